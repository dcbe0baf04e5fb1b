//! # provisioning-e2e
//!
//! End-to-end API tests for the template combination relationship of a
//! provisioning-management server.
//!
//! A template combination ties one provisioning template to one hostgroup and
//! one environment. The harness creates those prerequisites on a running
//! server, creates a combination, checks that it can be read back and deleted,
//! and removes everything it created.
//!
//! ## Layout
//!
//! - **client**: typed REST client over `reqwest` with status-to-error mapping
//! - **entities**: environments, hostgroups, template kinds, templates, combinations
//! - **fixtures**: shared and per-scenario fixtures with guaranteed teardown
//! - **scenarios**: the get/delete checks and a suite runner
//!
//! ## Running against a server
//!
//! ```bash
//! PROVISIONING_URL=https://foreman.example.com \
//! PROVISIONING_USERNAME=admin PROVISIONING_PASSWORD=changeme \
//! cargo test --test e2e_smoke -- --ignored --nocapture
//! ```

pub mod client;
pub mod config;
pub mod entities;
pub mod fixtures;
pub mod scenarios;
pub mod telemetry;

mod error;

pub use client::{ApiClient, ListResponse, Resource};
pub use config::HarnessConfig;
pub use error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::client::{ApiClient, Resource};
    pub use crate::config::HarnessConfig;
    pub use crate::entities::{
        EntityRef, Environment, Hostgroup, ProvisioningTemplate, TemplateCombination,
    };
    pub use crate::fixtures::{
        with_shared_fixtures, with_template_combination, CombinationFixture, SharedFixtures,
    };
    pub use crate::scenarios::{run_suite, Scenario, ScenarioOutcome};
    pub use crate::{Error, Result};
}
