//! Typed views of provisioning server resources
//!
//! Each entity pairs a response type implementing [`crate::Resource`] with a draft
//! type used as the create payload.

mod environment;
mod hostgroup;
mod provisioning_template;
mod template_combination;
mod template_kind;

pub use environment::{Environment, NewEnvironment};
pub use hostgroup::{Hostgroup, NewHostgroup};
pub use provisioning_template::{
    CombinationAttributes, CombinationSummary, NewProvisioningTemplate, ProvisioningTemplate,
};
pub use template_combination::{NewTemplateCombination, TemplateCombination};
pub use template_kind::TemplateKind;

use serde::{Deserialize, Serialize};

/// Reference to a related resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityRef {
    pub fn new(id: u64) -> Self {
        Self { id, name: None }
    }

    pub fn named(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }
}
