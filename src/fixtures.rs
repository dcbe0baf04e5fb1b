//! Fixture provisioning with guaranteed teardown
//!
//! Shared fixtures (one hostgroup, one environment) are created once per test
//! group and reused by every scenario in it. Each scenario then gets a fresh
//! provisioning template carrying exactly one template combination that points
//! at the shared pair.
//!
//! The `with_*` helpers run a body between setup and teardown. Teardown runs
//! when the body returns `Ok`, returns `Err`, or panics; a panic is resumed
//! once teardown has finished.

use crate::client::ApiClient;
use crate::entities::{
    EntityRef, Environment, Hostgroup, NewEnvironment, NewHostgroup, NewProvisioningTemplate,
    ProvisioningTemplate, TemplateCombination, TemplateKind,
};
use crate::{Error, Result};

use futures::FutureExt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

/// Name with a random suffix, safe for resources that only allow `[A-Za-z0-9_]`
pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Hostgroup and environment shared by a test group. Scenarios must not mutate them.
#[derive(Debug, Clone)]
pub struct SharedFixtures {
    pub hostgroup: Hostgroup,
    pub environment: Environment,
}

impl SharedFixtures {
    /// Create the hostgroup, then the environment
    pub async fn setup(client: &ApiClient) -> Result<Self> {
        let hostgroup: Hostgroup = client
            .create(&NewHostgroup::new(unique_name("hostgroup")))
            .await?;
        info!(hostgroup_id = hostgroup.id, name = %hostgroup.name, "Created shared hostgroup");

        let environment: Environment =
            match client.create(&NewEnvironment::new(unique_name("env"))).await {
                Ok(environment) => environment,
                Err(e) => {
                    if let Err(cleanup) = client.remove::<Hostgroup>(hostgroup.id).await {
                        warn!(
                            hostgroup_id = hostgroup.id,
                            error = %cleanup,
                            "Failed to remove hostgroup after environment creation failed"
                        );
                    }
                    return Err(e);
                }
            };
        info!(environment_id = environment.id, name = %environment.name, "Created shared environment");

        Ok(Self {
            hostgroup,
            environment,
        })
    }

    /// Delete the hostgroup, then the environment. Both are attempted; the first error wins.
    pub async fn teardown(self, client: &ApiClient) -> Result<()> {
        let hostgroup = client.remove::<Hostgroup>(self.hostgroup.id).await;
        let environment = client.remove::<Environment>(self.environment.id).await;
        info!(
            hostgroup_id = self.hostgroup.id,
            environment_id = self.environment.id,
            "Removed shared fixtures"
        );
        hostgroup.and(environment)
    }
}

/// A fresh template with one combination, plus the shared pair it references
#[derive(Debug, Clone)]
pub struct CombinationFixture {
    pub shared: SharedFixtures,
    pub template: ProvisioningTemplate,
    pub combination: TemplateCombination,
}

impl CombinationFixture {
    /// Create a non-snippet template embedding one `{hostgroup, environment}` combination
    pub async fn setup(client: &ApiClient, shared: &SharedFixtures) -> Result<Self> {
        let template_kind_id = client
            .list::<TemplateKind>()
            .await?
            .first()
            .map(|kind| kind.id);

        let draft = NewProvisioningTemplate::new(unique_name("template"))
            .with_template_kind(template_kind_id)
            .with_combination(shared.hostgroup.id, shared.environment.id);
        let template: ProvisioningTemplate = client.create(&draft).await?;

        let Some(combination_id) = template.template_combinations.first().map(|c| c.id) else {
            if let Err(cleanup) = client.remove::<ProvisioningTemplate>(template.id).await {
                warn!(template_id = template.id, error = %cleanup, "Failed to remove template");
            }
            return Err(Error::Fixture(format!(
                "provisioning template {} was created without a template combination",
                template.id
            )));
        };

        let combination = TemplateCombination {
            id: combination_id,
            provisioning_template: EntityRef::named(template.id, template.name.clone()),
            hostgroup: EntityRef::named(shared.hostgroup.id, shared.hostgroup.name.clone()),
            environment: EntityRef::named(shared.environment.id, shared.environment.name.clone()),
        };
        info!(
            template_id = template.id,
            combination_id = combination.id,
            "Created template combination fixture"
        );

        Ok(Self {
            shared: shared.clone(),
            template,
            combination,
        })
    }

    /// Delete the combination (already gone is fine), then the template
    pub async fn teardown(self, client: &ApiClient) -> Result<()> {
        let combination = match client.remove::<TemplateCombination>(self.combination.id).await {
            Err(e) if e.is_not_found() => {
                debug!(
                    combination_id = self.combination.id,
                    "Template combination already removed"
                );
                Ok(())
            }
            other => other,
        };
        let template = client.remove::<ProvisioningTemplate>(self.template.id).await;
        info!(
            template_id = self.template.id,
            combination_id = self.combination.id,
            "Removed template combination fixture"
        );
        combination.and(template)
    }
}

/// Run `body` with freshly created shared fixtures, tearing them down afterwards
pub async fn with_shared_fixtures<F, Fut, T>(client: &ApiClient, body: F) -> Result<T>
where
    F: FnOnce(ApiClient, SharedFixtures) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let shared = SharedFixtures::setup(client).await?;
    let outcome = AssertUnwindSafe(body(client.clone(), shared.clone()))
        .catch_unwind()
        .await;
    let teardown = shared.teardown(client).await;
    settle("shared fixtures", outcome, teardown)
}

/// Run `body` with a fresh template combination, tearing it down afterwards
pub async fn with_template_combination<F, Fut, T>(
    client: &ApiClient,
    shared: &SharedFixtures,
    body: F,
) -> Result<T>
where
    F: FnOnce(ApiClient, CombinationFixture) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let fixture = CombinationFixture::setup(client, shared).await?;
    let outcome = AssertUnwindSafe(body(client.clone(), fixture.clone()))
        .catch_unwind()
        .await;
    let teardown = fixture.teardown(client).await;
    settle("template combination fixture", outcome, teardown)
}

// Body result takes precedence; a panic is resumed only after teardown ran.
fn settle<T>(
    scope: &str,
    outcome: std::thread::Result<Result<T>>,
    teardown: Result<()>,
) -> Result<T> {
    match outcome {
        Ok(Ok(value)) => teardown.map(|()| value),
        Ok(Err(e)) => {
            if let Err(teardown_err) = teardown {
                warn!(scope, error = %teardown_err, "Teardown failed after body error");
            }
            Err(e)
        }
        Err(payload) => {
            if let Err(teardown_err) = teardown {
                warn!(scope, error = %teardown_err, "Teardown failed after body panic");
            }
            panic::resume_unwind(payload)
        }
    }
}
