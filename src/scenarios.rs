//! Template combination scenarios
//!
//! Each scenario runs against a [`CombinationFixture`] and reports a failed
//! check as [`Error::Assertion`].

use crate::client::ApiClient;
use crate::entities::{ProvisioningTemplate, TemplateCombination};
use crate::fixtures::{with_shared_fixtures, with_template_combination, CombinationFixture};
use crate::{Error, Result};

use std::fmt::Debug;
use tracing::{info, warn};

/// Reading a combination returns the template, environment and hostgroup it was created with.
pub async fn get_combination(client: &ApiClient, fixture: &CombinationFixture) -> Result<()> {
    let combination: TemplateCombination = client.read(fixture.combination.id).await?;

    check_eq(
        "combination provisioning template id",
        fixture.template.id,
        combination.provisioning_template.id,
    )?;
    check_eq(
        "combination environment id",
        fixture.shared.environment.id,
        combination.environment.id,
    )?;
    check_eq(
        "combination hostgroup id",
        fixture.shared.hostgroup.id,
        combination.hostgroup.id,
    )?;

    let again: TemplateCombination = client.read(fixture.combination.id).await?;
    check_eq("repeated combination read", &combination, &again)
}

/// Deleting a combination makes it unreadable and empties the parent template's list.
pub async fn delete_combination(client: &ApiClient, fixture: &CombinationFixture) -> Result<()> {
    let combination: TemplateCombination = client.read(fixture.combination.id).await?;

    let before = combination_count(client, fixture.template.id).await?;
    check_eq("template combinations before delete", 1, before)?;

    client.remove::<TemplateCombination>(combination.id).await?;

    match client.read::<TemplateCombination>(combination.id).await {
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e),
        Ok(still_there) => {
            return Err(Error::assertion(
                "combination read after delete",
                "not found",
                still_there,
            ));
        }
    }

    let after = combination_count(client, fixture.template.id).await?;
    check_eq("template combinations after delete", 0, after)
}

async fn combination_count(client: &ApiClient, template_id: u64) -> Result<usize> {
    let template: ProvisioningTemplate = client.read(template_id).await?;
    Ok(template.template_combinations.len())
}

pub(crate) fn check_eq<T>(what: &str, expected: T, actual: T) -> Result<()>
where
    T: PartialEq + Debug,
{
    if expected == actual {
        Ok(())
    } else {
        Err(Error::assertion(what, expected, actual))
    }
}

/// Scenarios exercised by [`run_suite`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    GetCombination,
    DeleteCombination,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::GetCombination, Scenario::DeleteCombination];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::GetCombination => "positive_get_combination",
            Scenario::DeleteCombination => "positive_delete_combination",
        }
    }

    pub async fn run(self, client: &ApiClient, fixture: &CombinationFixture) -> Result<()> {
        match self {
            Scenario::GetCombination => get_combination(client, fixture).await,
            Scenario::DeleteCombination => delete_combination(client, fixture).await,
        }
    }
}

/// Result of one scenario in a suite run
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub scenario: Scenario,
    pub result: Result<()>,
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run every scenario in one shared fixture group, each with its own combination fixture.
///
/// A scenario failure (including its fixture setup) is recorded and the
/// suite moves on; shared fixture setup or teardown failure fails the run.
pub async fn run_suite(client: &ApiClient) -> Result<Vec<ScenarioOutcome>> {
    with_shared_fixtures(client, |client, shared| async move {
        let mut outcomes = Vec::with_capacity(Scenario::ALL.len());

        for scenario in Scenario::ALL {
            let result = with_template_combination(&client, &shared, |client, fixture| async move {
                scenario.run(&client, &fixture).await
            })
            .await;

            match &result {
                Ok(()) => info!(scenario = scenario.name(), "Scenario passed"),
                Err(e) => warn!(scenario = scenario.name(), error = %e, "Scenario failed"),
            }
            outcomes.push(ScenarioOutcome { scenario, result });
        }

        Ok(outcomes)
    })
    .await
}
