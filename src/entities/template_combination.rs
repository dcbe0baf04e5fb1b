//! The template/hostgroup/environment association

use super::EntityRef;
use crate::client::{ApiClient, ListResponse, Resource};
use serde::{Deserialize, Serialize};

/// Association tying one template to one hostgroup and one environment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "CombinationRecord")]
pub struct TemplateCombination {
    pub id: u64,
    pub provisioning_template: EntityRef,
    pub hostgroup: EntityRef,
    pub environment: EntityRef,
}

/// Create payload for the nested `provisioning_templates/{id}/template_combinations` route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTemplateCombination {
    pub hostgroup_id: u64,
    pub environment_id: u64,
}

impl Resource for TemplateCombination {
    const COLLECTION: &'static str = "template_combinations";
    const PAYLOAD_KEY: &'static str = "template_combination";

    fn id(&self) -> u64 {
        self.id
    }
}

impl TemplateCombination {
    /// Collection path of the combinations owned by a template
    pub fn nested_path(template_id: u64) -> String {
        format!("provisioning_templates/{}/template_combinations", template_id)
    }
}

impl ApiClient {
    /// List the combinations attached to a template
    pub async fn template_combinations_of(
        &self,
        template_id: u64,
    ) -> crate::Result<Vec<TemplateCombination>> {
        let page: ListResponse<TemplateCombination> =
            self.get(&TemplateCombination::nested_path(template_id)).await?;
        Ok(page.results)
    }

    /// Attach a new combination to an existing template
    pub async fn add_template_combination(
        &self,
        template_id: u64,
        draft: &NewTemplateCombination,
    ) -> crate::Result<TemplateCombination> {
        let path = TemplateCombination::nested_path(template_id);
        self.create_at::<TemplateCombination, _>(&path, draft).await
    }
}

// Wire shape: references arrive flat (`hostgroup_id`, `hostgroup_name`) or nested.
#[derive(Deserialize)]
struct CombinationRecord {
    id: u64,
    #[serde(default)]
    provisioning_template: Option<EntityRef>,
    #[serde(default)]
    provisioning_template_id: Option<u64>,
    #[serde(default)]
    provisioning_template_name: Option<String>,
    #[serde(default)]
    hostgroup: Option<EntityRef>,
    #[serde(default)]
    hostgroup_id: Option<u64>,
    #[serde(default)]
    hostgroup_name: Option<String>,
    #[serde(default)]
    environment: Option<EntityRef>,
    #[serde(default)]
    environment_id: Option<u64>,
    #[serde(default)]
    environment_name: Option<String>,
}

fn reference(
    field: &str,
    nested: Option<EntityRef>,
    id: Option<u64>,
    name: Option<String>,
) -> Result<EntityRef, String> {
    nested
        .or_else(|| id.map(|id| EntityRef { id, name }))
        .ok_or_else(|| format!("template combination is missing its {field} reference"))
}

impl TryFrom<CombinationRecord> for TemplateCombination {
    type Error = String;

    fn try_from(record: CombinationRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            provisioning_template: reference(
                "provisioning_template",
                record.provisioning_template,
                record.provisioning_template_id,
                record.provisioning_template_name,
            )?,
            hostgroup: reference(
                "hostgroup",
                record.hostgroup,
                record.hostgroup_id,
                record.hostgroup_name,
            )?,
            environment: reference(
                "environment",
                record.environment,
                record.environment_id,
                record.environment_name,
            )?,
        })
    }
}
