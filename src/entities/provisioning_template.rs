//! Provisioning templates and their embedded combination lists

use crate::client::Resource;
use serde::{Deserialize, Serialize};

const DEFAULT_TEMPLATE_BODY: &str = "#!/bin/sh\necho \"provisioning <%= @host.name %>\"\n";

/// A template document as returned by the server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProvisioningTemplate {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub snippet: bool,
    #[serde(default)]
    pub template_kind_id: Option<u64>,
    /// Combinations in server order; `null` decodes as empty
    #[serde(default, deserialize_with = "null_as_empty")]
    pub template_combinations: Vec<CombinationSummary>,
}

/// Combination entry embedded in a template
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CombinationSummary {
    pub id: u64,
    #[serde(default)]
    pub hostgroup_id: Option<u64>,
    #[serde(default)]
    pub environment_id: Option<u64>,
}

/// Combination requested at template creation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinationAttributes {
    pub hostgroup_id: u64,
    pub environment_id: u64,
}

/// Create payload for a [`ProvisioningTemplate`]
///
/// The combination list is sent under the server's nested-attributes name.
#[derive(Debug, Clone, Serialize)]
pub struct NewProvisioningTemplate {
    pub name: String,
    pub template: String,
    pub snippet: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_kind_id: Option<u64>,
    #[serde(
        rename = "template_combinations_attributes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub template_combinations: Vec<CombinationAttributes>,
}

impl NewProvisioningTemplate {
    /// Non-snippet template with a placeholder body and no combinations
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: DEFAULT_TEMPLATE_BODY.to_string(),
            snippet: false,
            template_kind_id: None,
            template_combinations: Vec::new(),
        }
    }

    pub fn with_template_kind(mut self, template_kind_id: Option<u64>) -> Self {
        self.template_kind_id = template_kind_id;
        self
    }

    /// Embed a combination for the given hostgroup/environment pair
    pub fn with_combination(mut self, hostgroup_id: u64, environment_id: u64) -> Self {
        self.template_combinations.push(CombinationAttributes {
            hostgroup_id,
            environment_id,
        });
        self
    }
}

impl Resource for ProvisioningTemplate {
    const COLLECTION: &'static str = "provisioning_templates";
    const PAYLOAD_KEY: &'static str = "provisioning_template";

    fn id(&self) -> u64 {
        self.id
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
