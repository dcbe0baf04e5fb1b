use crate::client::Resource;
use serde::{Deserialize, Serialize};

/// Named grouping of hosts
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Hostgroup {
    pub id: u64,
    pub name: String,
    /// Full path including ancestors, e.g. `base/web`
    #[serde(default)]
    pub title: Option<String>,
}

/// Create payload for a [`Hostgroup`]
#[derive(Debug, Clone, Serialize)]
pub struct NewHostgroup {
    pub name: String,
}

impl NewHostgroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Resource for Hostgroup {
    const COLLECTION: &'static str = "hostgroups";
    const PAYLOAD_KEY: &'static str = "hostgroup";

    fn id(&self) -> u64 {
        self.id
    }
}
