use crate::client::Resource;
use serde::{Deserialize, Serialize};

/// Named deployment context
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Environment {
    pub id: u64,
    pub name: String,
}

/// Create payload for an [`Environment`]
#[derive(Debug, Clone, Serialize)]
pub struct NewEnvironment {
    pub name: String,
}

impl NewEnvironment {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Resource for Environment {
    const COLLECTION: &'static str = "environments";
    const PAYLOAD_KEY: &'static str = "environment";

    fn id(&self) -> u64 {
        self.id
    }
}
