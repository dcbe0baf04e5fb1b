use crate::client::Resource;
use serde::Deserialize;

/// Category of a non-snippet template (provision, PXELinux, ...). Read-only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateKind {
    pub id: u64,
    pub name: String,
}

impl Resource for TemplateKind {
    const COLLECTION: &'static str = "template_kinds";
    const PAYLOAD_KEY: &'static str = "template_kind";

    fn id(&self) -> u64 {
        self.id
    }
}
