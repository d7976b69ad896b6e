//! Vendor-neutral item shape shared by all integrations.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One record loaded from an integration, e.g. a CRM contact.
///
/// Items are rebuilt on every fetch and carry no identity beyond it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IntegrationItem {
    /// `<vendor_id>_<item_type>`
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    /// `<vendor_parent_id>_Base` when the record has a parent.
    pub parent_id: Option<String>,
    pub parent_path_or_name: Option<String>,
}

impl IntegrationItem {
    /// Build an item from the identifying fields of a vendor record.
    pub fn from_vendor_record(
        vendor_id: &str,
        name: &str,
        item_type: &str,
        parent_id: Option<&str>,
        parent_name: Option<&str>,
    ) -> Self {
        Self {
            id: format!("{vendor_id}_{item_type}"),
            name: name.to_string(),
            item_type: item_type.to_string(),
            parent_id: parent_id.map(|id| format!("{id}_Base")),
            parent_path_or_name: parent_name.map(str::to_string),
        }
    }
}
