//! Extracted product record and the availability decision

use serde::Serialize;

/// Fields extracted from a product page
///
/// An `ItemInfo` depends only on the document it was extracted from; it holds
/// no network or clock state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemInfo {
    /// Product display name
    pub title: Option<String>,

    /// Price text as rendered on the page
    pub price: Option<String>,

    /// Text of the availability-status element
    pub availability: Option<String>,

    /// Whether the availability text equals the "contact agent" sentinel
    pub is_contact_agent_only: bool,
}

impl ItemInfo {
    /// Whether the item can be bought directly
    pub fn is_available(&self) -> bool {
        !self.is_contact_agent_only
    }
}

/// Decides whether the item is purchasable now
///
/// A page without an availability element counts as available.
pub fn is_available(info: &ItemInfo) -> bool {
    info.is_available()
}
