//! Dialable address shared by outplans, targets and calls.

use serde::{Deserialize, Serialize};

/// Kind of address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressType {
    /// E.164 telephone number.
    Tel,
    /// SIP URI.
    Sip,
    /// Registered extension.
    Extension,
    /// Agent by id.
    Agent,
}

/// A source or destination address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Address kind.
    #[serde(rename = "type")]
    pub address_type: AddressType,
    /// Target string, e.g. `+821100000001`.
    pub target: String,
    /// Display name of the target.
    #[serde(default)]
    pub target_name: String,
    /// Free-form name.
    #[serde(default)]
    pub name: String,
    /// Free-form detail.
    #[serde(default)]
    pub detail: String,
}

impl Address {
    /// Telephone address with no display metadata.
    pub fn tel(target: impl Into<String>) -> Self {
        Self {
            address_type: AddressType::Tel,
            target: target.into(),
            target_name: String::new(),
            name: String::new(),
            detail: String::new(),
        }
    }
}
