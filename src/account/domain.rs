//! Core account domain types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Database identifier for an account.
pub type AccountId = i64;

/// A place money is held or moved through, e.g. a bank account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Account {
    /// The ID of the account.
    pub id: AccountId,
    /// The name of the account.
    pub name: String,
}

/// A single piece of metadata attached to an account.
///
/// The value is stored JSON-encoded under a name key, so callers can attach
/// booleans, numbers, or structured data, e.g. `{"currency": "NZD"}` under
/// the name `currency_settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountMeta {
    /// The ID of the metadata row.
    pub id: i64,
    /// The ID of the account this metadata belongs to.
    pub account_id: AccountId,
    /// The key the data is stored under.
    pub name: String,
    /// The decoded JSON value.
    pub data: Value,
}
