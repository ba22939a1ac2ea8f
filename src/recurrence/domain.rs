//! Core recurrence domain types.

use serde::{Deserialize, Serialize};

use crate::transaction_type::TransactionTypeId;

/// Database identifier for a recurrence.
pub type RecurrenceId = i64;

/// A template for generating repeating transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    /// The ID of the recurrence.
    pub id: RecurrenceId,
    /// A human-readable title, e.g. 'Monthly rent'.
    pub title: String,
    /// The ID of the recurrence's transaction type.
    ///
    /// On old databases this classifies the whole recurrence. The type
    /// migration moves the classification down to the individual template
    /// transactions and points this at the sentinel invalid type.
    pub transaction_type_id: TransactionTypeId,
}

/// A template transaction inside a recurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceTransaction {
    /// The ID of the template transaction.
    pub id: i64,
    /// The ID of the recurrence this template belongs to.
    pub recurrence_id: RecurrenceId,
    /// The ID of this template's own transaction type, once the type
    /// migration has run. `None` on unmigrated rows.
    pub transaction_type_id: Option<TransactionTypeId>,
    /// A human-readable description.
    pub description: String,
    /// The amount of money the generated transaction will move.
    pub amount: f64,
}

/// The data needed to create a recurrence and its template transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecurrence {
    /// A human-readable title.
    pub title: String,
    /// The ID of the recurrence's transaction type.
    pub transaction_type_id: TransactionTypeId,
    /// The template transactions the recurrence generates.
    pub transactions: Vec<NewRecurrenceTransaction>,
}

/// The data needed to create a template transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecurrenceTransaction {
    /// A human-readable description.
    pub description: String,
    /// The amount of money the generated transaction will move.
    pub amount: f64,
}
