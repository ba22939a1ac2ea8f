//! Core journal domain types.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{account::AccountId, transaction_type::TransactionTypeId};

/// Database identifier for a transaction journal.
pub type JournalId = i64;

/// The header row of a double-entry transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionJournal {
    /// The ID of the journal.
    pub id: JournalId,
    /// A human-readable description, e.g. 'Weekly groceries'.
    pub description: String,
    /// The date the transaction happened.
    pub date: Date,
    /// The ID of the journal's transaction type (withdrawal, deposit, ...).
    pub transaction_type_id: TransactionTypeId,
}

/// One leg of a double-entry transaction.
///
/// The source leg carries a negative amount and the destination leg carries
/// the matching positive amount. The foreign amount is set when the leg was
/// settled in a different currency, and follows the same sign convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionLeg {
    /// The ID of the leg.
    pub id: i64,
    /// The ID of the journal this leg belongs to.
    pub journal_id: JournalId,
    /// The ID of the account money moved out of or into.
    pub account_id: AccountId,
    /// The amount of money, negative for the source leg.
    pub amount: f64,
    /// The amount in the foreign currency, if any.
    pub foreign_amount: Option<f64>,
}

/// A journal joined with both of its legs, as returned by the collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalRow {
    /// The journal header.
    pub journal: TransactionJournal,
    /// The leg money moved out of.
    pub source: TransactionLeg,
    /// The leg money moved into.
    pub destination: TransactionLeg,
}

/// The data needed to create a journal and its two legs.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJournal {
    /// A human-readable description.
    pub description: String,
    /// The date the transaction happened.
    pub date: Date,
    /// The ID of the journal's transaction type.
    pub transaction_type_id: TransactionTypeId,
    /// The account money moves out of.
    pub source_account_id: AccountId,
    /// The account money moves into.
    pub destination_account_id: AccountId,
    /// The amount of money moved. Must be positive; the source leg is stored
    /// as its negation.
    pub amount: f64,
    /// The amount in the foreign currency, if the transaction was settled in
    /// a different currency. Must be positive when set.
    pub foreign_amount: Option<f64>,
}
