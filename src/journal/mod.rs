//! Double-entry transaction journals and the composable query collector.
//!
//! A journal is the unit of bookkeeping: it owns exactly two legs in the
//! `"transaction"` table, a source leg with a negative amount and a
//! destination leg with the matching positive amount. The collector builds
//! filtered queries over journals without callers writing SQL.

mod collector;
mod db;
mod domain;

pub use collector::JournalCollector;
pub use db::{create_journal, create_journal_tables, get_journal};
pub use domain::{JournalId, JournalRow, NewJournal, TransactionJournal, TransactionLeg};
