//! Recurring transaction templates and the one-time type migration.

mod db;
mod domain;
mod migration;

pub use db::{
    create_recurrence, create_recurrence_tables, get_all_recurrences, get_recurrence,
    get_recurrence_transactions,
};
pub use domain::{
    NewRecurrence, NewRecurrenceTransaction, Recurrence, RecurrenceId, RecurrenceTransaction,
};
pub use migration::{MIGRATE_RECURRENCE_TYPE_CONFIG, MigrationSummary, migrate_recurrence_types};
