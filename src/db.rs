//! Database initialization for the application's domain models.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    account::create_account_tables,
    category::create_category_tables,
    config_store::create_config_table,
    journal::create_journal_tables,
    recurrence::create_recurrence_tables,
    tag::create_tag_tables,
    transaction_type::create_transaction_type_table,
};

/// Create the tables for all of the application's domain models.
///
/// All tables are created inside a single exclusive transaction so that a
/// partially initialized database is never left behind. Tables use
/// `IF NOT EXISTS`, so calling this function on an existing database is a
/// no-op.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Foreign key enforcement is per-connection and cannot be changed inside
    // a transaction.
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_account_tables(&transaction)?;
    create_transaction_type_table(&transaction)?;
    create_journal_tables(&transaction)?;
    create_category_tables(&transaction)?;
    create_tag_tables(&transaction)?;
    create_recurrence_tables(&transaction)?;
    create_config_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
