//! The enumerated classification of a transaction journal.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Database identifier for a transaction type.
pub type TransactionTypeId = i64;

/// The classification of a transaction journal.
///
/// `Invalid` is a sentinel value: it is never assigned to new journals, but
/// historical records may be re-pointed at it by data migrations to mark them
/// as legacy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money leaving an asset account, e.g. groceries.
    Withdrawal,
    /// Money entering an asset account, e.g. salary.
    Deposit,
    /// Money moving between two asset accounts.
    Transfer,
    /// Sentinel value used to flag legacy records.
    Invalid,
}

impl TransactionType {
    /// The string stored in the database for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Deposit => "deposit",
            TransactionType::Transfer => "transfer",
            TransactionType::Invalid => "invalid",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "withdrawal" => Ok(TransactionType::Withdrawal),
            "deposit" => Ok(TransactionType::Deposit),
            "transfer" => Ok(TransactionType::Transfer),
            "invalid" => Ok(TransactionType::Invalid),
            _ => Err(Error::NotFound),
        }
    }
}

/// Retrieve the ID for `transaction_type`, creating the row on demand.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_or_create_transaction_type(
    transaction_type: TransactionType,
    connection: &Connection,
) -> Result<TransactionTypeId, Error> {
    let existing: Option<TransactionTypeId> = connection
        .prepare("SELECT id FROM transaction_type WHERE type = :type")?
        .query_row(&[(":type", transaction_type.as_str())], |row| row.get(0))
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    connection.execute(
        "INSERT INTO transaction_type (type) VALUES (?1)",
        (transaction_type.as_str(),),
    )?;

    Ok(connection.last_insert_rowid())
}

/// Retrieve the type stored under `id`.
///
/// # Errors
/// Returns an [Error::NotFound] if `id` does not refer to a valid transaction
/// type, or an [Error::SqlError] if there is some other SQL error.
pub fn get_transaction_type(
    id: TransactionTypeId,
    connection: &Connection,
) -> Result<TransactionType, Error> {
    let name: String = connection
        .prepare("SELECT type FROM transaction_type WHERE id = :id")?
        .query_row(&[(":id", &id)], |row| row.get(0))?;

    name.parse()
}

/// Create the transaction type table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_type_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transaction_type (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type TEXT NOT NULL UNIQUE
                )",
        (),
    )?;

    Ok(())
}

#[cfg(test)]
mod transaction_type_tests {
    use rusqlite::Connection;

    use crate::Error;

    use super::{
        TransactionType, create_transaction_type_table, get_or_create_transaction_type,
        get_transaction_type,
    };

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_transaction_type_table(&connection)
            .expect("Could not create transaction type table");
        connection
    }

    #[test]
    fn get_or_create_creates_missing_type() {
        let connection = get_test_db_connection();

        let id = get_or_create_transaction_type(TransactionType::Invalid, &connection).unwrap();

        assert!(id > 0);
        assert_eq!(
            get_transaction_type(id, &connection),
            Ok(TransactionType::Invalid)
        );
    }

    #[test]
    fn get_or_create_returns_existing_id() {
        let connection = get_test_db_connection();
        let first =
            get_or_create_transaction_type(TransactionType::Withdrawal, &connection).unwrap();

        let second =
            get_or_create_transaction_type(TransactionType::Withdrawal, &connection).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn get_type_fails_on_invalid_id() {
        let connection = get_test_db_connection();

        let result = get_transaction_type(1337, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn type_strings_round_trip() {
        for transaction_type in [
            TransactionType::Withdrawal,
            TransactionType::Deposit,
            TransactionType::Transfer,
            TransactionType::Invalid,
        ] {
            let parsed: TransactionType = transaction_type.as_str().parse().unwrap();

            assert_eq!(parsed, transaction_type);
        }
    }
}
