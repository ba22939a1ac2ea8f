//! Database operations for accounts and account metadata.

use rusqlite::{Connection, OptionalExtension, Row};
use serde_json::Value;

use crate::{
    Error,
    account::{Account, AccountId, AccountMeta},
};

/// Create an account and return it with its generated ID.
pub fn create_account(name: &str, connection: &Connection) -> Result<Account, Error> {
    connection.execute("INSERT INTO account (name) VALUES (?1);", (name,))?;

    let id = connection.last_insert_rowid();

    Ok(Account {
        id,
        name: name.to_owned(),
    })
}

/// Retrieve a single account by ID.
pub fn get_account(account_id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare("SELECT id, name FROM account WHERE id = :id;")?
        .query_row(&[(":id", &account_id)], map_account_row)
        .map_err(|error| error.into())
}

/// Retrieve all accounts ordered alphabetically by name.
pub fn get_all_accounts(connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare("SELECT id, name FROM account ORDER BY name ASC;")?
        .query_map([], map_account_row)?
        .map(|maybe_account| maybe_account.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the accounts matching `account_ids`, ordered alphabetically by name.
///
/// IDs that do not match an account are silently skipped.
pub fn get_accounts_by_ids(
    account_ids: &[AccountId],
    connection: &Connection,
) -> Result<Vec<Account>, Error> {
    if account_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; account_ids.len()].join(", ");
    let query =
        format!("SELECT id, name FROM account WHERE id IN ({placeholders}) ORDER BY name ASC");

    connection
        .prepare(&query)?
        .query_map(rusqlite::params_from_iter(account_ids.iter()), map_account_row)?
        .map(|maybe_account| maybe_account.map_err(|error| error.into()))
        .collect()
}

/// Store `value` as JSON-encoded metadata under `name` for the account
/// `account_id`, overwriting any existing value for that key.
///
/// # Errors
/// This function will return an:
/// - [Error::InvalidAccount] if `account_id` does not refer to a valid account,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn set_account_meta(
    account_id: AccountId,
    name: &str,
    value: &Value,
    connection: &Connection,
) -> Result<AccountMeta, Error> {
    let text = serde_json::to_string(value)
        .map_err(|error| Error::JsonSerializationError(error.to_string()))?;

    connection
        .execute(
            "INSERT INTO account_meta (account_id, name, data) VALUES (?1, ?2, ?3)
             ON CONFLICT(account_id, name) DO UPDATE SET data = excluded.data",
            (account_id, name, text),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidAccount(Some(account_id)),
            error => error.into(),
        })?;

    let id: i64 = connection
        .prepare("SELECT id FROM account_meta WHERE account_id = ?1 AND name = ?2")?
        .query_row((account_id, name), |row| row.get(0))?;

    Ok(AccountMeta {
        id,
        account_id,
        name: name.to_owned(),
        data: value.clone(),
    })
}

/// Retrieve and decode the metadata stored under `name` for the account
/// `account_id`, or `None` if the key has never been set.
///
/// # Errors
/// Returns an [Error::JsonSerializationError] if the stored text is not valid
/// JSON, or an [Error::SqlError] if there is an SQL error.
pub fn get_account_meta(
    account_id: AccountId,
    name: &str,
    connection: &Connection,
) -> Result<Option<Value>, Error> {
    let data: Option<String> = connection
        .prepare("SELECT data FROM account_meta WHERE account_id = ?1 AND name = ?2")?
        .query_row((account_id, name), |row| row.get(0))
        .optional()?;

    match data {
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|error| Error::JsonSerializationError(error.to_string())),
        None => Ok(None),
    }
}

/// Create the account and account metadata tables.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn create_account_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS account_meta (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            account_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            data TEXT NOT NULL,
            UNIQUE (account_id, name),
            FOREIGN KEY(account_id) REFERENCES account(id) ON DELETE CASCADE
        );",
    )?;

    Ok(())
}

fn map_account_row(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

#[cfg(test)]
mod account_tests {
    use rusqlite::Connection;

    use crate::{Error, db::initialize};

    use super::{create_account, get_account, get_accounts_by_ids, get_all_accounts};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn create_account_succeeds() {
        let connection = get_test_db_connection();

        let account = create_account("Checking", &connection).expect("Could not create account");

        assert!(account.id > 0);
        assert_eq!(account.name, "Checking");
    }

    #[test]
    fn get_account_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        let result = get_account(1337, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_all_accounts_orders_by_name() {
        let connection = get_test_db_connection();
        let savings = create_account("Savings", &connection).unwrap();
        let checking = create_account("Checking", &connection).unwrap();

        let accounts = get_all_accounts(&connection).unwrap();

        assert_eq!(accounts, vec![checking, savings]);
    }

    #[test]
    fn get_accounts_by_ids_skips_missing_ids() {
        let connection = get_test_db_connection();
        let checking = create_account("Checking", &connection).unwrap();

        let accounts = get_accounts_by_ids(&[checking.id, checking.id + 99], &connection).unwrap();

        assert_eq!(accounts, vec![checking]);
    }
}
