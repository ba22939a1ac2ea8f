//! A key/value config store persisted in the application database.
//!
//! Values are JSON-encoded so that callers can store booleans, numbers, or
//! structured data under a name key. One-time data migrations use this store
//! to record that they have been executed.

use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;

use crate::Error;

/// Retrieve the config value stored under `name`, or `None` if the key has
/// never been set.
///
/// # Errors
/// Returns an [Error::JsonSerializationError] if the stored text is not valid
/// JSON, or an [Error::SqlError] if there is an SQL error.
pub fn get_config(name: &str, connection: &Connection) -> Result<Option<Value>, Error> {
    let data: Option<String> = connection
        .prepare("SELECT data FROM config WHERE name = :name")?
        .query_row(&[(":name", &name)], |row| row.get(0))
        .optional()?;

    match data {
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|error| Error::JsonSerializationError(error.to_string())),
        None => Ok(None),
    }
}

/// Store `value` under `name`, overwriting any existing value.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn set_config(name: &str, value: &Value, connection: &Connection) -> Result<(), Error> {
    let text = serde_json::to_string(value)
        .map_err(|error| Error::JsonSerializationError(error.to_string()))?;

    connection.execute(
        "INSERT INTO config (name, data) VALUES (?1, ?2)
         ON CONFLICT(name) DO UPDATE SET data = excluded.data",
        (name, text),
    )?;

    Ok(())
}

/// Read a boolean flag from the config store.
///
/// Missing keys and non-boolean values read as `false`.
pub fn get_bool_config(name: &str, connection: &Connection) -> Result<bool, Error> {
    Ok(get_config(name, connection)?
        .and_then(|value| value.as_bool())
        .unwrap_or(false))
}

/// Store a boolean flag in the config store.
pub fn set_bool_config(name: &str, value: bool, connection: &Connection) -> Result<(), Error> {
    set_config(name, &Value::Bool(value), connection)
}

/// Create the config table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_config_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS config (
                name TEXT PRIMARY KEY,
                data TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}
