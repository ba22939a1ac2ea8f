//! Tags for grouping transaction journals, used by the tag/month report.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, journal::JournalId};

/// Database identifier for a tag.
pub type TagId = i64;

/// A validated, non-empty tag name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct TagName(String);

impl TagName {
    /// Create a tag name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyTagName] if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyTagName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a tag name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for TagName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for TagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tag for grouping transaction journals (e.g., 'Holiday 2025').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Tag {
    /// The ID of the tag.
    pub id: TagId,
    /// The name of the tag.
    pub name: TagName,
}

/// Create a tag and return it with its generated ID.
pub fn create_tag(name: TagName, connection: &Connection) -> Result<Tag, Error> {
    connection.execute("INSERT INTO tag (name) VALUES (?1);", (name.as_ref(),))?;

    let id = connection.last_insert_rowid();

    Ok(Tag { id, name })
}

/// Retrieve a single tag by ID.
pub fn get_tag(tag_id: TagId, connection: &Connection) -> Result<Tag, Error> {
    connection
        .prepare("SELECT id, name FROM tag WHERE id = :id;")?
        .query_row(&[(":id", &tag_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve the tags matching `tag_ids`, ordered alphabetically by name.
///
/// IDs that do not match a tag are silently skipped.
pub fn get_tags_by_ids(tag_ids: &[TagId], connection: &Connection) -> Result<Vec<Tag>, Error> {
    if tag_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; tag_ids.len()].join(", ");
    let query = format!("SELECT id, name FROM tag WHERE id IN ({placeholders}) ORDER BY name ASC");

    connection
        .prepare(&query)?
        .query_map(rusqlite::params_from_iter(tag_ids.iter()), map_row)?
        .map(|maybe_tag| maybe_tag.map_err(|error| error.into()))
        .collect()
}

/// Attach `tag_id` to the journal `journal_id`.
///
/// Attaching the same tag twice is a no-op.
pub fn tag_journal(tag_id: TagId, journal_id: JournalId, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT OR IGNORE INTO tag_transaction_journal (tag_id, transaction_journal_id)
         VALUES (?1, ?2)",
        (tag_id, journal_id),
    )?;

    Ok(())
}

/// Create the tag table and its journal join table.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn create_tag_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS tag (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS tag_transaction_journal (
            tag_id INTEGER NOT NULL,
            transaction_journal_id INTEGER NOT NULL,
            PRIMARY KEY (tag_id, transaction_journal_id),
            FOREIGN KEY(tag_id) REFERENCES tag(id) ON DELETE CASCADE,
            FOREIGN KEY(transaction_journal_id) REFERENCES transaction_journal(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_tag_name ON tag(name);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Tag, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = TagName::new_unchecked(&raw_name);

    Ok(Tag { id, name })
}


#[cfg(test)]
mod tag_query_tests {
    use rusqlite::Connection;

    use crate::{Error, db::initialize};

    use super::{TagName, create_tag, get_tag, get_tags_by_ids};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn create_tag_succeeds() {
        let connection = get_test_db_connection();
        let name = TagName::new("Terrifically a tag").unwrap();

        let tag = create_tag(name.clone(), &connection);

        let got_tag = tag.expect("Could not create tag");
        assert!(got_tag.id > 0);
        assert_eq!(got_tag.name, name);
    }

    #[test]
    fn get_tag_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();
        let inserted_tag = create_tag(TagName::new_unchecked("Foo"), &connection)
            .expect("Could not create test tag");

        let selected_tag = get_tag(inserted_tag.id + 123, &connection);

        assert_eq!(selected_tag, Err(Error::NotFound));
    }

    #[test]
    fn get_tags_by_ids_orders_by_name() {
        let connection = get_test_db_connection();
        let zulu = create_tag(TagName::new_unchecked("Zulu"), &connection).unwrap();
        let alpha = create_tag(TagName::new_unchecked("Alpha"), &connection).unwrap();

        let tags = get_tags_by_ids(&[zulu.id, alpha.id], &connection).unwrap();

        assert_eq!(tags, vec![alpha, zulu]);
    }

    #[test]
    fn get_tags_by_ids_with_empty_ids_returns_empty() {
        let connection = get_test_db_connection();
        create_tag(TagName::new_unchecked("Foo"), &connection).unwrap();

        let tags = get_tags_by_ids(&[], &connection).unwrap();

        assert_eq!(tags, vec![]);
    }
}
