//! Database operations for categories, their journal links, notes, and
//! attachments.
//!
//! Notes and attachments are stored in polymorphic tables keyed by an owner
//! type string and owner ID, so other models can reuse them later without a
//! schema change.

use rusqlite::{Connection, OptionalExtension, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName},
    journal::JournalId,
};

/// The owner type string for rows in the polymorphic note and attachment
/// tables that belong to a category.
const CATEGORY_OWNER_TYPE: &str = "category";

/// A file attached to a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// The ID of the attachment row.
    pub id: i64,
    /// The name of the attached file.
    pub filename: String,
}

/// Create a category and return it with its generated ID.
pub fn create_category(name: CategoryName, connection: &Connection) -> Result<Category, Error> {
    connection.execute("INSERT INTO category (name) VALUES (?1);", (name.as_ref(),))?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name,
        deleted_at: None,
    })
}

/// Retrieve a single category by ID.
///
/// Soft-deleted categories are treated as not found.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, name, deleted_at FROM category
             WHERE id = :id AND deleted_at IS NULL;",
        )?
        .query_row(&[(":id", &category_id)], map_category_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories that have not been soft-deleted, ordered
/// alphabetically by name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, deleted_at FROM category
             WHERE deleted_at IS NULL ORDER BY name ASC;",
        )?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Soft-delete the category `category_id` by recording a deletion timestamp.
///
/// The row, its journal links, and its notes and attachments are all kept so
/// that existing reports remain intact.
///
/// # Errors
/// This function will return an:
/// - [Error::DeleteMissingCategory] if `category_id` does not refer to a
///   category that is still live,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn soft_delete_category(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
        (OffsetDateTime::now_utc(), category_id),
    )?;

    if rows_affected == 0 {
        Err(Error::DeleteMissingCategory(category_id))
    } else {
        Ok(())
    }
}

/// Attach the category `category_id` to the journal `journal_id`.
///
/// Attaching the same category twice is a no-op.
pub fn link_journal_to_category(
    category_id: CategoryId,
    journal_id: JournalId,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT OR IGNORE INTO category_transaction_journal (category_id, transaction_journal_id)
         VALUES (?1, ?2)",
        (category_id, journal_id),
    )?;

    Ok(())
}

/// Detach the category `category_id` from the journal `journal_id`.
///
/// Detaching a category that was never attached is a no-op.
pub fn unlink_journal_from_category(
    category_id: CategoryId,
    journal_id: JournalId,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "DELETE FROM category_transaction_journal
         WHERE category_id = ?1 AND transaction_journal_id = ?2",
        (category_id, journal_id),
    )?;

    Ok(())
}

/// Store `text` as the note for the category `category_id`, replacing any
/// existing note.
pub fn set_category_note(
    category_id: CategoryId,
    text: &str,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO note (owner_id, owner_type, text) VALUES (?1, ?2, ?3)
         ON CONFLICT(owner_id, owner_type) DO UPDATE SET text = excluded.text",
        (category_id, CATEGORY_OWNER_TYPE, text),
    )?;

    Ok(())
}

/// Retrieve the note for the category `category_id`, or `None` if no note has
/// been set.
pub fn get_category_note(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Option<String>, Error> {
    connection
        .prepare("SELECT text FROM note WHERE owner_id = ?1 AND owner_type = ?2")?
        .query_row((category_id, CATEGORY_OWNER_TYPE), |row| row.get(0))
        .optional()
        .map_err(|error| error.into())
}

/// Record a file attachment against the category `category_id`.
pub fn add_category_attachment(
    category_id: CategoryId,
    filename: &str,
    connection: &Connection,
) -> Result<Attachment, Error> {
    connection.execute(
        "INSERT INTO attachment (owner_id, owner_type, filename) VALUES (?1, ?2, ?3)",
        (category_id, CATEGORY_OWNER_TYPE, filename),
    )?;

    Ok(Attachment {
        id: connection.last_insert_rowid(),
        filename: filename.to_owned(),
    })
}

/// Retrieve the attachments recorded against the category `category_id`, in
/// insertion order.
pub fn get_category_attachments(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Vec<Attachment>, Error> {
    connection
        .prepare(
            "SELECT id, filename FROM attachment
             WHERE owner_id = ?1 AND owner_type = ?2 ORDER BY id ASC",
        )?
        .query_map((category_id, CATEGORY_OWNER_TYPE), |row| {
            Ok(Attachment {
                id: row.get(0)?,
                filename: row.get(1)?,
            })
        })?
        .map(|maybe_attachment| maybe_attachment.map_err(|error| error.into()))
        .collect()
}

/// Count the journals linked to each live category.
pub(crate) fn count_journals_per_category(
    connection: &Connection,
) -> Result<std::collections::HashMap<CategoryId, u32>, Error> {
    let result: Result<std::collections::HashMap<CategoryId, u32>, rusqlite::Error> = connection
        .prepare(
            "SELECT category_id, COUNT(1) FROM category_transaction_journal GROUP BY category_id",
        )?
        .query_map((), |row| {
            let category_id = row.get(0)?;
            let count = row.get(1)?;

            Ok((category_id, count))
        })?
        .collect();

    result.map_err(Error::from)
}

/// Create the category table, its journal join table, and the polymorphic
/// note and attachment tables.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn create_category_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            deleted_at TEXT
        );

        CREATE TABLE IF NOT EXISTS category_transaction_journal (
            category_id INTEGER NOT NULL,
            transaction_journal_id INTEGER NOT NULL,
            PRIMARY KEY (category_id, transaction_journal_id),
            FOREIGN KEY(category_id) REFERENCES category(id) ON DELETE CASCADE,
            FOREIGN KEY(transaction_journal_id) REFERENCES transaction_journal(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS note (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            owner_type TEXT NOT NULL,
            text TEXT NOT NULL,
            UNIQUE (owner_id, owner_type)
        );

        CREATE TABLE IF NOT EXISTS attachment (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            owner_type TEXT NOT NULL,
            filename TEXT NOT NULL
        );",
    )?;

    Ok(())
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);
    let deleted_at = row.get(2)?;

    Ok(Category {
        id,
        name,
        deleted_at,
    })
}

#[cfg(test)]
mod category_tests {
    use rusqlite::Connection;

    use crate::{Error, db::initialize};

    use super::{
        CategoryName, create_category, get_all_categories, get_category, soft_delete_category,
    };

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn create_category_succeeds() {
        let connection = get_test_db_connection();
        let name = CategoryName::new("Groceries").unwrap();

        let category =
            create_category(name.clone(), &connection).expect("Could not create category");

        assert!(category.id > 0);
        assert_eq!(category.name, name);
        assert_eq!(category.deleted_at, None);
    }

    #[test]
    fn get_category_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        let result = get_category(999, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_all_categories_orders_by_name() {
        let connection = get_test_db_connection();
        let rent = create_category(CategoryName::new_unchecked("Rent"), &connection).unwrap();
        let bills = create_category(CategoryName::new_unchecked("Bills"), &connection).unwrap();

        let categories = get_all_categories(&connection).unwrap();

        assert_eq!(categories, vec![bills, rent]);
    }

    #[test]
    fn soft_delete_hides_category_from_queries() {
        let connection = get_test_db_connection();
        let category =
            create_category(CategoryName::new_unchecked("Groceries"), &connection).unwrap();

        soft_delete_category(category.id, &connection).expect("Could not delete category");

        assert_eq!(get_category(category.id, &connection), Err(Error::NotFound));
        assert_eq!(get_all_categories(&connection).unwrap(), vec![]);
    }

    #[test]
    fn soft_delete_keeps_the_row() {
        let connection = get_test_db_connection();
        let category =
            create_category(CategoryName::new_unchecked("Groceries"), &connection).unwrap();

        soft_delete_category(category.id, &connection).unwrap();

        let count: i64 = connection
            .query_row("SELECT COUNT(1) FROM category", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn soft_delete_missing_category_fails() {
        let connection = get_test_db_connection();

        let result = soft_delete_category(404, &connection);

        assert_eq!(result, Err(Error::DeleteMissingCategory(404)));
    }

    #[test]
    fn soft_delete_twice_fails_the_second_time() {
        let connection = get_test_db_connection();
        let category =
            create_category(CategoryName::new_unchecked("Groceries"), &connection).unwrap();

        soft_delete_category(category.id, &connection).unwrap();
        let result = soft_delete_category(category.id, &connection);

        assert_eq!(result, Err(Error::DeleteMissingCategory(category.id)));
    }
}
