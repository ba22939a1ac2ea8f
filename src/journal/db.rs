//! Database operations for journals and their legs.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    journal::{JournalId, JournalRow, NewJournal, TransactionJournal, TransactionLeg},
};

/// Create a journal and its two legs.
///
/// The source leg is stored with the negated amount and the destination leg
/// with the positive amount, so the two legs always cancel out.
///
/// # Errors
/// This function will return an:
/// - [Error::UnbalancedJournal] if the amount is not a positive number, since
///   such an amount cannot produce two balancing legs,
/// - [Error::InvalidAccount] if either account ID does not refer to a valid
///   account,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_journal(journal: NewJournal, connection: &Connection) -> Result<JournalRow, Error> {
    if !(journal.amount > 0.0 && journal.amount.is_finite()) {
        return Err(Error::UnbalancedJournal);
    }

    if let Some(foreign_amount) = journal.foreign_amount
        && !(foreign_amount > 0.0 && foreign_amount.is_finite())
    {
        return Err(Error::UnbalancedJournal);
    }

    connection.execute(
        "INSERT INTO transaction_journal (description, date, transaction_type_id)
         VALUES (?1, ?2, ?3)",
        (
            &journal.description,
            journal.date,
            journal.transaction_type_id,
        ),
    )?;

    let journal_id = connection.last_insert_rowid();

    let source = insert_leg(
        journal_id,
        journal.source_account_id,
        -journal.amount,
        journal.foreign_amount.map(|amount| -amount),
        connection,
    )?;

    let destination = insert_leg(
        journal_id,
        journal.destination_account_id,
        journal.amount,
        journal.foreign_amount,
        connection,
    )?;

    Ok(JournalRow {
        journal: TransactionJournal {
            id: journal_id,
            description: journal.description,
            date: journal.date,
            transaction_type_id: journal.transaction_type_id,
        },
        source,
        destination,
    })
}

fn insert_leg(
    journal_id: JournalId,
    account_id: i64,
    amount: f64,
    foreign_amount: Option<f64>,
    connection: &Connection,
) -> Result<TransactionLeg, Error> {
    connection
        .execute(
            "INSERT INTO \"transaction\" (journal_id, account_id, amount, foreign_amount)
             VALUES (?1, ?2, ?3, ?4)",
            (journal_id, account_id, amount, foreign_amount),
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

    Ok(TransactionLeg {
        id: connection.last_insert_rowid(),
        journal_id,
        account_id,
        amount,
        foreign_amount,
    })
}

/// Retrieve a journal with both of its legs.
pub fn get_journal(journal_id: JournalId, connection: &Connection) -> Result<JournalRow, Error> {
    connection
        .prepare(
            "SELECT journal.id, journal.description, journal.date, journal.transaction_type_id,
                    source.id, source.account_id, source.amount, source.foreign_amount,
                    destination.id, destination.account_id, destination.amount,
                    destination.foreign_amount
             FROM transaction_journal journal
             INNER JOIN \"transaction\" source
                ON source.journal_id = journal.id AND source.amount < 0
             INNER JOIN \"transaction\" destination
                ON destination.journal_id = journal.id AND destination.amount > 0
             WHERE journal.id = :id",
        )?
        .query_row(&[(":id", &journal_id)], map_journal_row)
        .map_err(|error| error.into())
}

/// Map a row of the journal self-join used by [get_journal] and the
/// collector.
pub(crate) fn map_journal_row(row: &Row) -> Result<JournalRow, rusqlite::Error> {
    let journal_id = row.get(0)?;

    Ok(JournalRow {
        journal: TransactionJournal {
            id: journal_id,
            description: row.get(1)?,
            date: row.get(2)?,
            transaction_type_id: row.get(3)?,
        },
        source: TransactionLeg {
            id: row.get(4)?,
            journal_id,
            account_id: row.get(5)?,
            amount: row.get(6)?,
            foreign_amount: row.get(7)?,
        },
        destination: TransactionLeg {
            id: row.get(8)?,
            journal_id,
            account_id: row.get(9)?,
            amount: row.get(10)?,
            foreign_amount: row.get(11)?,
        },
    })
}

/// Create the journal table and the table holding its legs.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn create_journal_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS transaction_journal (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT NOT NULL,
            date TEXT NOT NULL,
            transaction_type_id INTEGER NOT NULL,
            FOREIGN KEY(transaction_type_id) REFERENCES transaction_type(id)
        );

        CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            journal_id INTEGER NOT NULL,
            account_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            foreign_amount REAL,
            FOREIGN KEY(journal_id) REFERENCES transaction_journal(id) ON DELETE CASCADE,
            FOREIGN KEY(account_id) REFERENCES account(id)
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_journal_id ON \"transaction\"(journal_id);
        CREATE INDEX IF NOT EXISTS idx_transaction_journal_date ON transaction_journal(date);",
    )?;

    Ok(())
}

#[cfg(test)]
mod journal_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        account::create_account,
        db::initialize,
        transaction_type::{TransactionType, get_or_create_transaction_type},
    };

    use super::{NewJournal, create_journal, get_journal};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn new_journal(connection: &Connection) -> NewJournal {
        let checking = create_account("Checking", connection).unwrap();
        let groceries = create_account("Groceries Store", connection).unwrap();
        let type_id =
            get_or_create_transaction_type(TransactionType::Withdrawal, connection).unwrap();

        NewJournal {
            description: "Weekly groceries".to_owned(),
            date: date!(2025 - 08 - 02),
            transaction_type_id: type_id,
            source_account_id: checking.id,
            destination_account_id: groceries.id,
            amount: 42.50,
            foreign_amount: None,
        }
    }

    #[test]
    fn create_journal_stores_balancing_legs() {
        let connection = get_test_db_connection();
        let journal = new_journal(&connection);

        let row = create_journal(journal, &connection).expect("Could not create journal");

        assert_eq!(row.source.amount, -42.50);
        assert_eq!(row.destination.amount, 42.50);
        assert_eq!(row.source.amount + row.destination.amount, 0.0);
        assert_eq!(get_journal(row.journal.id, &connection), Ok(row));
    }

    #[test]
    fn create_journal_negates_foreign_amount_on_source_leg() {
        let connection = get_test_db_connection();
        let journal = NewJournal {
            foreign_amount: Some(25.0),
            ..new_journal(&connection)
        };

        let row = create_journal(journal, &connection).unwrap();

        assert_eq!(row.source.foreign_amount, Some(-25.0));
        assert_eq!(row.destination.foreign_amount, Some(25.0));
    }

    #[test]
    fn create_journal_rejects_non_positive_amount() {
        let connection = get_test_db_connection();
        let journal = NewJournal {
            amount: -10.0,
            ..new_journal(&connection)
        };

        let result = create_journal(journal, &connection);

        assert_eq!(result, Err(Error::UnbalancedJournal));
    }

    #[test]
    fn create_journal_rejects_invalid_account() {
        let connection = get_test_db_connection();
        let journal = NewJournal {
            source_account_id: 999,
            ..new_journal(&connection)
        };

        let result = create_journal(journal, &connection);

        assert_eq!(result, Err(Error::InvalidAccount(Some(999))));
    }

    #[test]
    fn get_journal_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        let result = get_journal(12345, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }
}
