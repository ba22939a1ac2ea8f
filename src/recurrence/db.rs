//! Database operations for recurrences and their template transactions.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    recurrence::{NewRecurrence, Recurrence, RecurrenceId, RecurrenceTransaction},
    transaction_type::TransactionTypeId,
};

/// Create a recurrence and its template transactions.
pub fn create_recurrence(
    recurrence: NewRecurrence,
    connection: &Connection,
) -> Result<Recurrence, Error> {
    connection.execute(
        "INSERT INTO recurrence (title, transaction_type_id) VALUES (?1, ?2)",
        (&recurrence.title, recurrence.transaction_type_id),
    )?;

    let id = connection.last_insert_rowid();

    for transaction in &recurrence.transactions {
        connection.execute(
            "INSERT INTO recurrence_transaction (recurrence_id, description, amount)
             VALUES (?1, ?2, ?3)",
            (id, &transaction.description, transaction.amount),
        )?;
    }

    Ok(Recurrence {
        id,
        title: recurrence.title,
        transaction_type_id: recurrence.transaction_type_id,
    })
}

/// Retrieve a single recurrence by ID.
pub fn get_recurrence(
    recurrence_id: RecurrenceId,
    connection: &Connection,
) -> Result<Recurrence, Error> {
    connection
        .prepare("SELECT id, title, transaction_type_id FROM recurrence WHERE id = :id")?
        .query_row(&[(":id", &recurrence_id)], map_recurrence_row)
        .map_err(|error| error.into())
}

/// Retrieve all recurrences, oldest first.
pub fn get_all_recurrences(connection: &Connection) -> Result<Vec<Recurrence>, Error> {
    connection
        .prepare("SELECT id, title, transaction_type_id FROM recurrence ORDER BY id ASC")?
        .query_map([], map_recurrence_row)?
        .map(|maybe_recurrence| maybe_recurrence.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the template transactions of the recurrence `recurrence_id`, in
/// insertion order.
pub fn get_recurrence_transactions(
    recurrence_id: RecurrenceId,
    connection: &Connection,
) -> Result<Vec<RecurrenceTransaction>, Error> {
    connection
        .prepare(
            "SELECT id, recurrence_id, transaction_type_id, description, amount
             FROM recurrence_transaction WHERE recurrence_id = :id ORDER BY id ASC",
        )?
        .query_map(&[(":id", &recurrence_id)], |row| {
            Ok(RecurrenceTransaction {
                id: row.get(0)?,
                recurrence_id: row.get(1)?,
                transaction_type_id: row.get(2)?,
                description: row.get(3)?,
                amount: row.get(4)?,
            })
        })?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Point the recurrence `recurrence_id` at a new transaction type.
pub(crate) fn set_recurrence_type(
    recurrence_id: RecurrenceId,
    transaction_type_id: TransactionTypeId,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "UPDATE recurrence SET transaction_type_id = ?1 WHERE id = ?2",
        (transaction_type_id, recurrence_id),
    )?;

    Ok(())
}

/// Point every template transaction of `recurrence_id` at a new transaction
/// type.
pub(crate) fn set_recurrence_transaction_types(
    recurrence_id: RecurrenceId,
    transaction_type_id: TransactionTypeId,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "UPDATE recurrence_transaction SET transaction_type_id = ?1 WHERE recurrence_id = ?2",
        (transaction_type_id, recurrence_id),
    )?;

    Ok(())
}

/// Create the recurrence table and the table holding its template
/// transactions.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn create_recurrence_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS recurrence (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            transaction_type_id INTEGER NOT NULL,
            FOREIGN KEY(transaction_type_id) REFERENCES transaction_type(id)
        );

        CREATE TABLE IF NOT EXISTS recurrence_transaction (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recurrence_id INTEGER NOT NULL,
            transaction_type_id INTEGER,
            description TEXT NOT NULL,
            amount REAL NOT NULL,
            FOREIGN KEY(recurrence_id) REFERENCES recurrence(id) ON DELETE CASCADE,
            FOREIGN KEY(transaction_type_id) REFERENCES transaction_type(id)
        );",
    )?;

    Ok(())
}

fn map_recurrence_row(row: &Row) -> Result<Recurrence, rusqlite::Error> {
    Ok(Recurrence {
        id: row.get(0)?,
        title: row.get(1)?,
        transaction_type_id: row.get(2)?,
    })
}

#[cfg(test)]
mod recurrence_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        recurrence::{NewRecurrence, NewRecurrenceTransaction},
        transaction_type::{TransactionType, get_or_create_transaction_type},
    };

    use super::{create_recurrence, get_all_recurrences, get_recurrence, get_recurrence_transactions};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn create_recurrence_stores_template_transactions() {
        let connection = get_test_db_connection();
        let type_id =
            get_or_create_transaction_type(TransactionType::Withdrawal, &connection).unwrap();

        let recurrence = create_recurrence(
            NewRecurrence {
                title: "Monthly rent".to_owned(),
                transaction_type_id: type_id,
                transactions: vec![NewRecurrenceTransaction {
                    description: "Rent".to_owned(),
                    amount: 1500.0,
                }],
            },
            &connection,
        )
        .expect("Could not create recurrence");

        assert_eq!(get_recurrence(recurrence.id, &connection), Ok(recurrence.clone()));

        let transactions = get_recurrence_transactions(recurrence.id, &connection).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].description, "Rent");
        assert_eq!(transactions[0].transaction_type_id, None);
    }

    #[test]
    fn get_recurrence_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        let result = get_recurrence(77, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_all_recurrences_returns_oldest_first() {
        let connection = get_test_db_connection();
        let type_id =
            get_or_create_transaction_type(TransactionType::Deposit, &connection).unwrap();
        let first = create_recurrence(
            NewRecurrence {
                title: "Salary".to_owned(),
                transaction_type_id: type_id,
                transactions: vec![],
            },
            &connection,
        )
        .unwrap();
        let second = create_recurrence(
            NewRecurrence {
                title: "Interest".to_owned(),
                transaction_type_id: type_id,
                transactions: vec![],
            },
            &connection,
        )
        .unwrap();

        let recurrences = get_all_recurrences(&connection).unwrap();

        assert_eq!(recurrences, vec![first, second]);
    }
}
