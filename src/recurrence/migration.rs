//! One-time migration that moves transaction types from recurrences down to
//! their template transactions.
//!
//! Old databases classify a whole recurrence with a single transaction type.
//! This migration copies that type onto every template transaction and points
//! the recurrence itself at the sentinel invalid type, marking it as a legacy
//! row while keeping the true type at the line-item level.

use rusqlite::Connection;

use crate::{
    Error,
    config_store::{get_bool_config, set_bool_config},
    recurrence::{
        db::{set_recurrence_transaction_types, set_recurrence_type},
        get_all_recurrences,
    },
    transaction_type::{TransactionType, get_or_create_transaction_type, get_transaction_type},
};

/// The config store key recording that the migration has run.
pub const MIGRATE_RECURRENCE_TYPE_CONFIG: &str = "550_migrate_recurrence_type";

/// What the migration did on one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationSummary {
    /// Whether the invocation was skipped because the migration had already
    /// run and `force` was not set.
    pub already_executed: bool,
    /// How many recurrences were rewritten.
    pub migrated: usize,
}

/// Move each recurrence's transaction type onto its template transactions.
///
/// The first run processes every recurrence and records completion in the
/// config store. Later runs are no-ops unless `force` is set. Recurrences
/// already at the sentinel invalid type are skipped even under `force`, so
/// rerunning never overwrites the types captured by the first run.
pub fn migrate_recurrence_types(
    force: bool,
    connection: &Connection,
) -> Result<MigrationSummary, Error> {
    if !force && get_bool_config(MIGRATE_RECURRENCE_TYPE_CONFIG, connection)? {
        tracing::info!("The recurrence type migration has already been executed.");

        return Ok(MigrationSummary {
            already_executed: true,
            migrated: 0,
        });
    }

    let invalid_type_id = get_or_create_transaction_type(TransactionType::Invalid, connection)?;
    let mut migrated = 0;

    for recurrence in get_all_recurrences(connection)? {
        if recurrence.transaction_type_id == invalid_type_id {
            continue;
        }

        let original_type_id = recurrence.transaction_type_id;

        set_recurrence_type(recurrence.id, invalid_type_id, connection)?;
        set_recurrence_transaction_types(recurrence.id, original_type_id, connection)?;

        let original_type = get_transaction_type(original_type_id, connection)?;
        tracing::info!(
            "Updated recurrence #{} to the new transaction type model ({original_type}).",
            recurrence.id
        );
        migrated += 1;
    }

    set_bool_config(MIGRATE_RECURRENCE_TYPE_CONFIG, true, connection)?;

    Ok(MigrationSummary {
        already_executed: false,
        migrated,
    })
}

#[cfg(test)]
mod migration_tests {
    use rusqlite::Connection;

    use crate::{
        config_store::set_bool_config,
        db::initialize,
        recurrence::{
            NewRecurrence, NewRecurrenceTransaction, create_recurrence, get_recurrence,
            get_recurrence_transactions,
        },
        transaction_type::{TransactionType, get_or_create_transaction_type},
    };

    use super::{MIGRATE_RECURRENCE_TYPE_CONFIG, MigrationSummary, migrate_recurrence_types};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn create_test_recurrence(
        transaction_type: TransactionType,
        connection: &Connection,
    ) -> crate::recurrence::Recurrence {
        let type_id = get_or_create_transaction_type(transaction_type, connection).unwrap();

        create_recurrence(
            NewRecurrence {
                title: "Monthly rent".to_owned(),
                transaction_type_id: type_id,
                transactions: vec![
                    NewRecurrenceTransaction {
                        description: "Rent".to_owned(),
                        amount: 1500.0,
                    },
                    NewRecurrenceTransaction {
                        description: "Water".to_owned(),
                        amount: 45.0,
                    },
                ],
            },
            connection,
        )
        .expect("Could not create test recurrence")
    }

    #[test]
    fn migration_moves_type_to_template_transactions() {
        let connection = get_test_db_connection();
        let recurrence = create_test_recurrence(TransactionType::Withdrawal, &connection);
        let original_type_id = recurrence.transaction_type_id;

        let summary = migrate_recurrence_types(false, &connection).unwrap();

        assert_eq!(
            summary,
            MigrationSummary {
                already_executed: false,
                migrated: 1
            }
        );

        let invalid_type_id =
            get_or_create_transaction_type(TransactionType::Invalid, &connection).unwrap();
        let migrated = get_recurrence(recurrence.id, &connection).unwrap();
        assert_eq!(migrated.transaction_type_id, invalid_type_id);

        for transaction in get_recurrence_transactions(recurrence.id, &connection).unwrap() {
            assert_eq!(transaction.transaction_type_id, Some(original_type_id));
        }
    }

    #[test]
    fn second_run_without_force_is_a_no_op() {
        let connection = get_test_db_connection();
        create_test_recurrence(TransactionType::Withdrawal, &connection);

        migrate_recurrence_types(false, &connection).unwrap();
        let summary = migrate_recurrence_types(false, &connection).unwrap();

        assert_eq!(
            summary,
            MigrationSummary {
                already_executed: true,
                migrated: 0
            }
        );
    }

    #[test]
    fn forced_rerun_skips_already_migrated_recurrences() {
        let connection = get_test_db_connection();
        let recurrence = create_test_recurrence(TransactionType::Withdrawal, &connection);
        let original_type_id = recurrence.transaction_type_id;

        migrate_recurrence_types(false, &connection).unwrap();
        let summary = migrate_recurrence_types(true, &connection).unwrap();

        assert_eq!(
            summary,
            MigrationSummary {
                already_executed: false,
                migrated: 0
            }
        );

        // The types captured by the first run survive the forced rerun.
        for transaction in get_recurrence_transactions(recurrence.id, &connection).unwrap() {
            assert_eq!(transaction.transaction_type_id, Some(original_type_id));
        }
    }

    #[test]
    fn forced_run_migrates_even_when_marked_executed() {
        let connection = get_test_db_connection();
        set_bool_config(MIGRATE_RECURRENCE_TYPE_CONFIG, true, &connection).unwrap();
        create_test_recurrence(TransactionType::Deposit, &connection);

        let summary = migrate_recurrence_types(true, &connection).unwrap();

        assert_eq!(
            summary,
            MigrationSummary {
                already_executed: false,
                migrated: 1
            }
        );
    }

    #[test]
    fn recurrences_at_the_sentinel_type_are_skipped() {
        let connection = get_test_db_connection();
        let recurrence = create_test_recurrence(TransactionType::Invalid, &connection);

        let summary = migrate_recurrence_types(false, &connection).unwrap();

        assert_eq!(summary.migrated, 0);

        // Template transactions keep their unset type.
        for transaction in get_recurrence_transactions(recurrence.id, &connection).unwrap() {
            assert_eq!(transaction.transaction_type_id, None);
        }
    }
}
