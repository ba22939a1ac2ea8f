//! Emberbook is a web app for managing your personal finances.
//!
//! Money is recorded as double-entry transaction journals: each journal owns a
//! source leg (negative amount) and a destination leg (positive amount).
//! This library provides the domain models, the SQLite persistence layer, a
//! composable journal query collector, report generation, and an HTTP server
//! that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod account;
mod alert;
mod app_state;
mod category;
mod config_store;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod journal;
mod logging;
mod navigation;
mod not_found;
mod recurrence;
mod report;
mod routing;
mod tag;
mod transaction_type;

#[cfg(test)]
mod test_utils;

pub use account::{
    Account, AccountId, AccountMeta, create_account, get_account, get_account_meta,
    get_accounts_by_ids, get_all_accounts, set_account_meta,
};
pub use app_state::AppState;
pub use category::{
    Attachment, Category, CategoryId, CategoryName, add_category_attachment, create_category,
    get_all_categories, get_category, get_category_attachments, get_category_note,
    link_journal_to_category, set_category_note, soft_delete_category,
    unlink_journal_from_category,
};
pub use config_store::{get_bool_config, get_config, set_bool_config, set_config};
pub use db::initialize as initialize_db;
pub use journal::{
    JournalCollector, JournalId, JournalRow, NewJournal, TransactionJournal, TransactionLeg,
    create_journal, get_journal,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use recurrence::{
    MIGRATE_RECURRENCE_TYPE_CONFIG, MigrationSummary, NewRecurrence, NewRecurrenceTransaction,
    Recurrence, RecurrenceId, RecurrenceTransaction, create_recurrence, get_all_recurrences,
    get_recurrence, get_recurrence_transactions, migrate_recurrence_types,
};
pub use report::{ReportGenerator, TagMonthReportGenerator};
pub use routing::build_router;
pub use tag::{Tag, TagId, TagName, create_tag, get_tag, get_tags_by_ids, tag_journal};
pub use transaction_type::{
    TransactionType, TransactionTypeId, get_or_create_transaction_type, get_transaction_type,
};

use crate::{
    alert::Alert,
    internal_server_error::{InternalServerErrorPageTemplate, render_internal_server_error},
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// An empty string was used to create a tag name.
    #[error("Tag name cannot be empty")]
    EmptyTagName,

    /// An amount string could not be parsed as a decimal number.
    ///
    /// Collector predicates accept amounts as decimal strings so that callers
    /// can pass user input through unchanged. The string is validated when the
    /// query is built, not when the predicate is added.
    #[error("\"{0}\" is not a valid decimal amount")]
    InvalidAmount(String),

    /// The two legs of a journal did not balance.
    ///
    /// In double-entry bookkeeping the source leg's (negative) amount and the
    /// destination leg's (positive) amount must cancel out.
    #[error("the source and destination legs of a journal must balance")]
    UnbalancedJournal,

    /// The account ID used to create a journal leg or account metadata did not
    /// match a valid account.
    #[error("the account ID does not refer to a valid account")]
    InvalidAccount(Option<AccountId>),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a category that does not exist (or was already soft-deleted)
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory(CategoryId),

    /// An error occurred while serializing or deserializing JSON data, e.g.
    /// account metadata or a config store value.
    #[error("could not serialize as JSON: {0}")]
    JsonSerializationError(String),

    /// A report could not be generated.
    ///
    /// The string carries the message of the original error, which has already
    /// been logged by the report generator.
    #[error("could not generate report: {0}")]
    ReportGeneration(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::ReportGeneration(message) => {
                render_internal_server_error(InternalServerErrorPageTemplate {
                    description: "Report Failed",
                    fix: &format!("The report could not be generated: {message}"),
                })
            }
            Error::DatabaseLockError => render_internal_server_error(Default::default()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(Default::default())
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert fragment.
    pub(crate) fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::EmptyCategoryName => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid category name",
                    "Category names cannot be empty. Enter a name and try again.",
                ),
            ),
            Error::DeleteMissingCategory(category_id) => (
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not delete category",
                    &format!(
                        "The category with ID {category_id} could not be found. \
                        Try refreshing the page to see if the category has already been deleted."
                    ),
                ),
            ),
            Error::InvalidAccount(account_id) => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid account ID",
                    &format!("Could not find an account with the ID {account_id:?}"),
                ),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                ),
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}
