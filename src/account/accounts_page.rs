//! Accounts listing page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base,
    },
    navigation::NavBar,
};

use super::{Account, get_all_accounts};

/// The state needed for the accounts listing page.
#[derive(Debug, Clone)]
pub struct AccountsPageState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the accounts listing page.
pub async fn get_accounts_page(State(state): State<AccountsPageState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts = get_all_accounts(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve accounts: {error}"))?;

    Ok(accounts_view(&accounts).into_response())
}

fn accounts_view(accounts: &[Account]) -> Markup {
    let nav_bar = NavBar::new(endpoints::ACCOUNTS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Accounts" }

                    a href=(endpoints::TAG_REPORT_VIEW) class=(LINK_STYLE)
                    {
                        "View reports"
                    }
                }

                section class="dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            }
                        }

                        tbody
                        {
                            @for account in accounts {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (account.name) }
                                }
                            }

                            @if accounts.is_empty() {
                                tr
                                {
                                    td
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No accounts created yet."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Accounts", &content)
}

#[cfg(test)]
mod accounts_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;

    use crate::{
        account::create_account,
        db::initialize,
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
    };

    use super::{AccountsPageState, get_accounts_page};

    fn get_accounts_page_state() -> AccountsPageState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");

        AccountsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn render_page_with_accounts() {
        let state = get_accounts_page_state();
        create_account("Checking", &state.db_connection.lock().unwrap())
            .expect("Could not create test account");

        let response = get_accounts_page(State(state))
            .await
            .expect("Could not render accounts page");

        assert_status_ok(&response);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let text = html.html();
        assert!(text.contains("Checking"), "page should list the account");
    }

    #[tokio::test]
    async fn render_page_with_no_accounts() {
        let state = get_accounts_page_state();

        let response = get_accounts_page(State(state))
            .await
            .expect("Could not render accounts page");

        assert_status_ok(&response);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert!(html.html().contains("No accounts created yet."));
    }
}
