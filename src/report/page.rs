//! Tag report page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, PreEscaped, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, macros::format_description};

use crate::{
    AppState, Error,
    account::get_accounts_by_ids,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base,
    },
    navigation::NavBar,
    report::{ReportGenerator, TagMonthReportGenerator},
    tag::get_tags_by_ids,
};

/// The state needed for the tag report page.
#[derive(Debug, Clone)]
pub struct TagReportPageState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TagReportPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters scoping the tag report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagReportQuery {
    /// The first date to report on, e.g. '2025-06-01'.
    pub start: Option<String>,
    /// The last date to report on.
    pub end: Option<String>,
    /// Comma-separated account IDs.
    pub accounts: Option<String>,
    /// Comma-separated tag IDs.
    pub tags: Option<String>,
}

/// Render the tag report page, generating a report when the query selects
/// any tags.
pub async fn get_tag_report_page(
    Query(query): Query<TagReportQuery>,
    State(state): State<TagReportPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let tag_ids = parse_id_list(query.tags.as_deref());

    if tag_ids.is_empty() {
        return Ok(report_page_view(&query, None, "").into_response());
    }

    let start = match parse_date(query.start.as_deref()) {
        Ok(start) => start,
        Err(message) => return Ok(report_page_view(&query, None, &message).into_response()),
    };
    let end = match parse_date(query.end.as_deref()) {
        Ok(end) => end,
        Err(message) => return Ok(report_page_view(&query, None, &message).into_response()),
    };

    let accounts = get_accounts_by_ids(&parse_id_list(query.accounts.as_deref()), &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve accounts: {error}"))?;
    let tags = get_tags_by_ids(&tag_ids, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve tags: {error}"))?;

    let mut generator = TagMonthReportGenerator::new();
    generator.set_accounts(accounts).set_tags(tags);

    if let Some(start) = start {
        generator.set_start_date(start);
    }

    if let Some(end) = end {
        generator.set_end_date(end);
    }

    let report = generator.generate(&connection)?;

    Ok(report_page_view(&query, Some(&report), "").into_response())
}

/// Parse a comma-separated ID list, skipping entries that are not integers.
fn parse_id_list(ids: Option<&str>) -> Vec<i64> {
    ids.unwrap_or_default()
        .split(',')
        .filter_map(|id| id.trim().parse().ok())
        .collect()
}

fn parse_date(date: Option<&str>) -> Result<Option<Date>, String> {
    let format = format_description!("[year]-[month]-[day]");

    match date {
        None | Some("") => Ok(None),
        Some(date) => Date::parse(date, &format)
            .map(Some)
            .map_err(|_| format!("Error: '{date}' is not a valid date (expected YYYY-MM-DD)")),
    }
}

fn report_page_view(
    query: &TagReportQuery,
    report: Option<&str>,
    error_message: &str,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TAG_REPORT_VIEW).into_html();

    let text_input = |id: &str, label: &str, placeholder: &str, value: &Option<String>| {
        html!(
            div
            {
                label for=(id) class=(FORM_LABEL_STYLE) { (label) }

                input
                    id=(id)
                    type="text"
                    name=(id)
                    placeholder=(placeholder)
                    value=(value.as_deref().unwrap_or_default())
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl lg:mx-auto"
            {
                h1 class="text-xl font-bold" { "Tag Report" }

                form method="get" action=(endpoints::TAG_REPORT_VIEW)
                    class="grid gap-4 md:grid-cols-2"
                {
                    (text_input("start", "Start Date", "2025-06-01", &query.start))
                    (text_input("end", "End Date", "2025-06-30", &query.end))
                    (text_input("accounts", "Account IDs", "1,2", &query.accounts))
                    (text_input("tags", "Tag IDs", "1", &query.tags))

                    @if !error_message.is_empty() {
                        p class="text-red-600 dark:text-red-400 md:col-span-2"
                        {
                            (error_message)
                        }
                    }

                    div class="md:col-span-2"
                    {
                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Run Report" }
                    }
                }

                @if let Some(report) = report {
                    (PreEscaped(report.to_owned()))
                } @else if error_message.is_empty() {
                    p class="text-gray-500 dark:text-gray-400"
                    {
                        "Select one or more tags to run a report."
                    }
                }
            }
        }
    );

    base("Tag Report", &content)
}
