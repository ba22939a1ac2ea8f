//! The report generator interface and the tag/month implementation.

use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    account::Account,
    html::{BADGE_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency},
    journal::{JournalCollector, JournalRow},
    tag::Tag,
};

/// Assembles a scoped dataset and renders it as an HTML report.
///
/// All report flavors share this interface so callers can configure any of
/// them the same way. Setters that a flavor has no use for fall back to the
/// default no-op implementations.
pub trait ReportGenerator {
    /// Only report on journals dated on or after `date`.
    fn set_start_date(&mut self, date: Date) -> &mut Self;

    /// Only report on journals dated on or before `date`.
    fn set_end_date(&mut self, date: Date) -> &mut Self;

    /// Only report on journals touching `accounts`.
    fn set_accounts(&mut self, accounts: Vec<Account>) -> &mut Self;

    /// Only report on journals tagged with `tags`.
    fn set_tags(&mut self, tags: Vec<Tag>) -> &mut Self;

    /// Only report on journals in the given budgets. Ignored by flavors that
    /// do not group by budget.
    fn set_budgets(&mut self, _budget_ids: &[i64]) -> &mut Self {
        self
    }

    /// Only report on journals in the given categories. Ignored by flavors
    /// that do not group by category.
    fn set_categories(&mut self, _category_ids: &[i64]) -> &mut Self {
        self
    }

    /// Only report on journals touching the given expense accounts. Ignored
    /// by flavors that do not distinguish expense accounts.
    fn set_expense(&mut self, _account_ids: &[i64]) -> &mut Self {
        self
    }

    /// Render the report as an HTML fragment.
    ///
    /// # Errors
    /// This function will return an [Error::ReportGeneration] wrapping the
    /// message of whatever went wrong while assembling the dataset. The
    /// original error is logged before it is wrapped.
    fn generate(&self, connection: &Connection) -> Result<String, Error>;
}

/// A report over the journals carrying a set of tags within a date range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagMonthReportGenerator {
    start: Option<Date>,
    end: Option<Date>,
    accounts: Vec<Account>,
    tags: Vec<Tag>,
}

impl TagMonthReportGenerator {
    /// Create a generator with no filters set.
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_journals(&self, connection: &Connection) -> Result<Vec<JournalRow>, Error> {
        let mut collector = JournalCollector::new();

        if let Some(start) = self.start {
            collector.set_start_date(start);
        }

        if let Some(end) = self.end {
            collector.set_end_date(end);
        }

        collector
            .set_accounts(self.accounts.iter().map(|account| account.id).collect())
            .set_tags(self.tags.iter().map(|tag| tag.id).collect())
            .collect(connection)
    }
}

impl ReportGenerator for TagMonthReportGenerator {
    fn set_start_date(&mut self, date: Date) -> &mut Self {
        self.start = Some(date);
        self
    }

    fn set_end_date(&mut self, date: Date) -> &mut Self {
        self.end = Some(date);
        self
    }

    fn set_accounts(&mut self, accounts: Vec<Account>) -> &mut Self {
        self.accounts = accounts;
        self
    }

    fn set_tags(&mut self, tags: Vec<Tag>) -> &mut Self {
        self.tags = tags;
        self
    }

    fn generate(&self, connection: &Connection) -> Result<String, Error> {
        let journals = self.collect_journals(connection).map_err(|error| {
            tracing::error!("Cannot render the tag report: {error}");
            Error::ReportGeneration(error.to_string())
        })?;

        Ok(report_view(self, &journals).into_string())
    }
}

fn report_view(generator: &TagMonthReportGenerator, journals: &[JournalRow]) -> Markup {
    let account_ids = generator
        .accounts
        .iter()
        .map(|account| account.id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let tag_ids = generator
        .tags
        .iter()
        .map(|tag| tag.id.to_string())
        .collect::<Vec<_>>()
        .join(",");

    let date_range = match (generator.start, generator.end) {
        (Some(start), Some(end)) => format!("{start} to {end}"),
        (Some(start), None) => format!("from {start}"),
        (None, Some(end)) => format!("until {end}"),
        (None, None) => "all time".to_owned(),
    };

    let total: f64 = journals
        .iter()
        .map(|journal| journal.destination.amount)
        .sum();

    html!(
        section
            data-report-type="tag"
            data-account-ids=(account_ids)
            data-tag-ids=(tag_ids)
            class="space-y-4 w-full"
        {
            header
            {
                h2 class="text-lg font-bold" { "Tag report" }
                p class="text-sm text-gray-500 dark:text-gray-400" { (date_range) }
            }

            div class="flex gap-2 flex-wrap"
            {
                @for tag in &generator.tags {
                    span class=(BADGE_STYLE) { (tag.name) }
                }
            }

            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                    }
                }

                tbody
                {
                    @for row in journals {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (row.journal.date) }
                            td class=(TABLE_CELL_STYLE) { (row.journal.description) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                (format_currency(row.destination.amount))
                            }
                        }
                    }

                    @if journals.is_empty() {
                        tr
                        {
                            td
                                colspan="3"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No journals matched this report."
                            }
                        }
                    }
                }

                tfoot
                {
                    tr class="font-semibold text-gray-900 dark:text-white"
                    {
                        td class=(TABLE_CELL_STYLE) { "Total" }
                        td class=(TABLE_CELL_STYLE) {}
                        td class=(TABLE_CELL_STYLE) { (format_currency(total)) }
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod tag_month_report_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        account::create_account,
        db::initialize,
        journal::{NewJournal, create_journal},
        tag::{TagName, create_tag, tag_journal},
        transaction_type::{TransactionType, get_or_create_transaction_type},
    };

    use super::{ReportGenerator, TagMonthReportGenerator};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn generate_includes_id_lists_and_report_type() {
        let connection = get_test_db_connection();
        let checking = create_account("Checking", &connection).unwrap();
        let savings = create_account("Savings", &connection).unwrap();
        let holiday = create_tag(TagName::new_unchecked("Holiday"), &connection).unwrap();

        let html = TagMonthReportGenerator::new()
            .set_accounts(vec![checking.clone(), savings.clone()])
            .set_tags(vec![holiday.clone()])
            .generate(&connection)
            .expect("Could not generate report");

        assert!(html.contains("data-report-type=\"tag\""));
        assert!(html.contains(&format!(
            "data-account-ids=\"{},{}\"",
            checking.id, savings.id
        )));
        assert!(html.contains(&format!("data-tag-ids=\"{}\"", holiday.id)));
        assert!(html.contains("Holiday"));
    }

    #[test]
    fn generate_only_includes_tagged_journals_in_range() {
        let connection = get_test_db_connection();
        let checking = create_account("Checking", &connection).unwrap();
        let store = create_account("Store", &connection).unwrap();
        let tag = create_tag(TagName::new_unchecked("Holiday"), &connection).unwrap();
        let type_id =
            get_or_create_transaction_type(TransactionType::Withdrawal, &connection).unwrap();

        let new_journal = |description: &str, date| NewJournal {
            description: description.to_owned(),
            date,
            transaction_type_id: type_id,
            source_account_id: checking.id,
            destination_account_id: store.id,
            amount: 10.0,
            foreign_amount: None,
        };

        let tagged = create_journal(
            new_journal("Flights", date!(2025 - 06 - 10)),
            &connection,
        )
        .unwrap();
        tag_journal(tag.id, tagged.journal.id, &connection).unwrap();

        let out_of_range = create_journal(
            new_journal("Hotel", date!(2025 - 07 - 10)),
            &connection,
        )
        .unwrap();
        tag_journal(tag.id, out_of_range.journal.id, &connection).unwrap();

        create_journal(new_journal("Untagged", date!(2025 - 06 - 11)), &connection).unwrap();

        let html = TagMonthReportGenerator::new()
            .set_start_date(date!(2025 - 06 - 01))
            .set_end_date(date!(2025 - 06 - 30))
            .set_tags(vec![tag])
            .generate(&connection)
            .expect("Could not generate report");

        assert!(html.contains("Flights"));
        assert!(!html.contains("Hotel"));
        assert!(!html.contains("Untagged"));
    }

    #[test]
    fn unused_setters_do_not_change_the_report() {
        let connection = get_test_db_connection();

        let with_unused = TagMonthReportGenerator::new()
            .set_budgets(&[1, 2])
            .set_categories(&[3])
            .set_expense(&[4])
            .generate(&connection)
            .unwrap();
        let without = TagMonthReportGenerator::new().generate(&connection).unwrap();

        assert_eq!(with_unused, without);
    }
}
