//! A composable query builder over transaction journals.
//!
//! Predicate methods record filter descriptors and return the collector for
//! chaining. Nothing touches the database until [JournalCollector::collect]
//! folds the descriptors into a single SQL query over the journal self-join,
//! with the source leg (negative amount) and destination leg (positive
//! amount) available as separate aliases.

use rusqlite::{Connection, ToSql, params_from_iter};
use time::Date;

use crate::{
    Error,
    account::AccountId,
    journal::{JournalRow, db::map_journal_row},
    tag::TagId,
};

/// An amount predicate recorded by the collector.
///
/// Amounts are kept as the caller's decimal strings and only parsed when the
/// query is built, so an invalid amount surfaces as an error from `collect`
/// rather than a panic mid-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AmountFilter {
    Is(String),
    IsNot(String),
    Less(String),
    More(String),
    ForeignIs(String),
    ForeignIsNot(String),
    ForeignLess(String),
    ForeignMore(String),
}

/// Collects filters and executes them as one query over journals.
///
/// Amount comparisons are sign-normalized for double-entry bookkeeping:
/// equality predicates compare against the source leg using the amount's
/// negation, while range predicates compare against the destination leg using
/// the amount's absolute value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalCollector {
    amount_filters: Vec<AmountFilter>,
    start_date: Option<Date>,
    end_date: Option<Date>,
    account_ids: Vec<AccountId>,
    tag_ids: Vec<TagId>,
}

impl JournalCollector {
    /// Create a collector with no filters. Collecting immediately returns
    /// every journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only include journals dated on or after `start_date`.
    pub fn set_start_date(&mut self, start_date: Date) -> &mut Self {
        self.start_date = Some(start_date);
        self
    }

    /// Only include journals dated on or before `end_date`.
    pub fn set_end_date(&mut self, end_date: Date) -> &mut Self {
        self.end_date = Some(end_date);
        self
    }

    /// Only include journals where either leg touches one of `account_ids`.
    pub fn set_accounts(&mut self, account_ids: Vec<AccountId>) -> &mut Self {
        self.account_ids = account_ids;
        self
    }

    /// Only include journals tagged with one of `tag_ids`.
    pub fn set_tags(&mut self, tag_ids: Vec<TagId>) -> &mut Self {
        self.tag_ids = tag_ids;
        self
    }

    /// Only include journals whose source leg equals the negation of `amount`.
    pub fn amount_is(&mut self, amount: &str) -> &mut Self {
        self.amount_filters.push(AmountFilter::Is(amount.to_owned()));
        self
    }

    /// Only include journals whose source leg differs from the negation of
    /// `amount`.
    pub fn amount_is_not(&mut self, amount: &str) -> &mut Self {
        self.amount_filters
            .push(AmountFilter::IsNot(amount.to_owned()));
        self
    }

    /// Only include journals whose destination leg is at most `amount`.
    pub fn amount_less(&mut self, amount: &str) -> &mut Self {
        self.amount_filters
            .push(AmountFilter::Less(amount.to_owned()));
        self
    }

    /// Only include journals whose destination leg is at least `amount`.
    pub fn amount_more(&mut self, amount: &str) -> &mut Self {
        self.amount_filters
            .push(AmountFilter::More(amount.to_owned()));
        self
    }

    /// Only include journals with a foreign amount on the source leg equal to
    /// the negation of `amount`.
    pub fn foreign_amount_is(&mut self, amount: &str) -> &mut Self {
        self.amount_filters
            .push(AmountFilter::ForeignIs(amount.to_owned()));
        self
    }

    /// Only include journals whose source leg has no foreign amount, or one
    /// that differs from the negation of `amount`.
    ///
    /// Unlike [JournalCollector::amount_is_not], rows without a foreign
    /// amount match. The asymmetry with [JournalCollector::foreign_amount_is]
    /// is long-standing observed behavior that callers rely on, so it is kept.
    pub fn foreign_amount_is_not(&mut self, amount: &str) -> &mut Self {
        self.amount_filters
            .push(AmountFilter::ForeignIsNot(amount.to_owned()));
        self
    }

    /// Only include journals with a foreign amount on the destination leg of
    /// at most `amount`.
    pub fn foreign_amount_less(&mut self, amount: &str) -> &mut Self {
        self.amount_filters
            .push(AmountFilter::ForeignLess(amount.to_owned()));
        self
    }

    /// Only include journals with a foreign amount on the destination leg of
    /// at least `amount`.
    pub fn foreign_amount_more(&mut self, amount: &str) -> &mut Self {
        self.amount_filters
            .push(AmountFilter::ForeignMore(amount.to_owned()));
        self
    }

    /// Execute the collected filters and return the matching journals,
    /// ordered by date then ID.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::InvalidAmount] if an amount passed to a predicate method is
    ///   not a valid decimal number,
    /// - or [Error::SqlError] if there is an SQL error.
    pub fn collect(&self, connection: &Connection) -> Result<Vec<JournalRow>, Error> {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        for filter in &self.amount_filters {
            let (clause, amount) = match filter {
                AmountFilter::Is(amount) => ("source.amount = ?", negative(amount)?),
                AmountFilter::IsNot(amount) => ("source.amount != ?", negative(amount)?),
                AmountFilter::Less(amount) => ("destination.amount <= ?", positive(amount)?),
                AmountFilter::More(amount) => ("destination.amount >= ?", positive(amount)?),
                AmountFilter::ForeignIs(amount) => (
                    "source.foreign_amount IS NOT NULL AND source.foreign_amount = ?",
                    negative(amount)?,
                ),
                AmountFilter::ForeignIsNot(amount) => (
                    "source.foreign_amount IS NULL OR source.foreign_amount != ?",
                    negative(amount)?,
                ),
                AmountFilter::ForeignLess(amount) => (
                    "destination.foreign_amount IS NOT NULL AND destination.foreign_amount <= ?",
                    positive(amount)?,
                ),
                AmountFilter::ForeignMore(amount) => (
                    "destination.foreign_amount IS NOT NULL AND destination.foreign_amount >= ?",
                    positive(amount)?,
                ),
            };

            clauses.push(format!("({clause})"));
            params.push(Box::new(amount));
        }

        if let Some(start_date) = self.start_date {
            clauses.push("(journal.date >= ?)".to_owned());
            params.push(Box::new(start_date));
        }

        if let Some(end_date) = self.end_date {
            clauses.push("(journal.date <= ?)".to_owned());
            params.push(Box::new(end_date));
        }

        if !self.account_ids.is_empty() {
            let placeholders = vec!["?"; self.account_ids.len()].join(", ");
            clauses.push(format!(
                "(source.account_id IN ({placeholders}) \
                 OR destination.account_id IN ({placeholders}))"
            ));

            // The placeholder list appears twice, so the IDs are bound twice.
            for _ in 0..2 {
                for account_id in &self.account_ids {
                    params.push(Box::new(*account_id));
                }
            }
        }

        if !self.tag_ids.is_empty() {
            let placeholders = vec!["?"; self.tag_ids.len()].join(", ");
            clauses.push(format!(
                "(journal.id IN (SELECT transaction_journal_id \
                 FROM tag_transaction_journal WHERE tag_id IN ({placeholders})))"
            ));

            for tag_id in &self.tag_ids {
                params.push(Box::new(*tag_id));
            }
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let query = format!(
            "SELECT journal.id, journal.description, journal.date, journal.transaction_type_id,
                    source.id, source.account_id, source.amount, source.foreign_amount,
                    destination.id, destination.account_id, destination.amount,
                    destination.foreign_amount
             FROM transaction_journal journal
             INNER JOIN \"transaction\" source
                ON source.journal_id = journal.id AND source.amount < 0
             INNER JOIN \"transaction\" destination
                ON destination.journal_id = journal.id AND destination.amount > 0
             {where_clause}
             ORDER BY journal.date ASC, journal.id ASC"
        );

        connection
            .prepare(&query)?
            .query_map(params_from_iter(params.iter()), map_journal_row)?
            .map(|maybe_row| maybe_row.map_err(|error| error.into()))
            .collect()
    }
}

/// Parse a decimal string and normalize it to a negative number, the sign of
/// a source leg.
fn negative(amount: &str) -> Result<f64, Error> {
    parse_amount(amount).map(|amount| -amount.abs())
}

/// Parse a decimal string and normalize it to a positive number, the sign of
/// a destination leg.
fn positive(amount: &str) -> Result<f64, Error> {
    parse_amount(amount).map(f64::abs)
}

fn parse_amount(amount: &str) -> Result<f64, Error> {
    amount
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .ok_or_else(|| Error::InvalidAmount(amount.to_owned()))
}
