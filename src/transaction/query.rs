//! Filtered, ordered and paginated queries over the transaction table.

use rusqlite::{Connection, named_params};
use time::Date;

use crate::{
    Error,
    calendar::MonthId,
    transaction::{
        Category, Transaction,
        core::{TRANSACTION_COLUMNS, map_transaction_row},
    },
};

/// The ordering used by every list of transactions: newest first.
const DEFAULT_ORDER: &str = "ORDER BY date DESC, created_at DESC, id DESC";

/// How to filter transactions by category.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Do not filter by category.
    #[default]
    Any,
    /// Only transactions in this category.
    Only(Category),
    /// The requested category does not exist, so nothing matches.
    Unknown,
}

/// The conditions a transaction must meet to be included in a query.
///
/// All conditions must hold for a transaction to match. A `None` means
/// that condition is not applied.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionFilter {
    /// Case-insensitive text to search for in the note.
    pub keyword: Option<String>,
    pub category: CategoryFilter,
    /// Earliest date to include.
    pub date_from: Option<Date>,
    /// Latest date to include.
    pub date_to: Option<Date>,
}

impl TransactionFilter {
    /// Whether the filter can be seen to match nothing without querying the database.
    fn matches_nothing(&self) -> bool {
        let empty_date_range = matches!(
            (self.date_from, self.date_to),
            (Some(from), Some(to)) if from > to
        );

        self.category == CategoryFilter::Unknown || empty_date_range
    }
}

/// A page of transactions that matched a query.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionPage {
    /// The transactions on the requested page, in the default order.
    pub transactions: Vec<Transaction>,
    /// The number of transactions that matched across all pages.
    pub total_count: u64,
}

/// Escape the LIKE wildcards in `keyword` and wrap it for a substring match.
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");

    format!("%{escaped}%")
}

/// Get page `page` (1-based) of the transactions that match `filter`.
///
/// Pages hold `page_size` transactions. A page past the last page is empty.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn query_transactions(
    filter: &TransactionFilter,
    page: u64,
    page_size: u64,
    connection: &Connection,
) -> Result<TransactionPage, Error> {
    if filter.matches_nothing() {
        return Ok(TransactionPage {
            transactions: Vec::new(),
            total_count: 0,
        });
    }

    let keyword = filter.keyword.as_deref().map(like_pattern);
    let category = match filter.category {
        CategoryFilter::Only(category) => Some(category),
        _ => None,
    };

    let where_clause = "WHERE (:keyword IS NULL OR note LIKE :keyword ESCAPE '\\')
        AND (:category IS NULL OR category = :category)
        AND (:date_from IS NULL OR date >= :date_from)
        AND (:date_to IS NULL OR date <= :date_to)";

    let total_count: i64 = connection
        .prepare(&format!(
            "SELECT COUNT(id) FROM \"transaction\" {where_clause}"
        ))?
        .query_row(
            named_params! {
                ":keyword": keyword,
                ":category": category,
                ":date_from": filter.date_from,
                ":date_to": filter.date_to,
            },
            |row| row.get(0),
        )?;

    let limit = i64::try_from(page_size).unwrap_or(i64::MAX);
    let offset = i64::try_from(page.saturating_sub(1).saturating_mul(page_size))
        .unwrap_or(i64::MAX);

    let transactions = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" {where_clause}
            {DEFAULT_ORDER}
            LIMIT :limit OFFSET :offset"
        ))?
        .query_map(
            named_params! {
                ":keyword": keyword,
                ":category": category,
                ":date_from": filter.date_from,
                ":date_to": filter.date_to,
                ":limit": limit,
                ":offset": offset,
            },
            map_transaction_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TransactionPage {
        transactions,
        total_count: u64::try_from(total_count).unwrap_or_default(),
    })
}

/// Get the `limit` most recent transactions.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_recent_transactions(
    limit: u64,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" {DEFAULT_ORDER} LIMIT :limit"
        ))?
        .query_map(named_params! { ":limit": limit }, map_transaction_row)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Get every transaction dated in `month`, in the default order.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions_in_month(
    month: MonthId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
            WHERE date BETWEEN :first_day AND :last_day
            {DEFAULT_ORDER}"
        ))?
        .query_map(
            named_params! {
                ":first_day": month.first_day(),
                ":last_day": month.last_day(),
            },
            map_transaction_row,
        )?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}
