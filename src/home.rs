//! The home page: the most recent expenses and this month's spending.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    AppState, Error,
    calendar::MonthId,
    endpoints::{self, format_endpoint},
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    timezone::current_local_date,
    transaction::{Transaction, get_recent_transactions, get_transactions_in_month},
};

/// The number of expenses shown on the home page.
const RECENT_TRANSACTION_COUNT: u64 = 5;

/// The state needed for the home page.
#[derive(Debug, Clone)]
pub struct HomePageState {
    /// The database connection for reading expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for HomePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

fn home_view(recent: &[Transaction], month: MonthId, month_total: Decimal) -> Markup {
    let nav_bar = NavBar::new(endpoints::ROOT).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            section class="mb-8"
            {
                h1 class="text-xl font-bold" { "Expense Tracker" }

                div class="mt-4 p-4 rounded border border-gray-200 dark:border-gray-700"
                {
                    p class="text-sm text-gray-500 dark:text-gray-400" { "Spent in " (month) }
                    p id="month-total" class="text-2xl font-semibold" { (format_currency(month_total)) }
                }

                div class="flex gap-4 mt-4"
                {
                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE) { "Add Expense" }
                    a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "View all expenses" }
                    a href=(endpoints::CALENDAR_VIEW) class=(LINK_STYLE) { "Calendar" }
                }
            }

            section
            {
                h2 class="text-lg font-semibold mb-2" { "Recent Expenses" }

                @if recent.is_empty() {
                    p class="text-gray-500 dark:text-gray-400"
                    {
                        "No expenses yet. "
                        a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE) { "Add your first expense" }
                    }
                } @else {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                            }
                        }

                        tbody
                        {
                            @for transaction in recent {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        a
                                            href=(format_endpoint(endpoints::TRANSACTION_VIEW, transaction.id))
                                            class=(LINK_STYLE)
                                        {
                                            (transaction.date)
                                        }
                                    }
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        span class=(CATEGORY_BADGE_STYLE) { (transaction.category) }
                                    }
                                    td class={ (TABLE_CELL_STYLE) " text-right" }
                                    {
                                        (format_currency(transaction.amount.as_decimal()))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Home", &[], &content)
}

/// Route handler for the home page.
pub async fn get_home_page(State(state): State<HomePageState>) -> Result<Response, Error> {
    let month = MonthId::containing(current_local_date(&state.local_timezone)?);

    let (recent, month_transactions) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let recent = get_recent_transactions(RECENT_TRANSACTION_COUNT, &connection)
            .inspect_err(|error| tracing::error!("could not get recent expenses: {error}"))?;
        let month_transactions = get_transactions_in_month(month, &connection)
            .inspect_err(|error| tracing::error!("could not get expenses for {month}: {error}"))?;

        (recent, month_transactions)
    };

    let month_total = month_transactions
        .iter()
        .map(|transaction| transaction.amount.as_decimal())
        .sum();

    Ok(home_view(&recent, month, month_total).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, response::IntoResponse};
    use rusqlite::Connection;
    use scraper::Selector;
    use time::{Duration, OffsetDateTime};

    use crate::{
        db::initialize,
        home::{HomePageState, get_home_page},
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
        transaction::{Transaction, create_transaction},
    };

    fn get_test_state() -> HomePageState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        HomePageState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn shows_five_most_recent_expenses_and_month_total() {
        let state = get_test_state();
        let today = OffsetDateTime::now_utc().date();
        {
            let connection = state.db_connection.lock().unwrap();
            for _ in 0..6 {
                create_transaction(
                    Transaction::build("2.50".parse().unwrap(), today),
                    &connection,
                )
                .unwrap();
            }
            // Far enough back to never be in the current month.
            create_transaction(
                Transaction::build("100".parse().unwrap(), today - Duration::days(62)),
                &connection,
            )
            .unwrap();
        }

        let response = get_home_page(State(state)).await.into_response();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let rows = document
            .select(&Selector::parse("tbody tr").unwrap())
            .count();
        assert_eq!(rows, 5);
        let month_total = document
            .select(&Selector::parse("#month-total").unwrap())
            .next()
            .expect("No month total found")
            .text()
            .collect::<String>();
        assert_eq!(month_total.trim(), "$15.00");
    }

    #[tokio::test]
    async fn shows_empty_state() {
        let response = get_home_page(State(get_test_state()))
            .await
            .into_response();

        let document = parse_html_document(response).await;
        assert!(
            document
                .select(&Selector::parse("table").unwrap())
                .next()
                .is_none()
        );
        let month_total = document
            .select(&Selector::parse("#month-total").unwrap())
            .next()
            .expect("No month total found")
            .text()
            .collect::<String>();
        assert_eq!(month_total.trim(), "$0.00");
    }
}
