//! Defines the route handler for the month calendar page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    calendar::{CalendarDay, CalendarMonth, MonthId, WeekStart, build_calendar_month},
    endpoints::{self, format_endpoint},
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_currency},
    navigation::NavBar,
    timezone::current_local_date,
    transaction::get_transactions_in_month,
};

/// The state needed for the calendar page.
#[derive(Debug, Clone)]
pub struct CalendarState {
    /// The database connection for reading expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// Which day the calendar weeks start on.
    pub week_start: WeekStart,
}

impl FromRef<AppState> for CalendarState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            week_start: state.week_start,
        }
    }
}

/// The month to show. Missing or invalid values fall back to the current month.
#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

/// Pick the month requested by `query`, falling back to the month of `today`
/// for the year and month separately.
fn resolve_month(query: &CalendarQuery, today: Date) -> MonthId {
    let year = query
        .year
        .as_deref()
        .and_then(|year| year.trim().parse::<i32>().ok())
        .filter(|year| MonthId::YEARS.contains(year))
        .unwrap_or_else(|| today.year());

    let month = query
        .month
        .as_deref()
        .and_then(|month| month.trim().parse::<u8>().ok())
        .filter(|month| (1..=12).contains(month))
        .unwrap_or_else(|| today.month().into());

    MonthId::new(year, month).unwrap_or_else(|| MonthId::containing(today))
}

fn month_url(month: MonthId) -> String {
    format!(
        "{}?year={}&month={}",
        endpoints::CALENDAR_VIEW,
        month.year(),
        month.month()
    )
}

fn day_cell(day: &CalendarDay) -> Markup {
    let cell_style = if day.is_today {
        "h-28 align-top p-2 border border-gray-200 dark:border-gray-700 \
        bg-blue-50 dark:bg-blue-900"
    } else {
        "h-28 align-top p-2 border border-gray-200 dark:border-gray-700"
    };

    html! {
        @if day.is_padding() {
            td class="h-28 border border-gray-200 dark:border-gray-700 bg-gray-50 dark:bg-gray-900" {}
        } @else {
            td class=(cell_style) data-day=(day.day)
            {
                div class="flex justify-between items-baseline"
                {
                    span class="font-semibold" { (day.day) }

                    @if !day.transactions.is_empty() {
                        span class="day-total text-xs font-medium" { (format_currency(day.total)) }
                    }
                }

                ul class="mt-1 space-y-1 text-xs"
                {
                    @for transaction in &day.transactions {
                        li
                        {
                            a
                                href=(format_endpoint(endpoints::TRANSACTION_VIEW, transaction.id))
                                class=(LINK_STYLE)
                                title=(transaction)
                            {
                                (transaction.category) " " (format_currency(transaction.amount.as_decimal()))
                            }
                        }
                    }
                }
            }
        }
    }
}

fn calendar_view(calendar: &CalendarMonth) -> Markup {
    let nav_bar = NavBar::new(endpoints::CALENDAR_VIEW).into_html();
    let title = calendar.month.to_string();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="flex justify-between flex-wrap items-end mb-4"
            {
                @if let Some(previous) = calendar.previous {
                    a href=(month_url(previous)) class=(LINK_STYLE) rel="prev" { "Previous" }
                } @else {
                    span {}
                }

                div class="text-center"
                {
                    h1 class="text-xl font-bold" { (title) }
                    p id="month-total" class="text-sm"
                    {
                        "Total: " (format_currency(calendar.total))
                    }
                }

                @if let Some(next) = calendar.next {
                    a href=(month_url(next)) class=(LINK_STYLE) rel="next" { "Next" }
                } @else {
                    span {}
                }
            }

            p class="text-sm text-center mb-4"
            {
                a href=(endpoints::CALENDAR_VIEW) class=(LINK_STYLE) { "Today" }
            }

            div class="overflow-x-auto"
            {
                table class="w-full table-fixed text-sm"
                {
                    thead
                    {
                        tr
                        {
                            @for day_name in calendar.week_start.day_names() {
                                th scope="col" class="p-2 text-center" { (day_name) }
                            }
                        }
                    }

                    tbody
                    {
                        @for week in &calendar.weeks {
                            tr
                            {
                                @for day in week {
                                    (day_cell(day))
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base(&title, &[], &content)
}

/// Route handler for the calendar page.
///
/// Shows the month given by the `year` and `month` query parameters, or the
/// current month in the local timezone.
pub async fn get_calendar_page(
    State(state): State<CalendarState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;
    let month = resolve_month(&query, today);

    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transactions_in_month(month, &connection)
            .inspect_err(|error| tracing::error!("could not get expenses for {month}: {error}"))?
    };

    let calendar = build_calendar_month(month, state.week_start, transactions, today);

    Ok(calendar_view(&calendar).into_response())
}
