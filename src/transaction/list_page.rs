//! Defines the route handler for the filtered, paginated list of expenses.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, PaginationIndicator, create_pagination_indicators, page_count},
    redirect::with_redirect_url,
    transaction::{
        Category, CategoryFilter, Transaction, TransactionFilter,
        form::parse_date,
        query_transactions,
    },
};

/// The max number of graphemes of a note to show in a table row before
/// truncating and displaying ellipses.
const MAX_NOTE_GRAPHEMES: usize = 40;

/// The state needed for the expense list page.
#[derive(Debug, Clone)]
pub struct TransactionListState {
    /// The database connection for querying expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The page size and number of page links to show.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionListState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The raw query parameters of the list page.
///
/// Values are kept as text so that bad input can be ignored instead of
/// rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionListQuery {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub page: Option<String>,
}

/// The filters in effect after ignoring empty and invalid parameters.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ActiveFilters {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub date_from: Option<Date>,
    pub date_to: Option<Date>,
}

impl ActiveFilters {
    fn from_query(query: &TransactionListQuery) -> Self {
        Self {
            keyword: non_empty(query.keyword.as_deref()),
            category: non_empty(query.category.as_deref()),
            date_from: parse_optional_date("date_from", query.date_from.as_deref()),
            date_to: parse_optional_date("date_to", query.date_to.as_deref()),
        }
    }

    /// The filters as a URL query string, e.g. "keyword=coffee&category=Food".
    fn to_query_string(&self) -> String {
        let params = [
            ("keyword", self.keyword.clone()),
            ("category", self.category.clone()),
            ("date_from", self.date_from.map(|date| date.to_string())),
            ("date_to", self.date_to.map(|date| date.to_string())),
        ];
        let params: Vec<_> = params
            .into_iter()
            .filter_map(|(name, value)| value.map(|value| (name, value)))
            .collect();

        serde_urlencoded::to_string(params).unwrap_or_else(|error| {
            tracing::error!("could not encode filters {self:?}: {error}");
            String::new()
        })
    }

    fn to_filter(&self) -> TransactionFilter {
        let category = match self.category.as_deref() {
            None => CategoryFilter::Any,
            Some(category) => category
                .parse::<Category>()
                .map(CategoryFilter::Only)
                .unwrap_or(CategoryFilter::Unknown),
        };

        TransactionFilter {
            keyword: self.keyword.clone(),
            category,
            date_from: self.date_from,
            date_to: self.date_to,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn parse_optional_date(name: &str, value: Option<&str>) -> Option<Date> {
    let value = non_empty(value)?;

    parse_date(&value)
        .inspect_err(|_| tracing::debug!("ignoring invalid {name} {value:?}"))
        .ok()
}

fn parse_page(page: Option<&str>, default_page: u64) -> u64 {
    page.and_then(|page| page.trim().parse::<u64>().ok())
        .filter(|&page| page > 0)
        .unwrap_or(default_page)
}

/// Everything needed to render one page of the expense list.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionListPage {
    /// The expenses on the current page.
    pub transactions: Vec<Transaction>,
    /// The number of expenses that match the filters across all pages.
    pub total_count: u64,
    /// The current page, starting at 1.
    pub page: u64,
    pub page_count: u64,
    pub filters: ActiveFilters,
    /// The active filters as a URL query string, without the page number.
    pub filter_query: String,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
}

impl TransactionListPage {
    /// The URL of `page` with the active filters.
    pub fn page_url(&self, page: u64) -> String {
        list_url(&self.filter_query, page)
    }

    /// The URL of the current page, used to come back after an edit.
    fn current_url(&self) -> String {
        list_url(&self.filter_query, self.page)
    }
}

fn list_url(filter_query: &str, page: u64) -> String {
    if filter_query.is_empty() {
        format!("{}?page={page}", endpoints::TRANSACTIONS_VIEW)
    } else {
        format!("{}?{filter_query}&page={page}", endpoints::TRANSACTIONS_VIEW)
    }
}

/// Apply the filters and page in `query` and collect the results.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn build_transaction_list_page(
    query: &TransactionListQuery,
    config: &PaginationConfig,
    connection: &Connection,
) -> Result<TransactionListPage, Error> {
    let filters = ActiveFilters::from_query(query);
    let page = parse_page(query.page.as_deref(), config.default_page);

    let result = query_transactions(&filters.to_filter(), page, config.page_size, connection)?;
    let page_count = page_count(result.total_count, config.page_size);

    let filter_query = filters.to_query_string();

    let previous_url =
        (page > 1).then(|| list_url(&filter_query, (page - 1).min(page_count.max(1))));
    let next_url = (page < page_count).then(|| list_url(&filter_query, page + 1));

    Ok(TransactionListPage {
        transactions: result.transactions,
        total_count: result.total_count,
        page,
        page_count,
        filters,
        filter_query,
        previous_url,
        next_url,
    })
}

fn format_note(note: &str) -> (String, Option<&str>) {
    let note_length = note.graphemes(true).count();

    if note_length <= MAX_NOTE_GRAPHEMES {
        (note.to_owned(), None)
    } else {
        let truncated: String = note.graphemes(true).take(MAX_NOTE_GRAPHEMES - 3).collect();
        (truncated + "...", Some(note))
    }
}

fn search_form_view(filters: &ActiveFilters) -> Markup {
    let selected_category = filters.category.as_deref().unwrap_or_default();

    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="grid grid-cols-1 md:grid-cols-5 gap-4 items-end mb-4"
        {
            div
            {
                label for="keyword" class=(FORM_LABEL_STYLE) { "Keyword" }
                input
                    name="keyword"
                    id="keyword"
                    type="text"
                    placeholder="Search in notes..."
                    value=[filters.keyword.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                select name="category" id="category" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[selected_category.is_empty()] { "All Categories" }

                    @for category in Category::ALL {
                        option
                            value=(category)
                            selected[selected_category == category.as_str()]
                        {
                            (category)
                        }
                    }
                }
            }

            div
            {
                label for="date_from" class=(FORM_LABEL_STYLE) { "From" }
                input
                    name="date_from"
                    id="date_from"
                    type="date"
                    value=[filters.date_from.map(|date| date.to_string())]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="date_to" class=(FORM_LABEL_STYLE) { "To" }
                input
                    name="date_to"
                    id="date_to"
                    type="date"
                    value=[filters.date_to.map(|date| date.to_string())]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex gap-4 items-center"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Search" }
                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "Clear" }
            }
        }
    }
}

fn pagination_view(list_page: &TransactionListPage, max_pages: u64) -> Markup {
    let indicators = create_pagination_indicators(list_page.page, list_page.page_count, max_pages);

    html! {
        @if !indicators.is_empty() {
            nav class="pagination flex justify-center mt-4" aria-label="Pagination"
            {
                ul class="flex gap-2 items-center"
                {
                    @for indicator in indicators {
                        li
                        {
                            @match indicator {
                                PaginationIndicator::Page(page) => {
                                    a href=(list_page.page_url(page)) class=(LINK_STYLE) { (page) }
                                }
                                PaginationIndicator::CurrPage(page) => {
                                    span aria-current="page" class="font-bold" { (page) }
                                }
                                PaginationIndicator::Ellipsis => {
                                    span { "..." }
                                }
                                PaginationIndicator::BackButton(page) => {
                                    a
                                        href=(list_page.previous_url.clone().unwrap_or_else(|| list_page.page_url(page)))
                                        class=(LINK_STYLE)
                                    {
                                        "Previous"
                                    }
                                }
                                PaginationIndicator::NextButton(page) => {
                                    a
                                        href=(list_page.next_url.clone().unwrap_or_else(|| list_page.page_url(page)))
                                        class=(LINK_STYLE)
                                    {
                                        "Next"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn transaction_list_view(list_page: &TransactionListPage, max_pages: u64) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let current_url = list_page.current_url();

    let table_row = |transaction: &Transaction| {
        let detail_url = format_endpoint(endpoints::TRANSACTION_VIEW, transaction.id);
        let edit_url = with_redirect_url(
            &format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id),
            &current_url,
        );
        let delete_url = format_endpoint(endpoints::TRANSACTION, transaction.id);
        let note = transaction.note.as_deref().map(format_note);

        html! {
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    a href=(detail_url) class=(LINK_STYLE) { (transaction.date) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    span class=(CATEGORY_BADGE_STYLE) { (transaction.category) }
                }

                td class={ (TABLE_CELL_STYLE) " text-right" }
                {
                    (format_currency(transaction.amount.as_decimal()))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    @if let Some((note, full_note)) = note {
                        span title=[full_note] { (note) }
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &edit_url,
                            &delete_url,
                            &format!("Are you sure you want to delete the expense '{transaction}'?"),
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        }
    };

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="relative"
            {
                div class="flex justify-between flex-wrap items-end mb-4"
                {
                    h1 class="text-xl font-bold" { "Expenses" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE) { "Add Expense" }
                }

                (search_form_view(&list_page.filters))

                p id="result-count" class="text-sm text-gray-500 dark:text-gray-400 mb-2"
                {
                    (list_page.total_count) " expense(s) found"
                }

                div class="dark:bg-gray-800 overflow-x-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Note" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in &list_page.transactions {
                                (table_row(transaction))
                            }

                            @if list_page.transactions.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No expenses found. "
                                        a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                                        {
                                            "Add an expense"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                (pagination_view(list_page, max_pages))
            }
        }
    };

    base("Expenses", &[], &content)
}

/// Route handler for the expense list page.
pub async fn get_transaction_list_page(
    State(state): State<TransactionListState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Response, Error> {
    let list_page = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        build_transaction_list_page(&query, &state.pagination_config, &connection)
            .inspect_err(|error| tracing::error!("could not query expenses: {error}"))?
    };

    Ok(transaction_list_view(&list_page, state.pagination_config.max_pages).into_response())
}
