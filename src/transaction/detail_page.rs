//! Defines the route handler for the page showing a single expense.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::macros::format_description;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    html::{
        CATEGORY_BADGE_STYLE, FORM_CONTAINER_STYLE, base, edit_delete_action_links,
        format_currency, link,
    },
    navigation::NavBar,
    redirect::with_redirect_url,
    transaction::{Transaction, get_transaction},
};

/// The state needed for the expense detail page.
#[derive(Debug, Clone)]
pub struct TransactionDetailState {
    /// The database connection for reading the expense.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionDetailState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn transaction_detail_view(transaction: &Transaction) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTION_VIEW).into_html();
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = with_redirect_url(
        &format_endpoint(endpoints::TRANSACTION, transaction.id),
        endpoints::TRANSACTIONS_VIEW,
    );
    let created_at = transaction
        .created_at
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute] UTC"
        ))
        .unwrap_or_else(|_| transaction.created_at.to_string());

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h2 class="text-xl font-bold" { "Expense Details" }

                dl class="grid grid-cols-2 gap-y-2"
                {
                    dt class="font-medium" { "Amount" }
                    dd id="amount" { (format_currency(transaction.amount.as_decimal())) }

                    dt class="font-medium" { "Category" }
                    dd id="category" { span class=(CATEGORY_BADGE_STYLE) { (transaction.category) } }

                    dt class="font-medium" { "Date" }
                    dd id="date" { (transaction.date) }

                    dt class="font-medium" { "Note" }
                    dd id="note"
                    {
                        @match &transaction.note {
                            Some(note) => (note),
                            None => span class="text-gray-500" { "No note" },
                        }
                    }

                    dt class="font-medium" { "Created" }
                    dd id="created-at" { (created_at) }
                }

                div class="flex gap-4"
                {
                    (edit_delete_action_links(
                        &edit_url,
                        &delete_url,
                        &format!("Are you sure you want to delete the expense '{transaction}'?"),
                        "this",
                        "none",
                    ))
                }

                p class="text-sm" { (link(endpoints::TRANSACTIONS_VIEW, "Back to expenses")) }
            }
        }
    };

    base("Expense Details", &[], &content)
}

/// Renders the page for a single expense, or the 404 page if it does not exist.
pub async fn get_transaction_detail_page(
    State(state): State<TransactionDetailState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let transaction = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transaction(transaction_id, &connection)?
    };

    Ok(transaction_detail_view(&transaction).into_response())
}
