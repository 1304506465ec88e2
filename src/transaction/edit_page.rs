//! Defines the route handler for the page for editing an expense.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    html::{FORM_CONTAINER_STYLE, base, dollar_input_styles, link},
    navigation::NavBar,
    redirect::{RedirectQuery, normalize_redirect_url, with_redirect_url},
    transaction::{
        Transaction,
        form::{FieldErrors, FormAction, TransactionForm, transaction_form_view},
        get_transaction,
    },
};

/// The state needed for the edit expense page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    /// The database connection for reading the expense.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn edit_transaction_view(transaction: &Transaction, redirect_url: Option<&str>) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_TRANSACTION_VIEW).into_html();
    let update_endpoint = format_endpoint(endpoints::TRANSACTION, transaction.id);
    let update_endpoint = match redirect_url {
        Some(redirect_url) => with_redirect_url(&update_endpoint, redirect_url),
        None => update_endpoint,
    };
    let cancel_url = redirect_url
        .map(str::to_owned)
        .unwrap_or_else(|| format_endpoint(endpoints::TRANSACTION_VIEW, transaction.id));

    let form = transaction_form_view(
        FormAction::Update(&update_endpoint),
        &TransactionForm::from_transaction(transaction),
        &FieldErrors::default(),
        "Save Changes",
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h2 class="text-xl font-bold" { "Edit Expense" }

                (form)

                p class="text-sm text-center" { (link(&cancel_url, "Cancel")) }
            }
        }
    };

    base("Edit Expense", &[dollar_input_styles()], &content)
}

/// Renders the page for editing an expense, or the 404 page if it does not exist.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionPageState>,
    Path(transaction_id): Path<TransactionId>,
    Query(query): Query<RedirectQuery>,
) -> Result<Response, Error> {
    let redirect_url = query
        .redirect_url
        .as_deref()
        .and_then(normalize_redirect_url);

    let transaction = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transaction(transaction_id, &connection)?
    };

    Ok(edit_transaction_view(&transaction, redirect_url.as_deref()).into_response())
}
