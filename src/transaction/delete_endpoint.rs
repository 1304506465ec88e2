//! Defines the endpoint for deleting an expense.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    database_id::TransactionId,
    redirect::{RedirectQuery, normalize_redirect_url},
    transaction::delete_transaction,
};

/// The state needed to delete an expense.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting an expense.
///
/// Redirects to `redirect_url` if given, otherwise responds with a success
/// alert so the table row that triggered the request can be removed.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Query(query): Query<RedirectQuery>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = delete_transaction(transaction_id, &connection) {
        tracing::error!("could not delete expense {transaction_id}: {error}");
        return error.into_alert_response();
    }

    tracing::info!("deleted expense {transaction_id}");

    match query
        .redirect_url
        .as_deref()
        .and_then(normalize_redirect_url)
    {
        Some(redirect_url) => (HxRedirect(redirect_url), StatusCode::SEE_OTHER).into_response(),
        // The status code has to be 200 OK or HTMX will not delete the table row.
        None => Alert::SuccessSimple {
            message: "Expense deleted successfully!".to_owned(),
        }
        .into_response(),
    }
}
