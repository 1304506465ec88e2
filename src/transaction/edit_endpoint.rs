//! Defines the endpoint for updating an expense.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    redirect::{RedirectQuery, normalize_redirect_url, with_redirect_url},
    timezone::current_local_date,
    transaction::{
        form::{FormAction, TransactionForm, transaction_form_view, validate_transaction_form},
        update_transaction,
    },
};

/// The state needed to edit an expense.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for replacing the fields of an expense.
///
/// Redirects to `redirect_url` if given, otherwise to the expense's detail page.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Query(query): Query<RedirectQuery>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let redirect_url = query
        .redirect_url
        .as_deref()
        .and_then(normalize_redirect_url);

    let today = match current_local_date(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let builder = match validate_transaction_form(&form, today) {
        Ok(builder) => builder,
        Err(errors) => {
            tracing::debug!("rejected invalid expense form for {transaction_id}: {errors:?}");
            let endpoint = format_endpoint(endpoints::TRANSACTION, transaction_id);
            let endpoint = match &redirect_url {
                Some(redirect_url) => with_redirect_url(&endpoint, redirect_url),
                None => endpoint,
            };

            return transaction_form_view(
                FormAction::Update(&endpoint),
                &form,
                &errors,
                "Save Changes",
            )
            .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = update_transaction(transaction_id, builder, &connection) {
        tracing::error!("could not update expense {transaction_id}: {error}");
        return error.into_alert_response();
    }

    let redirect_url = redirect_url
        .unwrap_or_else(|| format_endpoint(endpoints::TRANSACTION_VIEW, transaction_id));

    (HxRedirect(redirect_url), StatusCode::SEE_OTHER).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        redirect::RedirectQuery,
        test_utils::{
            assert_form_error_message, assert_hx_endpoint, assert_hx_redirect, assert_status_ok,
            must_get_form, parse_html_fragment,
        },
        transaction::{
            Category, Transaction, create_transaction,
            edit_endpoint::{EditTransactionState, edit_transaction_endpoint},
            form::TransactionForm,
            get_transaction,
        },
    };

    fn get_test_state() -> EditTransactionState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        EditTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn insert_expense(state: &EditTransactionState) -> Transaction {
        create_transaction(
            Transaction::build("10".parse().unwrap(), date!(2024 - 03 - 01))
                .category(Category::Food)
                .note("Groceries"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap()
    }

    fn valid_form() -> TransactionForm {
        TransactionForm {
            amount: "25.99".to_owned(),
            category: "Shopping".to_owned(),
            date: "2024-03-02".to_owned(),
            note: String::new(),
        }
    }

    #[tokio::test]
    async fn updates_expense_and_redirects_to_detail_page() {
        let state = get_test_state();
        let original = insert_expense(&state);

        let response = edit_transaction_endpoint(
            State(state.clone()),
            Path(original.id),
            Query(RedirectQuery::default()),
            Form(valid_form()),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, &format!("/transactions/{}", original.id));
        let updated = get_transaction(original.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(updated.amount.to_string(), "25.99");
        assert_eq!(updated.category, Category::Shopping);
        assert_eq!(updated.date, date!(2024 - 03 - 02));
        assert_eq!(updated.note, None);
        assert_eq!(updated.created_at, original.created_at);
    }

    #[tokio::test]
    async fn redirects_to_redirect_url() {
        let state = get_test_state();
        let original = insert_expense(&state);
        let redirect_url = "/transactions?category=Food&page=2".to_owned();

        let response = edit_transaction_endpoint(
            State(state),
            Path(original.id),
            Query(RedirectQuery {
                redirect_url: Some(redirect_url.clone()),
            }),
            Form(valid_form()),
        )
        .await
        .into_response();

        assert_hx_redirect(&response, &redirect_url);
    }

    #[tokio::test]
    async fn ignores_external_redirect_url() {
        let state = get_test_state();
        let original = insert_expense(&state);

        let response = edit_transaction_endpoint(
            State(state),
            Path(original.id),
            Query(RedirectQuery {
                redirect_url: Some("https://example.com".to_owned()),
            }),
            Form(valid_form()),
        )
        .await
        .into_response();

        assert_hx_redirect(&response, &format!("/transactions/{}", original.id));
    }

    #[tokio::test]
    async fn invalid_form_leaves_expense_unchanged() {
        let state = get_test_state();
        let original = insert_expense(&state);
        let form = TransactionForm {
            date: "not a date".to_owned(),
            ..valid_form()
        };

        let response = edit_transaction_endpoint(
            State(state.clone()),
            Path(original.id),
            Query(RedirectQuery::default()),
            Form(form),
        )
        .await
        .into_response();

        assert_status_ok(&response);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format!("/api/transactions/{}", original.id),
            "hx-put",
        );
        assert_form_error_message(&form, "date", "Enter a valid date.");
        let got = get_transaction(original.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(got, original);
    }

    #[tokio::test]
    async fn missing_expense_returns_not_found_alert() {
        let state = get_test_state();

        let response = edit_transaction_endpoint(
            State(state.clone()),
            Path(999),
            Query(RedirectQuery::default()),
            Form(valid_form()),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get_transaction(999, &state.db_connection.lock().unwrap()),
            Err(Error::NotFound)
        );
    }
}
