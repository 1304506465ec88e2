//! Defines the route handler for the page for creating a new expense.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::Date;

use crate::{
    AppState, Error, endpoints,
    html::{FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    timezone::current_local_date,
    transaction::form::{FieldErrors, FormAction, TransactionForm, transaction_form_view},
};

/// The state needed for the new expense page.
#[derive(Debug, Clone)]
pub struct CreateTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

fn create_transaction_view(today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let form = transaction_form_view(
        FormAction::Create(endpoints::TRANSACTIONS_API),
        &TransactionForm::new_with_date(today),
        &FieldErrors::default(),
        "Add Expense",
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h2 class="text-xl font-bold" { "Add Expense" }

                (form)
            }
        }
    };

    base("Add Expense", &[dollar_input_styles()], &content)
}

/// Renders the page for creating an expense with the date set to today.
pub async fn get_create_transaction_page(
    State(state): State<CreateTransactionPageState>,
) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;

    Ok(create_transaction_view(today).into_response())
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, response::IntoResponse};
    use time::OffsetDateTime;

    use crate::{
        endpoints,
        test_utils::{
            assert_content_type, assert_form_input, assert_form_input_with_value,
            assert_form_select, assert_form_submit_button, assert_hx_endpoint,
            assert_no_form_errors, assert_status_ok, assert_valid_html, must_get_form,
            parse_html_document,
        },
        transaction::create_page::{CreateTransactionPageState, get_create_transaction_page},
    };

    #[tokio::test]
    async fn renders_form_with_todays_date() {
        let state = CreateTransactionPageState {
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_create_transaction_page(State(state))
            .await
            .into_response();

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_input_with_value(
            &form,
            "date",
            "date",
            &OffsetDateTime::now_utc().date().to_string(),
        );
        assert_form_select(&form, "category", "Other");
        assert_form_submit_button(&form);
        assert_no_form_errors(&form);
    }

    #[tokio::test]
    async fn invalid_timezone_is_an_error() {
        let state = CreateTransactionPageState {
            local_timezone: "Not/AZone".to_owned(),
        };

        let response = get_create_transaction_page(State(state))
            .await
            .into_response();

        assert_eq!(response.status(), 500);
    }
}
