//! The expense form shared by the create and edit pages, and its validation.

use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, macros::format_description};

use crate::{
    Error,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner},
    transaction::{Amount, Category, Transaction, TransactionBuilder},
};

/// The raw values submitted with the expense form.
///
/// Every field is kept as text so the form can be shown again exactly as the
/// user entered it when validation fails.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct TransactionForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub note: String,
}

impl TransactionForm {
    /// The values to show on a blank form: today's date and the default category.
    pub fn new_with_date(today: Date) -> Self {
        Self {
            date: today.to_string(),
            category: Category::default().to_string(),
            ..Default::default()
        }
    }

    /// The values of an existing transaction.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            amount: transaction.amount.to_string(),
            category: transaction.category.to_string(),
            date: transaction.date.to_string(),
            note: transaction.note.clone().unwrap_or_default(),
        }
    }
}

/// The messages to show next to the fields that failed validation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldErrors {
    pub amount: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
}

/// Parse a date in the ISO 8601 format used by date inputs, e.g. "2024-03-05".
///
/// # Errors
/// Returns [Error::InvalidDate] if `text` is not a valid date.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate("Enter a valid date.".to_owned()))
}

/// Check the submitted form and convert it into the fields of a transaction.
///
/// An empty category means [Category::Other] and an empty date means `today`.
///
/// # Errors
/// Returns every field that is invalid along with a message explaining why.
pub fn validate_transaction_form(
    form: &TransactionForm,
    today: Date,
) -> Result<TransactionBuilder, FieldErrors> {
    let amount = form.amount.parse::<Amount>();

    let category = match form.category.trim() {
        "" => Ok(Category::default()),
        category => category.parse::<Category>(),
    };

    let date = match form.date.trim() {
        "" => Ok(today),
        date => parse_date(date),
    };

    match (amount, category, date) {
        (Ok(amount), Ok(category), Ok(date)) => Ok(Transaction::build(amount, date)
            .category(category)
            .note(&form.note)),
        (amount, category, date) => Err(FieldErrors {
            amount: amount.err().map(|error| error.to_string()),
            category: category.err().map(|error| error.to_string()),
            date: date.err().map(|error| error.to_string()),
        }),
    }
}

/// How the form is submitted with HTMX.
pub enum FormAction<'a> {
    /// Create a new expense with a POST to the endpoint.
    Create(&'a str),
    /// Replace an existing expense with a PUT to the endpoint.
    Update(&'a str),
}

fn field_error(field: &str, message: Option<&String>) -> Markup {
    html! {
        @if let Some(message) = message {
            p id=(format!("{field}-error")) class="text-red-500 text-base" { (message) }
        }
    }
}

/// Render the expense form with `values` filled in and a message under each
/// field in `errors`.
///
/// Validation failures are swapped in place of the form, while other errors
/// are shown as alerts.
pub fn transaction_form_view(
    action: FormAction<'_>,
    values: &TransactionForm,
    errors: &FieldErrors,
    submit_label: &str,
) -> Markup {
    let (hx_post, hx_put) = match action {
        FormAction::Create(endpoint) => (Some(endpoint), None),
        FormAction::Update(endpoint) => (None, Some(endpoint)),
    };

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-disabled-elt="#submit-button"
            hx-indicator="#indicator"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                div class="input-wrapper w-full"
                {
                    input
                        name="amount"
                        id="amount"
                        type="number"
                        step="0.01"
                        min="0"
                        placeholder="0.00"
                        required
                        autofocus
                        value=(values.amount)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                (field_error("amount", errors.amount.as_ref()))
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select name="category" id="category" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for category in Category::ALL {
                        option
                            value=(category)
                            selected[values.category == category.as_str()]
                        {
                            (category)
                        }
                    }
                }

                (field_error("category", errors.category.as_ref()))
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    name="date"
                    id="date"
                    type="date"
                    value=(values.date)
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error("date", errors.date.as_ref()))
            }

            div
            {
                label for="note" class=(FORM_LABEL_STYLE) { "Note" }

                textarea
                    name="note"
                    id="note"
                    rows="3"
                    placeholder="Optional note about this expense..."
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    (values.note)
                }
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                (submit_label)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        test_utils::{
            assert_form_error_message, assert_form_input_with_value, assert_form_select,
            assert_form_submit_button_with_text, assert_hx_endpoint, assert_no_form_errors,
            assert_valid_html, must_get_form,
        },
        transaction::{
            Category, Transaction,
            form::{
                FieldErrors, FormAction, TransactionForm, transaction_form_view,
                validate_transaction_form,
            },
        },
    };

    const TODAY: time::Date = date!(2024 - 03 - 20);

    fn form(amount: &str, category: &str, date: &str, note: &str) -> TransactionForm {
        TransactionForm {
            amount: amount.to_owned(),
            category: category.to_owned(),
            date: date.to_owned(),
            note: note.to_owned(),
        }
    }

    #[test]
    fn valid_form_builds_transaction() {
        let got = validate_transaction_form(&form("12.5", "Food", "2024-03-05", "Lunch"), TODAY);

        assert_eq!(
            got,
            Ok(
                Transaction::build("12.50".parse().unwrap(), date!(2024 - 03 - 05))
                    .category(Category::Food)
                    .note("Lunch")
            )
        );
    }

    #[test]
    fn empty_category_and_date_use_defaults() {
        let got = validate_transaction_form(&form("3", "", "", ""), TODAY)
            .expect("form should be valid");

        assert_eq!(got.category, Category::Other);
        assert_eq!(got.date, TODAY);
        assert_eq!(got.note, None);
    }

    #[test]
    fn future_dates_are_allowed() {
        let got = validate_transaction_form(&form("3", "Bills", "2030-01-01", ""), TODAY);

        assert!(got.is_ok());
    }

    #[test]
    fn reports_every_invalid_field() {
        let got = validate_transaction_form(&form("-1", "Travel", "2024-02-30", ""), TODAY);

        assert_eq!(
            got,
            Err(FieldErrors {
                amount: Some("Ensure this value is greater than or equal to 0.".to_owned()),
                category: Some(
                    "Select a valid choice. Travel is not one of the available choices."
                        .to_owned()
                ),
                date: Some("Enter a valid date.".to_owned()),
            })
        );
    }

    #[test]
    fn missing_amount_is_required() {
        let got = validate_transaction_form(&form("", "Food", "2024-03-05", ""), TODAY);

        assert_eq!(
            got.map_err(|errors| errors.amount),
            Err(Some("This field is required.".to_owned()))
        );
    }

    #[test]
    fn form_view_keeps_submitted_values_and_shows_errors() {
        let values = form("1.234", "Fuel", "2024-03-05", "Petrol");
        let errors = FieldErrors {
            amount: Some("Ensure that there are no more than 2 decimal places.".to_owned()),
            ..Default::default()
        };

        let markup = transaction_form_view(
            FormAction::Create("/api/transactions"),
            &values,
            &errors,
            "Save",
        );

        let html = Html::parse_fragment(&markup.into_string());
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, "/api/transactions", "hx-post");
        assert_form_input_with_value(&form, "amount", "number", "1.234");
        assert_form_input_with_value(&form, "date", "date", "2024-03-05");
        assert_form_select(&form, "category", "Fuel");
        assert_form_error_message(
            &form,
            "amount",
            "Ensure that there are no more than 2 decimal places.",
        );
        assert_form_submit_button_with_text(&form, "Save");
        let note = form
            .select(&Selector::parse("textarea[name=note]").unwrap())
            .next()
            .expect("No note field found")
            .text()
            .collect::<String>();
        assert_eq!(note, "Petrol");
    }

    #[test]
    fn update_form_uses_put() {
        let markup = transaction_form_view(
            FormAction::Update("/api/transactions/1"),
            &TransactionForm::new_with_date(TODAY),
            &FieldErrors::default(),
            "Save",
        );

        let html = Html::parse_fragment(&markup.into_string());
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, "/api/transactions/1", "hx-put");
        assert!(form.value().attr("hx-post").is_none());
        assert_form_select(&form, "category", "Other");
        assert_no_form_errors(&form);
    }
}
