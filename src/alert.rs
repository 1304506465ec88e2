//! Alert system for displaying success and error messages to users.
//!
//! Alerts are HTML fragments that HTMX swaps into the `#alert-container`
//! element defined in the base layout.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// An alert message to show at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message on its own.
    SuccessSimple { message: String },
    /// An error message followed by detail text that tells the user what to do next.
    Error { message: String, details: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (is_error, message, details) = match self {
            Alert::SuccessSimple { message } => (false, message, String::new()),
            Alert::Error { message, details } => (true, message, details),
        };

        let container_style = if is_error {
            "flex items-start p-4 mb-4 rounded-lg shadow-lg text-red-800 \
            bg-red-50 dark:bg-gray-800 dark:text-red-400 border border-red-300 \
            dark:border-red-800"
        } else {
            "flex items-start p-4 mb-4 rounded-lg shadow-lg text-green-800 \
            bg-green-50 dark:bg-gray-800 dark:text-green-400 border border-green-300 \
            dark:border-green-800"
        };

        html! {
            div
                class=(container_style)
                role="alert"
                hx-swap-oob="innerHTML:#alert-container"
            {
                div class="flex-1"
                {
                    p class="font-medium" { (message) }

                    @if !details.is_empty() {
                        p class="text-sm mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    class="ms-3 text-lg leading-none"
                    aria-label="Dismiss"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "×"
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.into_html()).into_response()
    }
}
