#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

use rusqlite::Connection;

use crate::{AppState, PaginationConfig, WeekStart};

pub(crate) use form::{
    assert_form_error_message, assert_form_input, assert_form_input_with_value,
    assert_form_select, assert_form_submit_button, assert_form_submit_button_with_text,
    assert_hx_endpoint, assert_no_form_errors, must_get_form,
};
pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment};
pub(crate) use http::{assert_content_type, assert_hx_redirect, assert_status_ok};

/// An in-memory database with the tables created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    crate::initialize_db(&connection).expect("Could not initialize database.");
    connection
}

/// App state backed by an in-memory database, using UTC and a Monday week start.
pub(crate) fn get_test_app_state() -> AppState {
    AppState::new(
        get_test_connection(),
        "Etc/UTC",
        PaginationConfig::default(),
        WeekStart::Monday,
    )
    .expect("Could not create app state.")
}
