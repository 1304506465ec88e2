//! Expense management.
//!
//! This module contains everything related to expenses:
//! - The `Transaction` model, its `Amount` and `Category`, and `TransactionBuilder`
//! - Database functions for storing, filtering and paging expenses
//! - The expense form, its validation, and the route handlers for the expense pages

mod amount;
mod category;
mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod detail_page;
mod edit_endpoint;
mod edit_page;
mod form;
mod list_page;
mod query;

pub use amount::Amount;
pub use category::Category;
pub use core::{
    Transaction, TransactionBuilder, create_transaction, create_transaction_table,
    delete_transaction, get_transaction, update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_create_transaction_page;
pub use delete_endpoint::delete_transaction_endpoint;
pub use detail_page::get_transaction_detail_page;
pub use edit_endpoint::edit_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
pub use list_page::get_transaction_list_page;
pub use query::{
    CategoryFilter, TransactionFilter, get_recent_transactions, get_transactions_in_month,
    query_transactions,
};

#[cfg(test)]
pub use core::count_transactions;
