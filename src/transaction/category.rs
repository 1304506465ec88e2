//! The fixed set of categories an expense can belong to.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};

use crate::Error;

/// What an expense was spent on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Groceries, eating out and coffee.
    Food,
    /// Petrol and charging.
    Fuel,
    /// Rent, utilities and subscriptions.
    Bills,
    /// Clothes, gadgets and other purchases.
    Shopping,
    /// Anything that does not fit elsewhere.
    #[default]
    Other,
}

impl Category {
    /// Every category, in the order they are offered in forms.
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Fuel,
        Category::Bills,
        Category::Shopping,
        Category::Other,
    ];

    /// The category's name as shown to users and stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Fuel => "Fuel",
            Category::Bills => "Bills",
            Category::Shopping => "Shopping",
            Category::Other => "Other",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    /// Parse a category from its exact name, e.g. "Food".
    ///
    /// # Errors
    /// Returns [Error::InvalidCategory] if `s` is not the name of a category.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| {
                Error::InvalidCategory(format!(
                    "Select a valid choice. {s} is not one of the available choices."
                ))
            })
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        text.parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}
