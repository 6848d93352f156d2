//! SQL `ORDER BY` rendering from a declared column table.
//!
//! Only column names that appear in the [`Table`] ever reach the rendered
//! clause, so user-supplied order strings cannot inject SQL.
//!
//! Tables are usually loaded from configuration:
//!
//! ```
//! use aip_query::{Order, Table};
//!
//! let table = Table::from_yaml(
//!     r#"
//! columns:
//!   - field_path: title
//!     database_name: book_title
//!     sortable: true
//!   - field_path: author.family_name
//!     database_name: author_family_name
//!     sortable: true
//! "#,
//! )
//! .unwrap();
//!
//! let order = Order::parse("author.family_name desc, title").unwrap();
//! assert_eq!(
//!     table.order_by_clause(&order).unwrap(),
//!     "ORDER BY author_family_name DESC, book_title\n"
//! );
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ordering::{Dir, Order};
use crate::path::FieldPath;

/// Mapping from a record field path to a database column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub field_path: FieldPath,
    pub database_name: String,
    #[serde(default)]
    pub sortable: bool,
}

impl Column {
    /// A non-sortable column.
    pub fn new(field_path: FieldPath, database_name: impl Into<String>) -> Self {
        Column {
            field_path,
            database_name: database_name.into(),
            sortable: false,
        }
    }

    /// Marks the column as usable in `ORDER BY`.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

/// The columns of one table, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Table { columns }
    }

    /// Loads a table from YAML.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| Error::Config(format!("column table: {e}")))
    }

    /// Loads a table from JSON.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Config(format!("column table: {e}")))
    }

    /// Looks up a column by field path.
    pub fn column(&self, path: &FieldPath) -> Option<&Column> {
        self.columns.iter().find(|c| &c.field_path == path)
    }

    /// Looks up a sortable column by field path.
    pub fn sortable_column(&self, path: &FieldPath) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.sortable && &c.field_path == path)
            .ok_or_else(|| Error::UnsortableField {
                field: path.to_string(),
                valid: self
                    .columns
                    .iter()
                    .filter(|c| c.sortable)
                    .map(|c| c.field_path.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Renders `ORDER BY col [DESC], ...` with a trailing newline, or the
    /// empty string for an empty order.
    pub fn order_by_clause(&self, order: &Order) -> Result<String> {
        if order.is_empty() {
            return Ok(String::new());
        }
        let mut seen = HashSet::new();
        let mut clause = String::from("ORDER BY ");
        for (i, key) in order.keys().iter().enumerate() {
            if i > 0 {
                clause.push_str(", ");
            }
            let column = self.sortable_column(&key.field)?;
            if !seen.insert(column.database_name.as_str()) {
                return Err(Error::DuplicateOrderField {
                    field: key.field.to_string(),
                });
            }
            clause.push_str(&column.database_name);
            if key.dir == Dir::Desc {
                clause.push_str(" DESC");
            }
        }
        clause.push('\n');
        tracing::trace!(clause = clause.trim_end(), "rendered order by");
        Ok(clause)
    }
}

/// Escapes a literal for use inside a SQL `LIKE` pattern.
///
/// `test_name` then matches only itself rather than also `test3name`.
pub fn quote_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
