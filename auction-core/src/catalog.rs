//! Catalog ingestion from tabular rows.
//!
//! A row is a column-name → JSON value map, as produced by any CSV/sheet
//! reader that emits JSON objects. Which columns are read depends on the
//! item's category:
//!
//! | category      | batting | bowling | keeping |
//! |---------------|---------|---------|---------|
//! | batsman       | yes     |         |         |
//! | bowler        |         | yes     |         |
//! | all-rounder   | yes     | yes     |         |
//! | wicket-keeper | yes     |         | yes     |
//!
//! Missing numeric cells read as zero and missing text cells as the empty
//! string. A row without a name or a positive floor price is rejected.

use serde_json::{Map, Value};

use crate::error::CatalogError;
use crate::item::{Catalog, Item};
use crate::types::{Attributes, Category};

pub type Row = Map<String, Value>;

pub const NAME_COLUMN: &str = "Player";
pub const FLOOR_PRICE_COLUMN: &str = "Base Price (Cr)";
pub const ROLE_COLUMN: &str = "Role";

// (source column, attribute name)
const COMMON_COLUMNS: &[(&str, &str)] = &[("Matches", "matches"), ("Stars", "stars"), ("Age", "age")];

const BATTING_COLUMNS: &[(&str, &str)] = &[
    ("Runs", "runs"),
    ("Average", "batting_avg"),
    ("Strike Rates", "strike_rate"),
    ("100", "hundreds"),
    ("50", "fifties"),
    ("4s", "fours"),
    ("6s", "sixes"),
    ("Ducks", "ducks"),
];

const BOWLING_COLUMNS: &[(&str, &str)] = &[
    ("Wkts", "wickets"),
    ("Economy", "economy"),
    ("Avg", "bowling_avg"),
    ("SR", "bowling_sr"),
    ("4", "four_wickets"),
    ("5", "five_wickets"),
];

const KEEPING_COLUMNS: &[(&str, &str)] = &[("Ct", "catches"), ("St", "stumpings")];

/// Numeric cell, or zero when absent. Numeric strings are accepted.
fn numeric(row_index: usize, row: &Row, column: &str) -> Result<f64, CatalogError> {
    let not_numeric = |value: &Value| CatalogError::NotNumeric {
        row: row_index,
        column: column.to_string(),
        value: value.to_string(),
    };

    match row.get(column) {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| not_numeric(&Value::Number(n.clone()))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(0.0),
        Some(value @ Value::String(s)) => s.trim().parse::<f64>().map_err(|_| not_numeric(value)),
        Some(other) => Err(not_numeric(other)),
    }
}

/// Text cell, or the empty string when absent. Numbers are kept verbatim.
fn text(row: &Row, column: &str) -> String {
    match row.get(column) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    }
}

fn read_columns(
    row_index: usize,
    row: &Row,
    columns: &[(&str, &str)],
    stats: &mut Attributes,
) -> Result<(), CatalogError> {
    for (column, attribute) in columns {
        stats.insert(*attribute, numeric(row_index, row, column)?);
    }
    Ok(())
}

/// Build one item from a row of a `category` table.
pub fn item_from_row(row_index: usize, row: &Row, category: Category) -> Result<Item, CatalogError> {
    let name = text(row, NAME_COLUMN);
    if name.is_empty() {
        return Err(CatalogError::MissingColumn {
            row: row_index,
            column: NAME_COLUMN,
        });
    }
    if !row.contains_key(FLOOR_PRICE_COLUMN) {
        return Err(CatalogError::MissingColumn {
            row: row_index,
            column: FLOOR_PRICE_COLUMN,
        });
    }
    let floor_price = numeric(row_index, row, FLOOR_PRICE_COLUMN)?;
    if !(floor_price.is_finite() && floor_price > 0.0) {
        return Err(CatalogError::InvalidRow {
            row: row_index,
            reason: format!("'{name}' has non-positive floor price {floor_price}"),
        });
    }

    let mut stats = Attributes::new();
    read_columns(row_index, row, COMMON_COLUMNS, &mut stats)?;
    if category.bats() {
        read_columns(row_index, row, BATTING_COLUMNS, &mut stats)?;
    }
    if category.bowls() {
        read_columns(row_index, row, BOWLING_COLUMNS, &mut stats)?;
    }
    if category == Category::WicketKeeper {
        read_columns(row_index, row, KEEPING_COLUMNS, &mut stats)?;
    }

    let mut item = Item::new(name, category, floor_price).with_stats(stats);
    item.age = item.stats.get_or("age", 0.0).max(0.0) as u32;
    item.nationality = text(row, "Nationality");
    item.text.insert("span".to_string(), text(row, "Span"));
    if category.bats() {
        item.text.insert("high_score".to_string(), text(row, "High Score"));
    }
    Ok(item)
}

/// Rows of a single-category table, e.g. one file per role.
pub fn load_items(rows: &[Row], category: Category) -> Result<Vec<Item>, CatalogError> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| item_from_row(i, row, category))
        .collect()
}

impl Catalog {
    /// Append every row of a single-category table.
    pub fn extend_rows(&mut self, rows: &[Row], category: Category) -> Result<(), CatalogError> {
        for item in load_items(rows, category)? {
            self.insert(item);
        }
        Ok(())
    }

    /// A JSON array of rows, each carrying its category in a `Role` column.
    pub fn from_json(json: &str) -> Result<Catalog, CatalogError> {
        let rows: Vec<Row> = serde_json::from_str(json).map_err(|e| CatalogError::Json(e.to_string()))?;
        Self::from_rows(&rows)
    }

    pub fn from_rows(rows: &[Row]) -> Result<Catalog, CatalogError> {
        let mut catalog = Catalog::new();
        for (i, row) in rows.iter().enumerate() {
            let role = text(row, ROLE_COLUMN);
            if role.is_empty() {
                return Err(CatalogError::MissingColumn {
                    row: i,
                    column: ROLE_COLUMN,
                });
            }
            let category = role
                .parse::<Category>()
                .map_err(|reason| CatalogError::InvalidRow { row: i, reason })?;
            catalog.insert(item_from_row(i, row, category)?);
        }
        Ok(catalog)
    }
}
