//! Plain-text tables and JSON output.

use anyhow::Result;
use serde::Serialize;
use std::fmt;

use stockroom_core::report::ValuationLine;

/// Longest description shown in a table cell.
const DESCRIPTION_WIDTH: usize = 30;

/// Column-aligned text table.
///
/// ```text
/// ID  Name    Price     Qty
/// --  ------  --------  ---
///  1  Laptop  $1200.00   20
/// ```
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    right: Vec<bool>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            right: vec![false; headers.len()],
        }
    }

    /// Right-aligns the given columns (numbers and money).
    pub fn align_right(mut self, columns: &[usize]) -> Self {
        for &col in columns {
            if let Some(flag) = self.right.get_mut(col) {
                *flag = true;
            }
        }
        self
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }
        widths
    }

    fn write_line(
        &self,
        f: &mut fmt::Formatter<'_>,
        cells: &[String],
        widths: &[usize],
    ) -> fmt::Result {
        let mut line = String::new();
        for (i, width) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            if i > 0 {
                line.push_str("  ");
            }
            if self.right[i] {
                line.push_str(&format!("{cell:>width$}"));
            } else {
                line.push_str(&format!("{cell:<width$}"));
            }
        }
        writeln!(f, "{}", line.trim_end())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        self.write_line(f, &self.headers, &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        self.write_line(f, &rule, &widths)?;
        for row in &self.rows {
            self.write_line(f, row, &widths)?;
        }
        Ok(())
    }
}

/// Stock positions with unit price and value.
pub fn valuation_table(lines: &[ValuationLine]) -> Table {
    let mut table =
        Table::new(&["ID", "Product", "Qty", "Unit Price", "Value"]).align_right(&[0, 2, 3, 4]);
    for l in lines {
        table.row(vec![
            l.product_id.to_string(),
            l.product_name.clone(),
            l.quantity.to_string(),
            l.unit_price.to_string(),
            l.total_value.to_string(),
        ]);
    }
    table
}

/// Writes a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints a table, or `empty` when it has no rows.
pub fn print_table(table: &Table, empty: &str) {
    if table.is_empty() {
        println!("{empty}");
    } else {
        print!("{table}");
    }
}

/// Shortens long text to a table-friendly width.
pub fn truncate(text: &str) -> String {
    if text.chars().count() <= DESCRIPTION_WIDTH {
        return text.to_string();
    }
    let head: String = text.chars().take(DESCRIPTION_WIDTH - 3).collect();
    format!("{head}...")
}

/// `-` for missing values.
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
