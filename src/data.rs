use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Read;

use crate::error::CompileError;

/// A parsed spreadsheet as handed over by the parsing service.
///
/// Serialises to the service's wire shape `{ columns, data, data_types }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TabularDataset {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default, rename = "data")]
    pub rows: Vec<Vec<Value>>,
    /// Raw type tags (`"string"`, `"category"`, `"numeric"`) keyed by column.
    #[serde(default, rename = "data_types")]
    pub column_types: BTreeMap<String, String>,
}

impl TabularDataset {
    pub fn new(
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
        column_types: BTreeMap<String, String>,
    ) -> Self {
        let mut dataset = Self {
            columns,
            rows,
            column_types,
        };
        dataset.normalize_rows();
        dataset
    }

    /// Create a dataset from the parsing service's JSON payload
    pub fn from_json(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(anyhow!("Dataset must be a JSON object with columns/data/data_types"));
        }
        let mut dataset: TabularDataset =
            serde_json::from_value(value.clone()).context("Malformed dataset payload")?;
        dataset.normalize_rows();
        Ok(dataset)
    }

    /// Read a CSV with a header row, inferring a type tag per column.
    ///
    /// A column is tagged `numeric` when every non-empty cell parses as a
    /// number, otherwise `string`.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = csv_reader
            .headers()
            .context("Failed to read CSV headers")?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut raw_rows = Vec::new();
        for (idx, record) in csv_reader.records().enumerate() {
            let record = record.with_context(|| format!("Failed to read CSV record {}", idx + 1))?;
            raw_rows.push(record.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        }

        let mut column_types = BTreeMap::new();
        for (col_idx, name) in columns.iter().enumerate() {
            let numeric = raw_rows
                .iter()
                .filter_map(|row| row.get(col_idx))
                .filter(|cell| !cell.is_empty())
                .all(|cell| cell.parse::<f64>().is_ok());
            let tag = if numeric { "numeric" } else { "string" };
            column_types.insert(name.clone(), tag.to_string());
        }

        let rows = raw_rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .enumerate()
                    .map(|(col_idx, cell)| {
                        let numeric = columns
                            .get(col_idx)
                            .and_then(|c| column_types.get(c))
                            .is_some_and(|t| t == "numeric");
                        csv_cell_to_value(cell, numeric)
                    })
                    .collect()
            })
            .collect();

        Ok(Self::new(columns, rows, column_types))
    }

    /// Fixed six-month sample used when a real dataset is unusable
    pub fn mock() -> Self {
        let months = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];
        let sales = [120, 190, 300, 240, 280, 320];
        let growth = [5.0, 12.5, 18.0, 9.5, 14.0, 16.5];

        let rows = months
            .iter()
            .zip(sales.iter())
            .zip(growth.iter())
            .map(|((m, s), g)| vec![Value::from(*m), Value::from(*s), Value::from(*g)])
            .collect();

        let column_types = BTreeMap::from([
            ("month".to_string(), "string".to_string()),
            ("sales".to_string(), "numeric".to_string()),
            ("growth".to_string(), "numeric".to_string()),
        ]);

        Self {
            columns: vec!["month".into(), "sales".into(), "growth".into()],
            rows,
            column_types,
        }
    }

    /// Check that the dataset has columns. A header-only sheet is valid and
    /// compiles to empty series.
    pub fn check_shape(&self) -> Result<(), CompileError> {
        if self.columns.is_empty() {
            return Err(CompileError::DataShape("columns"));
        }
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Column-wise view: the ordered values of one column
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).unwrap_or(&Value::Null))
                .collect(),
        )
    }

    /// Display strings of one column, used for category labels
    pub fn column_labels(&self, name: &str) -> Vec<String> {
        self.column(name)
            .map(|values| values.into_iter().map(cell_label).collect())
            .unwrap_or_default()
    }

    fn normalize_rows(&mut self) {
        let width = self.columns.len();
        for (idx, row) in self.rows.iter_mut().enumerate() {
            if row.len() != width {
                log::debug!(
                    "row {} has {} values, expected {}; reshaping",
                    idx,
                    row.len(),
                    width
                );
                row.resize(width, Value::Null);
            }
        }
    }
}

/// Render a cell as label text
pub fn cell_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn csv_cell_to_value(cell: String, numeric: bool) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if numeric {
        if let Ok(i) = cell.parse::<i64>() {
            return Value::from(i);
        }
        if let Some(n) = cell.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
            return Value::Number(n);
        }
    }
    Value::String(cell)
}
