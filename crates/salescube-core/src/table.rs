use serde::Serialize;

/// A single cell produced by the query service.
///
/// DuckDB's richer types (timestamps, decimals, lists) are rendered to text
/// by the backend before they reach this enum; the dashboard and the CLI
/// table printer only need these five shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ScalarValue {
    /// Render for the CLI table printer. NULLs print as an empty cell.
    pub fn render(&self) -> String {
        match self {
            ScalarValue::Null => String::new(),
            ScalarValue::Bool(b) => b.to_string(),
            ScalarValue::Int(i) => i.to_string(),
            ScalarValue::Float(f) => f.to_string(),
            ScalarValue::Text(t) => t.clone(),
        }
    }
}

/// Tabular result of a read-only query: named columns plus row-major cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<ScalarValue>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
