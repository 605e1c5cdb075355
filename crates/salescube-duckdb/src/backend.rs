use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use duckdb::types::Value;
use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::{debug, info};

use salescube_core::table::{QueryResult, ScalarValue};

use crate::schema::session_init_sql;

/// A DuckDB-backed star-schema warehouse.
///
/// DuckDB is single-writer: the connection sits behind an async mutex so
/// the struct can be cheaply cloned and shared, while the batch rebuild
/// and all reads are serialised through it. There is deliberately no
/// multi-process coordination — the pipeline is specified as a
/// single-process, single-writer batch tool, and the check-then-rebuild
/// sequence in [`DuckDbWarehouse::ensure_schema`] is not safe against
/// concurrent invocations (known limitation, not engineered around).
///
/// Repeated identical queries are served from a process-local cache keyed
/// by the exact query text; [`crate::loader`] clears it on every rebuild.
#[derive(Clone)]
pub struct DuckDbWarehouse {
    pub(crate) conn: Arc<Mutex<Connection>>,
    pub(crate) query_cache: Arc<Mutex<HashMap<String, Arc<QueryResult>>>>,
}

impl DuckDbWarehouse {
    /// Open (or create) the warehouse database file at `path`.
    ///
    /// `memory_limit` is a DuckDB size string such as `"512MB"`; it is read
    /// from `Config.duckdb_memory_limit` at the call site. Opening only
    /// applies session settings — the schema itself is created by
    /// [`DuckDbWarehouse::rebuild`].
    pub fn open(path: &str, memory_limit: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(&session_init_sql(memory_limit))?;
        info!(path, memory_limit, "DuckDB warehouse opened");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            query_cache: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Open an **in-memory** warehouse.
    ///
    /// Intended for tests — data is discarded when the struct is dropped.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&session_init_sql("512MB"))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            query_cache: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Whether the warehouse tables from the last rebuild are present.
    ///
    /// Any failure of the check (store unreachable, catalog query error)
    /// is treated as "schema absent" so the caller falls through to a
    /// rebuild attempt. A deliberate simplification, not a health check.
    pub async fn has_schema(&self) -> bool {
        let conn = self.conn.lock().await;
        let count: std::result::Result<i64, duckdb::Error> = conn
            .prepare(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_name IN ('dim_product', 'dim_customer', 'fact_sales')",
            )
            .and_then(|mut stmt| stmt.query_row([], |row| row.get(0)));
        matches!(count, Ok(n) if n >= 3)
    }

    /// Execute a read-only query and return named columns plus rows.
    ///
    /// Results for identical query text are memoized until the next
    /// rebuild. Execution errors (for example referencing a view before
    /// the first rebuild) surface to the caller.
    pub async fn query(&self, sql: &str) -> Result<Arc<QueryResult>> {
        if let Some(hit) = self.query_cache.lock().await.get(sql) {
            debug!(sql, "query cache hit");
            return Ok(Arc::clone(hit));
        }

        let result = {
            let conn = self.conn.lock().await;
            Arc::new(run_query(&conn, sql)?)
        };
        self.query_cache
            .lock()
            .await
            .insert(sql.to_string(), Arc::clone(&result));
        Ok(result)
    }

    /// Drop all memoized query results. Called by the loader after every
    /// rebuild; exposed for callers that mutate the store out of band.
    pub async fn invalidate_query_cache(&self) {
        self.query_cache.lock().await.clear();
    }
}

fn run_query(conn: &Connection, sql: &str) -> Result<QueryResult> {
    let mut stmt = conn.prepare(sql)?;
    let mut columns: Vec<String> = Vec::new();
    let mut rows_out: Vec<Vec<ScalarValue>> = Vec::new();

    {
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            if columns.is_empty() {
                columns = row
                    .as_ref()
                    .column_names()
                    .into_iter()
                    .map(|c| c.to_string())
                    .collect();
            }
            let mut cells = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                let value: Value = row.get(idx)?;
                cells.push(scalar_from_value(value));
            }
            rows_out.push(cells);
        }
    }

    // Empty result set: column metadata is only available after execution,
    // which `query` above has done by now.
    if columns.is_empty() {
        columns = stmt
            .column_names()
            .into_iter()
            .map(|c| c.to_string())
            .collect();
    }

    Ok(QueryResult {
        columns,
        rows: rows_out,
    })
}

/// Flatten a DuckDB value into the five shapes the presentation layer
/// understands. Dates render as ISO strings; exotic types fall back to
/// their debug rendering rather than failing the whole result set.
fn scalar_from_value(value: Value) -> ScalarValue {
    match value {
        Value::Null => ScalarValue::Null,
        Value::Boolean(b) => ScalarValue::Bool(b),
        Value::TinyInt(v) => ScalarValue::Int(i64::from(v)),
        Value::SmallInt(v) => ScalarValue::Int(i64::from(v)),
        Value::Int(v) => ScalarValue::Int(i64::from(v)),
        Value::BigInt(v) => ScalarValue::Int(v),
        Value::UTinyInt(v) => ScalarValue::Int(i64::from(v)),
        Value::USmallInt(v) => ScalarValue::Int(i64::from(v)),
        Value::UInt(v) => ScalarValue::Int(i64::from(v)),
        Value::UBigInt(v) => match i64::try_from(v) {
            Ok(i) => ScalarValue::Int(i),
            Err(_) => ScalarValue::Text(v.to_string()),
        },
        Value::HugeInt(v) => ScalarValue::Text(v.to_string()),
        Value::Float(v) => ScalarValue::Float(f64::from(v)),
        Value::Double(v) => ScalarValue::Float(v),
        Value::Decimal(v) => ScalarValue::Text(v.to_string()),
        Value::Text(v) => ScalarValue::Text(v),
        Value::Date32(days) => match NaiveDate::from_ymd_opt(1970, 1, 1)
            .and_then(|epoch| epoch.checked_add_signed(chrono::Duration::days(i64::from(days))))
        {
            Some(date) => ScalarValue::Text(date.format("%Y-%m-%d").to_string()),
            None => ScalarValue::Null,
        },
        other => ScalarValue::Text(format!("{other:?}")),
    }
}
