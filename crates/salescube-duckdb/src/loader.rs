use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::info;

use salescube_core::records::{CustomerRecord, OrderItemRecord, OrderRecord, ProductRecord};

use crate::schema::{DERIVE_SQL, REBUILD_TABLES_SQL, STAGING_SQL, VIEWS_SQL};
use crate::DuckDbWarehouse;

/// Row counts of a completed rebuild, for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildSummary {
    pub products: usize,
    pub customers: usize,
    pub orders: usize,
    pub order_items: usize,
    pub fact_rows: i64,
    pub date_rows: i64,
}

impl DuckDbWarehouse {
    /// Rebuild the warehouse wholesale from the flat files in `data_dir`.
    ///
    /// One logical batch: drop + recreate the star schema, bulk-insert the
    /// dimension files verbatim, stage the order files in temporary tables,
    /// derive `dim_date` and `fact_sales` in SQL, recreate the five query
    /// views, and invalidate the query cache.
    ///
    /// The loader assumes the input files exist and are well-formed. Any
    /// missing file or parse failure aborts the rebuild with an error —
    /// malformed input is an operator problem, never silently swallowed.
    pub async fn rebuild(&self, data_dir: &Path) -> Result<RebuildSummary> {
        // Parse everything up front so a bad file aborts before the old
        // schema has been dropped.
        let products: Vec<ProductRecord> = read_records(&data_dir.join("products.csv"))?;
        let customers: Vec<CustomerRecord> = read_records(&data_dir.join("customers.csv"))?;
        let orders: Vec<OrderRecord> = read_records(&data_dir.join("orders.csv"))?;
        let items: Vec<OrderItemRecord> = read_records(&data_dir.join("order_items.csv"))?;

        {
            let mut conn = self.conn.lock().await;
            conn.execute_batch(REBUILD_TABLES_SQL)?;

            // Single transaction for all inserts: one fsync instead of N,
            // and a failed rebuild never leaves half-loaded dimensions.
            let tx = conn.transaction()?;

            for p in &products {
                tx.execute(
                    "INSERT INTO dim_product (product_id, category, subcategory, price) \
                     VALUES (?1, ?2, ?3, ?4)",
                    duckdb::params![p.product_id, p.category, p.subcategory, p.price],
                )?;
            }
            for c in &customers {
                tx.execute(
                    "INSERT INTO dim_customer (customer_id, signup_date, city, state) \
                     VALUES (?1, ?2, ?3, ?4)",
                    duckdb::params![
                        c.customer_id,
                        c.signup_date.format("%Y-%m-%d").to_string(),
                        c.city,
                        c.state
                    ],
                )?;
            }

            tx.execute_batch(STAGING_SQL)?;
            for o in &orders {
                tx.execute(
                    "INSERT INTO stg_orders (order_id, customer_id, order_date, status, payment_method) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    duckdb::params![
                        o.order_id,
                        o.customer_id,
                        o.order_date.format("%Y-%m-%d").to_string(),
                        o.status,
                        o.payment_method
                    ],
                )?;
            }
            for i in &items {
                tx.execute(
                    "INSERT INTO stg_order_items (order_id, product_id, quantity, unit_price, discount) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    duckdb::params![i.order_id, i.product_id, i.quantity, i.unit_price, i.discount],
                )?;
            }

            tx.execute_batch(DERIVE_SQL)?;
            tx.commit()?;

            conn.execute_batch(VIEWS_SQL)?;
        }

        self.invalidate_query_cache().await;

        let fact_rows = self.count("fact_sales").await?;
        let date_rows = self.count("dim_date").await?;
        let summary = RebuildSummary {
            products: products.len(),
            customers: customers.len(),
            orders: orders.len(),
            order_items: items.len(),
            fact_rows,
            date_rows,
        };
        info!(
            products = summary.products,
            customers = summary.customers,
            orders = summary.orders,
            order_items = summary.order_items,
            fact_rows = summary.fact_rows,
            "warehouse rebuilt"
        );
        Ok(summary)
    }

    /// Idempotent startup guard: rebuild only when the schema is absent.
    ///
    /// Returns `true` if a rebuild ran. Check-then-act is not safe against
    /// concurrent invocations; only a single interactive process is
    /// expected (see [`DuckDbWarehouse`]).
    pub async fn ensure_schema(&self, data_dir: &Path) -> Result<bool> {
        if self.has_schema().await {
            info!("warehouse schema present, skipping rebuild");
            return Ok(false);
        }
        self.rebuild(data_dir).await?;
        Ok(true)
    }

    async fn count(&self, table: &str) -> Result<i64> {
        let conn = self.conn.lock().await;
        let n = conn
            .prepare(&format!("SELECT COUNT(*) FROM {table}"))?
            .query_row([], |row| row.get(0))?;
        Ok(n)
    }
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .with_context(|| format!("failed to parse {}", path.display()))
}
