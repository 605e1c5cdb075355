/// Per-connection DuckDB session settings, executed once at open time.
///
/// `memory_limit` is a DuckDB size string such as `"512MB"` or `"1GB"`,
/// read from `Config.duckdb_memory_limit` (env `SALESCUBE_DUCKDB_MEMORY`).
/// An explicit limit is always set — the DuckDB default (80% of system RAM)
/// is not acceptable for a batch tool that may share a host.
/// `SET threads = 2` caps the background thread pool; the warehouse is
/// single-writer and the workload is tiny.
pub fn session_init_sql(memory_limit: &str) -> String {
    format!(
        "SET memory_limit = '{memory_limit}';\n\
         SET threads = 2;"
    )
}

/// Star-schema rebuild DDL.
///
/// The warehouse is a batch artifact: every rebuild drops the previous
/// tables and views wholesale and recreates them. There is no merge, no
/// upsert, and no migration machinery — dimension rows are full-replaced.
/// Views are dropped before their base tables so no dependency is left
/// dangling mid-rebuild.
pub const REBUILD_TABLES_SQL: &str = r#"
DROP VIEW IF EXISTS dq_nulls;
DROP VIEW IF EXISTS dq_negative_qty;
DROP VIEW IF EXISTS v_monthly_kpis;
DROP VIEW IF EXISTS v_top_products;
DROP VIEW IF EXISTS v_category_contribution;

DROP TABLE IF EXISTS fact_sales;
DROP TABLE IF EXISTS dim_product;
DROP TABLE IF EXISTS dim_customer;
DROP TABLE IF EXISTS dim_date;

-- ===========================================
-- DIMENSIONS
-- ===========================================
CREATE TABLE dim_product (
    product_id      INTEGER PRIMARY KEY,
    category        VARCHAR,
    subcategory     VARCHAR,
    price           DOUBLE
);

CREATE TABLE dim_customer (
    customer_id     INTEGER PRIMARY KEY,
    signup_date     DATE,
    city            VARCHAR,
    state           VARCHAR
);

-- One row per distinct order date observed in staging.
CREATE TABLE dim_date (
    date_key        DATE PRIMARY KEY,
    year            INTEGER,
    month           INTEGER,
    day             INTEGER
);

-- ===========================================
-- FACT (one row per order item)
-- ===========================================
-- Order-derived columns are nullable: an order item with no matching
-- order still produces a fact row (left-join semantics, preserved from
-- the source pipeline as a known quirk — dq_nulls surfaces such rows).
CREATE TABLE fact_sales (
    order_id        INTEGER,
    order_date      DATE,
    customer_id     INTEGER,
    product_id      INTEGER,
    quantity        INTEGER,
    unit_price      DOUBLE,
    discount        DOUBLE,
    status          VARCHAR,
    payment_method  VARCHAR,
    revenue         DOUBLE
);
"#;

/// Transient staging tables for the raw order files. TEMPORARY: they live
/// in the session, never in the durable schema, and are dropped again at
/// the end of the fact derivation.
pub const STAGING_SQL: &str = r#"
DROP TABLE IF EXISTS stg_orders;
DROP TABLE IF EXISTS stg_order_items;

CREATE TEMPORARY TABLE stg_orders (
    order_id        INTEGER,
    customer_id     INTEGER,
    order_date      DATE,
    status          VARCHAR,
    payment_method  VARCHAR
);

CREATE TEMPORARY TABLE stg_order_items (
    order_id        INTEGER,
    product_id      INTEGER,
    quantity        INTEGER,
    unit_price      DOUBLE,
    discount        DOUBLE
);
"#;

/// Declarative derivation of `dim_date` and `fact_sales` from staging.
///
/// revenue = quantity * unit_price * (1 - discount), with an absent
/// discount coalesced to 0. The LEFT JOIN keeps orphan order items:
/// their order-derived columns land as NULL instead of failing the load.
pub const DERIVE_SQL: &str = r#"
INSERT INTO dim_date
SELECT DISTINCT
    order_date AS date_key,
    year(order_date), month(order_date), day(order_date)
FROM stg_orders
WHERE order_date IS NOT NULL
ORDER BY 1;

INSERT INTO fact_sales
SELECT
    i.order_id,
    o.order_date,
    o.customer_id,
    i.product_id,
    i.quantity,
    i.unit_price,
    i.discount,
    o.status,
    o.payment_method,
    i.quantity * i.unit_price * (1 - COALESCE(i.discount, 0)) AS revenue
FROM stg_order_items i
LEFT JOIN stg_orders o USING (order_id);

DROP TABLE IF EXISTS stg_orders;
DROP TABLE IF EXISTS stg_order_items;
"#;

/// The five query views, recreated after every rebuild.
///
/// KPI views restrict to completed/shipped — cancelled orders never count
/// towards revenue. Monetary aggregates are rounded to 2 decimals in SQL
/// so every consumer (dashboard, static export, CLI) sees identical
/// numbers.
pub const VIEWS_SQL: &str = r#"
DROP VIEW IF EXISTS dq_nulls;
DROP VIEW IF EXISTS dq_negative_qty;
DROP VIEW IF EXISTS v_monthly_kpis;
DROP VIEW IF EXISTS v_top_products;
DROP VIEW IF EXISTS v_category_contribution;

CREATE VIEW dq_nulls AS
SELECT * FROM fact_sales
WHERE order_id IS NULL OR customer_id IS NULL OR product_id IS NULL;

CREATE VIEW dq_negative_qty AS
SELECT * FROM fact_sales
WHERE quantity < 0 OR unit_price < 0;

CREATE VIEW v_monthly_kpis AS
SELECT
    strftime(order_date, '%Y-%m')                               AS month,
    COUNT(DISTINCT order_id)                                    AS orders,
    ROUND(SUM(revenue), 2)                                      AS revenue,
    ROUND(SUM(revenue) / NULLIF(COUNT(DISTINCT order_id), 0), 2) AS aov
FROM fact_sales
WHERE status IN ('completed', 'shipped')
GROUP BY 1
ORDER BY 1;

CREATE VIEW v_top_products AS
SELECT
    fs.product_id,
    dp.category,
    dp.subcategory,
    ROUND(SUM(fs.revenue), 2) AS revenue
FROM fact_sales fs
LEFT JOIN dim_product dp ON dp.product_id = fs.product_id
WHERE fs.status IN ('completed', 'shipped')
GROUP BY 1, 2, 3
ORDER BY revenue DESC
LIMIT 10;

CREATE VIEW v_category_contribution AS
SELECT
    dp.category,
    ROUND(SUM(fs.revenue), 2) AS revenue,
    ROUND(100.0 * SUM(fs.revenue) /
          (SELECT SUM(revenue) FROM fact_sales
           WHERE status IN ('completed', 'shipped')), 2) AS pct
FROM fact_sales fs
JOIN dim_product dp ON dp.product_id = fs.product_id
WHERE fs.status IN ('completed', 'shipped')
GROUP BY dp.category
ORDER BY revenue DESC;
"#;
