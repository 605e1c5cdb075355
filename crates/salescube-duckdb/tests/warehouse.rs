use std::fs;
use std::path::Path;

use salescube_core::table::ScalarValue;
use salescube_duckdb::DuckDbWarehouse;
use tempfile::TempDir;

const PRODUCTS_HEADER: &str = "product_id,category,subcategory,price";
const CUSTOMERS_HEADER: &str = "customer_id,signup_date,city,state";
const ORDERS_HEADER: &str = "order_id,customer_id,order_date,status,payment_method";
const ITEMS_HEADER: &str = "order_id,product_id,quantity,unit_price,discount";

fn write_file(dir: &Path, name: &str, header: &str, rows: &[&str]) {
    let mut body = String::from(header);
    for row in rows {
        body.push('\n');
        body.push_str(row);
    }
    body.push('\n');
    fs::write(dir.join(name), body).expect("write fixture");
}

/// Two products, two customers, two orders (one cancelled), three items.
fn write_small_fixture(dir: &Path) {
    write_file(
        dir,
        "products.csv",
        PRODUCTS_HEADER,
        &["1,Beverages,Premium,100.0", "2,Snacks,Budget,50.0"],
    );
    write_file(
        dir,
        "customers.csv",
        CUSTOMERS_HEADER,
        &["1,2024-01-01,Delhi,DL", "2,2024-01-02,Mumbai,MH"],
    );
    write_file(
        dir,
        "orders.csv",
        ORDERS_HEADER,
        &[
            "1,1,2024-01-15,completed,UPI",
            "2,2,2024-02-10,cancelled,Card",
        ],
    );
    write_file(
        dir,
        "order_items.csv",
        ITEMS_HEADER,
        &[
            "1,1,2,100.0,0.1",
            "1,2,1,50.0,0.0",
            "2,2,3,50.0,0.2",
        ],
    );
}

async fn rebuilt(dir: &Path) -> DuckDbWarehouse {
    let db = DuckDbWarehouse::open_in_memory().expect("open in-memory warehouse");
    db.rebuild(dir).await.expect("rebuild");
    db
}

async fn scalar_i64(db: &DuckDbWarehouse, sql: &str) -> i64 {
    let result = db.query(sql).await.expect("query");
    match result.rows[0][0] {
        ScalarValue::Int(v) => v,
        ref other => panic!("expected int, got {other:?}"),
    }
}

async fn scalar_f64(db: &DuckDbWarehouse, sql: &str) -> f64 {
    let result = db.query(sql).await.expect("query");
    match result.rows[0][0] {
        ScalarValue::Float(v) => v,
        ScalarValue::Int(v) => v as f64,
        ref other => panic!("expected number, got {other:?}"),
    }
}

#[tokio::test]
async fn rebuild_loads_dimensions_fact_and_date_dim() {
    let dir = TempDir::new().expect("tempdir");
    write_small_fixture(dir.path());
    let db = rebuilt(dir.path()).await;

    assert_eq!(scalar_i64(&db, "SELECT COUNT(*) FROM dim_product").await, 2);
    assert_eq!(scalar_i64(&db, "SELECT COUNT(*) FROM dim_customer").await, 2);
    assert_eq!(scalar_i64(&db, "SELECT COUNT(*) FROM fact_sales").await, 3);
    // One dim_date row per distinct order date.
    assert_eq!(scalar_i64(&db, "SELECT COUNT(*) FROM dim_date").await, 2);
    assert_eq!(
        scalar_i64(
            &db,
            "SELECT COUNT(*) FROM dim_date WHERE year = 2024 AND month = 1 AND day = 15"
        )
        .await,
        1
    );
}

#[tokio::test]
async fn revenue_follows_quantity_price_discount_formula() {
    let dir = TempDir::new().expect("tempdir");
    write_small_fixture(dir.path());
    let db = rebuilt(dir.path()).await;

    // 2 * 100 * (1 - 0.1) = 180
    let rev = scalar_f64(
        &db,
        "SELECT revenue FROM fact_sales WHERE order_id = 1 AND product_id = 1",
    )
    .await;
    assert!((rev - 180.0).abs() < 1e-9);

    // Every fact row satisfies the formula with discount coalesced to 0.
    let mismatches = scalar_i64(
        &db,
        "SELECT COUNT(*) FROM fact_sales \
         WHERE abs(revenue - quantity * unit_price * (1 - COALESCE(discount, 0))) > 1e-9",
    )
    .await;
    assert_eq!(mismatches, 0);
}

#[tokio::test]
async fn missing_discount_field_is_treated_as_zero() {
    let dir = TempDir::new().expect("tempdir");
    write_small_fixture(dir.path());
    // Empty trailing field: discount absent for this item.
    write_file(dir.path(), "order_items.csv", ITEMS_HEADER, &["1,1,2,100.0,"]);
    let db = rebuilt(dir.path()).await;

    assert_eq!(
        scalar_i64(&db, "SELECT COUNT(*) FROM fact_sales WHERE discount IS NULL").await,
        1
    );
    let rev = scalar_f64(&db, "SELECT revenue FROM fact_sales").await;
    assert!((rev - 200.0).abs() < 1e-9);
}

#[tokio::test]
async fn monthly_kpis_exclude_cancelled_and_compute_aov() {
    let dir = TempDir::new().expect("tempdir");
    write_small_fixture(dir.path());
    let db = rebuilt(dir.path()).await;

    let rows = db.monthly_kpis().await.expect("monthly kpis");
    // Order 2 is cancelled; only January's completed order survives.
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].month, "2024-01");
    assert_eq!(rows[0].orders, 1);
    assert!((rows[0].revenue - 230.0).abs() < 1e-9);
    assert_eq!(rows[0].aov, Some(230.0));
}

#[tokio::test]
async fn monthly_kpi_aov_is_revenue_over_orders_rounded() {
    let dir = TempDir::new().expect("tempdir");
    write_small_fixture(dir.path());
    write_file(
        dir.path(),
        "orders.csv",
        ORDERS_HEADER,
        &[
            "1,1,2024-03-05,completed,UPI",
            "2,2,2024-03-20,shipped,COD",
            "3,1,2024-03-25,cancelled,Card",
        ],
    );
    write_file(
        dir.path(),
        "order_items.csv",
        ITEMS_HEADER,
        &["1,1,1,100.0,0.0", "2,2,1,33.0,0.0", "3,1,1,999.0,0.0"],
    );
    let db = rebuilt(dir.path()).await;

    let rows = db.monthly_kpis().await.expect("monthly kpis");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].orders, 2);
    assert!((rows[0].revenue - 133.0).abs() < 1e-9);
    // round(133 / 2, 2) = 66.5
    assert_eq!(rows[0].aov, Some(66.5));
}

#[tokio::test]
async fn category_contribution_percentages_sum_to_100() {
    let dir = TempDir::new().expect("tempdir");
    write_small_fixture(dir.path());
    write_file(
        dir.path(),
        "orders.csv",
        ORDERS_HEADER,
        &[
            "1,1,2024-01-15,completed,UPI",
            "2,2,2024-02-10,shipped,Card",
        ],
    );
    let db = rebuilt(dir.path()).await;

    let rows = db.category_contribution().await.expect("category view");
    assert_eq!(rows.len(), 2);
    let pct_sum: f64 = rows.iter().map(|r| r.pct).sum();
    assert!((pct_sum - 100.0).abs() < 0.05, "pct sum {pct_sum}");
    // Ordered by revenue descending.
    assert!(rows[0].revenue >= rows[1].revenue);
}

#[tokio::test]
async fn top_products_caps_at_ten_sorted_descending() {
    let dir = TempDir::new().expect("tempdir");
    let products: Vec<String> = (1..=12)
        .map(|id| format!("{id},Electronics,Standard,{}.0", id * 10))
        .collect();
    let product_refs: Vec<&str> = products.iter().map(String::as_str).collect();
    write_file(dir.path(), "products.csv", PRODUCTS_HEADER, &product_refs);
    write_file(
        dir.path(),
        "customers.csv",
        CUSTOMERS_HEADER,
        &["1,2024-01-01,Delhi,DL"],
    );
    let orders: Vec<String> = (1..=12)
        .map(|id| format!("{id},1,2024-01-{:02},completed,UPI", id))
        .collect();
    let order_refs: Vec<&str> = orders.iter().map(String::as_str).collect();
    write_file(dir.path(), "orders.csv", ORDERS_HEADER, &order_refs);
    let items: Vec<String> = (1..=12)
        .map(|id| format!("{id},{id},1,{}.0,0.0", id * 10))
        .collect();
    let item_refs: Vec<&str> = items.iter().map(String::as_str).collect();
    write_file(dir.path(), "order_items.csv", ITEMS_HEADER, &item_refs);

    let db = rebuilt(dir.path()).await;
    let rows = db.top_products().await.expect("top products");
    assert_eq!(rows.len(), 10);
    for pair in rows.windows(2) {
        assert!(pair[0].revenue >= pair[1].revenue);
    }
    // Highest-priced product leads.
    assert_eq!(rows[0].product_id, 12);
    assert_eq!(rows[0].category.as_deref(), Some("Electronics"));
}

#[tokio::test]
async fn orphan_order_item_keeps_fact_row_with_null_order_fields() {
    let dir = TempDir::new().expect("tempdir");
    write_small_fixture(dir.path());
    write_file(
        dir.path(),
        "order_items.csv",
        ITEMS_HEADER,
        &["1,1,2,100.0,0.0", "999,1,1,100.0,0.0"],
    );
    let db = rebuilt(dir.path()).await;

    // Left-join semantics: the orphan row is loaded, not rejected.
    assert_eq!(scalar_i64(&db, "SELECT COUNT(*) FROM fact_sales").await, 2);
    assert_eq!(
        scalar_i64(
            &db,
            "SELECT COUNT(*) FROM fact_sales \
             WHERE order_id = 999 AND status IS NULL AND customer_id IS NULL"
        )
        .await,
        1
    );
    // It surfaces in dq_nulls via its NULL customer_id.
    let dq = db.dq_issue_counts().await.expect("dq counts");
    assert_eq!(dq.nulls, 1);
    assert_eq!(dq.negative_qty, 0);
}

#[tokio::test]
async fn item_referencing_unknown_product_joins_with_absent_category() {
    let dir = TempDir::new().expect("tempdir");
    write_small_fixture(dir.path());
    write_file(
        dir.path(),
        "order_items.csv",
        ITEMS_HEADER,
        &["1,77,1,100.0,0.0"],
    );
    let db = rebuilt(dir.path()).await;

    let rows = db.top_products().await.expect("top products");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].product_id, 77);
    assert_eq!(rows[0].category, None);
    assert_eq!(rows[0].subcategory, None);
}

#[tokio::test]
async fn negative_quantity_rows_land_in_dq_view() {
    let dir = TempDir::new().expect("tempdir");
    write_small_fixture(dir.path());
    write_file(
        dir.path(),
        "order_items.csv",
        ITEMS_HEADER,
        &["1,1,-2,100.0,0.0", "1,2,1,50.0,0.0"],
    );
    let db = rebuilt(dir.path()).await;

    let dq = db.dq_issue_counts().await.expect("dq counts");
    assert_eq!(dq.negative_qty, 1);
    assert_eq!(dq.total(), 1);
}

#[tokio::test]
async fn uniform_discount_order_revenue_is_price_times_quantity_per_item() {
    let dir = TempDir::new().expect("tempdir");
    write_small_fixture(dir.path());
    // Three items, each quantity 2 at unit price 100 with discount 0.
    write_file(
        dir.path(),
        "order_items.csv",
        ITEMS_HEADER,
        &["1,1,2,100.0,0.0", "1,2,2,100.0,0.0", "1,1,2,100.0,0.0"],
    );
    let db = rebuilt(dir.path()).await;

    let total = scalar_f64(
        &db,
        "SELECT SUM(revenue) FROM fact_sales WHERE order_id = 1",
    )
    .await;
    assert!((total - 600.0).abs() < 1e-9);
}

#[tokio::test]
async fn rebuild_twice_from_same_inputs_is_identical() {
    let dir = TempDir::new().expect("tempdir");
    write_small_fixture(dir.path());
    let db = DuckDbWarehouse::open_in_memory().expect("open in-memory warehouse");

    db.rebuild(dir.path()).await.expect("first rebuild");
    let first = db
        .query("SELECT * FROM fact_sales ORDER BY order_id, product_id, revenue")
        .await
        .expect("query");

    db.rebuild(dir.path()).await.expect("second rebuild");
    let second = db
        .query("SELECT * FROM fact_sales ORDER BY order_id, product_id, revenue")
        .await
        .expect("query");

    assert_eq!(*first, *second);
}

#[tokio::test]
async fn query_cache_is_invalidated_by_rebuild() {
    let dir = TempDir::new().expect("tempdir");
    write_small_fixture(dir.path());
    let db = rebuilt(dir.path()).await;

    let sql = "SELECT COUNT(*) FROM dim_product";
    assert_eq!(scalar_i64(&db, sql).await, 2);
    // Same text again: served from cache, same answer.
    assert_eq!(scalar_i64(&db, sql).await, 2);

    // Grow the dimension and rebuild; the cached entry must not survive.
    write_file(
        dir.path(),
        "products.csv",
        PRODUCTS_HEADER,
        &[
            "1,Beverages,Premium,100.0",
            "2,Snacks,Budget,50.0",
            "3,Home,Organic,75.0",
        ],
    );
    db.rebuild(dir.path()).await.expect("rebuild");
    assert_eq!(scalar_i64(&db, sql).await, 3);
}

#[tokio::test]
async fn query_before_first_rebuild_surfaces_error() {
    let db = DuckDbWarehouse::open_in_memory().expect("open in-memory warehouse");
    let err = db.query("SELECT * FROM v_monthly_kpis").await;
    assert!(err.is_err());
}

#[tokio::test]
async fn ensure_schema_rebuilds_once_then_skips() {
    let dir = TempDir::new().expect("tempdir");
    write_small_fixture(dir.path());
    let db = DuckDbWarehouse::open_in_memory().expect("open in-memory warehouse");

    assert!(!db.has_schema().await);
    assert!(db.ensure_schema(dir.path()).await.expect("ensure"));
    assert!(db.has_schema().await);
    assert!(!db.ensure_schema(dir.path()).await.expect("ensure again"));
}

#[tokio::test]
async fn malformed_input_aborts_the_rebuild() {
    let dir = TempDir::new().expect("tempdir");
    write_small_fixture(dir.path());
    write_file(
        dir.path(),
        "products.csv",
        PRODUCTS_HEADER,
        &["1,Beverages,Premium,not-a-price"],
    );
    let db = DuckDbWarehouse::open_in_memory().expect("open in-memory warehouse");
    let err = db.rebuild(dir.path()).await;
    assert!(err.is_err());
}

#[tokio::test]
async fn missing_input_file_aborts_the_rebuild() {
    let dir = TempDir::new().expect("tempdir");
    write_small_fixture(dir.path());
    fs::remove_file(dir.path().join("orders.csv")).expect("remove fixture");
    let db = DuckDbWarehouse::open_in_memory().expect("open in-memory warehouse");
    let err = db.rebuild(dir.path()).await;
    assert!(err.is_err());
}

#[tokio::test]
async fn seeded_generator_fills_the_star_schema() {
    let dir = TempDir::new().expect("tempdir");
    let counts = salescube_pipeline::generator::generate(dir.path(), 42).expect("generate");
    assert_eq!(counts.products, 50);
    assert_eq!(counts.customers, 400);

    let db = rebuilt(dir.path()).await;
    assert_eq!(scalar_i64(&db, "SELECT COUNT(*) FROM dim_product").await, 50);
    assert_eq!(
        scalar_i64(&db, "SELECT COUNT(*) FROM dim_customer").await,
        400
    );
    let negative = scalar_i64(&db, "SELECT COUNT(*) FROM fact_sales WHERE revenue < 0").await;
    assert_eq!(negative, 0);

    // Generated data is clean: both DQ views are empty.
    let dq = db.dq_issue_counts().await.expect("dq counts");
    assert_eq!(dq.total(), 0);

    let pct_sum: f64 = db
        .category_contribution()
        .await
        .expect("category view")
        .iter()
        .map(|r| r.pct)
        .sum();
    assert!((pct_sum - 100.0).abs() < 0.1, "pct sum {pct_sum}");
}
