use anyhow::Result;

use salescube_core::views::{CategoryShareRow, TopProductRow};

use crate::DuckDbWarehouse;

/// Read `v_top_products`: at most 10 rows, revenue descending.
/// category/subcategory come back as NULL for fact rows whose product is
/// missing from `dim_product` (the view joins LEFT for display).
pub async fn top_products(db: &DuckDbWarehouse) -> Result<Vec<TopProductRow>> {
    let conn = db.conn.lock().await;
    let mut stmt =
        conn.prepare("SELECT product_id, category, subcategory, revenue FROM v_top_products")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(TopProductRow {
                product_id: row.get(0)?,
                category: row.get(1)?,
                subcategory: row.get(2)?,
                revenue: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Read `v_category_contribution`: per-category revenue plus its share of
/// the completed/shipped grand total, revenue descending.
pub async fn category_contribution(db: &DuckDbWarehouse) -> Result<Vec<CategoryShareRow>> {
    let conn = db.conn.lock().await;
    let mut stmt = conn.prepare("SELECT category, revenue, pct FROM v_category_contribution")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(CategoryShareRow {
                category: row.get(0)?,
                revenue: row.get(1)?,
                pct: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

impl DuckDbWarehouse {
    pub async fn top_products(&self) -> Result<Vec<TopProductRow>> {
        top_products(self).await
    }

    pub async fn category_contribution(&self) -> Result<Vec<CategoryShareRow>> {
        category_contribution(self).await
    }
}
