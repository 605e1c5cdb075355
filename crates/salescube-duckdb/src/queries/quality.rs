use anyhow::Result;

use salescube_core::views::DqCounts;

use crate::DuckDbWarehouse;

/// Row counts of the two data-quality views. `dq_nulls` also catches the
/// left-join quirk: orphan order items land there via their NULL
/// customer_id.
pub async fn dq_issue_counts(db: &DuckDbWarehouse) -> Result<DqCounts> {
    let conn = db.conn.lock().await;
    let nulls: i64 = conn
        .prepare("SELECT COUNT(*) FROM dq_nulls")?
        .query_row([], |row| row.get(0))?;
    let negative_qty: i64 = conn
        .prepare("SELECT COUNT(*) FROM dq_negative_qty")?
        .query_row([], |row| row.get(0))?;
    Ok(DqCounts {
        nulls,
        negative_qty,
    })
}

impl DuckDbWarehouse {
    pub async fn dq_issue_counts(&self) -> Result<DqCounts> {
        dq_issue_counts(self).await
    }
}
