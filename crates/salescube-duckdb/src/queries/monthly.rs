use anyhow::Result;

use salescube_core::views::MonthlyKpiRow;

use crate::DuckDbWarehouse;

/// Read `v_monthly_kpis` in month order. Cancelled orders never appear:
/// the view restricts to completed/shipped before grouping.
pub async fn monthly_kpis(db: &DuckDbWarehouse) -> Result<Vec<MonthlyKpiRow>> {
    let conn = db.conn.lock().await;
    let mut stmt = conn.prepare("SELECT month, orders, revenue, aov FROM v_monthly_kpis")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(MonthlyKpiRow {
                month: row.get(0)?,
                orders: row.get(1)?,
                revenue: row.get(2)?,
                aov: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

impl DuckDbWarehouse {
    pub async fn monthly_kpis(&self) -> Result<Vec<MonthlyKpiRow>> {
        monthly_kpis(self).await
    }
}
