use serde::Serialize;

use crate::error::CoreError;
use crate::views::{CategoryShareRow, DqCounts, MonthlyKpiRow, TopProductRow};

/// Headline numbers for the four KPI cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub revenue: f64,
    pub orders: i64,
    pub aov: f64,
    pub dq_issues: i64,
}

/// Monthly KPI series as parallel arrays, the layout the static page's
/// chart code consumes directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySeries {
    pub month: Vec<String>,
    pub revenue: Vec<f64>,
    pub orders: Vec<i64>,
    pub aov: Vec<Option<f64>>,
}

/// The `data.json` snapshot consumed by the static dashboard page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportPayload {
    pub kpis: Kpis,
    pub monthly: MonthlySeries,
    pub top_products: Vec<TopProductRow>,
    pub category: Vec<CategoryShareRow>,
}

impl ExportPayload {
    /// Assemble the snapshot from the warehouse views. Headline revenue and
    /// order counts are the sums over the monthly KPI rows; aov divides by
    /// max(orders, 1) so an empty warehouse exports 0 rather than NaN.
    pub fn assemble(
        monthly: &[MonthlyKpiRow],
        top_products: Vec<TopProductRow>,
        category: Vec<CategoryShareRow>,
        dq: &DqCounts,
    ) -> Self {
        let revenue: f64 = monthly.iter().map(|m| m.revenue).sum();
        let orders: i64 = monthly.iter().map(|m| m.orders).sum();
        let aov = revenue / orders.max(1) as f64;
        Self {
            kpis: Kpis {
                revenue: round2(revenue),
                orders,
                aov: round2(aov),
                dq_issues: dq.total(),
            },
            monthly: MonthlySeries {
                month: monthly.iter().map(|m| m.month.clone()).collect(),
                revenue: monthly.iter().map(|m| m.revenue).collect(),
                orders: monthly.iter().map(|m| m.orders).collect(),
                aov: monthly.iter().map(|m| m.aov).collect(),
            },
            top_products,
            category,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
