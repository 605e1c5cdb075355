use serde::Serialize;

/// One row of `v_monthly_kpis`. `month` is the `YYYY-MM` truncation of the
/// order date; only completed/shipped rows contribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyKpiRow {
    pub month: String,
    pub orders: i64,
    pub revenue: f64,
    /// NULL-safe average order value; None when the month has no orders.
    pub aov: Option<f64>,
}

/// One row of `v_top_products` (top 10 by revenue, descending).
///
/// category/subcategory are optional because an order item may reference a
/// product that is missing from `dim_product`; the fact row still exists
/// and joins with absent product attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopProductRow {
    pub product_id: i64,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub revenue: f64,
}

/// One row of `v_category_contribution`; `pct` is the category's share of
/// the completed/shipped revenue grand total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShareRow {
    pub category: String,
    pub revenue: f64,
    pub pct: f64,
}

/// Row counts of the two data-quality views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DqCounts {
    pub nulls: i64,
    pub negative_qty: i64,
}

impl DqCounts {
    pub fn total(&self) -> i64 {
        self.nulls + self.negative_qty
    }
}
