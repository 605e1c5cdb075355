use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use salescube_core::config::Config;
use salescube_core::export::ExportPayload;
use salescube_duckdb::DuckDbWarehouse;

/// Self-contained dashboard page; fetches `data.json` next to it and
/// renders the KPI cards and the three charts via the Plotly CDN.
const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Re-read the KPI views and write the static snapshot (`data.json` plus
/// `index.html`) into `Config.docs_dir`.
pub async fn write_static_site(cfg: &Config, db: &DuckDbWarehouse) -> Result<()> {
    let monthly = db.monthly_kpis().await?;
    let top_products = db.top_products().await?;
    let category = db.category_contribution().await?;
    let dq = db.dq_issue_counts().await?;

    let payload = ExportPayload::assemble(&monthly, top_products, category, &dq);

    let docs_dir = Path::new(&cfg.docs_dir);
    fs::create_dir_all(docs_dir)
        .with_context(|| format!("failed to create {}", docs_dir.display()))?;
    fs::write(docs_dir.join("data.json"), payload.to_json_pretty()?)?;
    fs::write(docs_dir.join("index.html"), INDEX_HTML)?;

    info!(
        docs_dir = %docs_dir.display(),
        months = payload.monthly.month.len(),
        revenue = payload.kpis.revenue,
        orders = payload.kpis.orders,
        dq_issues = payload.kpis.dq_issues,
        "static snapshot written"
    );
    Ok(())
}
