mod export;

use std::path::Path;

use anyhow::{anyhow, bail, Result};
use tracing::info;

use salescube_core::config::Config;
use salescube_core::table::QueryResult;
use salescube_duckdb::DuckDbWarehouse;

#[tokio::main]
async fn main() -> Result<()> {
    // Structured logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("salescube=info".parse()?),
        )
        .init();

    let cfg = Config::from_env().map_err(|e| anyhow!(e))?;
    std::fs::create_dir_all(&cfg.data_dir)?;
    let db = DuckDbWarehouse::open(&cfg.db_path(), &cfg.duckdb_memory_limit)?;

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        // Full pipeline: regenerate inputs, fetch the sample, rebuild.
        Some("build") => {
            run_build(&cfg, &db).await?;
        }
        Some("export") => {
            ensure_warehouse(&cfg, &db).await?;
            export::write_static_site(&cfg, &db).await?;
        }
        Some("query") => {
            let sql = args
                .get(2)
                .ok_or_else(|| anyhow!("usage: salescube query <sql>"))?;
            ensure_warehouse(&cfg, &db).await?;
            let result = db.query(sql).await?;
            print_table(&result);
        }
        None => {
            ensure_warehouse(&cfg, &db).await?;
            export::write_static_site(&cfg, &db).await?;
        }
        Some(other) => bail!("unknown command: {other} (expected build, export or query)"),
    }
    Ok(())
}

/// Regenerate inputs and rebuild the warehouse wholesale.
///
/// The sample fetch is the one step allowed to fail: it degrades to the
/// fallback title internally, and even a local write failure only logs.
async fn run_build(cfg: &Config, db: &DuckDbWarehouse) -> Result<()> {
    let data_dir = Path::new(&cfg.data_dir);
    salescube_pipeline::generator::generate(data_dir, cfg.seed)?;
    if let Err(e) =
        salescube_pipeline::fetcher::fetch_api_sample(data_dir, &cfg.sample_url, cfg.sample_timeout())
            .await
    {
        tracing::warn!(error = %e, "could not write api sample file, continuing");
    }
    db.rebuild(data_dir).await?;
    Ok(())
}

/// Startup guard: build the warehouse once if its schema is absent.
/// Check-then-act; safe only because a single process runs the pipeline.
async fn ensure_warehouse(cfg: &Config, db: &DuckDbWarehouse) -> Result<()> {
    if db.has_schema().await {
        info!("warehouse schema present");
        return Ok(());
    }
    info!("warehouse schema absent, running full build");
    run_build(cfg, db).await
}

fn print_table(result: &QueryResult) {
    let mut widths: Vec<usize> = result.columns.iter().map(String::len).collect();
    let rendered: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.render()).collect())
        .collect();
    for row in &rendered {
        for (i, cell) in row.iter().enumerate() {
            if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let header: Vec<String> = result
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, &w)| format!("{c:<w$}"))
        .collect();
    println!("{}", header.join(" | "));
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    for row in &rendered {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect();
        println!("{}", line.join(" | "));
    }
    println!("({} rows)", result.rows.len());
}
