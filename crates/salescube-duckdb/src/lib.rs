pub mod backend;
pub mod loader;
pub mod queries;
pub mod schema;

pub use backend::DuckDbWarehouse;

/// Re-export the `duckdb` crate so consumers (especially tests) can use
/// `salescube_duckdb::duckdb::params!` without an extra dependency.
pub use duckdb;
