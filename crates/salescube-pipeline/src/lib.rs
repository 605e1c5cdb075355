pub mod fetcher;
pub mod generator;
