pub mod config;
pub mod error;
pub mod export;
pub mod records;
pub mod table;
pub mod views;
