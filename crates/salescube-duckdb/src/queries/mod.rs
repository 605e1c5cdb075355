pub mod monthly;
pub mod products;
pub mod quality;
