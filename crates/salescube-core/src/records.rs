use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of `products.csv` and of the `dim_product` dimension.
/// Dimensions are full-replaced on every rebuild; rows never mutate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_id: u32,
    pub category: String,
    pub subcategory: String,
    pub price: f64,
}

/// One row of `customers.csv` and of `dim_customer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: u32,
    pub signup_date: NaiveDate,
    pub city: String,
    pub state: String,
}

/// One row of `orders.csv`. Orders are staged only; they survive into the
/// warehouse solely as order-derived columns on `fact_sales`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: u32,
    pub customer_id: u32,
    pub order_date: NaiveDate,
    pub status: String,
    pub payment_method: String,
}

/// One row of `order_items.csv`. `discount` may be absent in the file;
/// revenue derivation treats an absent discount as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemRecord {
    pub order_id: u32,
    pub product_id: u32,
    pub quantity: i32,
    pub unit_price: f64,
    pub discount: Option<f64>,
}

/// The single row written to `api_sample.csv` by the sample fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSampleRecord {
    pub sample_title: String,
}

pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_SHIPPED: &str = "shipped";
pub const STATUS_CANCELLED: &str = "cancelled";

/// Revenue formula shared by the SQL derivation and the tests:
/// quantity x unit_price x (1 - discount), absent discount treated as 0.
pub fn revenue(quantity: i32, unit_price: f64, discount: Option<f64>) -> f64 {
    f64::from(quantity) * unit_price * (1.0 - discount.unwrap_or(0.0))
}
