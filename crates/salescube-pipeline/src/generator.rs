use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use salescube_core::records::{
    CustomerRecord, OrderItemRecord, OrderRecord, ProductRecord, STATUS_CANCELLED,
    STATUS_COMPLETED, STATUS_SHIPPED,
};

pub const PRODUCT_COUNT: u32 = 50;
pub const CUSTOMER_COUNT: u32 = 400;

/// Order dates and signup dates both start here; signups increment daily,
/// order dates offset uniformly within [0, 270) days.
const ORDER_DATE_SPAN_DAYS: i64 = 270;
const MAX_ORDERS_PER_CUSTOMER: u32 = 5;
const MAX_ITEMS_PER_ORDER: u32 = 6;

const CATEGORIES: [&str; 4] = ["Beverages", "Snacks", "Electronics", "Home"];
const SUBCATEGORIES: [&str; 4] = ["Premium", "Budget", "Organic", "Standard"];
const PAYMENT_METHODS: [&str; 3] = ["UPI", "Card", "COD"];
const CITIES: [(&str, &str); 5] = [
    ("Delhi", "DL"),
    ("Mumbai", "MH"),
    ("Bengaluru", "KA"),
    ("Chandigarh", "PB"),
    ("Jaipur", "RJ"),
];

const DISCOUNT_VALUES: [f64; 4] = [0.0, 0.05, 0.1, 0.2];
const DISCOUNT_WEIGHTS: [f64; 4] = [0.5, 0.2, 0.2, 0.1];
const STATUSES: [&str; 3] = [STATUS_COMPLETED, STATUS_SHIPPED, STATUS_CANCELLED];
const STATUS_WEIGHTS: [f64; 3] = [0.7, 0.2, 0.1];

/// Row counts of one generation run, for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratedCounts {
    pub products: usize,
    pub customers: usize,
    pub orders: usize,
    pub order_items: usize,
}

fn epoch() -> NaiveDate {
    match NaiveDate::from_ymd_opt(2024, 1, 1) {
        Some(d) => d,
        None => unreachable!("static epoch date"),
    }
}

/// Generate the four flat input files into `data_dir`, overwriting any
/// prior versions. Fully deterministic for a given `seed` — two runs with
/// the same seed produce byte-identical files.
pub fn generate(data_dir: &Path, seed: u64) -> Result<GeneratedCounts> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let status_dist = WeightedIndex::new(STATUS_WEIGHTS)?;
    let discount_dist = WeightedIndex::new(DISCOUNT_WEIGHTS)?;

    let products: Vec<ProductRecord> = (1..=PRODUCT_COUNT)
        .map(|product_id| ProductRecord {
            product_id,
            category: CATEGORIES[rng.gen_range(0..CATEGORIES.len())].to_string(),
            subcategory: SUBCATEGORIES[rng.gen_range(0..SUBCATEGORIES.len())].to_string(),
            price: f64::from(rng.gen_range(50..2000)),
        })
        .collect();

    let customers: Vec<CustomerRecord> = (1..=CUSTOMER_COUNT)
        .map(|customer_id| {
            let (city, state) = CITIES[rng.gen_range(0..CITIES.len())];
            CustomerRecord {
                customer_id,
                signup_date: epoch() + Duration::days(i64::from(customer_id) - 1),
                city: city.to_string(),
                state: state.to_string(),
            }
        })
        .collect();

    let mut orders = Vec::new();
    let mut items = Vec::new();
    let mut order_id = 1u32;
    for customer in &customers {
        let n_orders = rng.gen_range(0..MAX_ORDERS_PER_CUSTOMER);
        for _ in 0..n_orders {
            orders.push(OrderRecord {
                order_id,
                customer_id: customer.customer_id,
                order_date: epoch() + Duration::days(rng.gen_range(0..ORDER_DATE_SPAN_DAYS)),
                status: STATUSES[status_dist.sample(&mut rng)].to_string(),
                payment_method: PAYMENT_METHODS[rng.gen_range(0..PAYMENT_METHODS.len())]
                    .to_string(),
            });

            let n_items = rng.gen_range(1..MAX_ITEMS_PER_ORDER);
            for _ in 0..n_items {
                let product = &products[rng.gen_range(0..products.len())];
                items.push(OrderItemRecord {
                    order_id,
                    product_id: product.product_id,
                    quantity: rng.gen_range(1..4),
                    unit_price: product.price,
                    discount: Some(DISCOUNT_VALUES[discount_dist.sample(&mut rng)]),
                });
            }
            order_id += 1;
        }
    }

    write_csv(&data_dir.join("products.csv"), &products)?;
    write_csv(&data_dir.join("customers.csv"), &customers)?;
    write_csv(&data_dir.join("orders.csv"), &orders)?;
    write_csv(&data_dir.join("order_items.csv"), &items)?;

    let counts = GeneratedCounts {
        products: products.len(),
        customers: customers.len(),
        orders: orders.len(),
        order_items: items.len(),
    };
    info!(
        seed,
        products = counts.products,
        customers = counts.customers,
        orders = counts.orders,
        order_items = counts.order_items,
        "synthetic input files written"
    );
    Ok(counts)
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("failed to open {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
