//! Rate, rule and catalog configuration for the service.
//!
//! Amounts are never hard-coded in the engines; deployments point
//! `PRICE_TABLE_PATH`, `TIME_RULES_PATH` and `SERVICE_CATALOG_PATH` at JSON
//! files, and a built-in demo configuration covers local runs.

use anyhow::Context;
use booking_flow::{PriceTable, Service, ServiceCatalog, ServiceCategory, TimeRules};
use rust_decimal::Decimal;
use tracing::info;

pub struct ServiceConfig {
    pub price_table: PriceTable,
    pub time_rules: TimeRules,
    pub catalog: ServiceCatalog,
}

pub fn load() -> anyhow::Result<ServiceConfig> {
    let price_table = match std::env::var("PRICE_TABLE_PATH") {
        Ok(path) => read_json(&path).context("loading price table")?,
        Err(_) => {
            info!("PRICE_TABLE_PATH not set, using the demo price table");
            PriceTable::default()
        }
    };

    let time_rules = match std::env::var("TIME_RULES_PATH") {
        Ok(path) => read_json(&path).context("loading time rules")?,
        Err(_) => TimeRules::default(),
    };

    let catalog = match std::env::var("SERVICE_CATALOG_PATH") {
        Ok(path) => {
            let services: Vec<Service> = read_json(&path).context("loading service catalog")?;
            ServiceCatalog::new(services)
                .map_err(|e| anyhow::anyhow!("invalid service catalog: {e}"))?
        }
        Err(_) => {
            info!("SERVICE_CATALOG_PATH not set, using the demo catalog");
            demo_catalog()?
        }
    };

    Ok(ServiceConfig {
        price_table,
        time_rules,
        catalog,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))
}

fn demo_catalog() -> anyhow::Result<ServiceCatalog> {
    let entry = |id: &str, name: &str, category, hours: u32, price: u32, badge: Option<&str>| {
        Service {
            id: id.to_string(),
            name: name.to_string(),
            category,
            base_duration_hours: hours,
            base_price: Decimal::from(price),
            badge: badge.map(str::to_string),
        }
    };
    ServiceCatalog::new(vec![
        entry("full-clean", "Full home clean", ServiceCategory::FullClean, 6, 120, Some("popular")),
        entry("kitchen", "Kitchen clean", ServiceCategory::Kitchen, 2, 50, None),
        entry("bathroom", "Bathroom clean", ServiceCategory::Bathroom, 2, 40, None),
        entry("fridge", "Refrigerator clean", ServiceCategory::Refrigerator, 3, 45, None),
        entry("custom", "Pick your areas", ServiceCategory::Custom, 2, 60, Some("new")),
    ])
    .map_err(|e| anyhow::anyhow!("invalid demo catalog: {e}"))
}
