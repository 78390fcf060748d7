//! The service catalog: immutable entries a customer picks from.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, Result};
use crate::session::Step;

/// Routing-relevant category of a catalog entry. The category decides which
/// customization step follows service selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceCategory {
    FullClean,
    Kitchen,
    Bathroom,
    Refrigerator,
    Custom,
}

/// Grouping shown on the selection screen. The three area-specific
/// categories are sold together as partial cleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogGroup {
    FullClean,
    PartialClean,
    Custom,
}

impl ServiceCategory {
    pub fn group(self) -> CatalogGroup {
        match self {
            ServiceCategory::FullClean => CatalogGroup::FullClean,
            ServiceCategory::Custom => CatalogGroup::Custom,
            ServiceCategory::Kitchen | ServiceCategory::Bathroom | ServiceCategory::Refrigerator => {
                CatalogGroup::PartialClean
            }
        }
    }

    /// The customization step a freshly selected service routes to.
    /// Full cleans have nothing to customize and go straight to the address.
    pub fn detail_step(self) -> Step {
        match self {
            ServiceCategory::Kitchen => Step::KitchenDetails,
            ServiceCategory::Bathroom => Step::ToiletDetails,
            ServiceCategory::Refrigerator => Step::RefrigeratorDetails,
            ServiceCategory::Custom => Step::CustomDetails,
            ServiceCategory::FullClean => Step::Address,
        }
    }
}

/// Immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub category: ServiceCategory,
    pub base_duration_hours: u32,
    pub base_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

/// Lookup table of bookable services, in display order. Built through
/// [`ServiceCatalog::new`] so entry invariants always hold.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ServiceCatalog {
    services: Vec<Service>,
}

impl ServiceCatalog {
    /// Builds a catalog, rejecting entries with a zero duration or a
    /// duplicated id.
    pub fn new(services: Vec<Service>) -> Result<Self> {
        for (idx, service) in services.iter().enumerate() {
            if service.base_duration_hours == 0 {
                return Err(BookingError::Validation {
                    step: Step::ServiceSelection,
                    reason: format!("service {} has a zero base duration", service.id),
                });
            }
            if services[..idx].iter().any(|s| s.id == service.id) {
                return Err(BookingError::Validation {
                    step: Step::ServiceSelection,
                    reason: format!("duplicate service id {}", service.id),
                });
            }
        }
        Ok(Self { services })
    }

    pub fn get(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }
}
