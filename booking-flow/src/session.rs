//! The mutable state of one booking attempt, plus session storage.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Service;
use crate::error::Result;
use crate::pricing::PriceBreakdown;

/// Screens of the booking flow, in the order a one-shot full clean visits
/// them. Which detail step follows service selection depends on the chosen
/// service's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    ServiceSelection,
    KitchenDetails,
    ToiletDetails,
    RefrigeratorDetails,
    CustomDetails,
    Address,
    DateTimeSelection,
    ReviewInfo,
    CancellationPolicy,
    Payment,
    Complete,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::ServiceSelection => "service_selection",
            Step::KitchenDetails => "kitchen_details",
            Step::ToiletDetails => "toilet_details",
            Step::RefrigeratorDetails => "refrigerator_details",
            Step::CustomDetails => "custom_details",
            Step::Address => "address",
            Step::DateTimeSelection => "date_time_selection",
            Step::ReviewInfo => "review_info",
            Step::CancellationPolicy => "cancellation_policy",
            Step::Payment => "payment",
            Step::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Per-service customization, keyed by the service category so a toilet
/// count can never end up attached to a fridge booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Customization {
    Kitchen {
        hood_cleaning: bool,
    },
    Toilets {
        count: u8,
    },
    Refrigerator {
        count: u8,
    },
    /// Custom combination of areas; at least one must be selected.
    Areas {
        kitchen: bool,
        toilet_count: Option<u8>,
        fridge_count: Option<u8>,
    },
}

impl Customization {
    pub fn hood_cleaning(&self) -> bool {
        matches!(self, Customization::Kitchen { hood_cleaning: true })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub detail: String,
}

/// A confirmed slot: one visit, or a recurring series sharing a start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
    Single { date: NaiveDate, time: NaiveTime },
    Recurring { dates: Vec<NaiveDate>, time: NaiveTime },
}

impl Schedule {
    pub fn date_count(&self) -> usize {
        match self {
            Schedule::Single { .. } => 1,
            Schedule::Recurring { dates, .. } => dates.len(),
        }
    }

    pub fn start_time(&self) -> NaiveTime {
        match self {
            Schedule::Single { time, .. } | Schedule::Recurring { time, .. } => *time,
        }
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        match self {
            Schedule::Single { date, .. } => Some(*date),
            Schedule::Recurring { dates, .. } => dates.first().copied(),
        }
    }

    /// A booking is recurring (and discount-eligible) from two dates up.
    pub fn is_recurring(&self) -> bool {
        self.date_count() >= 2
    }

    /// Human-readable summary for the review screen. Recurring series list
    /// at most three dates and fold the rest into an "N more" tail.
    pub fn summary(&self) -> String {
        const SHOWN: usize = 3;
        match self {
            Schedule::Single { date, time } => format!("{date} at {time}"),
            Schedule::Recurring { dates, time } => {
                let shown = dates
                    .iter()
                    .take(SHOWN)
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                if dates.len() > SHOWN {
                    format!("{shown} and {} more at {time}", dates.len() - SHOWN)
                } else {
                    format!("{shown} at {time}")
                }
            }
        }
    }
}

/// Optional extras, all off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditionalServices {
    pub laundry: bool,
    pub window_frame: bool,
    pub porch_cleaning: bool,
    pub ironing: bool,
}

/// Everything entered during one booking attempt.
///
/// Owned exclusively by the state machine for the attempt's lifetime;
/// `price_breakdown` is derived and recomputed on every merge, never edited
/// by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSession {
    pub id: String,
    pub current_step: Step,
    pub step_history: Vec<Step>,
    pub service: Option<Service>,
    pub customization: Option<Customization>,
    pub address: Option<Address>,
    pub area_sqm: Option<u32>,
    pub schedule: Option<Schedule>,
    pub additional_services: AdditionalServices,
    pub cancellation_ack: bool,
    pub price_breakdown: PriceBreakdown,
    pub payment_method_id: Option<String>,
    pub reservation_id: Option<String>,
}

impl BookingSession {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            current_step: Step::ServiceSelection,
            step_history: Vec::new(),
            service: None,
            customization: None,
            address: None,
            area_sqm: None,
            schedule: None,
            additional_services: AdditionalServices::default(),
            cancellation_ack: false,
            price_breakdown: PriceBreakdown::default(),
            payment_method_id: None,
            reservation_id: None,
        }
    }
}

impl Default for BookingSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for storing and retrieving booking sessions between commands.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn save(&self, session: BookingSession) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<BookingSession>>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// In-memory implementation of [`SessionStorage`].
pub struct InMemorySessionStorage {
    sessions: Arc<DashMap<String, BookingSession>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemorySessionStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn save(&self, session: BookingSession) -> Result<()> {
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<BookingSession>> {
        Ok(self.sessions.get(id).map(|entry| entry.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.sessions.remove(id);
        Ok(())
    }
}
