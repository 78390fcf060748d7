//! The pricing engine: a pure derivation from session inputs and rate
//! configuration to a price breakdown.

use std::collections::BTreeMap;

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, CountKind, Result};
use crate::session::{BookingSession, Customization};

/// Optional extras with a fixed price each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Addon {
    Laundry,
    WindowFrame,
    PorchCleaning,
    Ironing,
    HoodCleaning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonPrices {
    pub laundry: Decimal,
    pub window_frame: Decimal,
    pub porch_cleaning: Decimal,
    pub ironing: Decimal,
    pub hood_cleaning: Decimal,
}

impl AddonPrices {
    pub fn price(&self, addon: Addon) -> Decimal {
        match addon {
            Addon::Laundry => self.laundry,
            Addon::WindowFrame => self.window_frame,
            Addon::PorchCleaning => self.porch_cleaning,
            Addon::Ironing => self.ironing,
            Addon::HoodCleaning => self.hood_cleaning,
        }
    }
}

/// Rate configuration for the pricing and cancellation engines.
///
/// All amounts are configuration, loaded from a file in deployments; the
/// defaults exist so demos and tests can run without one. The engines never
/// hard-code an amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTable {
    /// Price of one service hour, applied to count-derived durations.
    pub hourly_rate: Decimal,
    pub addon_prices: AddonPrices,
    /// Share of the subtotal discounted on bookings with two or more dates.
    pub recurring_discount_rate: Decimal,
    /// Share of the booking total charged on a late cancellation.
    pub late_cancel_rate: Decimal,
    /// From this clock time on the eve of a service, cancelling counts as
    /// late notice.
    #[serde(default = "default_late_notice_after")]
    pub late_notice_after: NaiveTime,
}

fn default_late_notice_after() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap()
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            hourly_rate: Decimal::from(15),
            addon_prices: AddonPrices {
                laundry: Decimal::from(9),
                window_frame: Decimal::from(12),
                porch_cleaning: Decimal::from(10),
                ironing: Decimal::from(8),
                hood_cleaning: Decimal::from(20),
            },
            recurring_discount_rate: Decimal::new(10, 2),
            late_cancel_rate: Decimal::new(30, 2),
            late_notice_after: default_late_notice_after(),
        }
    }
}

/// Itemized price of a booking. `recurring_discount` is never positive and
/// `total` never negative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base: Decimal,
    pub addons: BTreeMap<Addon, Decimal>,
    pub count_surcharge: Decimal,
    pub recurring_discount: Decimal,
    pub total: Decimal,
}

impl PriceBreakdown {
    pub fn addons_sum(&self) -> Decimal {
        self.addons.values().copied().sum()
    }
}

/// Hours implied by a toilet count; counts outside 1..=5 are rejected.
pub fn toilet_hours(count: u8) -> Result<u32> {
    match count {
        1..=5 => Ok(u32::from(count) + 1),
        _ => Err(BookingError::InvalidCount {
            kind: CountKind::Toilet,
            given: count,
            min: 1,
            max: 5,
        }),
    }
}

/// Hours implied by a refrigerator count; one fridge takes 3 hours, two
/// take 5, anything else is rejected.
pub fn fridge_hours(count: u8) -> Result<u32> {
    match count {
        1 => Ok(3),
        2 => Ok(5),
        _ => Err(BookingError::InvalidCount {
            kind: CountKind::Fridge,
            given: count,
            min: 1,
            max: 2,
        }),
    }
}

/// Extra hours implied by customization counts. Kitchen work is covered by
/// the service's base duration and contributes none.
pub fn count_hours(customization: &Customization) -> Result<u32> {
    match customization {
        Customization::Kitchen { .. } => Ok(0),
        Customization::Toilets { count } => toilet_hours(*count),
        Customization::Refrigerator { count } => fridge_hours(*count),
        Customization::Areas {
            toilet_count,
            fridge_count,
            ..
        } => {
            let mut hours = 0;
            if let Some(count) = toilet_count {
                hours += toilet_hours(*count)?;
            }
            if let Some(count) = fridge_count {
                hours += fridge_hours(*count)?;
            }
            Ok(hours)
        }
    }
}

/// Total duration of a visit, fed to the time-constraint validator when a
/// slot is chosen.
pub fn service_duration_hours(
    base_duration_hours: u32,
    customization: Option<&Customization>,
) -> Result<u32> {
    match customization {
        None | Some(Customization::Kitchen { .. }) => Ok(base_duration_hours),
        Some(Customization::Toilets { count }) => toilet_hours(*count),
        Some(Customization::Refrigerator { count }) => fridge_hours(*count),
        Some(custom @ Customization::Areas { kitchen, .. }) => {
            let base = if *kitchen { base_duration_hours } else { 0 };
            Ok(base + count_hours(custom)?)
        }
    }
}

/// Derives a [`PriceBreakdown`] from the session's current inputs.
///
/// Pure and idempotent: equal inputs produce an equal breakdown and the
/// session is never mutated. Called on every merge so the breakdown can
/// never go stale. Out-of-range counts are rejected before they reach this
/// engine; it refuses them anyway rather than price nonsense.
pub fn compute_price(session: &BookingSession, table: &PriceTable) -> Result<PriceBreakdown> {
    let Some(service) = session.service.as_ref() else {
        return Ok(PriceBreakdown::default());
    };

    let base = service.base_price;

    let mut addons = BTreeMap::new();
    let flags = &session.additional_services;
    for (enabled, addon) in [
        (flags.laundry, Addon::Laundry),
        (flags.window_frame, Addon::WindowFrame),
        (flags.porch_cleaning, Addon::PorchCleaning),
        (flags.ironing, Addon::Ironing),
    ] {
        if enabled {
            addons.insert(addon, table.addon_prices.price(addon));
        }
    }
    if session
        .customization
        .as_ref()
        .is_some_and(Customization::hood_cleaning)
    {
        addons.insert(Addon::HoodCleaning, table.addon_prices.price(Addon::HoodCleaning));
    }

    let count_surcharge = match session.customization.as_ref() {
        Some(customization) => Decimal::from(count_hours(customization)?) * table.hourly_rate,
        None => Decimal::ZERO,
    };

    let addons_sum: Decimal = addons.values().copied().sum();
    let subtotal = base + addons_sum + count_surcharge;

    let discount_eligible = session
        .schedule
        .as_ref()
        .is_some_and(|schedule| schedule.is_recurring());
    let mut recurring_discount = if discount_eligible {
        -(table.recurring_discount_rate * subtotal)
    } else {
        Decimal::ZERO
    };
    // clamp the discount rather than let the total go negative
    if subtotal + recurring_discount < Decimal::ZERO {
        recurring_discount = -subtotal;
    }

    Ok(PriceBreakdown {
        base,
        addons,
        count_surcharge,
        recurring_discount,
        total: subtotal + recurring_discount,
    })
}
