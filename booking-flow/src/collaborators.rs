//! Contracts for the external systems the booking core talks to, with
//! in-memory implementations for tests and demos.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::session::BookingSession;

/// Reservation persistence. Called exactly once per session, from the
/// terminal payment transition.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn create_reservation(&self, session: &BookingSession) -> Result<String>;
}

/// Optional address pre-check before the flow moves on to scheduling.
#[async_trait]
pub trait AddressVerifier: Send + Sync {
    async fn validate_address(&self, street: &str, detail: &str) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeOutcome {
    Charged,
    Declined,
}

/// Charges a cancellation penalty to a registered payment method. Invoked
/// only when a fee decision requires an automatic charge.
#[async_trait]
pub trait PenaltyCharger: Send + Sync {
    async fn charge_penalty(&self, payment_method_id: &str, amount: Decimal)
    -> Result<ChargeOutcome>;
}

/// In-memory [`ReservationStore`] keeping a snapshot of every confirmed
/// session.
pub struct InMemoryReservationStore {
    reservations: Arc<DashMap<String, BookingSession>>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self {
            reservations: Arc::new(DashMap::new()),
        }
    }

    pub fn get(&self, reservation_id: &str) -> Option<BookingSession> {
        self.reservations
            .get(reservation_id)
            .map(|entry| entry.clone())
    }

    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }
}

impl Default for InMemoryReservationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn create_reservation(&self, session: &BookingSession) -> Result<String> {
        let reservation_id = Uuid::new_v4().to_string();
        self.reservations
            .insert(reservation_id.clone(), session.clone());
        Ok(reservation_id)
    }
}

/// [`AddressVerifier`] that accepts every address; stands in for the real
/// address service in demos.
pub struct AlwaysValidAddresses;

#[async_trait]
impl AddressVerifier for AlwaysValidAddresses {
    async fn validate_address(&self, _street: &str, _detail: &str) -> Result<bool> {
        Ok(true)
    }
}

/// [`PenaltyCharger`] that records charges instead of performing them.
pub struct RecordingPenaltyCharger {
    charges: Arc<DashMap<String, Vec<Decimal>>>,
}

impl RecordingPenaltyCharger {
    pub fn new() -> Self {
        Self {
            charges: Arc::new(DashMap::new()),
        }
    }

    pub fn charges_for(&self, payment_method_id: &str) -> Vec<Decimal> {
        self.charges
            .get(payment_method_id)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }
}

impl Default for RecordingPenaltyCharger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PenaltyCharger for RecordingPenaltyCharger {
    async fn charge_penalty(
        &self,
        payment_method_id: &str,
        amount: Decimal,
    ) -> Result<ChargeOutcome> {
        self.charges
            .entry(payment_method_id.to_string())
            .or_default()
            .push(amount);
        Ok(ChargeOutcome::Charged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn reservation_store_snapshots_the_session() {
        let store = InMemoryReservationStore::new();
        let session = BookingSession::with_id("s1");
        let reservation_id = store.create_reservation(&session).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&reservation_id), Some(session));
    }

    #[tokio::test]
    async fn penalty_charger_records_per_payment_method() {
        let charger = RecordingPenaltyCharger::new();
        charger.charge_penalty("pm-1", dec!(12.50)).await.unwrap();
        charger.charge_penalty("pm-1", dec!(3)).await.unwrap();

        assert_eq!(charger.charges_for("pm-1"), vec![dec!(12.50), dec!(3)]);
        assert!(charger.charges_for("pm-2").is_empty());
    }
}
