//! FlowRunner: loads a session, applies exactly one booking command, and
//! persists the updated session back to storage.
//!
//! Interactive surfaces (one HTTP request per screen) want exactly this
//! load-execute-save roundtrip; embedders that drive the
//! [`BookingStateMachine`] in a loop can use it directly and save once at
//! the end.

use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cancellation::{self, CancellationRequest, FeeDecision, SessionKind};
use crate::catalog::ServiceCatalog;
use crate::collaborators::{AddressVerifier, PenaltyCharger, ReservationStore};
use crate::constraints::TimeRules;
use crate::error::{BookingError, Result};
use crate::machine::{BookingStateMachine, StepInput, StepOutcome};
use crate::pricing::PriceTable;
use crate::session::{BookingSession, SessionStorage, Step};

/// Facts about a cancellation the core does not track itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CancelRequest {
    pub cancel_time: NaiveDateTime,
    /// Sessions of the booking already carried out.
    #[serde(default)]
    pub completed_sessions: u32,
    /// True when the customer could not be reached after the 30-minute
    /// on-site wait.
    #[serde(default)]
    pub customer_unreachable: bool,
}

/// High-level helper orchestrating the _load → execute → save_ pattern over
/// a [`SessionStorage`].
#[derive(Clone)]
pub struct FlowRunner {
    storage: Arc<dyn SessionStorage>,
    catalog: Arc<ServiceCatalog>,
    price_table: Arc<PriceTable>,
    time_rules: TimeRules,
    reservations: Arc<dyn ReservationStore>,
    address_verifier: Option<Arc<dyn AddressVerifier>>,
    penalty_charger: Arc<dyn PenaltyCharger>,
}

impl FlowRunner {
    pub fn new(
        storage: Arc<dyn SessionStorage>,
        catalog: Arc<ServiceCatalog>,
        price_table: Arc<PriceTable>,
        time_rules: TimeRules,
        reservations: Arc<dyn ReservationStore>,
        penalty_charger: Arc<dyn PenaltyCharger>,
    ) -> Self {
        Self {
            storage,
            catalog,
            price_table,
            time_rules,
            reservations,
            address_verifier: None,
            penalty_charger,
        }
    }

    /// Enables the optional address pre-check before scheduling.
    pub fn with_address_verifier(mut self, verifier: Arc<dyn AddressVerifier>) -> Self {
        self.address_verifier = Some(verifier);
        self
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    /// Starts a new booking attempt and persists the fresh session.
    pub async fn create_session(&self) -> Result<BookingSession> {
        let session = BookingSession::new();
        info!(session_id = %session.id, "booking session created");
        self.storage.save(session.clone()).await?;
        Ok(session)
    }

    pub async fn session(&self, session_id: &str) -> Result<BookingSession> {
        self.storage
            .get(session_id)
            .await?
            .ok_or_else(|| BookingError::SessionNotFound(session_id.to_string()))
    }

    /// Applies one `advance` command and persists the result. On failure
    /// nothing is saved; the stored session keeps its last valid state.
    pub async fn advance(&self, session_id: &str, input: StepInput) -> Result<StepOutcome> {
        let mut machine = self.machine(self.session(session_id).await?);
        let outcome = machine.advance(input).await?;
        self.storage.save(machine.into_session()).await?;
        Ok(outcome)
    }

    /// Applies one `retreat` command and persists the result.
    pub async fn retreat(&self, session_id: &str) -> Result<Step> {
        let mut machine = self.machine(self.session(session_id).await?);
        let step = machine.retreat()?;
        self.storage.save(machine.into_session()).await?;
        Ok(step)
    }

    /// Drops a mid-flow session. Nothing was persisted outside storage, so
    /// abandoning is a plain delete with no rollback protocol.
    pub async fn abandon(&self, session_id: &str) -> Result<()> {
        info!(session_id = %session_id, "booking session abandoned");
        self.storage.delete(session_id).await
    }

    /// Computes the cancellation fee for a confirmed booking and triggers
    /// the automatic penalty charge when the decision calls for one.
    pub async fn cancel(&self, session_id: &str, request: CancelRequest) -> Result<FeeDecision> {
        let session = self.session(session_id).await?;
        let schedule = session.schedule.as_ref().ok_or_else(|| {
            BookingError::Validation {
                step: session.current_step,
                reason: "the booking has no confirmed schedule".to_string(),
            }
        })?;
        let service_date = schedule.first_date().ok_or_else(|| {
            BookingError::Validation {
                step: session.current_step,
                reason: "the booking has no service date".to_string(),
            }
        })?;

        let kind = SessionKind::classify(schedule.is_recurring(), request.completed_sessions);
        let decision = cancellation::compute_cancellation_fee(
            &CancellationRequest {
                cancel_time: request.cancel_time,
                service_time: service_date.and_time(schedule.start_time()),
                kind,
                total: session.price_breakdown.total,
                discount_granted: -session.price_breakdown.recurring_discount,
                customer_unreachable: request.customer_unreachable,
            },
            &self.price_table,
        );
        info!(
            session_id = %session_id,
            tier = ?decision.tier_applied,
            fee = %decision.fee_amount,
            "cancellation fee computed"
        );

        if decision.requires_auto_charge && decision.clawback > Decimal::ZERO {
            let payment_method_id = session.payment_method_id.as_deref().ok_or_else(|| {
                BookingError::Validation {
                    step: session.current_step,
                    reason: "no registered payment method to charge".to_string(),
                }
            })?;
            self.penalty_charger
                .charge_penalty(payment_method_id, decision.clawback)
                .await?;
            info!(
                session_id = %session_id,
                amount = %decision.clawback,
                "discount clawback auto-charged"
            );
        }

        Ok(decision)
    }

    fn machine(&self, session: BookingSession) -> BookingStateMachine {
        let machine = BookingStateMachine::new(
            session,
            self.catalog.clone(),
            self.price_table.clone(),
            self.time_rules.clone(),
            self.reservations.clone(),
        );
        match &self.address_verifier {
            Some(verifier) => machine.with_address_verifier(verifier.clone()),
            None => machine,
        }
    }
}
