//! The step state machine driving one booking attempt.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::catalog::ServiceCatalog;
use crate::collaborators::{AddressVerifier, ReservationStore};
use crate::constraints::{TimeConstraintValidator, TimeRules};
use crate::error::{BookingError, Result};
use crate::pricing::{self, PriceTable};
use crate::session::{AdditionalServices, Address, BookingSession, Customization, Schedule, Step};

/// Input for the current step, merged into the session on a successful
/// `advance`. The variant must match the step the session is at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "input", rename_all = "snake_case")]
pub enum StepInput {
    SelectService {
        service_id: String,
    },
    KitchenDetails {
        hood_cleaning: bool,
    },
    ToiletDetails {
        count: u8,
    },
    RefrigeratorDetails {
        count: u8,
    },
    CustomDetails {
        kitchen: bool,
        toilet_count: Option<u8>,
        fridge_count: Option<u8>,
    },
    Address {
        street: String,
        detail: String,
    },
    Schedule {
        schedule: Schedule,
        area_sqm: u32,
    },
    ConfirmReview {
        #[serde(default)]
        additional_services: Option<AdditionalServices>,
    },
    AcknowledgePolicy {
        acknowledged: bool,
    },
    Pay {
        payment_method_id: String,
    },
}

impl StepInput {
    fn label(&self) -> &'static str {
        match self {
            StepInput::SelectService { .. } => "select_service",
            StepInput::KitchenDetails { .. } => "kitchen_details",
            StepInput::ToiletDetails { .. } => "toilet_details",
            StepInput::RefrigeratorDetails { .. } => "refrigerator_details",
            StepInput::CustomDetails { .. } => "custom_details",
            StepInput::Address { .. } => "address",
            StepInput::Schedule { .. } => "schedule",
            StepInput::ConfirmReview { .. } => "confirm_review",
            StepInput::AcknowledgePolicy { .. } => "acknowledge_policy",
            StepInput::Pay { .. } => "pay",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    WaitingForInput,
    Completed,
}

/// What a successful command produced: the step the session is now at and
/// an optional message to show the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: Step,
    pub response: Option<String>,
    pub status: FlowStatus,
}

/// Sequences the screens of one booking attempt and owns its
/// [`BookingSession`] until the attempt completes or is abandoned.
///
/// Every rejected command leaves the session exactly as it was; merges are
/// prepared on a scratch copy and only swapped in once the whole
/// transition, price recomputation included, has succeeded.
pub struct BookingStateMachine {
    session: BookingSession,
    catalog: Arc<ServiceCatalog>,
    price_table: Arc<PriceTable>,
    validator: TimeConstraintValidator,
    reservations: Arc<dyn ReservationStore>,
    address_verifier: Option<Arc<dyn AddressVerifier>>,
}

impl BookingStateMachine {
    pub fn new(
        session: BookingSession,
        catalog: Arc<ServiceCatalog>,
        price_table: Arc<PriceTable>,
        time_rules: TimeRules,
        reservations: Arc<dyn ReservationStore>,
    ) -> Self {
        Self {
            session,
            catalog,
            price_table,
            validator: TimeConstraintValidator::new(time_rules),
            reservations,
            address_verifier: None,
        }
    }

    /// Enables the optional address pre-check before scheduling.
    pub fn with_address_verifier(mut self, verifier: Arc<dyn AddressVerifier>) -> Self {
        self.address_verifier = Some(verifier);
        self
    }

    pub fn session(&self) -> &BookingSession {
        &self.session
    }

    pub fn into_session(self) -> BookingSession {
        self.session
    }

    /// Validates `input` against the current step, merges it and moves to
    /// the next step. The terminal transition submits the reservation to
    /// the external store.
    pub async fn advance(&mut self, input: StepInput) -> Result<StepOutcome> {
        let step = self.session.current_step;
        if step == Step::Complete {
            error!(session_id = %self.session.id, "advance called on a completed booking");
            return Err(BookingError::TerminalState);
        }

        match (step, input) {
            (Step::ServiceSelection, StepInput::SelectService { service_id }) => {
                let service = self
                    .catalog
                    .get(&service_id)
                    .cloned()
                    .ok_or(BookingError::UnknownService(service_id))?;
                let next = service.category.detail_step();
                let service_changed = self
                    .session
                    .service
                    .as_ref()
                    .is_some_and(|old| old.id != service.id);
                self.apply(next, move |session| {
                    if service_changed {
                        session.customization = None;
                    }
                    session.service = Some(service);
                })
            }

            (Step::KitchenDetails, StepInput::KitchenDetails { hood_cleaning }) => {
                self.apply(Step::Address, move |session| {
                    session.customization = Some(Customization::Kitchen { hood_cleaning });
                })
            }

            (Step::ToiletDetails, StepInput::ToiletDetails { count }) => {
                pricing::toilet_hours(count)?;
                self.apply(Step::Address, move |session| {
                    session.customization = Some(Customization::Toilets { count });
                })
            }

            (Step::RefrigeratorDetails, StepInput::RefrigeratorDetails { count }) => {
                pricing::fridge_hours(count)?;
                self.apply(Step::Address, move |session| {
                    session.customization = Some(Customization::Refrigerator { count });
                })
            }

            (
                Step::CustomDetails,
                StepInput::CustomDetails {
                    kitchen,
                    toilet_count,
                    fridge_count,
                },
            ) => {
                if !kitchen && toilet_count.is_none() && fridge_count.is_none() {
                    return Err(BookingError::Validation {
                        step,
                        reason: "at least one area must be selected".to_string(),
                    });
                }
                if let Some(count) = toilet_count {
                    pricing::toilet_hours(count)?;
                }
                if let Some(count) = fridge_count {
                    pricing::fridge_hours(count)?;
                }
                self.apply(Step::Address, move |session| {
                    session.customization = Some(Customization::Areas {
                        kitchen,
                        toilet_count,
                        fridge_count,
                    });
                })
            }

            (Step::Address, StepInput::Address { street, detail }) => {
                let street = street.trim().to_string();
                let detail = detail.trim().to_string();
                if street.is_empty() || detail.is_empty() {
                    return Err(BookingError::Validation {
                        step,
                        reason: "street and detail are both required".to_string(),
                    });
                }
                if let Some(verifier) = &self.address_verifier {
                    if !verifier.validate_address(&street, &detail).await? {
                        return Err(BookingError::Validation {
                            step,
                            reason: "address could not be verified".to_string(),
                        });
                    }
                }
                self.apply(Step::DateTimeSelection, move |session| {
                    session.address = Some(Address { street, detail });
                })
            }

            (Step::DateTimeSelection, StepInput::Schedule { schedule, area_sqm }) => {
                let service = self.session.service.as_ref().ok_or_else(|| {
                    BookingError::Validation {
                        step,
                        reason: "no service selected".to_string(),
                    }
                })?;
                if schedule.date_count() == 0 {
                    return Err(BookingError::Validation {
                        step,
                        reason: "at least one date must be selected".to_string(),
                    });
                }
                let duration_hours = pricing::service_duration_hours(
                    service.base_duration_hours,
                    self.session.customization.as_ref(),
                )?;
                // rejection surfaces as a dialog; schedule stays unset
                self.validator
                    .validate(schedule.start_time(), duration_hours, area_sqm)?;
                self.apply(Step::ReviewInfo, move |session| {
                    session.schedule = Some(schedule);
                    session.area_sqm = Some(area_sqm);
                })
            }

            (
                Step::ReviewInfo,
                StepInput::ConfirmReview {
                    additional_services,
                },
            ) => self.apply(Step::CancellationPolicy, move |session| {
                if let Some(flags) = additional_services {
                    session.additional_services = flags;
                }
            }),

            (Step::CancellationPolicy, StepInput::AcknowledgePolicy { acknowledged }) => {
                if !acknowledged {
                    return Err(BookingError::Validation {
                        step,
                        reason: "the cancellation terms must be acknowledged".to_string(),
                    });
                }
                self.apply(Step::Payment, |session| {
                    session.cancellation_ack = true;
                })
            }

            (Step::Payment, StepInput::Pay { payment_method_id }) => {
                let payment_method_id = payment_method_id.trim().to_string();
                if payment_method_id.is_empty() {
                    return Err(BookingError::Validation {
                        step,
                        reason: "a payment method is required".to_string(),
                    });
                }
                // submitted at most once: success is terminal, failure
                // leaves the session at this step for a clean resubmit
                let reservation_id = self.reservations.create_reservation(&self.session).await?;
                info!(
                    session_id = %self.session.id,
                    reservation_id = %reservation_id,
                    "reservation created"
                );
                self.apply(Step::Complete, move |session| {
                    session.payment_method_id = Some(payment_method_id);
                    session.reservation_id = Some(reservation_id);
                })
            }

            (step, input) => Err(BookingError::Validation {
                step,
                reason: format!("unexpected input {} for this step", input.label()),
            }),
        }
    }

    /// Returns to the previous step. Data entered for steps still ahead is
    /// kept so the user does not re-type it on the way forward again.
    pub fn retreat(&mut self) -> Result<Step> {
        if self.session.current_step == Step::Complete {
            error!(session_id = %self.session.id, "retreat called on a completed booking");
            return Err(BookingError::TerminalState);
        }
        let previous = self.session.step_history.pop().ok_or_else(|| {
            error!(session_id = %self.session.id, "retreat called at the first step");
            BookingError::NoHistory
        })?;
        info!(
            session_id = %self.session.id,
            from = %self.session.current_step,
            to = %previous,
            "step retreated"
        );
        self.session.current_step = previous;
        Ok(previous)
    }

    /// Merges on a scratch copy, recomputes the price, then swaps the
    /// session in one move so failures cannot leave it half-updated.
    fn apply(
        &mut self,
        next: Step,
        merge: impl FnOnce(&mut BookingSession),
    ) -> Result<StepOutcome> {
        let mut updated = self.session.clone();
        merge(&mut updated);
        updated.step_history.push(updated.current_step);
        updated.current_step = next;
        updated.price_breakdown = pricing::compute_price(&updated, &self.price_table)?;

        info!(
            session_id = %updated.id,
            from = %self.session.current_step,
            to = %next,
            total = %updated.price_breakdown.total,
            "step advanced"
        );
        self.session = updated;
        Ok(self.outcome())
    }

    fn outcome(&self) -> StepOutcome {
        let step = self.session.current_step;
        let response = match step {
            Step::ReviewInfo => Some(self.review_summary()),
            Step::CancellationPolicy => Some(self.policy_text()),
            Step::Complete => self.session.reservation_id.as_ref().map(|reservation_id| {
                format!("Booking confirmed. Reservation {reservation_id}.")
            }),
            _ => None,
        };
        StepOutcome {
            step,
            response,
            status: if step == Step::Complete {
                FlowStatus::Completed
            } else {
                FlowStatus::WaitingForInput
            },
        }
    }

    fn review_summary(&self) -> String {
        let session = &self.session;
        let service = session
            .service
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or("-");
        let address = session
            .address
            .as_ref()
            .map(|a| format!("{} {}", a.street, a.detail))
            .unwrap_or_else(|| "-".to_string());
        let schedule = session
            .schedule
            .as_ref()
            .map(Schedule::summary)
            .unwrap_or_else(|| "-".to_string());
        format!(
            "Service: {service}\nAddress: {address}\nSchedule: {schedule}\nTotal: {}",
            session.price_breakdown.total
        )
    }

    fn policy_text(&self) -> String {
        let percent = (self.price_table.late_cancel_rate * Decimal::from(100)).normalize();
        format!(
            "Cancellations on the service day with no contact after a 30 minute wait, \
             or after {} on the day before, are charged {percent}% of the total. \
             Recurring discounts are reclaimed if fewer than two sessions complete.",
            self.price_table.late_notice_after
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Service, ServiceCategory};
    use crate::collaborators::InMemoryReservationStore;
    use crate::error::CountKind;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;

    fn catalog() -> Arc<ServiceCatalog> {
        let entry = |id: &str, category, hours, price| Service {
            id: id.to_string(),
            name: id.to_string(),
            category,
            base_duration_hours: hours,
            base_price: price,
            badge: None,
        };
        Arc::new(
            ServiceCatalog::new(vec![
                entry("full-clean", ServiceCategory::FullClean, 6, dec!(120)),
                entry("kitchen", ServiceCategory::Kitchen, 2, dec!(50)),
                entry("kitchen-deep", ServiceCategory::Kitchen, 3, dec!(70)),
                entry("bathroom", ServiceCategory::Bathroom, 2, dec!(40)),
                entry("fridge", ServiceCategory::Refrigerator, 3, dec!(45)),
                entry("custom", ServiceCategory::Custom, 2, dec!(60)),
            ])
            .unwrap(),
        )
    }

    fn machine() -> BookingStateMachine {
        machine_with_store(Arc::new(InMemoryReservationStore::new()))
    }

    fn machine_with_store(store: Arc<dyn ReservationStore>) -> BookingStateMachine {
        BookingStateMachine::new(
            BookingSession::with_id("s1"),
            catalog(),
            Arc::new(PriceTable::default()),
            TimeRules::default(),
            store,
        )
    }

    fn schedule_input() -> StepInput {
        StepInput::Schedule {
            schedule: Schedule::Single {
                date: NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(),
                time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            },
            area_sqm: 20,
        }
    }

    async fn advance_to_payment(machine: &mut BookingStateMachine) {
        machine
            .advance(StepInput::SelectService {
                service_id: "bathroom".to_string(),
            })
            .await
            .unwrap();
        machine
            .advance(StepInput::ToiletDetails { count: 1 })
            .await
            .unwrap();
        machine
            .advance(StepInput::Address {
                street: "12 Maple Row".to_string(),
                detail: "Apt 3".to_string(),
            })
            .await
            .unwrap();
        machine.advance(schedule_input()).await.unwrap();
        machine
            .advance(StepInput::ConfirmReview {
                additional_services: None,
            })
            .await
            .unwrap();
        machine
            .advance(StepInput::AcknowledgePolicy { acknowledged: true })
            .await
            .unwrap();
        assert_eq!(machine.session().current_step, Step::Payment);
    }

    #[tokio::test]
    async fn kitchen_services_always_route_to_kitchen_details() {
        for id in ["kitchen", "kitchen-deep"] {
            let mut machine = machine();
            let outcome = machine
                .advance(StepInput::SelectService {
                    service_id: id.to_string(),
                })
                .await
                .unwrap();
            assert_eq!(outcome.step, Step::KitchenDetails);
        }
    }

    #[tokio::test]
    async fn full_clean_skips_customization() {
        let mut machine = machine();
        let outcome = machine
            .advance(StepInput::SelectService {
                service_id: "full-clean".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(outcome.step, Step::Address);
    }

    #[tokio::test]
    async fn unknown_service_is_rejected() {
        let mut machine = machine();
        let err = machine
            .advance(StepInput::SelectService {
                service_id: "nope".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::UnknownService(_)));
        assert_eq!(machine.session().current_step, Step::ServiceSelection);
    }

    #[tokio::test]
    async fn mismatched_input_leaves_session_unchanged() {
        let mut machine = machine();
        let before = machine.session().clone();
        let err = machine
            .advance(StepInput::ToiletDetails { count: 2 })
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation { .. }));
        assert_eq!(machine.session(), &before);
    }

    #[tokio::test]
    async fn out_of_range_toilet_count_is_rejected_at_entry() {
        let mut machine = machine();
        machine
            .advance(StepInput::SelectService {
                service_id: "bathroom".to_string(),
            })
            .await
            .unwrap();
        let before = machine.session().clone();
        let err = machine
            .advance(StepInput::ToiletDetails { count: 6 })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BookingError::InvalidCount {
                kind: CountKind::Toilet,
                given: 6,
                ..
            }
        ));
        assert_eq!(machine.session(), &before);
    }

    #[tokio::test]
    async fn custom_details_require_at_least_one_area() {
        let mut machine = machine();
        machine
            .advance(StepInput::SelectService {
                service_id: "custom".to_string(),
            })
            .await
            .unwrap();
        let err = machine
            .advance(StepInput::CustomDetails {
                kitchen: false,
                toilet_count: None,
                fridge_count: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation { .. }));
    }

    #[tokio::test]
    async fn blank_address_fields_are_rejected() {
        let mut machine = machine();
        machine
            .advance(StepInput::SelectService {
                service_id: "full-clean".to_string(),
            })
            .await
            .unwrap();
        let err = machine
            .advance(StepInput::Address {
                street: "  ".to_string(),
                detail: "Apt 3".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation { .. }));
        assert!(machine.session().address.is_none());
    }

    #[tokio::test]
    async fn time_guard_rejects_and_leaves_schedule_unset() {
        let mut machine = machine();
        machine
            .advance(StepInput::SelectService {
                service_id: "full-clean".to_string(),
            })
            .await
            .unwrap();
        machine
            .advance(StepInput::Address {
                street: "12 Maple Row".to_string(),
                detail: "Apt 3".to_string(),
            })
            .await
            .unwrap();

        // full clean runs 6h; 14:30 start would end at 20:30
        let err = machine
            .advance(StepInput::Schedule {
                schedule: Schedule::Single {
                    date: NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(),
                    time: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
                },
                area_sqm: 20,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::TimeConstraint(_)));
        assert!(machine.session().schedule.is_none());
        assert_eq!(machine.session().current_step, Step::DateTimeSelection);
    }

    #[tokio::test]
    async fn review_shows_summary_and_policy_must_be_acknowledged() {
        let mut machine = machine();
        machine
            .advance(StepInput::SelectService {
                service_id: "bathroom".to_string(),
            })
            .await
            .unwrap();
        machine
            .advance(StepInput::ToiletDetails { count: 3 })
            .await
            .unwrap();
        machine
            .advance(StepInput::Address {
                street: "12 Maple Row".to_string(),
                detail: "Apt 3".to_string(),
            })
            .await
            .unwrap();
        let outcome = machine.advance(schedule_input()).await.unwrap();
        assert_eq!(outcome.step, Step::ReviewInfo);
        let summary = outcome.response.unwrap();
        assert!(summary.contains("bathroom"));
        assert!(summary.contains("12 Maple Row"));

        machine
            .advance(StepInput::ConfirmReview {
                additional_services: None,
            })
            .await
            .unwrap();
        let err = machine
            .advance(StepInput::AcknowledgePolicy {
                acknowledged: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation { .. }));
        assert!(!machine.session().cancellation_ack);
    }

    #[tokio::test]
    async fn completed_booking_is_terminal() {
        let store = Arc::new(InMemoryReservationStore::new());
        let mut machine = machine_with_store(store.clone());
        advance_to_payment(&mut machine).await;

        let outcome = machine
            .advance(StepInput::Pay {
                payment_method_id: "pm-1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(outcome.step, Step::Complete);
        assert_eq!(outcome.status, FlowStatus::Completed);
        assert_eq!(store.len(), 1);
        assert!(machine.session().reservation_id.is_some());

        let err = machine
            .advance(StepInput::Pay {
                payment_method_id: "pm-1".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::TerminalState));
        assert!(matches!(
            machine.retreat().unwrap_err(),
            BookingError::TerminalState
        ));
        // still exactly one reservation
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn retreat_on_fresh_session_fails_and_changes_nothing() {
        let mut machine = machine();
        let before = machine.session().clone();
        assert!(matches!(
            machine.retreat().unwrap_err(),
            BookingError::NoHistory
        ));
        assert_eq!(machine.session(), &before);
    }

    #[tokio::test]
    async fn retreat_keeps_data_entered_for_steps_ahead() {
        let mut machine = machine();
        machine
            .advance(StepInput::SelectService {
                service_id: "bathroom".to_string(),
            })
            .await
            .unwrap();
        machine
            .advance(StepInput::ToiletDetails { count: 2 })
            .await
            .unwrap();

        assert_eq!(machine.retreat().unwrap(), Step::ToiletDetails);
        assert_eq!(
            machine.session().customization,
            Some(Customization::Toilets { count: 2 })
        );

        // re-selecting the same service keeps the customization
        assert_eq!(machine.retreat().unwrap(), Step::ServiceSelection);
        machine
            .advance(StepInput::SelectService {
                service_id: "bathroom".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(
            machine.session().customization,
            Some(Customization::Toilets { count: 2 })
        );
    }

    #[tokio::test]
    async fn switching_services_drops_the_old_customization() {
        let mut machine = machine();
        machine
            .advance(StepInput::SelectService {
                service_id: "bathroom".to_string(),
            })
            .await
            .unwrap();
        machine
            .advance(StepInput::ToiletDetails { count: 2 })
            .await
            .unwrap();
        machine.retreat().unwrap();
        machine.retreat().unwrap();

        machine
            .advance(StepInput::SelectService {
                service_id: "fridge".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(machine.session().customization, None);
    }

    struct FailingReservationStore;

    #[async_trait::async_trait]
    impl ReservationStore for FailingReservationStore {
        async fn create_reservation(&self, _session: &BookingSession) -> crate::Result<String> {
            Err(BookingError::Persistence("store offline".to_string()))
        }
    }

    #[tokio::test]
    async fn persistence_failure_keeps_the_session_resubmittable() {
        let mut machine = machine_with_store(Arc::new(FailingReservationStore));
        advance_to_payment(&mut machine).await;
        let before = machine.session().clone();

        let err = machine
            .advance(StepInput::Pay {
                payment_method_id: "pm-1".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Persistence(_)));
        assert_eq!(machine.session(), &before);

        // same session, working store: the resubmit succeeds
        let store = Arc::new(InMemoryReservationStore::new());
        let mut retry = BookingStateMachine::new(
            machine.into_session(),
            catalog(),
            Arc::new(PriceTable::default()),
            TimeRules::default(),
            store.clone(),
        );
        let outcome = retry
            .advance(StepInput::Pay {
                payment_method_id: "pm-1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(outcome.step, Step::Complete);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn price_breakdown_tracks_every_merge() {
        let mut machine = machine();
        machine
            .advance(StepInput::SelectService {
                service_id: "bathroom".to_string(),
            })
            .await
            .unwrap();
        let base_only = machine.session().price_breakdown.total;

        machine
            .advance(StepInput::ToiletDetails { count: 3 })
            .await
            .unwrap();
        let with_surcharge = machine.session().price_breakdown.total;
        assert!(with_surcharge > base_only);

        machine
            .advance(StepInput::Address {
                street: "12 Maple Row".to_string(),
                detail: "Apt 3".to_string(),
            })
            .await
            .unwrap();
        machine.advance(schedule_input()).await.unwrap();
        machine
            .advance(StepInput::ConfirmReview {
                additional_services: Some(AdditionalServices {
                    laundry: true,
                    ..AdditionalServices::default()
                }),
            })
            .await
            .unwrap();
        assert!(machine.session().price_breakdown.total > with_surcharge);
        assert!(machine.session().price_breakdown.total >= Decimal::ZERO);
    }
}
