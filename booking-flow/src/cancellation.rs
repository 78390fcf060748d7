//! The cancellation-fee policy: a pure mapping from cancellation
//! circumstances to a fee decision.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::PriceTable;

/// Recurrence state of a booking at cancellation time, used to pick a fee
/// tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    OneTime,
    Recurring,
    /// A recurring booking whose discount was granted but where fewer than
    /// two sessions were completed before cancellation.
    RecurringSingleCompleted,
}

impl SessionKind {
    pub fn classify(is_recurring: bool, completed_sessions: u32) -> Self {
        if !is_recurring {
            SessionKind::OneTime
        } else if completed_sessions < 2 {
            SessionKind::RecurringSingleCompleted
        } else {
            SessionKind::Recurring
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeTier {
    /// Same calendar day as the service, customer unreachable past the
    /// 30-minute on-site wait.
    SameDayUnreachable,
    /// Cancelled at or after the notice deadline on the eve of the service.
    LateNotice,
    /// No time-based fee; only the recurring-discount clawback applies.
    DiscountClawback,
    NoFee,
}

/// Outcome of the policy. The engine never performs a charge itself; the
/// caller hands the decision to the payment collaborator when
/// `requires_auto_charge` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeDecision {
    pub fee_amount: Decimal,
    pub tier_applied: FeeTier,
    /// Portion of `fee_amount` that claws back a granted recurring
    /// discount. Charged automatically to the registered payment method.
    pub clawback: Decimal,
    pub requires_auto_charge: bool,
}

/// Circumstances of a cancellation, assembled by the caller from the
/// session and from post-booking facts the core does not track itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationRequest {
    pub cancel_time: NaiveDateTime,
    pub service_time: NaiveDateTime,
    pub kind: SessionKind,
    /// Booking total the percentage tiers apply to.
    pub total: Decimal,
    /// Absolute value of the recurring discount originally granted.
    pub discount_granted: Decimal,
    /// True when the customer could not be reached after the 30-minute
    /// on-site wait.
    pub customer_unreachable: bool,
}

/// Computes the fee owed for a cancellation.
///
/// Tiers are evaluated in order: same-day unreachable, late notice, then
/// the discount clawback, which is independent of the first two and stacks
/// on top of them when both hold.
pub fn compute_cancellation_fee(request: &CancellationRequest, table: &PriceTable) -> FeeDecision {
    let same_day = request.cancel_time.date() == request.service_time.date();
    let notice_deadline = request
        .service_time
        .date()
        .pred_opt()
        .map(|eve| eve.and_time(table.late_notice_after));

    let time_tier = if same_day && request.customer_unreachable {
        FeeTier::SameDayUnreachable
    } else if notice_deadline.is_some_and(|deadline| request.cancel_time >= deadline) {
        FeeTier::LateNotice
    } else {
        FeeTier::NoFee
    };

    let time_fee = match time_tier {
        FeeTier::SameDayUnreachable | FeeTier::LateNotice => {
            (table.late_cancel_rate * request.total).round_dp(2)
        }
        _ => Decimal::ZERO,
    };

    let clawback = if request.kind == SessionKind::RecurringSingleCompleted {
        request.discount_granted
    } else {
        Decimal::ZERO
    };

    let tier_applied = match time_tier {
        FeeTier::NoFee if clawback > Decimal::ZERO => FeeTier::DiscountClawback,
        other => other,
    };

    FeeDecision {
        fee_amount: time_fee + clawback,
        tier_applied,
        clawback,
        requires_auto_charge: request.kind == SessionKind::RecurringSingleCompleted,
    }
}
