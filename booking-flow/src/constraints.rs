//! Pure validation of candidate (start time, duration, area) selections.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scheduling rules a candidate time slot must satisfy.
///
/// Loaded as configuration next to the price table; the defaults are the
/// marketplace's standard operating rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeRules {
    /// Latest clock time a service may end.
    pub cutoff: NaiveTime,
    /// Earliest clock time a service may start.
    pub opening: NaiveTime,
    /// Floor area at or above which `large_area_min_hours` applies.
    pub large_area_sqm: u32,
    /// Minimum duration for homes at or above `large_area_sqm`.
    pub large_area_min_hours: u32,
    /// Supported service lengths, inclusive.
    pub min_duration_hours: u32,
    pub max_duration_hours: u32,
}

impl Default for TimeRules {
    fn default() -> Self {
        Self {
            cutoff: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            opening: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            large_area_sqm: 30,
            large_area_min_hours: 4,
            min_duration_hours: 1,
            max_duration_hours: 8,
        }
    }
}

/// Why a candidate selection was rejected.
///
/// Each variant maps 1:1 to a user-facing dialog, so it carries the values
/// the dialog needs for message formatting.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeRejection {
    /// The service would still be running past the daily cutoff.
    #[error("a {duration_hours}h service starting at {start} would end after the {cutoff} cutoff")]
    ExceedsCutoff {
        start: NaiveTime,
        duration_hours: u32,
        cutoff: NaiveTime,
    },

    /// Larger homes need a minimum duration; carries the area so the dialog
    /// can explain which threshold was hit.
    #[error("homes of {area_sqm}m\u{b2} or more require at least {min_hours}h, got {duration_hours}h")]
    BelowMinDuration {
        area_sqm: u32,
        duration_hours: u32,
        min_hours: u32,
    },

    /// Any other duration/time combination the marketplace does not offer.
    #[error("unsupported selection: {duration_hours}h starting at {start}")]
    UnsupportedSelection {
        start: NaiveTime,
        duration_hours: u32,
    },
}

/// Validates candidate time slots against a set of [`TimeRules`].
///
/// Total and side-effect free: callers surface the rejection reason and
/// re-prompt; the session's schedule is left untouched on rejection.
#[derive(Debug, Clone, Default)]
pub struct TimeConstraintValidator {
    rules: TimeRules,
}

impl TimeConstraintValidator {
    pub fn new(rules: TimeRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &TimeRules {
        &self.rules
    }

    pub fn validate(
        &self,
        start: NaiveTime,
        duration_hours: u32,
        area_sqm: u32,
    ) -> Result<(), TimeRejection> {
        let rules = &self.rules;

        if duration_hours < rules.min_duration_hours
            || duration_hours > rules.max_duration_hours
            || start < rules.opening
        {
            return Err(TimeRejection::UnsupportedSelection {
                start,
                duration_hours,
            });
        }

        let (end, wrapped) = start.overflowing_add_signed(Duration::hours(duration_hours as i64));
        if wrapped != 0 || end > rules.cutoff {
            return Err(TimeRejection::ExceedsCutoff {
                start,
                duration_hours,
                cutoff: rules.cutoff,
            });
        }

        if area_sqm >= rules.large_area_sqm && duration_hours < rules.large_area_min_hours {
            return Err(TimeRejection::BelowMinDuration {
                area_sqm,
                duration_hours,
                min_hours: rules.large_area_min_hours,
            });
        }

        Ok(())
    }
}
