//! Maps time-constraint rejections to the dialogs the client renders.

use booking_flow::TimeRejection;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DialogKind {
    /// The selection runs past the daily cutoff.
    TimeLimit,
    /// The selection itself needs to change (duration or slot).
    TimeSelection,
}

/// A dialog the client shows before re-prompting the time selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dialog {
    pub kind: DialogKind,
    pub message: String,
}

pub fn dialog_for(rejection: &TimeRejection) -> Dialog {
    match rejection {
        TimeRejection::ExceedsCutoff {
            start,
            duration_hours,
            cutoff,
        } => Dialog {
            kind: DialogKind::TimeLimit,
            message: format!(
                "A {duration_hours} hour service starting at {start} cannot finish by {cutoff}. \
                 Please choose an earlier start."
            ),
        },
        TimeRejection::BelowMinDuration {
            area_sqm,
            min_hours,
            ..
        } => Dialog {
            kind: DialogKind::TimeSelection,
            message: format!(
                "Homes of {area_sqm}m\u{b2} or more need at least {min_hours} hours. \
                 Please choose a longer duration."
            ),
        },
        TimeRejection::UnsupportedSelection { .. } => Dialog {
            kind: DialogKind::TimeSelection,
            message: "That time selection is not available. Please choose a different slot."
                .to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn cutoff_rejections_render_the_time_limit_dialog() {
        let dialog = dialog_for(&TimeRejection::ExceedsCutoff {
            start: at(14, 30),
            duration_hours: 3,
            cutoff: at(16, 0),
        });
        assert_eq!(dialog.kind, DialogKind::TimeLimit);
        assert!(dialog.message.contains("14:30"));
        assert!(dialog.message.contains("3 hour"));
    }

    #[test]
    fn area_rejections_carry_the_area_in_the_message() {
        let dialog = dialog_for(&TimeRejection::BelowMinDuration {
            area_sqm: 30,
            duration_hours: 2,
            min_hours: 4,
        });
        assert_eq!(dialog.kind, DialogKind::TimeSelection);
        assert!(dialog.message.contains("30m\u{b2}"));
    }
}
