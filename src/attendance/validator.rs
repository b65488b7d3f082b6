use crate::model::punch::{PunchEvent, PunchType};
use serde::Serialize;
use strum_macros::Display;
use utoipa::ToSchema;

/// A full working day must span at least this many hours, inclusive.
pub const MIN_WORK_HOURS: f64 = 9.0;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Display, ToSchema)]
pub enum WorkStatus {
    #[strum(serialize = "No punch")]
    #[serde(rename = "No punch")]
    NoPunch,
    #[strum(serialize = "Incomplete punch")]
    #[serde(rename = "Incomplete punch")]
    IncompletePunch,
    #[strum(serialize = "Less than 9 hours")]
    #[serde(rename = "Less than 9 hours")]
    LessThanMinimum,
    #[strum(serialize = "Worked")]
    Worked,
}

/// Derived verdict for one day. Computed fresh on every read, never stored.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AttendanceVerdict {
    pub status: WorkStatus,
    /// Raw fractional hours, unrounded and unclamped. Rounding happens at
    /// the presentation boundary only.
    pub hours_worked: f64,
}

/// Evaluate a day's punch set into a verdict.
///
/// Pairing is first-IN / last-OUT: the earliest IN and the latest OUT define
/// the span, regardless of any punches between them. Malformed data (OUT
/// before IN) yields negative hours, which never reach `Worked`.
pub fn evaluate(punches: &[PunchEvent]) -> AttendanceVerdict {
    if punches.is_empty() {
        return AttendanceVerdict {
            status: WorkStatus::NoPunch,
            hours_worked: 0.0,
        };
    }

    let first_in = punches
        .iter()
        .filter(|p| p.punch_type == PunchType::In)
        .min_by_key(|p| p.timestamp);
    let last_out = punches
        .iter()
        .filter(|p| p.punch_type == PunchType::Out)
        .max_by_key(|p| p.timestamp);

    let (first_in, last_out) = match (first_in, last_out) {
        (Some(i), Some(o)) if punches.len() >= 2 => (i, o),
        _ => {
            return AttendanceVerdict {
                status: WorkStatus::IncompletePunch,
                hours_worked: 0.0,
            };
        }
    };

    let hours_worked =
        (last_out.timestamp - first_in.timestamp).num_seconds() as f64 / 3600.0;

    let status = if hours_worked >= MIN_WORK_HOURS {
        WorkStatus::Worked
    } else {
        WorkStatus::LessThanMinimum
    };

    AttendanceVerdict {
        status,
        hours_worked,
    }
}
