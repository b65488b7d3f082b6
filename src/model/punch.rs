use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Direction of a swipe.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub enum PunchType {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
}

/// One recorded swipe. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PunchEvent {
    #[serde(rename = "type")]
    pub punch_type: PunchType,
    #[schema(value_type = String, format = "date-time")]
    pub timestamp: DateTime<Utc>,
    /// Localized human-readable time, set at record time.
    pub readable_local_time: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_from_branch_m: f64,
}

/// One employee's punches for one calendar date.
///
/// Created lazily on the first punch of a day. At most one IN and one OUT
/// survive per day; recording a second punch of the same type replaces the
/// first. Punches stay sorted ascending by timestamp after every mutation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceDay {
    pub employee_code: String,
    pub branch_name: String,
    /// Calendar date as `YYYY-MM-DD`.
    pub date: String,
    pub punches: Vec<PunchEvent>,
}

impl AttendanceDay {
    pub fn new(employee_code: &str, branch_name: &str, date: &str, first: PunchEvent) -> Self {
        Self {
            employee_code: employee_code.to_string(),
            branch_name: branch_name.to_string(),
            date: date.to_string(),
            punches: vec![first],
        }
    }

    /// Replace any existing punch of the same type, then re-sort by timestamp.
    pub fn apply(&mut self, punch: PunchEvent) {
        self.punches.retain(|p| p.punch_type != punch.punch_type);
        self.punches.push(punch);
        self.punches.sort_by_key(|p| p.timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn punch(punch_type: PunchType, hour: u32) -> PunchEvent {
        let ts = Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0).unwrap();
        PunchEvent {
            punch_type,
            timestamp: ts,
            readable_local_time: ts.format("%Y-%m-%d %I:%M:%S %p").to_string(),
            latitude: 23.8103,
            longitude: 90.4125,
            distance_from_branch_m: 0.0,
        }
    }

    #[test]
    fn apply_replaces_same_type() {
        let mut day = AttendanceDay::new("EMP-7", "Gulshan", "2026-03-02", punch(PunchType::In, 8));
        day.apply(punch(PunchType::Out, 17));
        day.apply(punch(PunchType::In, 9));

        assert_eq!(day.punches.len(), 2);
        let ins: Vec<_> = day
            .punches
            .iter()
            .filter(|p| p.punch_type == PunchType::In)
            .collect();
        assert_eq!(ins.len(), 1);
        assert_eq!(ins[0].timestamp.format("%H").to_string(), "09");
    }

    #[test]
    fn punches_stay_sorted() {
        let mut day =
            AttendanceDay::new("EMP-7", "Gulshan", "2026-03-02", punch(PunchType::Out, 18));
        day.apply(punch(PunchType::In, 8));

        let stamps: Vec<_> = day.punches.iter().map(|p| p.timestamp).collect();
        let mut sorted = stamps.clone();
        sorted.sort();
        assert_eq!(stamps, sorted);
        assert_eq!(day.punches[0].punch_type, PunchType::In);
    }
}
