use crate::attendance::store::AttendanceStore;
use crate::geo;
use crate::model::branch::BranchDirectory;
use crate::model::punch::{AttendanceDay, PunchEvent, PunchType};
use chrono::{Local, Utc};
use derive_more::Display;

#[derive(Debug, Display)]
pub enum PunchError {
    #[display(fmt = "branch not found")]
    BranchNotFound,
    /// Punch coordinates fall outside the branch geofence. Distance exactly
    /// equal to the radius is accepted.
    #[display(fmt = "out of geofence radius: {:.2} m from branch, allowed {:.2} m", distance_m, radius_m)]
    OutOfRange { distance_m: f64, radius_m: f64 },
    #[display(fmt = "attendance store failure: {}", _0)]
    Store(anyhow::Error),
}

/// Records a punch for "today", gated by the branch geofence.
///
/// Per employee+day, a punch of a given type replaces any earlier punch of
/// that type, so at most one IN and one OUT survive. The read-check-upsert
/// sequence is not transactional; concurrent punches for the same
/// employee+day race with last-write-wins.
pub struct GeofencePunchRecorder<S, B> {
    store: S,
    branches: B,
}

impl<S: AttendanceStore, B: BranchDirectory> GeofencePunchRecorder<S, B> {
    pub fn new(store: S, branches: B) -> Self {
        Self { store, branches }
    }

    pub async fn record_punch(
        &self,
        employee_code: &str,
        branch_name: &str,
        latitude: f64,
        longitude: f64,
        punch_type: PunchType,
    ) -> Result<PunchEvent, PunchError> {
        let branch = self
            .branches
            .find_by_name_ci(branch_name)
            .await
            .map_err(PunchError::Store)?
            .ok_or(PunchError::BranchNotFound)?;

        let distance_m =
            geo::distance_meters(latitude, longitude, branch.latitude, branch.longitude);
        if distance_m > branch.geofence_radius_m {
            return Err(PunchError::OutOfRange {
                distance_m,
                radius_m: branch.geofence_radius_m,
            });
        }

        let now = Utc::now();
        let punch = PunchEvent {
            punch_type,
            timestamp: now,
            readable_local_time: now
                .with_timezone(&Local)
                .format("%Y-%m-%d %I:%M:%S %p")
                .to_string(),
            latitude,
            longitude,
            distance_from_branch_m: distance_m,
        };

        let today = now.with_timezone(&Local).format("%Y-%m-%d").to_string();

        let day = self
            .store
            .get_day(employee_code, &today)
            .await
            .map_err(PunchError::Store)?;

        let day = match day {
            None => AttendanceDay::new(employee_code, &branch.name, &today, punch.clone()),
            Some(mut existing) => {
                existing.apply(punch.clone());
                existing
            }
        };

        self.store.upsert_day(&day).await.map_err(PunchError::Store)?;

        Ok(punch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::store::MemoryAttendanceStore;
    use crate::model::branch::{Branch, MemoryBranchDirectory};

    const BRANCH_LAT: f64 = 23.8103;
    const BRANCH_LON: f64 = 90.4125;

    fn recorder(
        radius_m: f64,
    ) -> GeofencePunchRecorder<MemoryAttendanceStore, MemoryBranchDirectory> {
        GeofencePunchRecorder::new(
            MemoryAttendanceStore::default(),
            MemoryBranchDirectory {
                branches: vec![Branch {
                    name: "Gulshan".to_string(),
                    latitude: BRANCH_LAT,
                    longitude: BRANCH_LON,
                    geofence_radius_m: radius_m,
                }],
            },
        )
    }

    #[actix_web::test]
    async fn unknown_branch_is_rejected() {
        let rec = recorder(200.0);
        let err = rec
            .record_punch("EMP-7", "Banani", BRANCH_LAT, BRANCH_LON, PunchType::In)
            .await
            .unwrap_err();
        assert!(matches!(err, PunchError::BranchNotFound));
    }

    #[actix_web::test]
    async fn branch_lookup_is_case_insensitive() {
        let rec = recorder(200.0);
        rec.record_punch("EMP-7", "gulshan", BRANCH_LAT, BRANCH_LON, PunchType::In)
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn punch_at_branch_center_is_accepted() {
        let rec = recorder(200.0);
        let punch = rec
            .record_punch("EMP-7", "Gulshan", BRANCH_LAT, BRANCH_LON, PunchType::In)
            .await
            .unwrap();
        assert_eq!(punch.distance_from_branch_m, 0.0);

        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        let day = rec.store.get_day("EMP-7", &today).await.unwrap().unwrap();
        assert_eq!(day.punches.len(), 1);
        assert_eq!(day.branch_name, "Gulshan");
    }

    #[actix_web::test]
    async fn distance_equal_to_radius_passes_but_beyond_fails() {
        // ~111 m north of the branch.
        let lat_off = BRANCH_LAT + 0.001;
        let d = crate::geo::distance_meters(lat_off, BRANCH_LON, BRANCH_LAT, BRANCH_LON);

        // Radius set to the exact distance: accepted.
        let rec = recorder(d);
        rec.record_punch("EMP-7", "Gulshan", lat_off, BRANCH_LON, PunchType::In)
            .await
            .unwrap();

        // A hair under the distance: rejected, no state mutated.
        let rec = recorder(d - 0.01);
        let err = rec
            .record_punch("EMP-8", "Gulshan", lat_off, BRANCH_LON, PunchType::In)
            .await
            .unwrap_err();
        assert!(matches!(err, PunchError::OutOfRange { .. }));

        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        assert!(rec.store.get_day("EMP-8", &today).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn second_in_replaces_first() {
        let rec = recorder(200.0);
        rec.record_punch("EMP-7", "Gulshan", BRANCH_LAT, BRANCH_LON, PunchType::In)
            .await
            .unwrap();
        rec.record_punch("EMP-7", "Gulshan", BRANCH_LAT, BRANCH_LON, PunchType::Out)
            .await
            .unwrap();
        rec.record_punch("EMP-7", "Gulshan", BRANCH_LAT, BRANCH_LON, PunchType::In)
            .await
            .unwrap();

        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        let day = rec.store.get_day("EMP-7", &today).await.unwrap().unwrap();

        assert_eq!(day.punches.len(), 2);
        let ins = day
            .punches
            .iter()
            .filter(|p| p.punch_type == PunchType::In)
            .count();
        assert_eq!(ins, 1);

        let stamps: Vec<_> = day.punches.iter().map(|p| p.timestamp).collect();
        let mut sorted = stamps.clone();
        sorted.sort();
        assert_eq!(stamps, sorted);
    }
}
