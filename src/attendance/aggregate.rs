use crate::attendance::payroll;
use crate::attendance::store::AttendanceStore;
use crate::attendance::validator::{self, WorkStatus};
use crate::model::punch::AttendanceDay;
use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

/// One synthetic day slot in a monthly report.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyAttendance {
    pub date: String,
    pub status: WorkStatus,
    /// Hours rounded to 2 decimals for display.
    pub hours: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyAttendanceSummary {
    pub total_days: u32,
    pub worked_days: u32,
    pub leave_days: u32,
    pub per_day_salary: f64,
    pub total_deduction: f64,
    pub final_salary: f64,
    pub daily_details: Vec<DailyAttendance>,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Expand a month into per-day verdicts for one employee.
///
/// Every month is treated as exactly 30 days, matching the payroll divisor.
/// Synthetic dates past the real calendar end (e.g. Feb 30) never match a
/// stored record and therefore count as leave.
pub async fn monthly_report<S: AttendanceStore>(
    store: &S,
    employee_code: &str,
    month: u32,
    year: i32,
) -> Result<Vec<DailyAttendance>> {
    let start = format!("{year:04}-{month:02}-01");
    let end = format!("{year:04}-{month:02}-{:02}", payroll::MONTH_DAYS);

    let stored = store
        .get_days_in_range(employee_code, &start, &end)
        .await?;
    let by_date: HashMap<String, AttendanceDay> =
        stored.into_iter().map(|d| (d.date.clone(), d)).collect();

    let mut details = Vec::with_capacity(payroll::MONTH_DAYS as usize);
    for day in 1..=payroll::MONTH_DAYS {
        let date = format!("{year:04}-{month:02}-{day:02}");
        let detail = match by_date.get(&date) {
            None => DailyAttendance {
                date,
                status: WorkStatus::NoPunch,
                hours: 0.0,
            },
            Some(stored_day) => {
                let verdict = validator::evaluate(&stored_day.punches);
                DailyAttendance {
                    date,
                    status: verdict.status,
                    hours: round2(verdict.hours_worked),
                }
            }
        };
        details.push(detail);
    }

    Ok(details)
}

/// Monthly summary with the leave deduction applied. Any day that is not a
/// full `Worked` day counts as leave; there is no partial credit.
pub async fn payroll_summary<S: AttendanceStore>(
    store: &S,
    employee_code: &str,
    month: u32,
    year: i32,
    monthly_salary: f64,
) -> Result<MonthlyAttendanceSummary> {
    let daily_details = monthly_report(store, employee_code, month, year).await?;

    let worked_days = daily_details
        .iter()
        .filter(|d| d.status == WorkStatus::Worked)
        .count() as u32;
    let leave_days = payroll::MONTH_DAYS - worked_days;

    let per_day = payroll::per_day_salary(monthly_salary);
    let deduction = payroll::leave_deduction(leave_days, per_day);

    Ok(MonthlyAttendanceSummary {
        total_days: payroll::MONTH_DAYS,
        worked_days,
        leave_days,
        per_day_salary: round2(per_day),
        total_deduction: round2(deduction),
        final_salary: round2(payroll::final_salary(monthly_salary, deduction)),
        daily_details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::store::MemoryAttendanceStore;
    use crate::model::punch::{PunchEvent, PunchType};
    use chrono::{TimeZone, Utc};

    fn punch(date: (i32, u32, u32), punch_type: PunchType, hour: u32) -> PunchEvent {
        let ts = Utc
            .with_ymd_and_hms(date.0, date.1, date.2, hour, 0, 0)
            .unwrap();
        PunchEvent {
            punch_type,
            timestamp: ts,
            readable_local_time: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            distance_from_branch_m: 0.0,
        }
    }

    async fn seed_day(
        store: &MemoryAttendanceStore,
        date: (i32, u32, u32),
        in_hour: u32,
        out_hour: u32,
    ) {
        let date_str = format!("{:04}-{:02}-{:02}", date.0, date.1, date.2);
        let mut day = crate::model::punch::AttendanceDay::new(
            "EMP-7",
            "Gulshan",
            &date_str,
            punch(date, PunchType::In, in_hour),
        );
        day.apply(punch(date, PunchType::Out, out_hour));
        store.upsert_day(&day).await.unwrap();
    }

    #[actix_web::test]
    async fn february_still_yields_thirty_slots() {
        let store = MemoryAttendanceStore::default();
        let details = monthly_report(&store, "EMP-7", 2, 2026).await.unwrap();
        assert_eq!(details.len(), 30);
        assert!(details.iter().all(|d| d.status == WorkStatus::NoPunch));
        assert_eq!(details[29].date, "2026-02-30");
    }

    #[actix_web::test]
    async fn worked_and_leave_split() {
        let store = MemoryAttendanceStore::default();
        seed_day(&store, (2026, 3, 2), 9, 19).await; // 10 h -> Worked
        seed_day(&store, (2026, 3, 3), 9, 14).await; // 5 h -> short

        let summary = payroll_summary(&store, "EMP-7", 3, 2026, 3000.0)
            .await
            .unwrap();
        assert_eq!(summary.worked_days, 1);
        assert_eq!(summary.leave_days, 29);

        let d2 = &summary.daily_details[1];
        assert_eq!(d2.status, WorkStatus::Worked);
        assert_eq!(d2.hours, 10.0);
        let d3 = &summary.daily_details[2];
        assert_eq!(d3.status, WorkStatus::LessThanMinimum);
    }

    #[actix_web::test]
    async fn heavy_leave_drives_final_salary_negative() {
        // One full day worked, 29 leave days, salary 3000.
        let store = MemoryAttendanceStore::default();
        seed_day(&store, (2026, 3, 2), 9, 19).await;

        let summary = payroll_summary(&store, "EMP-7", 3, 2026, 3000.0)
            .await
            .unwrap();
        assert_eq!(summary.per_day_salary, 100.0);
        assert_eq!(summary.total_deduction, 5300.0);
        assert_eq!(summary.final_salary, -2300.0);
    }

    #[actix_web::test]
    async fn incomplete_day_counts_as_leave() {
        let store = MemoryAttendanceStore::default();
        let date_str = "2026-03-04";
        let day = crate::model::punch::AttendanceDay::new(
            "EMP-7",
            "Gulshan",
            date_str,
            punch((2026, 3, 4), PunchType::In, 9),
        );
        store.upsert_day(&day).await.unwrap();

        let summary = payroll_summary(&store, "EMP-7", 3, 2026, 3000.0)
            .await
            .unwrap();
        assert_eq!(summary.worked_days, 0);
        assert_eq!(summary.leave_days, 30);
        assert_eq!(
            summary.daily_details[3].status,
            WorkStatus::IncompletePunch
        );
    }
}
