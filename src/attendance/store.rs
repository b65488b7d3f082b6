use crate::model::punch::{AttendanceDay, PunchEvent};
use anyhow::Result;
use sqlx::{FromRow, MySqlPool};

/// Persistence seam for attendance days. The relational store is the single
/// source of truth; nothing here is cached across requests.
pub trait AttendanceStore {
    fn get_day(
        &self,
        employee_code: &str,
        date: &str,
    ) -> impl std::future::Future<Output = Result<Option<AttendanceDay>>> + Send;

    fn upsert_day(
        &self,
        day: &AttendanceDay,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn get_days_in_range(
        &self,
        employee_code: &str,
        start_date: &str,
        end_date: &str,
    ) -> impl std::future::Future<Output = Result<Vec<AttendanceDay>>> + Send;
}

#[derive(FromRow)]
struct AttendanceDayRow {
    employee_code: String,
    branch_name: String,
    date: String,
    /// JSON-encoded punch array.
    punches: String,
}

impl AttendanceDayRow {
    fn into_day(self) -> Result<AttendanceDay> {
        let punches: Vec<PunchEvent> = serde_json::from_str(&self.punches)?;
        Ok(AttendanceDay {
            employee_code: self.employee_code,
            branch_name: self.branch_name,
            date: self.date,
            punches,
        })
    }
}

/// MySQL-backed store. One row per employee+date, punch array held in a
/// JSON column.
pub struct SqlAttendanceStore {
    pool: MySqlPool,
}

impl SqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl AttendanceStore for SqlAttendanceStore {
    async fn get_day(&self, employee_code: &str, date: &str) -> Result<Option<AttendanceDay>> {
        let row = sqlx::query_as::<_, AttendanceDayRow>(
            r#"
            SELECT employee_code, branch_name, date, punches
            FROM attendance_days
            WHERE employee_code = ? AND date = ?
            "#,
        )
        .bind(employee_code)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AttendanceDayRow::into_day).transpose()
    }

    async fn upsert_day(&self, day: &AttendanceDay) -> Result<()> {
        let punches = serde_json::to_string(&day.punches)?;

        sqlx::query(
            r#"
            INSERT INTO attendance_days (employee_code, branch_name, date, punches)
            VALUES (?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                branch_name = VALUES(branch_name),
                punches = VALUES(punches)
            "#,
        )
        .bind(&day.employee_code)
        .bind(&day.branch_name)
        .bind(&day.date)
        .bind(punches)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_days_in_range(
        &self,
        employee_code: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<AttendanceDay>> {
        let rows = sqlx::query_as::<_, AttendanceDayRow>(
            r#"
            SELECT employee_code, branch_name, date, punches
            FROM attendance_days
            WHERE employee_code = ? AND date BETWEEN ? AND ?
            ORDER BY date
            "#,
        )
        .bind(employee_code)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AttendanceDayRow::into_day).collect()
    }
}

/// In-memory store for tests. Keyed by (employee_code, date).
#[cfg(test)]
#[derive(Default)]
pub struct MemoryAttendanceStore {
    days: std::sync::Mutex<std::collections::HashMap<(String, String), AttendanceDay>>,
}

#[cfg(test)]
impl AttendanceStore for MemoryAttendanceStore {
    async fn get_day(&self, employee_code: &str, date: &str) -> Result<Option<AttendanceDay>> {
        let days = self.days.lock().unwrap();
        Ok(days
            .get(&(employee_code.to_string(), date.to_string()))
            .cloned())
    }

    async fn upsert_day(&self, day: &AttendanceDay) -> Result<()> {
        let mut days = self.days.lock().unwrap();
        days.insert(
            (day.employee_code.clone(), day.date.clone()),
            day.clone(),
        );
        Ok(())
    }

    async fn get_days_in_range(
        &self,
        employee_code: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<AttendanceDay>> {
        let days = self.days.lock().unwrap();
        let mut hits: Vec<AttendanceDay> = days
            .values()
            .filter(|d| {
                d.employee_code == employee_code
                    && d.date.as_str() >= start_date
                    && d.date.as_str() <= end_date
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(hits)
    }
}
