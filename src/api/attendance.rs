use crate::attendance::aggregate::{self, DailyAttendance, MonthlyAttendanceSummary};
use crate::attendance::recorder::{GeofencePunchRecorder, PunchError};
use crate::attendance::store::{AttendanceStore, SqlAttendanceStore};
use crate::auth::auth::AuthUser;
use crate::model::branch::SqlBranchDirectory;
use crate::model::punch::{AttendanceDay, PunchType};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct PunchReq {
    #[schema(example = "EMP-1042")]
    pub employee_code: String,

    #[schema(example = 23.8103)]
    pub current_lat: f64,

    #[schema(example = 90.4125)]
    pub current_long: f64,

    #[schema(example = "Gulshan")]
    pub branch_name: String,

    pub punch_status: PunchType,
}

#[derive(Deserialize, IntoParams)]
pub struct CheckQuery {
    pub employee_code: String,
    /// Calendar date as YYYY-MM-DD
    pub date: String,
}

#[derive(Serialize, ToSchema)]
pub struct CheckResponse {
    pub punched_in: bool,
    pub record: Option<AttendanceDay>,
}

#[derive(Deserialize, IntoParams)]
pub struct MonthlyQuery {
    pub employee_code: String,
    pub month: u32,
    pub year: i32,
}

#[derive(Deserialize, IntoParams)]
pub struct PayrollQuery {
    pub employee_code: String,
    pub month: u32,
    pub year: i32,
    pub monthly_salary: f64,
}

fn validate_month_year(month: u32, year: i32) -> Result<(), HttpResponse> {
    if !(1..=12).contains(&month) {
        return Err(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "month must be between 1 and 12"
        })));
    }
    if year < 2000 {
        return Err(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "year must be 2000 or later"
        })));
    }
    Ok(())
}

/// Geofenced punch endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/punch",
    request_body = PunchReq,
    responses(
        (status = 200, description = "Punch recorded", body = Object, example = json!({
            "message": "Punch recorded",
            "distance_from_branch_m": 12.4
        })),
        (status = 400, description = "Outside geofence radius"),
        (status = 404, description = "Branch not found"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn punch(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    body: web::Json<PunchReq>,
) -> actix_web::Result<impl Responder> {
    if body.employee_code.trim().is_empty() || body.branch_name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "employee_code and branch_name are required"
        })));
    }

    let recorder = GeofencePunchRecorder::new(
        SqlAttendanceStore::new(pool.get_ref().clone()),
        SqlBranchDirectory::new(pool.get_ref().clone()),
    );

    match recorder
        .record_punch(
            &body.employee_code,
            &body.branch_name,
            body.current_lat,
            body.current_long,
            body.punch_status,
        )
        .await
    {
        Ok(punch) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Punch recorded",
            "punched_at": punch.readable_local_time,
            "distance_from_branch_m": (punch.distance_from_branch_m * 100.0).round() / 100.0,
        }))),
        Err(PunchError::BranchNotFound) => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Branch not found"
        }))),
        Err(e @ PunchError::OutOfRange { .. }) => {
            Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": e.to_string()
            })))
        }
        Err(PunchError::Store(e)) => {
            tracing::error!(error = %e, employee_code = %body.employee_code, "Punch failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Punched-in check for one date
#[utoipa::path(
    get,
    path = "/api/v1/attendance/check",
    params(CheckQuery),
    responses(
        (status = 200, body = CheckResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<CheckQuery>,
) -> actix_web::Result<impl Responder> {
    let store = SqlAttendanceStore::new(pool.get_ref().clone());

    let record = store
        .get_day(&query.employee_code, &query.date)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch attendance day");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let punched_in = record
        .as_ref()
        .is_some_and(|d| d.punches.iter().any(|p| p.punch_type == PunchType::In));

    Ok(HttpResponse::Ok().json(CheckResponse { punched_in, record }))
}

/// Per-day attendance for a month
#[utoipa::path(
    get,
    path = "/api/v1/attendance/monthly",
    params(MonthlyQuery),
    responses(
        (status = 200, body = Vec<DailyAttendance>),
        (status = 400, description = "Invalid month or year"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn monthly(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<MonthlyQuery>,
) -> actix_web::Result<impl Responder> {
    if let Err(resp) = validate_month_year(query.month, query.year) {
        return Ok(resp);
    }

    let store = SqlAttendanceStore::new(pool.get_ref().clone());
    let details = aggregate::monthly_report(&store, &query.employee_code, query.month, query.year)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build monthly report");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(details))
}

/// Monthly payroll summary with leave deduction
#[utoipa::path(
    get,
    path = "/api/v1/attendance/payroll",
    params(PayrollQuery),
    responses(
        (status = 200, body = MonthlyAttendanceSummary),
        (status = 400, description = "Invalid month, year or salary"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PayrollQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    if let Err(resp) = validate_month_year(query.month, query.year) {
        return Ok(resp);
    }
    if query.monthly_salary <= 0.0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "monthly_salary must be positive"
        })));
    }

    let store = SqlAttendanceStore::new(pool.get_ref().clone());
    let summary = aggregate::payroll_summary(
        &store,
        &query.employee_code,
        query.month,
        query.year,
        query.monthly_salary,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to build payroll summary");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(summary))
}
