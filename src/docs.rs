use crate::api::attendance::{CheckResponse, PunchReq};
use crate::attendance::aggregate::{DailyAttendance, MonthlyAttendanceSummary};
use crate::attendance::validator::WorkStatus;
use crate::model::punch::{AttendanceDay, PunchEvent, PunchType};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Retail Back-Office API",
        version = "1.0.0",
        description = r#"
## Retail Back-Office — Attendance & Auth

Employee attendance with geofenced punches, monthly work-hour reports and
leave-deduction payroll summaries, plus JWT access/refresh token auth and
OTP phone verification.

### Attendance
- Geofenced IN/OUT punches validated against the branch location
- Monthly per-day reports (fixed 30-day salary month)
- Payroll summaries with tiered leave deduction

### Security
Protected endpoints use **JWT Bearer authentication**. Refresh tokens are
single-use and rotated on every refresh.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::punch,
        crate::api::attendance::check,
        crate::api::attendance::monthly,
        crate::api::attendance::payroll,
    ),
    components(
        schemas(
            PunchReq,
            CheckResponse,
            DailyAttendance,
            MonthlyAttendanceSummary,
            WorkStatus,
            AttendanceDay,
            PunchEvent,
            PunchType,
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance and payroll APIs"),
    )
)]
pub struct ApiDoc;
