use serde::Serialize;
use sqlx::FromRow;

#[derive(FromRow)]
pub struct UserRow {
    pub id: u64, // matches BIGINT UNSIGNED
    pub username: String,
    pub password: String,
    pub role_id: u8,
    pub phone: Option<String>,
    pub company_tag: String,
    /// Present only if this user is linked to an employee record
    pub employee_code: Option<String>,
}

/// Public projection returned by auth endpoints.
#[derive(Serialize)]
pub struct UserInfo {
    pub id: u64,
    pub username: String,
    pub role_id: u8,
    pub employee_code: Option<String>,
}

impl From<&UserRow> for UserInfo {
    fn from(u: &UserRow) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            role_id: u.role_id,
            employee_code: u.employee_code.clone(),
        }
    }
}
