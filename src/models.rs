use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
    /// Present only if this user is linked to an employee record
    pub employee_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReq {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RefreshReq {
    pub refresh_token: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LogoutReq {
    pub refresh_token: String,
}

#[derive(Deserialize, ToSchema)]
pub struct OtpSendReq {
    pub phone_number: String,
    pub name: String,
    pub company_name: String,
}

#[derive(Serialize, ToSchema)]
pub struct OtpSendResp {
    pub verification_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct OtpVerifyReq {
    pub verification_id: String,
    pub otp: String,
    pub company_name: String,
}
