use crate::{
    auth::{
        jwt::{generate_access_token, generate_refresh_token},
        otp::{OtpError, OtpStore},
        password::verify_password,
        refresh_store::RefreshTokenStore,
    },
    config::Config,
    models::{LoginReq, LogoutReq, OtpSendReq, OtpSendResp, OtpVerifyReq, RefreshReq, TokenPair},
    model::user::{UserInfo, UserRow},
    sms::HttpSmsGateway,
};
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

async fn fetch_user_by_username(
    username: &str,
    pool: &MySqlPool,
) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, username, password, role_id, phone, company_tag, employee_code
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

async fn fetch_user_by_phone(
    phone: &str,
    pool: &MySqlPool,
) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, username, password, role_id, phone, company_tag, employee_code
        FROM users
        WHERE phone = ?
        "#,
    )
    .bind(phone)
    .fetch_optional(pool)
    .await
}

/// Mint an access/refresh pair for a user and register the refresh token in
/// the live set.
fn issue_token_pair(user: &UserRow, config: &Config, refresh_store: &RefreshTokenStore) -> TokenPair {
    let access_token = generate_access_token(
        user.id,
        user.username.clone(),
        user.role_id,
        user.employee_code.clone(),
        &config.jwt_secret,
        config.access_token_ttl,
    );

    let (refresh_token, _) = generate_refresh_token(
        user.id,
        user.username.clone(),
        user.role_id,
        user.employee_code.clone(),
        &config.jwt_secret,
        config.refresh_token_ttl,
    );
    refresh_store.register(&refresh_token);

    TokenPair {
        access_token,
        refresh_token,
    }
}

#[instrument(
    name = "auth_login",
    skip(pool, config, refresh_store, body),
    fields(username = %body.username)
)]
pub async fn login(
    body: web::Json<LoginReq>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    refresh_store: web::Data<RefreshTokenStore>,
) -> impl Responder {
    info!("Login request received");

    if body.username.trim().is_empty() || body.password.is_empty() {
        info!("Validation failed: empty username or password");
        return HttpResponse::BadRequest().body("Username or password required");
    }

    debug!("Fetching user from database");

    let db_user = match fetch_user_by_username(&body.username, pool.get_ref()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = verify_password(&body.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    let tokens = issue_token_pair(&db_user, config.get_ref(), refresh_store.get_ref());

    // Non-fatal; login still succeeds if this write fails.
    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
        .bind(db_user.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
    }

    info!("Login successful");

    HttpResponse::Ok().json(tokens)
}

pub async fn refresh_token(
    body: web::Json<RefreshReq>,
    config: web::Data<Config>,
    refresh_store: web::Data<RefreshTokenStore>,
) -> impl Responder {
    match refresh_store.rotate(
        &body.refresh_token,
        &config.jwt_secret,
        config.access_token_ttl,
        config.refresh_token_ttl,
    ) {
        Ok(pair) => HttpResponse::Ok().json(pair),
        Err(e) => {
            debug!(reason = %e, "Refresh rotation rejected");
            HttpResponse::Forbidden().json(json!({"error": "invalid or expired token"}))
        }
    }
}

/// 200 always, even for tokens that were never issued.
pub async fn logout(
    body: web::Json<LogoutReq>,
    refresh_store: web::Data<RefreshTokenStore>,
) -> impl Responder {
    refresh_store.revoke(&body.refresh_token);
    HttpResponse::Ok().json(json!({"message": "Logged out"}))
}

#[instrument(name = "otp_send", skip_all, fields(company = %body.company_name))]
pub async fn otp_send(
    body: web::Json<OtpSendReq>,
    pool: web::Data<MySqlPool>,
    otp_store: web::Data<OtpStore>,
    sms: web::Data<HttpSmsGateway>,
) -> impl Responder {
    if body.phone_number.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "Phone number required"}));
    }

    let user = match fetch_user_by_phone(&body.phone_number, pool.get_ref()).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(json!({"error": "No account for this phone number"}));
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user by phone");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if !user.company_tag.eq_ignore_ascii_case(&body.company_name) {
        return HttpResponse::Forbidden().json(json!({"error": "Wrong company"}));
    }

    match otp_store
        .issue(sms.get_ref(), &body.phone_number, &body.name, &body.company_name)
        .await
    {
        Ok(verification_id) => {
            info!("OTP issued");
            HttpResponse::Ok().json(OtpSendResp { verification_id })
        }
        Err(e) => {
            error!(error = %e, "OTP delivery failed");
            HttpResponse::InternalServerError().json(json!({"error": e.to_string()}))
        }
    }
}

#[instrument(name = "otp_verify", skip_all)]
pub async fn otp_verify(
    body: web::Json<OtpVerifyReq>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    otp_store: web::Data<OtpStore>,
    refresh_store: web::Data<RefreshTokenStore>,
) -> impl Responder {
    let record = match otp_store.verify(&body.verification_id, &body.otp).await {
        Ok(r) => r,
        Err(e @ (OtpError::InvalidVerificationId | OtpError::Expired | OtpError::InvalidOtp)) => {
            return HttpResponse::BadRequest().json(json!({"error": e.to_string()}));
        }
        Err(e) => {
            error!(error = %e, "OTP verification failed");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if !record.company_tag.eq_ignore_ascii_case(&body.company_name) {
        return HttpResponse::BadRequest().json(json!({"error": "Wrong company"}));
    }

    let user = match fetch_user_by_phone(&record.phone_number, pool.get_ref()).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return HttpResponse::BadRequest().json(json!({"error": "Account no longer exists"}));
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user by phone");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let tokens = issue_token_pair(&user, config.get_ref(), refresh_store.get_ref());

    HttpResponse::Ok().json(json!({
        "token": tokens,
        "user": UserInfo::from(&user),
    }))
}
