use crate::{
    api::attendance,
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let otp_limiter = Arc::new(build_limiter(config.rate_otp_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    cfg.service(
        web::scope("/otp")
            .service(
                web::resource("/send")
                    .wrap(otp_limiter.clone())
                    .route(web::post().to(handlers::otp_send)),
            )
            .service(
                web::resource("/verify")
                    .wrap(otp_limiter)
                    .route(web::post().to(handlers::otp_verify)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/attendance")
                    .service(web::resource("/punch").route(web::post().to(attendance::punch)))
                    .service(web::resource("/check").route(web::get().to(attendance::check)))
                    .service(web::resource("/monthly").route(web::get().to(attendance::monthly)))
                    .service(web::resource("/payroll").route(web::get().to(attendance::payroll))),
            ),
    );
}

// LOGIN / OTP VERIFY
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days, held in the live set)
//
// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ old token leaves the live set, new pair comes back
