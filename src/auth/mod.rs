pub mod auth;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod otp;
pub mod password;
pub mod refresh_store;
