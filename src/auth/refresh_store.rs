use crate::auth::jwt::{generate_access_token, generate_refresh_token, verify_token};
use crate::models::{TokenPair, TokenType};
use derive_more::Display;
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Display, PartialEq)]
pub enum RefreshError {
    /// Token is not in the live set (never issued, already rotated, or
    /// revoked). Message stays generic on purpose.
    #[display(fmt = "invalid or expired token")]
    InvalidToken,
    /// Signature or expiry verification failed. The token has already been
    /// purged from the live set when this is returned.
    #[display(fmt = "invalid or expired token")]
    ExpiredOrTampered,
}

/// Live set of currently-redeemable refresh tokens.
///
/// Process-lifetime state: tokens issued before a restart become
/// unredeemable. Every failure path removes, never corrupts.
pub struct RefreshTokenStore {
    live: Mutex<HashSet<String>>,
}

impl RefreshTokenStore {
    pub fn new() -> Self {
        Self {
            live: Mutex::new(HashSet::new()),
        }
    }

    /// Register a freshly minted refresh token.
    pub fn register(&self, token: &str) {
        self.live.lock().unwrap().insert(token.to_string());
    }

    #[cfg(test)]
    pub fn contains(&self, token: &str) -> bool {
        self.live.lock().unwrap().contains(token)
    }

    pub fn len(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    /// Redeem `old_token` for a fresh pair. Single use: the old token is
    /// removed before the replacement is minted, so presenting it a second
    /// time fails with `InvalidToken`.
    pub fn rotate(
        &self,
        old_token: &str,
        secret: &str,
        access_ttl: usize,
        refresh_ttl: usize,
    ) -> Result<TokenPair, RefreshError> {
        if !self.live.lock().unwrap().contains(old_token) {
            return Err(RefreshError::InvalidToken);
        }

        let claims = match verify_token(old_token, secret) {
            Ok(c) if c.token_type == TokenType::Refresh => c,
            _ => {
                // Fail closed: purge the offending token.
                self.live.lock().unwrap().remove(old_token);
                return Err(RefreshError::ExpiredOrTampered);
            }
        };

        // remove() returning false means a concurrent rotation won the race.
        if !self.live.lock().unwrap().remove(old_token) {
            return Err(RefreshError::InvalidToken);
        }

        let access_token = generate_access_token(
            claims.user_id,
            claims.sub.clone(),
            claims.role,
            claims.employee_code.clone(),
            secret,
            access_ttl,
        );
        let (refresh_token, _) = generate_refresh_token(
            claims.user_id,
            claims.sub,
            claims.role,
            claims.employee_code,
            secret,
            refresh_ttl,
        );
        self.register(&refresh_token);

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Logout path. Idempotent; revoking an absent token is not an error.
    pub fn revoke(&self, token: &str) {
        self.live.lock().unwrap().remove(token);
    }

    /// Drop every live token whose expiry has passed. Tokens that fail to
    /// decode at all are dropped too. Returns the number removed.
    pub fn sweep_expired(&self, secret: &str) -> usize {
        let mut live = self.live.lock().unwrap();
        let before = live.len();
        live.retain(|token| verify_token(token, secret).is_ok());
        before - live.len()
    }
}
