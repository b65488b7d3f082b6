use crate::sms::SmsSender;
use chrono::{DateTime, Duration, Utc};
use derive_more::Display;
use moka::future::Cache;
use rand::Rng;
use uuid::Uuid;

/// A stored code is verifiable for this long after issue.
const OTP_TTL_MINUTES: i64 = 5;
/// Cache eviction backstop. Deliberately longer than the OTP TTL so an
/// expired entry is still readable and reports `Expired` rather than being
/// indistinguishable from a missing id.
const CACHE_BACKSTOP_SECS: u64 = 15 * 60;

#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub code: String,
    pub phone_number: String,
    pub company_tag: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Display, PartialEq)]
pub enum OtpError {
    #[display(fmt = "invalid verification id")]
    InvalidVerificationId,
    #[display(fmt = "OTP expired")]
    Expired,
    #[display(fmt = "invalid OTP")]
    InvalidOtp,
    #[display(fmt = "failed to deliver OTP: {}", _0)]
    DeliveryFailed(String),
}

/// Expiring store of one-time codes, keyed by verification id.
pub struct OtpStore {
    entries: Cache<String, OtpRecord>,
}

impl OtpStore {
    pub fn new() -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(std::time::Duration::from_secs(CACHE_BACKSTOP_SECS))
                .build(),
        }
    }

    /// Generate a 4-digit code, deliver it by SMS, and store it under a
    /// fresh verification id. If delivery fails the record is not stored.
    pub async fn issue<S: SmsSender>(
        &self,
        sms: &S,
        phone_number: &str,
        name: &str,
        company_tag: &str,
    ) -> Result<String, OtpError> {
        let code = rand::thread_rng().gen_range(1000..=9999).to_string();

        let message = format!(
            "Dear {name}, your {company_tag} verification code is {code}. It expires in {OTP_TTL_MINUTES} minutes."
        );
        sms.send(phone_number, &message)
            .await
            .map_err(|e| OtpError::DeliveryFailed(e.to_string()))?;

        let verification_id = Uuid::new_v4().to_string();
        self.entries
            .insert(
                verification_id.clone(),
                OtpRecord {
                    code,
                    phone_number: phone_number.to_string(),
                    company_tag: company_tag.to_string(),
                    issued_at: Utc::now(),
                },
            )
            .await;

        Ok(verification_id)
    }

    /// Check a submitted code. Single use on success; a mismatch keeps the
    /// record so the caller can retry until expiry.
    pub async fn verify(&self, verification_id: &str, code: &str) -> Result<OtpRecord, OtpError> {
        self.verify_at(verification_id, code, Utc::now()).await
    }

    async fn verify_at(
        &self,
        verification_id: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<OtpRecord, OtpError> {
        let record = self
            .entries
            .get(verification_id)
            .await
            .ok_or(OtpError::InvalidVerificationId)?;

        if now - record.issued_at > Duration::minutes(OTP_TTL_MINUTES) {
            self.entries.invalidate(verification_id).await;
            return Err(OtpError::Expired);
        }

        if record.code != code {
            return Err(OtpError::InvalidOtp);
        }

        self.entries.invalidate(verification_id).await;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sms::RecordingSms;

    #[actix_web::test]
    async fn issue_sends_and_verify_is_single_use() {
        let store = OtpStore::new();
        let sms = RecordingSms::default();

        let id = store.issue(&sms, "+8801700000000", "Nadia", "acme").await.unwrap();

        let sent = sms.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "+8801700000000");
        let code: String = sent[0].1.chars().filter(|c| c.is_ascii_digit()).take(4).collect();
        assert_eq!(code.len(), 4);

        let record = store.verify(&id, &code).await.unwrap();
        assert_eq!(record.phone_number, "+8801700000000");
        assert_eq!(record.company_tag, "acme");

        // Second use of the same id fails.
        assert_eq!(
            store.verify(&id, &code).await.unwrap_err(),
            OtpError::InvalidVerificationId
        );
    }

    #[actix_web::test]
    async fn delivery_failure_stores_nothing() {
        let store = OtpStore::new();
        let sms = RecordingSms {
            fail: true,
            ..Default::default()
        };

        let err = store
            .issue(&sms, "+8801700000000", "Nadia", "acme")
            .await
            .unwrap_err();
        assert!(matches!(err, OtpError::DeliveryFailed(_)));
    }

    #[actix_web::test]
    async fn mismatch_keeps_record_for_retry() {
        let store = OtpStore::new();
        let sms = RecordingSms::default();
        let id = store.issue(&sms, "+880170", "Nadia", "acme").await.unwrap();
        let sent = sms.sent.lock().unwrap().clone();
        let code: String = sent[0].1.chars().filter(|c| c.is_ascii_digit()).take(4).collect();

        let wrong = if code == "1000" { "1001" } else { "1000" };
        assert_eq!(store.verify(&id, wrong).await.unwrap_err(), OtpError::InvalidOtp);

        // Still verifiable with the right code.
        assert!(store.verify(&id, &code).await.is_ok());
    }

    #[actix_web::test]
    async fn expired_record_is_deleted_on_read() {
        let store = OtpStore::new();
        let sms = RecordingSms::default();
        let id = store.issue(&sms, "+880170", "Nadia", "acme").await.unwrap();
        let sent = sms.sent.lock().unwrap().clone();
        let code: String = sent[0].1.chars().filter(|c| c.is_ascii_digit()).take(4).collect();

        let late = Utc::now() + Duration::minutes(OTP_TTL_MINUTES) + Duration::seconds(1);
        assert_eq!(
            store.verify_at(&id, &code, late).await.unwrap_err(),
            OtpError::Expired
        );

        // Gone for good, even with the correct code at a valid time.
        assert_eq!(
            store.verify(&id, &code).await.unwrap_err(),
            OtpError::InvalidVerificationId
        );
    }
}
