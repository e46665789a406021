//! # OTP Lifecycle
//!
//! Issues, verifies, and consumes short-lived one-time codes bound to an
//! account's email address. Written once and parameterized over
//! `AccountKind`, so travelers and guides share the exact same lifecycle.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use domains::{
    Account, AccountKind, AccountRepo, CredentialHasher, DomainError, Mailer, OtpState, Result,
};

/// Codes are valid for ten minutes from issue.
pub const OTP_TTL_MINUTES: i64 = 10;

/// Why a code is being issued. Controls the already-verified check and
/// the wording of the email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    SignupVerify,
    PasswordReset,
}

pub struct OtpLifecycle {
    accounts: Arc<dyn AccountRepo>,
    mailer: Arc<dyn Mailer>,
    hasher: Arc<dyn CredentialHasher>,
}

impl OtpLifecycle {
    pub fn new(
        accounts: Arc<dyn AccountRepo>,
        mailer: Arc<dyn Mailer>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            accounts,
            mailer,
            hasher,
        }
    }

    /// Generates a 6-digit decimal code, stores its hash with a 10-minute
    /// expiry (overwriting any pending code), and emails the plaintext.
    ///
    /// Fails with `NotFound` if no account matches, and with `Conflict`
    /// when a signup-verify code is requested for an already-verified
    /// account. Resend is just another call to this.
    pub async fn issue(&self, kind: AccountKind, email: &str, purpose: OtpPurpose) -> Result<()> {
        let account = self.require_account(kind, email).await?;

        if purpose == OtpPurpose::SignupVerify && account.is_verified {
            return Err(DomainError::Conflict("account is already verified".into()));
        }

        let code = generate_code();
        let otp = OtpState {
            code_hash: hash_code(&code),
            expires_at: Utc::now() + Duration::minutes(OTP_TTL_MINUTES),
        };
        self.accounts.set_otp(kind, account.id, otp).await?;

        let (subject, body) = compose_email(&account.name, &code, purpose);
        self.mailer.send(&account.email, &subject, &body).await?;

        tracing::info!(kind = kind.as_str(), account = %account.id, "issued OTP");
        Ok(())
    }

    /// Verifies a code and flips `is_verified`, clearing the OTP fields in
    /// the same document write.
    pub async fn verify(&self, kind: AccountKind, email: &str, code: &str) -> Result<()> {
        let account = self.require_account(kind, email).await?;
        check_code(&account, code)?;
        self.accounts.mark_verified(kind, account.id).await?;
        tracing::info!(kind = kind.as_str(), account = %account.id, "account verified");
        Ok(())
    }

    /// Verifies a reset code and replaces the stored password hash,
    /// clearing the OTP fields in the same write. Possession of the code
    /// proves control of the mailbox, so this also verifies the account.
    pub async fn reset(
        &self,
        kind: AccountKind,
        email: &str,
        code: &str,
        new_secret: &str,
    ) -> Result<()> {
        if new_secret.trim().len() < 8 {
            return Err(DomainError::Validation(
                "password must be at least 8 characters".into(),
            ));
        }

        let account = self.require_account(kind, email).await?;
        check_code(&account, code)?;

        let password_hash = self.hasher.hash(new_secret)?;
        self.accounts
            .reset_credentials(kind, account.id, &password_hash)
            .await?;
        tracing::info!(kind = kind.as_str(), account = %account.id, "password reset");
        Ok(())
    }

    async fn require_account(&self, kind: AccountKind, email: &str) -> Result<Account> {
        self.accounts
            .find_by_email(kind, email)
            .await?
            .ok_or_else(|| DomainError::not_found("account", email))
    }
}

/// Uniform random code in [100000, 999999], so always six digits.
fn generate_code() -> String {
    rand::rng().random_range(100_000..=999_999).to_string()
}

/// One-way hash of the plaintext code: SHA-256, hex encoded.
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

/// Shared pending/expiry/mismatch checks for verify and reset.
fn check_code(account: &Account, code: &str) -> Result<()> {
    let otp = account
        .otp
        .as_ref()
        .ok_or_else(|| DomainError::Validation("OTP is invalid or has expired".into()))?;

    if otp.expires_at < Utc::now() {
        return Err(DomainError::Validation(
            "OTP is invalid or has expired".into(),
        ));
    }
    if otp.code_hash != hash_code(code) {
        return Err(DomainError::Validation("incorrect OTP".into()));
    }
    Ok(())
}

fn compose_email(name: &str, code: &str, purpose: OtpPurpose) -> (String, String) {
    match purpose {
        OtpPurpose::SignupVerify => (
            "Verify your Wayfarer account".into(),
            format!(
                "Hi {name},\n\nYour verification code is {code}. \
                 It expires in {OTP_TTL_MINUTES} minutes.\n"
            ),
        ),
        OtpPurpose::PasswordReset => (
            "Reset your Wayfarer password".into(),
            format!(
                "Hi {name},\n\nYour password reset code is {code}. \
                 It expires in {OTP_TTL_MINUTES} minutes.\n"
            ),
        ),
    }
}
