//! # Auth
//!
//! Signup, login, and per-request session checks around the OTP core.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use domains::{
    Account, AccountKind, AccountRepo, CredentialHasher, DomainError, Result, SessionClaims,
    TokenIssuer,
};

use crate::otp::{OtpLifecycle, OtpPurpose};

/// Fields accepted at signup. The guide profile fields are ignored for
/// traveler signups.
#[derive(Debug, Clone)]
pub struct NewSignup {
    pub name: String,
    pub email: String,
    pub password: String,
    pub speciality: Option<String>,
    pub rate_per_day: Option<f64>,
}

pub struct AuthService {
    accounts: Arc<dyn AccountRepo>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenIssuer>,
    otp: Arc<OtpLifecycle>,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountRepo>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenIssuer>,
        otp: Arc<OtpLifecycle>,
    ) -> Self {
        Self {
            accounts,
            hasher,
            tokens,
            otp,
        }
    }

    /// Creates an unverified account and issues the signup OTP.
    pub async fn signup(&self, kind: AccountKind, signup: NewSignup) -> Result<()> {
        validate_signup(&signup)?;

        if self
            .accounts
            .find_by_email(kind, &signup.email)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict(format!(
                "an account with email {} already exists",
                signup.email
            )));
        }

        let account = Account {
            id: Uuid::now_v7(),
            kind,
            name: signup.name.trim().to_string(),
            email: signup.email.trim().to_lowercase(),
            password_hash: self.hasher.hash(&signup.password)?,
            is_verified: false,
            otp: None,
            speciality: signup.speciality.filter(|_| kind == AccountKind::Guide),
            rate_per_day: signup.rate_per_day.filter(|_| kind == AccountKind::Guide),
            created_at: Utc::now(),
        };
        let email = account.email.clone();
        self.accounts.insert(account).await?;

        self.otp.issue(kind, &email, OtpPurpose::SignupVerify).await
    }

    /// Checks credentials and mints a session token. Unverified accounts
    /// are rejected with `Forbidden` rather than `Auth` so the client can
    /// prompt for OTP verification.
    pub async fn login(
        &self,
        kind: AccountKind,
        email: &str,
        password: &str,
    ) -> Result<(Account, String)> {
        let account = self
            .accounts
            .find_by_email(kind, email)
            .await?
            .ok_or_else(|| DomainError::Auth("unknown email or wrong password".into()))?;

        if !self.hasher.verify(password, &account.password_hash) {
            return Err(DomainError::Auth("unknown email or wrong password".into()));
        }
        if !account.is_verified {
            return Err(DomainError::Forbidden(
                "account is not verified; check your email for the OTP".into(),
            ));
        }

        let token = self.tokens.issue(&SessionClaims {
            account_id: account.id,
            email: account.email.clone(),
            kind,
        })?;
        Ok((account, token))
    }

    /// Per-request session check: the token must carry a valid signature
    /// AND the account must still exist in the matching collection.
    pub async fn authenticate(&self, token: &str) -> Result<Account> {
        let claims = self.tokens.decode(token)?;
        self.accounts
            .find_by_id(claims.kind, claims.account_id)
            .await?
            .ok_or_else(|| DomainError::Auth("account no longer exists".into()))
    }
}

fn validate_signup(signup: &NewSignup) -> Result<()> {
    if signup.name.trim().is_empty() {
        return Err(DomainError::Validation("name must not be blank".into()));
    }
    let email = signup.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::Validation("a valid email is required".into()));
    }
    if signup.password.trim().len() < 8 {
        return Err(DomainError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{MockAccountRepo, MockCredentialHasher, MockMailer, MockTokenIssuer, OtpState};
    use mockall::predicate::eq;

    fn verified_account(kind: AccountKind) -> Account {
        Account {
            id: Uuid::now_v7(),
            kind,
            name: "bob".into(),
            email: "b@x.com".into(),
            password_hash: "$argon2id$stub".into(),
            is_verified: true,
            otp: None,
            speciality: None,
            rate_per_day: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn login_rejects_unverified_accounts() {
        let mut unverified = verified_account(AccountKind::Traveler);
        unverified.is_verified = false;
        unverified.otp = Some(OtpState {
            code_hash: "deadbeef".into(),
            expires_at: Utc::now(),
        });

        let mut accounts = MockAccountRepo::new();
        accounts
            .expect_find_by_email()
            .returning(move |_, _| Ok(Some(unverified.clone())));

        let mut hasher = MockCredentialHasher::new();
        hasher.expect_verify().returning(|_, _| true);

        let accounts = Arc::new(accounts);
        let hasher: Arc<dyn CredentialHasher> = Arc::new(hasher);
        let otp = Arc::new(OtpLifecycle::new(
            accounts.clone(),
            Arc::new(MockMailer::new()),
            hasher.clone(),
        ));
        let svc = AuthService::new(accounts, hasher, Arc::new(MockTokenIssuer::new()), otp);

        let err = svc
            .login(AccountKind::Traveler, "b@x.com", "secret123")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn login_mints_token_for_verified_accounts() {
        let account = verified_account(AccountKind::Guide);
        let id = account.id;

        let mut accounts = MockAccountRepo::new();
        accounts
            .expect_find_by_email()
            .with(eq(AccountKind::Guide), eq("b@x.com"))
            .returning(move |_, _| Ok(Some(account.clone())));

        let mut hasher = MockCredentialHasher::new();
        hasher.expect_verify().returning(|_, _| true);

        let mut tokens = MockTokenIssuer::new();
        tokens
            .expect_issue()
            .withf(move |claims| claims.account_id == id && claims.kind == AccountKind::Guide)
            .returning(|_| Ok("signed.jwt.token".into()));

        let accounts = Arc::new(accounts);
        let hasher: Arc<dyn CredentialHasher> = Arc::new(hasher);
        let otp = Arc::new(OtpLifecycle::new(
            accounts.clone(),
            Arc::new(MockMailer::new()),
            hasher.clone(),
        ));
        let svc = AuthService::new(accounts, hasher, Arc::new(tokens), otp);

        let (got, token) = svc
            .login(AccountKind::Guide, "b@x.com", "secret123")
            .await
            .unwrap();
        assert_eq!(got.id, id);
        assert_eq!(token, "signed.jwt.token");
    }

    #[tokio::test]
    async fn signup_rejects_duplicate_email() {
        let existing = verified_account(AccountKind::Traveler);
        let mut accounts = MockAccountRepo::new();
        accounts
            .expect_find_by_email()
            .returning(move |_, _| Ok(Some(existing.clone())));
        accounts.expect_insert().never();

        let mut hasher = MockCredentialHasher::new();
        hasher.expect_hash().returning(|_| Ok("$argon2id$stub".into()));

        let accounts = Arc::new(accounts);
        let hasher: Arc<dyn CredentialHasher> = Arc::new(hasher);
        let otp = Arc::new(OtpLifecycle::new(
            accounts.clone(),
            Arc::new(MockMailer::new()),
            hasher.clone(),
        ));
        let svc = AuthService::new(accounts, hasher, Arc::new(MockTokenIssuer::new()), otp);

        let err = svc
            .signup(
                AccountKind::Traveler,
                NewSignup {
                    name: "bob".into(),
                    email: "b@x.com".into(),
                    password: "secret123".into(),
                    speciality: None,
                    rate_per_day: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn signup_validation_catches_blank_and_short_fields() {
        let base = NewSignup {
            name: "alice".into(),
            email: "a@x.com".into(),
            password: "secret123".into(),
            speciality: None,
            rate_per_day: None,
        };

        let mut blank_name = base.clone();
        blank_name.name = "  ".into();
        assert!(validate_signup(&blank_name).is_err());

        let mut bad_email = base.clone();
        bad_email.email = "not-an-email".into();
        assert!(validate_signup(&bad_email).is_err());

        let mut short_password = base.clone();
        short_password.password = "short".into();
        assert!(validate_signup(&short_password).is_err());

        assert!(validate_signup(&base).is_ok());
    }
}
