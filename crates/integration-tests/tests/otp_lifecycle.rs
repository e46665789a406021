//! Stateful OTP lifecycle: signup → resend → verify with the real hashing,
//! against an in-memory account store and a mailbox that records what the
//! service sends.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use domains::{
    Account, AccountKind, AccountRepo, DomainError, Mailer, MockCredentialHasher, OtpState,
    Result,
};
use services::{OtpLifecycle, OtpPurpose};

/// One-account store that actually applies the OTP writes.
#[derive(Default)]
struct InMemoryAccounts {
    account: Mutex<Option<Account>>,
}

#[async_trait]
impl AccountRepo for InMemoryAccounts {
    async fn insert(&self, account: Account) -> Result<()> {
        *self.account.lock().unwrap() = Some(account);
        Ok(())
    }

    async fn find_by_email(&self, _kind: AccountKind, email: &str) -> Result<Option<Account>> {
        Ok(self
            .account
            .lock()
            .unwrap()
            .clone()
            .filter(|account| account.email == email))
    }

    async fn find_by_id(&self, _kind: AccountKind, id: Uuid) -> Result<Option<Account>> {
        Ok(self
            .account
            .lock()
            .unwrap()
            .clone()
            .filter(|account| account.id == id))
    }

    async fn resolve_any(&self, id: Uuid) -> Result<Option<Account>> {
        self.find_by_id(AccountKind::Traveler, id).await
    }

    async fn set_otp(&self, _kind: AccountKind, id: Uuid, otp: OtpState) -> Result<()> {
        let mut guard = self.account.lock().unwrap();
        match guard.as_mut().filter(|account| account.id == id) {
            Some(account) => {
                account.otp = Some(otp);
                Ok(())
            }
            None => Err(DomainError::not_found("account", id)),
        }
    }

    async fn mark_verified(&self, _kind: AccountKind, id: Uuid) -> Result<()> {
        let mut guard = self.account.lock().unwrap();
        match guard.as_mut().filter(|account| account.id == id) {
            Some(account) => {
                account.is_verified = true;
                account.otp = None;
                Ok(())
            }
            None => Err(DomainError::not_found("account", id)),
        }
    }

    async fn reset_credentials(
        &self,
        _kind: AccountKind,
        id: Uuid,
        password_hash: &str,
    ) -> Result<()> {
        let mut guard = self.account.lock().unwrap();
        match guard.as_mut().filter(|account| account.id == id) {
            Some(account) => {
                account.password_hash = password_hash.to_string();
                account.is_verified = true;
                account.otp = None;
                Ok(())
            }
            None => Err(DomainError::not_found("account", id)),
        }
    }
}

/// Captures outgoing mail so the test can read the plaintext code.
#[derive(Default)]
struct RecordingMailbox {
    bodies: Mutex<Vec<String>>,
}

impl RecordingMailbox {
    /// The 6-digit code inside the most recent email.
    fn latest_code(&self) -> String {
        let bodies = self.bodies.lock().unwrap();
        let body = bodies.last().expect("no email was sent");
        body.split_whitespace()
            .find(|word| {
                let digits = word.trim_end_matches('.');
                digits.len() == 6 && digits.chars().all(|c| c.is_ascii_digit())
            })
            .expect("email carries no 6-digit code")
            .trim_end_matches('.')
            .to_string()
    }
}

#[async_trait]
impl Mailer for RecordingMailbox {
    async fn send(&self, _to: &str, _subject: &str, body: &str) -> Result<()> {
        self.bodies.lock().unwrap().push(body.to_string());
        Ok(())
    }
}

fn unverified_account() -> Account {
    Account {
        id: Uuid::now_v7(),
        kind: AccountKind::Traveler,
        name: "Nadia".into(),
        email: "nadia@example.com".into(),
        password_hash: "$argon2id$stub".into(),
        is_verified: false,
        otp: None,
        speciality: None,
        rate_per_day: None,
        created_at: Utc::now(),
    }
}

fn lifecycle(
    accounts: Arc<InMemoryAccounts>,
    mailbox: Arc<RecordingMailbox>,
) -> OtpLifecycle {
    OtpLifecycle::new(accounts, mailbox, Arc::new(MockCredentialHasher::new()))
}

#[tokio::test]
async fn issued_code_verifies_the_account() {
    let accounts = Arc::new(InMemoryAccounts::default());
    let mailbox = Arc::new(RecordingMailbox::default());
    accounts.insert(unverified_account()).await.unwrap();

    let svc = lifecycle(accounts.clone(), mailbox.clone());
    svc.issue(
        AccountKind::Traveler,
        "nadia@example.com",
        OtpPurpose::SignupVerify,
    )
    .await
    .unwrap();

    let code = mailbox.latest_code();
    svc.verify(AccountKind::Traveler, "nadia@example.com", &code)
        .await
        .unwrap();

    let account = accounts
        .find_by_email(AccountKind::Traveler, "nadia@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(account.is_verified);
    // verification consumes the pending code in the same write
    assert!(account.otp.is_none());
}

#[tokio::test]
async fn reissue_invalidates_the_previous_code() {
    let accounts = Arc::new(InMemoryAccounts::default());
    let mailbox = Arc::new(RecordingMailbox::default());
    accounts.insert(unverified_account()).await.unwrap();

    let svc = lifecycle(accounts.clone(), mailbox.clone());
    svc.issue(
        AccountKind::Traveler,
        "nadia@example.com",
        OtpPurpose::SignupVerify,
    )
    .await
    .unwrap();
    let first_code = mailbox.latest_code();

    svc.issue(
        AccountKind::Traveler,
        "nadia@example.com",
        OtpPurpose::SignupVerify,
    )
    .await
    .unwrap();
    let second_code = mailbox.latest_code();

    if first_code != second_code {
        let err = svc
            .verify(AccountKind::Traveler, "nadia@example.com", &first_code)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
    svc.verify(AccountKind::Traveler, "nadia@example.com", &second_code)
        .await
        .unwrap();
}

#[tokio::test]
async fn verified_code_cannot_be_replayed() {
    let accounts = Arc::new(InMemoryAccounts::default());
    let mailbox = Arc::new(RecordingMailbox::default());
    accounts.insert(unverified_account()).await.unwrap();

    let svc = lifecycle(accounts.clone(), mailbox.clone());
    svc.issue(
        AccountKind::Traveler,
        "nadia@example.com",
        OtpPurpose::SignupVerify,
    )
    .await
    .unwrap();

    let code = mailbox.latest_code();
    svc.verify(AccountKind::Traveler, "nadia@example.com", &code)
        .await
        .unwrap();

    let err = svc
        .verify(AccountKind::Traveler, "nadia@example.com", &code)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn reset_sets_the_new_hash_verifies_the_account_and_consumes_the_code() {
    let accounts = Arc::new(InMemoryAccounts::default());
    let mailbox = Arc::new(RecordingMailbox::default());
    // deliberately unverified: proving control of the address via the
    // reset code doubles as signup verification
    accounts.insert(unverified_account()).await.unwrap();

    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_hash()
        .returning(|_| Ok("$argon2id$fresh".into()));
    let svc = OtpLifecycle::new(accounts.clone(), mailbox.clone(), Arc::new(hasher));

    svc.issue(
        AccountKind::Traveler,
        "nadia@example.com",
        OtpPurpose::PasswordReset,
    )
    .await
    .unwrap();

    let code = mailbox.latest_code();
    svc.reset(
        AccountKind::Traveler,
        "nadia@example.com",
        &code,
        "brand-new-secret",
    )
    .await
    .unwrap();

    let account = accounts
        .find_by_email(AccountKind::Traveler, "nadia@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.password_hash, "$argon2id$fresh");
    assert!(account.is_verified);
    assert!(account.otp.is_none());
}
