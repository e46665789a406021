//! Signup, OTP verification, login, and password-reset endpoints.
//!
//! Mounted twice (under `/api/user` and `/api/guide`) with an
//! `Extension<AccountKind>` naming the collection, so each handler is
//! written once.

use axum::extract::State;
use axum::response::Response;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domains::{Account, AccountKind};
use services::auth::NewSignup;
use services::OtpPurpose;

use crate::envelope::{self, ApiResult};
use crate::AppState;

/// Public projection of an account: no password hash, no OTP state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: Uuid,
    pub kind: AccountKind,
    pub user_name: String,
    pub user_email: String,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speciality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_per_day: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            kind: account.kind,
            user_name: account.name.clone(),
            user_email: account.email.clone(),
            is_verified: account.is_verified,
            speciality: account.speciality.clone(),
            rate_per_day: account.rate_per_day,
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub user_name: String,
    pub user_email: String,
    pub password: String,
    #[serde(default)]
    pub speciality: Option<String>,
    #[serde(default)]
    pub rate_per_day: Option<f64>,
}

pub async fn signup(
    State(state): State<AppState>,
    Extension(kind): Extension<AccountKind>,
    Json(body): Json<SignupRequest>,
) -> ApiResult<Response> {
    state
        .auth
        .signup(
            kind,
            NewSignup {
                name: body.user_name,
                email: body.user_email,
                password: body.password,
                speciality: body.speciality,
                rate_per_day: body.rate_per_day,
            },
        )
        .await?;
    Ok(envelope::created(
        "account created; check your email for the verification code",
        (),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub user_email: String,
    pub otp: String,
}

pub async fn verify(
    State(state): State<AppState>,
    Extension(kind): Extension<AccountKind>,
    Json(body): Json<VerifyRequest>,
) -> ApiResult<Response> {
    state.otp.verify(kind, &body.user_email, &body.otp).await?;
    Ok(envelope::ok_message("account verified"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailOnlyRequest {
    pub user_email: String,
}

pub async fn resend_otp(
    State(state): State<AppState>,
    Extension(kind): Extension<AccountKind>,
    Json(body): Json<EmailOnlyRequest>,
) -> ApiResult<Response> {
    state
        .otp
        .issue(kind, &body.user_email, OtpPurpose::SignupVerify)
        .await?;
    Ok(envelope::ok_message("a new verification code is on its way"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub user: AccountView,
    pub token: String,
}

pub async fn login(
    State(state): State<AppState>,
    Extension(kind): Extension<AccountKind>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Response> {
    let (account, token) = state
        .auth
        .login(kind, &body.user_email, &body.password)
        .await?;
    Ok(envelope::ok(
        "login successful",
        LoginData {
            user: AccountView::from(&account),
            token,
        },
    ))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Extension(kind): Extension<AccountKind>,
    Json(body): Json<EmailOnlyRequest>,
) -> ApiResult<Response> {
    state
        .otp
        .issue(kind, &body.user_email, OtpPurpose::PasswordReset)
        .await?;
    Ok(envelope::ok_message("a password reset code is on its way"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub user_email: String,
    pub otp: String,
    pub new_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Extension(kind): Extension<AccountKind>,
    Json(body): Json<ResetPasswordRequest>,
) -> ApiResult<Response> {
    state
        .otp
        .reset(kind, &body.user_email, &body.otp, &body.new_password)
        .await?;
    Ok(envelope::ok_message("password updated"))
}
