//! # Auth Actions
//!
//! ```text
//! signup ──► code mailed ──► verify-otp ──► AuthSession (token + cookie)
//!                 ▲
//!            resend-otp
//!
//! login ─────────────────────────────────► AuthSession (verified users only)
//!
//! forgot-password ──► code mailed ──► reset-password
//! ```
//!
//! Unknown emails on `resend-otp` and `forgot-password` still answer with
//! success, so the endpoints do not reveal which addresses have accounts.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use biztrack_core::codes::generate_verification_code;
use biztrack_core::validation::Validate;
use biztrack_core::{
    ActionResponse, AuthSession, CodeSent, CoreError, CurrentUser, ForgotPasswordRequest,
    LoginRequest, ResendOtpRequest, ResetPasswordRequest, SignupRequest, User, UserProfile,
    VerificationPurpose, VerifyOtpRequest,
};
use biztrack_db::NewOwner;
use chrono::Utc;
use tracing::{error, info};

use crate::auth::{hash_password, session_cookie, verify_password, Session};
use crate::error::{respond, ActionError, ActionResult, ErrorCode};
use crate::extract::ActionJson;
use crate::mailer::Email;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/verify-otp", post(verify_otp))
        .route("/api/auth/resend-otp", post(resend_otp))
        .route("/api/auth/login", post(login))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/auth/me", get(me))
}

/// POST /api/auth/signup
async fn signup(
    State(state): State<Arc<AppState>>,
    ActionJson(req): ActionJson<SignupRequest>,
) -> ActionResult<CodeSent> {
    req.validate()?;

    let email = req.email.trim().to_lowercase();
    if state.db.users().find_by_email(&email).await?.is_some() {
        return Err(CoreError::EmailTaken(email).into());
    }

    let password_hash = hash_password(&req.password)?;
    let (business, owner) = state
        .db
        .businesses()
        .register(
            &req.business_name,
            &req.currency,
            NewOwner {
                name: req.name,
                email: email.clone(),
                password_hash,
            },
        )
        .await?;
    info!(business_id = %business.id, user_id = %owner.id, "Business registered");

    send_code(&state, &email, VerificationPurpose::Signup).await?;
    respond(CodeSent {
        email,
        purpose: VerificationPurpose::Signup,
    })
}

/// POST /api/auth/verify-otp
async fn verify_otp(
    State(state): State<Arc<AppState>>,
    ActionJson(req): ActionJson<VerifyOtpRequest>,
) -> Result<Response, ActionError> {
    req.validate()?;

    state
        .db
        .verification_codes()
        .consume(&req.email, VerificationPurpose::Signup, &req.code, Utc::now())
        .await?;

    let mut user = state
        .db
        .users()
        .find_by_email(&req.email)
        .await?
        .ok_or(CoreError::InvalidCode)?;
    if !user.email_verified {
        state.db.users().mark_verified(&user.id).await?;
        user.email_verified = true;
    }
    info!(user_id = %user.id, "Email verified");

    start_session(&state, &user).await
}

/// POST /api/auth/resend-otp
async fn resend_otp(
    State(state): State<Arc<AppState>>,
    ActionJson(req): ActionJson<ResendOtpRequest>,
) -> ActionResult<CodeSent> {
    req.validate()?;

    let email = req.email.trim().to_lowercase();
    let wanted = match state.db.users().find_by_email(&email).await? {
        Some(user) => match req.purpose {
            VerificationPurpose::Signup => !user.email_verified,
            VerificationPurpose::PasswordReset => true,
        },
        None => false,
    };

    if wanted {
        send_code(&state, &email, req.purpose).await?;
    }
    respond(CodeSent {
        email,
        purpose: req.purpose,
    })
}

/// POST /api/auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    ActionJson(req): ActionJson<LoginRequest>,
) -> Result<Response, ActionError> {
    req.validate()?;

    let user = state
        .db
        .users()
        .find_by_email(&req.email)
        .await?
        .ok_or(CoreError::InvalidCredentials)?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(CoreError::InvalidCredentials.into());
    }
    if !user.email_verified {
        return Err(CoreError::EmailNotVerified(user.email).into());
    }

    info!(user_id = %user.id, "User signed in");
    start_session(&state, &user).await
}

/// POST /api/auth/forgot-password
async fn forgot_password(
    State(state): State<Arc<AppState>>,
    ActionJson(req): ActionJson<ForgotPasswordRequest>,
) -> ActionResult<CodeSent> {
    req.validate()?;

    let email = req.email.trim().to_lowercase();
    if state.db.users().find_by_email(&email).await?.is_some() {
        send_code(&state, &email, VerificationPurpose::PasswordReset).await?;
    } else {
        info!(%email, "Password reset requested for unknown email");
    }

    respond(CodeSent {
        email,
        purpose: VerificationPurpose::PasswordReset,
    })
}

/// POST /api/auth/reset-password
async fn reset_password(
    State(state): State<Arc<AppState>>,
    ActionJson(req): ActionJson<ResetPasswordRequest>,
) -> ActionResult<()> {
    req.validate()?;

    state
        .db
        .verification_codes()
        .consume(&req.email, VerificationPurpose::PasswordReset, &req.code, Utc::now())
        .await?;

    let user = state
        .db
        .users()
        .find_by_email(&req.email)
        .await?
        .ok_or(CoreError::InvalidCode)?;

    let password_hash = hash_password(&req.new_password)?;
    state.db.users().update_password(&user.id, &password_hash).await?;
    // The code proved ownership of the address.
    if !user.email_verified {
        state.db.users().mark_verified(&user.id).await?;
    }

    info!(user_id = %user.id, "Password reset");
    respond(())
}

/// GET /api/auth/me
async fn me(State(state): State<Arc<AppState>>, session: Session) -> ActionResult<CurrentUser> {
    let user = state.db.users().get(&session.user_id).await?;
    let business = state.db.businesses().get(&user.business_id).await?;

    respond(CurrentUser {
        user: UserProfile::from(&user),
        business,
    })
}

// =============================================================================
// Helpers
// =============================================================================

/// Issues and mails a fresh code, invalidating older ones.
async fn send_code(
    state: &AppState,
    email: &str,
    purpose: VerificationPurpose,
) -> Result<(), ActionError> {
    let code = generate_verification_code();
    state
        .db
        .verification_codes()
        .issue(email, purpose, &code, state.config.otp_ttl())
        .await?;

    let message = Email::verification_code(email, &code, purpose, state.config.otp_ttl_minutes);
    if let Err(e) = state.mailer.send(message).await {
        error!(error = %e, %email, ?purpose, "Failed to send verification code");
        return Err(ActionError::new(
            ErrorCode::Internal,
            "Could not send the verification email, please try again",
        ));
    }
    Ok(())
}

/// Success envelope with the session, plus the session cookie.
async fn start_session(state: &AppState, user: &User) -> Result<Response, ActionError> {
    let token = state.jwt.issue(user)?;
    let business = state.db.businesses().get(&user.business_id).await?;
    let cookie = session_cookie(&token, state.jwt.lifetime_secs());

    let body = ActionResponse::ok(AuthSession {
        token,
        user: UserProfile::from(user),
        business,
    });
    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}
