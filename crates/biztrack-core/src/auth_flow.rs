//! # Auth Step Flow
//!
//! State of the signup / login / OTP / password-reset overlay.
//!
//! ## Steps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Auth Overlay                                    │
//! │                                                                         │
//! │   closed ──open_auth(step)──► open at `step`                           │
//! │                                                                         │
//! │   Linear sequence walked by next_step():                               │
//! │                                                                         │
//! │      signup ───► otp ───► complete ───► closed + Navigation            │
//! │                                                                         │
//! │   Side entries (login, forgot-password) are not part of the            │
//! │   sequence. Opening there, or jumping straight to otp/complete,        │
//! │   leaves the flow without a position: the next next_step()            │
//! │   finishes at once.                                                    │
//! │                                                                         │
//! │   close_auth() from anywhere: step = signup, email/redirect cleared.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The "finishes at once" rule is how the overlay has always behaved and
//! callers depend on it: a login form calls `next_step()` after a successful
//! login to close itself and navigate.
//!
//! Nothing here talks to the server; the flow only tracks which form is
//! shown and where to go afterwards.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::DEFAULT_REDIRECT_PATH;

/// One screen of the auth overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum AuthStep {
    #[default]
    Signup,
    Login,
    ForgotPassword,
    Otp,
    Complete,
}

/// The order `next_step` walks.
const FLOW: [AuthStep; 3] = [AuthStep::Signup, AuthStep::Otp, AuthStep::Complete];

/// Where to go once the flow finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Navigation {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFlow {
    step: AuthStep,
    is_open: bool,
    email: Option<String>,
    redirect_path: Option<String>,
    /// Index into [`FLOW`]. `None` when the flow was entered anywhere
    /// but the start of the sequence.
    cursor: Option<usize>,
}

impl Default for AuthFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthFlow {
    /// A closed overlay, positioned at signup.
    pub fn new() -> Self {
        AuthFlow {
            step: AuthStep::Signup,
            is_open: false,
            email: None,
            redirect_path: None,
            cursor: Some(0),
        }
    }

    /// Opens the overlay at `step`, optionally recording where to go after.
    ///
    /// A `None` redirect keeps whatever was recorded before.
    pub fn open_auth(&mut self, step: AuthStep, redirect_to: Option<String>) {
        self.step = step;
        self.is_open = true;
        self.cursor = match step {
            AuthStep::Signup => Some(0),
            _ => None,
        };
        if redirect_to.is_some() {
            self.redirect_path = redirect_to;
        }
    }

    /// Moves to the next step of the sequence, or finishes.
    ///
    /// Finishing closes the overlay and returns the navigation target: the
    /// recorded redirect, else [`DEFAULT_REDIRECT_PATH`]. The redirect is
    /// consumed.
    pub fn next_step(&mut self) -> Option<Navigation> {
        match self.cursor {
            Some(i) if i + 1 < FLOW.len() => {
                self.cursor = Some(i + 1);
                self.step = FLOW[i + 1];
                None
            }
            _ => {
                self.is_open = false;
                let path = self
                    .redirect_path
                    .take()
                    .unwrap_or_else(|| DEFAULT_REDIRECT_PATH.to_string());
                Some(Navigation { path })
            }
        }
    }

    /// Closes the overlay and forgets everything it captured.
    pub fn close_auth(&mut self) {
        *self = AuthFlow::new();
    }

    /// Remembers the email typed into the form, for the OTP screen.
    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = Some(email.into());
    }

    pub fn step(&self) -> AuthStep {
        self.step
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn redirect_path(&self) -> Option<&str> {
        self.redirect_path.as_deref()
    }
}
