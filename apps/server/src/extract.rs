//! Request extractors that fail with an envelope instead of axum's default
//! plain-text rejection.

use axum::extract::FromRequest;

use crate::error::ActionError;

/// JSON body whose parse errors become a validation envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ActionError))]
pub struct ActionJson<T>(pub T);
