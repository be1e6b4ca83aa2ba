//! Debt actions and repayments.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::Router;
use biztrack_core::validation::Validate;
use biztrack_core::{Debt, DebtUpdate, NewDebt, NewDebtPayment};

use crate::auth::Session;
use crate::error::{respond, ActionResult};
use crate::extract::ActionJson;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/debts", get(list_debts).post(create_debt))
        .route("/api/debts/{id}", put(update_debt).delete(delete_debt))
        .route("/api/debts/{id}/payments", post(add_payment))
}

/// GET /api/debts
async fn list_debts(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> ActionResult<Vec<Debt>> {
    respond(state.db.debts().list(&session.business_id).await?)
}

/// POST /api/debts
async fn create_debt(
    State(state): State<Arc<AppState>>,
    session: Session,
    ActionJson(input): ActionJson<NewDebt>,
) -> ActionResult<Debt> {
    input.validate()?;
    respond(state.db.debts().create(&session.business_id, input).await?)
}

/// PUT /api/debts/{id}
async fn update_debt(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    ActionJson(update): ActionJson<DebtUpdate>,
) -> ActionResult<Debt> {
    update.validate()?;
    let mut debt = state.db.debts().get(&session.business_id, &id).await?;
    update.apply(&mut debt);
    respond(state.db.debts().save(&debt).await?)
}

/// DELETE /api/debts/{id}
async fn delete_debt(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> ActionResult<()> {
    state.db.debts().delete(&session.business_id, &id).await?;
    respond(())
}

/// POST /api/debts/{id}/payments
async fn add_payment(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    ActionJson(payment): ActionJson<NewDebtPayment>,
) -> ActionResult<Debt> {
    payment.validate()?;
    respond(
        state
            .db
            .debts()
            .add_payment(&session.business_id, &id, payment)
            .await?,
    )
}
