//! Delivery actions.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::Router;
use biztrack_core::validation::Validate;
use biztrack_core::{Delivery, DeliveryUpdate, NewDelivery};
use chrono::Utc;

use crate::auth::Session;
use crate::error::{respond, ActionResult};
use crate::extract::ActionJson;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/deliveries", get(list_deliveries).post(create_delivery))
        .route("/api/deliveries/{id}", put(update_delivery).delete(delete_delivery))
}

async fn list_deliveries(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> ActionResult<Vec<Delivery>> {
    respond(state.db.deliveries().list(&session.business_id).await?)
}

async fn create_delivery(
    State(state): State<Arc<AppState>>,
    session: Session,
    ActionJson(input): ActionJson<NewDelivery>,
) -> ActionResult<Delivery> {
    input.validate()?;
    respond(state.db.deliveries().create(&session.business_id, input).await?)
}

async fn update_delivery(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    ActionJson(update): ActionJson<DeliveryUpdate>,
) -> ActionResult<Delivery> {
    update.validate()?;
    let mut delivery = state.db.deliveries().get(&session.business_id, &id).await?;
    update.apply(&mut delivery, Utc::now());
    respond(state.db.deliveries().save(&delivery).await?)
}

async fn delete_delivery(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> ActionResult<()> {
    state.db.deliveries().delete(&session.business_id, &id).await?;
    respond(())
}
