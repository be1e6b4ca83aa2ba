//! Production actions. Completing a run adds its quantity to the product's
//! stock (see `ProductionRepository::update`).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::Router;
use biztrack_core::validation::Validate;
use biztrack_core::{NewProduction, Production, ProductionUpdate};

use crate::auth::Session;
use crate::error::{respond, ActionResult};
use crate::extract::ActionJson;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/productions", get(list_productions).post(create_production))
        .route(
            "/api/productions/{id}",
            put(update_production).delete(delete_production),
        )
}

async fn list_productions(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> ActionResult<Vec<Production>> {
    respond(state.db.productions().list(&session.business_id).await?)
}

async fn create_production(
    State(state): State<Arc<AppState>>,
    session: Session,
    ActionJson(input): ActionJson<NewProduction>,
) -> ActionResult<Production> {
    input.validate()?;
    respond(state.db.productions().create(&session.business_id, input).await?)
}

async fn update_production(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    ActionJson(update): ActionJson<ProductionUpdate>,
) -> ActionResult<Production> {
    update.validate()?;
    respond(
        state
            .db
            .productions()
            .update(&session.business_id, &id, update)
            .await?,
    )
}

async fn delete_production(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> ActionResult<()> {
    state.db.productions().delete(&session.business_id, &id).await?;
    respond(())
}
