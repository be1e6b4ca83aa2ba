//! Supplier actions.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::Router;
use biztrack_core::validation::Validate;
use biztrack_core::{NewSupplier, Supplier, SupplierUpdate};

use crate::auth::Session;
use crate::error::{respond, ActionResult};
use crate::extract::ActionJson;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/suppliers", get(list_suppliers).post(create_supplier))
        .route("/api/suppliers/{id}", put(update_supplier).delete(delete_supplier))
}

async fn list_suppliers(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> ActionResult<Vec<Supplier>> {
    respond(state.db.suppliers().list(&session.business_id).await?)
}

async fn create_supplier(
    State(state): State<Arc<AppState>>,
    session: Session,
    ActionJson(input): ActionJson<NewSupplier>,
) -> ActionResult<Supplier> {
    input.validate()?;
    respond(state.db.suppliers().create(&session.business_id, input).await?)
}

async fn update_supplier(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    ActionJson(update): ActionJson<SupplierUpdate>,
) -> ActionResult<Supplier> {
    update.validate()?;
    let mut supplier = state.db.suppliers().get(&session.business_id, &id).await?;
    update.apply(&mut supplier);
    respond(state.db.suppliers().save(&supplier).await?)
}

async fn delete_supplier(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> ActionResult<()> {
    state.db.suppliers().delete(&session.business_id, &id).await?;
    respond(())
}
