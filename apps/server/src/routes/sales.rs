//! Sale actions.
//!
//! Creating a sale takes stock off every line's product and, when less than
//! the total is paid, opens a debt for the remainder. Both happen in one
//! database transaction.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use biztrack_core::validation::Validate;
use biztrack_core::{NewSale, RecordedSale, Sale};
use tracing::info;

use crate::auth::Session;
use crate::error::{respond, ActionResult};
use crate::extract::ActionJson;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/sales", get(list_sales).post(create_sale))
        .route("/api/sales/{id}", get(get_sale).delete(delete_sale))
}

/// GET /api/sales
async fn list_sales(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> ActionResult<Vec<Sale>> {
    respond(state.db.sales().list(&session.business_id).await?)
}

/// POST /api/sales
async fn create_sale(
    State(state): State<Arc<AppState>>,
    session: Session,
    ActionJson(input): ActionJson<NewSale>,
) -> ActionResult<RecordedSale> {
    input.validate()?;

    let (sale, debt) = state
        .db
        .sales()
        .create(&session.business_id, Some(session.user_id.as_str()), input)
        .await?;

    info!(
        sale_id = %sale.id,
        total = %sale.total(),
        items = sale.items.len(),
        on_credit = debt.is_some(),
        "Sale recorded"
    );
    respond(RecordedSale { sale, debt })
}

/// GET /api/sales/{id}
async fn get_sale(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> ActionResult<Sale> {
    respond(state.db.sales().get(&session.business_id, &id).await?)
}

/// DELETE /api/sales/{id}
async fn delete_sale(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> ActionResult<()> {
    state.db.sales().delete(&session.business_id, &id).await?;
    info!(sale_id = %id, "Sale deleted, stock restored");
    respond(())
}
