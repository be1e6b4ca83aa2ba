//! Product actions.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::Router;
use biztrack_core::validation::Validate;
use biztrack_core::{NewProduct, Product, ProductUpdate, StockAdjustment};
use serde::Deserialize;
use tracing::info;

use crate::auth::Session;
use crate::error::{respond, ActionResult};
use crate::extract::ActionJson;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/api/products/{id}/stock", post(adjust_stock))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    /// Only active products at or below their threshold.
    #[serde(default)]
    pub low_stock: bool,
}

/// GET /api/products
async fn list_products(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(filter): Query<ProductFilter>,
) -> ActionResult<Vec<Product>> {
    let products = if filter.low_stock {
        state.db.products().low_stock(&session.business_id).await?
    } else {
        state.db.products().list(&session.business_id).await?
    };
    respond(products)
}

/// POST /api/products
async fn create_product(
    State(state): State<Arc<AppState>>,
    session: Session,
    ActionJson(input): ActionJson<NewProduct>,
) -> ActionResult<Product> {
    input.validate()?;
    let product = state.db.products().create(&session.business_id, input).await?;
    respond(product)
}

/// GET /api/products/{id}
async fn get_product(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> ActionResult<Product> {
    respond(state.db.products().get(&session.business_id, &id).await?)
}

/// PUT /api/products/{id}
async fn update_product(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    ActionJson(update): ActionJson<ProductUpdate>,
) -> ActionResult<Product> {
    update.validate()?;
    let mut product = state.db.products().get(&session.business_id, &id).await?;
    update.apply(&mut product);
    respond(state.db.products().save(&product).await?)
}

/// DELETE /api/products/{id}
async fn delete_product(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> ActionResult<()> {
    state.db.products().delete(&session.business_id, &id).await?;
    respond(())
}

/// POST /api/products/{id}/stock
async fn adjust_stock(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    ActionJson(adjustment): ActionJson<StockAdjustment>,
) -> ActionResult<Product> {
    adjustment.validate()?;
    let product = state
        .db
        .products()
        .adjust_stock(&session.business_id, &id, adjustment.delta)
        .await?;

    info!(
        product_id = %id,
        delta = adjustment.delta,
        reason = adjustment.reason.as_deref().unwrap_or(""),
        quantity = product.quantity,
        "Stock adjusted"
    );
    respond(product)
}
