//! Route table. One module per resource, each exposing `router()`.

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod debts;
pub mod deliveries;
pub mod employees;
pub mod productions;
pub mod products;
pub mod proxy;
pub mod sales;
pub mod suppliers;
pub mod system;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(auth::router())
        .merge(products::router())
        .merge(sales::router())
        .merge(debts::router())
        .merge(deliveries::router())
        .merge(productions::router())
        .merge(suppliers::router())
        .merge(employees::router())
        .merge(proxy::router())
        .merge(system::router())
}
