//! # Dashboard Loader
//!
//! Loads the four collections the dashboard overview needs at once.
//!
//! ```text
//!                  ┌── fetch_products ───┐
//!                  ├── fetch_sales ──────┤
//! load_dashboard ──┤                     ├── tokio::join! ──► DashboardState
//!                  ├── fetch_debts ──────┤
//!                  └── fetch_deliveries ─┘
//!
//! success: false     → that collection is empty, warn! logged
//! transport failure  → that collection is empty, first message kept in `error`
//! 401                → as a transport failure, and `unauthorized` is set
//! ```
//!
//! A failing collection never blanks the others.

use async_trait::async_trait;
use biztrack_core::{ActionResponse, Debt, Delivery, Money, Product, Sale};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::ClientError;

type Fetched<T> = Result<ActionResponse<Vec<T>>, ClientError>;

/// Where the dashboard gets its data. [`ApiClient`] in the app; fakes in tests.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    async fn fetch_products(&self) -> Fetched<Product>;
    async fn fetch_sales(&self) -> Fetched<Sale>;
    async fn fetch_debts(&self) -> Fetched<Debt>;
    async fn fetch_deliveries(&self) -> Fetched<Delivery>;
}

#[async_trait]
impl DashboardSource for ApiClient {
    async fn fetch_products(&self) -> Fetched<Product> {
        self.list_products().await
    }

    async fn fetch_sales(&self) -> Fetched<Sale> {
        self.list_sales().await
    }

    async fn fetch_debts(&self) -> Fetched<Debt> {
        self.list_debts().await
    }

    async fn fetch_deliveries(&self) -> Fetched<Delivery> {
        self.list_deliveries().await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub products: Vec<Product>,
    pub sales: Vec<Sale>,
    pub debts: Vec<Debt>,
    pub deliveries: Vec<Delivery>,
    pub is_loading: bool,
    pub error: Option<String>,
    /// At least one fetch was answered with 401.
    pub unauthorized: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        DashboardState {
            products: Vec::new(),
            sales: Vec::new(),
            debts: Vec::new(),
            deliveries: Vec::new(),
            is_loading: true,
            error: None,
            unauthorized: false,
        }
    }
}

/// Headline figures for the overview cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSummary {
    pub revenue: Money,
    pub outstanding_debt: Money,
    pub overdue_debts: usize,
    pub low_stock_count: usize,
    pub pending_deliveries: usize,
}

impl DashboardState {
    pub fn summary(&self, now: DateTime<Utc>) -> DashboardSummary {
        DashboardSummary {
            revenue: self.sales.iter().map(Sale::total).sum(),
            outstanding_debt: self.debts.iter().map(Debt::outstanding).sum(),
            overdue_debts: self.debts.iter().filter(|d| d.is_overdue(now)).count(),
            low_stock_count: self
                .products
                .iter()
                .filter(|p| p.is_active && p.is_low_stock())
                .count(),
            pending_deliveries: self.deliveries.iter().filter(|d| d.status.is_open()).count(),
        }
    }
}

/// Runs all four fetches concurrently and combines them.
pub async fn load_dashboard<S: DashboardSource + ?Sized>(source: &S) -> DashboardState {
    let (products, sales, debts, deliveries) = tokio::join!(
        source.fetch_products(),
        source.fetch_sales(),
        source.fetch_debts(),
        source.fetch_deliveries(),
    );

    let mut failures = Failures::default();
    let state = DashboardState {
        products: collect("products", products, &mut failures),
        sales: collect("sales", sales, &mut failures),
        debts: collect("debts", debts, &mut failures),
        deliveries: collect("deliveries", deliveries, &mut failures),
        is_loading: false,
        error: failures.error,
        unauthorized: failures.unauthorized,
    };

    debug!(
        products = state.products.len(),
        sales = state.sales.len(),
        debts = state.debts.len(),
        deliveries = state.deliveries.len(),
        failed = state.error.is_some(),
        "Dashboard loaded"
    );
    state
}

#[derive(Default)]
struct Failures {
    error: Option<String>,
    unauthorized: bool,
}

fn collect<T>(resource: &str, fetched: Fetched<T>, failures: &mut Failures) -> Vec<T> {
    match fetched {
        Ok(response) if response.success => response.data.unwrap_or_default(),
        Ok(response) => {
            warn!(
                resource,
                error = response.error.as_deref().unwrap_or("unknown"),
                "Dashboard fetch returned an error"
            );
            Vec::new()
        }
        Err(e) => {
            warn!(resource, error = %e, "Dashboard fetch failed");
            failures.unauthorized |= e.is_unauthorized();
            failures.error.get_or_insert_with(|| e.to_string());
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biztrack_core::{DebtStatus, DeliveryStatus, PaymentMethod, SaleStatus};
    use chrono::Duration;

    fn product(id: &str, quantity: i64) -> Product {
        Product {
            id: id.to_string(),
            business_id: "b1".to_string(),
            name: format!("Product {id}"),
            sku: None,
            category: None,
            description: None,
            unit: "pcs".to_string(),
            price_cents: 1_000,
            cost_cents: 600,
            quantity,
            low_stock_threshold: 5,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sale(id: &str, total: i64) -> Sale {
        Sale {
            id: id.to_string(),
            business_id: "b1".to_string(),
            customer_name: None,
            status: SaleStatus::Completed,
            payment_method: PaymentMethod::Cash,
            total_cents: total,
            amount_paid_cents: total,
            notes: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            items: Vec::new(),
        }
    }

    fn debt(id: &str, amount: i64, paid: i64, due: Option<DateTime<Utc>>) -> Debt {
        Debt {
            id: id.to_string(),
            business_id: "b1".to_string(),
            customer_name: "Chidi".to_string(),
            customer_phone: None,
            sale_id: None,
            amount_cents: amount,
            amount_paid_cents: paid,
            status: DebtStatus::from_amounts(amount, paid),
            due_date: due,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            payments: Vec::new(),
        }
    }

    fn delivery(id: &str, status: DeliveryStatus) -> Delivery {
        Delivery {
            id: id.to_string(),
            business_id: "b1".to_string(),
            supplier_id: None,
            customer_name: Some("Ada".to_string()),
            address: None,
            status,
            scheduled_at: None,
            delivered_at: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Each fetch answers with whatever the test put in its slot.
    struct FakeSource {
        products: Fetched<Product>,
        sales: Fetched<Sale>,
        debts: Fetched<Debt>,
        deliveries: Fetched<Delivery>,
    }

    impl FakeSource {
        fn healthy() -> Self {
            FakeSource {
                products: Ok(ActionResponse::ok(vec![product("p1", 50), product("p2", 3)])),
                sales: Ok(ActionResponse::ok(vec![sale("s1", 2_500), sale("s2", 1_500)])),
                debts: Ok(ActionResponse::ok(vec![debt("d1", 4_000, 1_000, None)])),
                deliveries: Ok(ActionResponse::ok(vec![
                    delivery("v1", DeliveryStatus::Pending),
                    delivery("v2", DeliveryStatus::Delivered),
                ])),
            }
        }
    }

    #[async_trait]
    impl DashboardSource for FakeSource {
        async fn fetch_products(&self) -> Fetched<Product> {
            self.products.clone()
        }
        async fn fetch_sales(&self) -> Fetched<Sale> {
            self.sales.clone()
        }
        async fn fetch_debts(&self) -> Fetched<Debt> {
            self.debts.clone()
        }
        async fn fetch_deliveries(&self) -> Fetched<Delivery> {
            self.deliveries.clone()
        }
    }

    #[tokio::test]
    async fn test_all_succeed() {
        let state = load_dashboard(&FakeSource::healthy()).await;

        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert_eq!(state.products.len(), 2);
        assert_eq!(state.sales.len(), 2);
        assert_eq!(state.debts.len(), 1);
        assert_eq!(state.deliveries.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_envelope_empties_only_that_collection() {
        let source = FakeSource {
            debts: Ok(ActionResponse::fail("Database operation failed")),
            ..FakeSource::healthy()
        };

        let state = load_dashboard(&source).await;

        assert!(!state.is_loading);
        assert!(state.debts.is_empty());
        assert_eq!(state.products.len(), 2);
        assert_eq!(state.sales.len(), 2);
        assert_eq!(state.deliveries.len(), 2);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_sets_error() {
        let source = FakeSource {
            sales: Err(ClientError::Transport("connection refused".to_string())),
            deliveries: Err(ClientError::Unauthorized),
            ..FakeSource::healthy()
        };

        let state = load_dashboard(&source).await;

        assert!(!state.is_loading);
        assert!(state.sales.is_empty());
        assert!(state.deliveries.is_empty());
        assert_eq!(state.products.len(), 2);
        assert_eq!(state.error.as_deref(), Some("Request failed: connection refused"));
        assert!(state.unauthorized);
    }

    #[tokio::test]
    async fn test_plain_transport_failure_is_not_unauthorized() {
        let source = FakeSource {
            debts: Err(ClientError::Transport("timed out".to_string())),
            ..FakeSource::healthy()
        };

        let state = load_dashboard(&source).await;

        assert!(state.error.is_some());
        assert!(!state.unauthorized);
    }

    #[test]
    fn test_default_is_loading() {
        let state = DashboardState::default();
        assert!(state.is_loading);
        assert!(state.products.is_empty());
    }

    #[test]
    fn test_summary() {
        let now = Utc::now();
        let state = DashboardState {
            products: vec![product("p1", 50), product("p2", 3), product("p3", 5)],
            sales: vec![sale("s1", 2_500), sale("s2", 1_500)],
            debts: vec![
                debt("d1", 4_000, 1_000, Some(now - Duration::days(2))),
                debt("d2", 1_000, 1_000, Some(now - Duration::days(2))),
                debt("d3", 500, 0, Some(now + Duration::days(7))),
            ],
            deliveries: vec![
                delivery("v1", DeliveryStatus::Pending),
                delivery("v2", DeliveryStatus::InTransit),
                delivery("v3", DeliveryStatus::Delivered),
            ],
            is_loading: false,
            error: None,
            unauthorized: false,
        };

        let summary = state.summary(now);
        assert_eq!(summary.revenue, Money::from_cents(4_000));
        assert_eq!(summary.outstanding_debt, Money::from_cents(3_500));
        assert_eq!(summary.overdue_debts, 1);
        assert_eq!(summary.low_stock_count, 2);
        assert_eq!(summary.pending_deliveries, 2);
    }
}
