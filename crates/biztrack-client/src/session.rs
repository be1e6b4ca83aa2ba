//! # Client Session
//!
//! Everything a signed-in browser tab holds: the token, the current user,
//! the auth overlay and the entity stores.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ClientSession                                 │
//! │                                                                         │
//! │   signup ──► auth: signup → otp        (email captured)                 │
//! │   verify_otp ──► token + user, auth: otp → complete                     │
//! │   finish ──► overlay closed, Navigation                                 │
//! │   login ──► token + user, overlay closed, Navigation                    │
//! │                                                                         │
//! │   any action answering 401 ──► handle_unauthorized:                     │
//! │        token, user and stores dropped, overlay opened at login          │
//! │                                                                         │
//! │   logout ──► token, user and stores dropped, overlay reset              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Store writes follow the server: a store changes only after the action
//! succeeded, and only by the row the server sent back.

use biztrack_core::*;
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::dashboard::{load_dashboard, DashboardState};
use crate::error::{ClientError, ClientResult};
use crate::stores::Stores;

/// An auth action's envelope plus where the overlay wants to go next.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthOutcome<T> {
    pub response: ActionResponse<T>,
    pub navigation: Option<Navigation>,
}

#[derive(Debug, Clone)]
pub struct ClientSession {
    api: ApiClient,
    auth: AuthFlow,
    stores: Stores,
    current: Option<CurrentUser>,
}

impl ClientSession {
    pub fn new(api: ApiClient) -> Self {
        ClientSession {
            api,
            auth: AuthFlow::new(),
            stores: Stores::new(),
            current: None,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn auth(&self) -> &AuthFlow {
        &self.auth
    }

    pub fn auth_mut(&mut self) -> &mut AuthFlow {
        &mut self.auth
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.current.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.api.token().is_some()
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Creates the account. On success the overlay moves on to the OTP step.
    pub async fn signup(&mut self, req: &SignupRequest) -> ClientResult<AuthOutcome<CodeSent>> {
        let response = self.api.signup(req).await?;
        let mut navigation = None;

        if let (true, Some(sent)) = (response.success, &response.data) {
            self.auth.set_email(sent.email.clone());
            navigation = self.advance();
        }
        Ok(AuthOutcome {
            response,
            navigation,
        })
    }

    /// Verifies the code mailed to the captured email and signs in.
    pub async fn verify_otp(&mut self, code: &str) -> ClientResult<AuthOutcome<AuthSession>> {
        let req = VerifyOtpRequest {
            email: self.auth.email().unwrap_or_default().to_string(),
            code: code.to_string(),
        };
        let response = self.api.verify_otp(&req).await?;
        let mut navigation = None;

        if let (true, Some(session)) = (response.success, &response.data) {
            self.start(session);
            navigation = self.advance();
        }
        Ok(AuthOutcome {
            response,
            navigation,
        })
    }

    pub async fn resend_code(&mut self) -> ClientResult<ActionResponse<CodeSent>> {
        let req = ResendOtpRequest {
            email: self.auth.email().unwrap_or_default().to_string(),
            purpose: VerificationPurpose::Signup,
        };
        self.api.resend_otp(&req).await
    }

    /// Signs in. The overlay closes and navigates straight away.
    pub async fn login(&mut self, req: &LoginRequest) -> ClientResult<AuthOutcome<AuthSession>> {
        let response = self.api.login(req).await?;
        let mut navigation = None;

        if let (true, Some(session)) = (response.success, &response.data) {
            self.auth.set_email(session.user.email.clone());
            self.start(session);
            navigation = self.advance();
        }
        Ok(AuthOutcome {
            response,
            navigation,
        })
    }

    /// Leaves the "complete" screen.
    pub fn finish(&mut self) -> Option<Navigation> {
        self.auth.next_step()
    }

    pub fn logout(&mut self) {
        info!(
            user_id = self.current.as_ref().map(|c| c.user.id.as_str()).unwrap_or(""),
            "Signing out"
        );
        self.end();
        self.auth.close_auth();
    }

    /// The server no longer accepts the token. Drops the session and asks
    /// the user to sign in again, returning to `redirect_to` afterwards.
    pub fn handle_unauthorized(&mut self, redirect_to: Option<String>) {
        debug!(?redirect_to, "Session rejected, reopening login");
        self.end();
        self.auth.open_auth(AuthStep::Login, redirect_to);
    }

    /// Moves the overlay on, if it is showing.
    fn advance(&mut self) -> Option<Navigation> {
        if self.auth.is_open() {
            self.auth.next_step()
        } else {
            None
        }
    }

    fn start(&mut self, session: &AuthSession) {
        self.api.set_token(Some(session.token.clone()));
        self.current = Some(CurrentUser {
            user: session.user.clone(),
            business: session.business.clone(),
        });
        info!(user_id = %session.user.id, business_id = %session.business.id, "Signed in");
    }

    fn end(&mut self) {
        self.api.set_token(None);
        self.current = None;
        self.stores.clear_all();
    }

    fn guard<T>(&mut self, result: ClientResult<ActionResponse<T>>) -> ClientResult<ActionResponse<T>> {
        if matches!(result, Err(ClientError::Unauthorized)) {
            self.handle_unauthorized(None);
        }
        result
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Loads the dashboard and fills the matching stores with what came back.
    /// A 401 on any of the fetches ends the session like any other action.
    pub async fn refresh_dashboard(&mut self) -> DashboardState {
        let state = load_dashboard(&self.api).await;
        if state.unauthorized {
            self.handle_unauthorized(None);
            return state;
        }
        self.stores.products.set(state.products.clone());
        self.stores.sales.set(state.sales.clone());
        self.stores.debts.set(state.debts.clone());
        self.stores.deliveries.set(state.deliveries.clone());
        state
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub async fn load_products(&mut self) -> ClientResult<ActionResponse<Vec<Product>>> {
        let result = self.api.list_products().await;
        let response = self.guard(result)?;
        replace_all(&mut self.stores.products, &response);
        Ok(response)
    }

    pub async fn create_product(&mut self, input: &NewProduct) -> ClientResult<ActionResponse<Product>> {
        let result = self.api.create_product(input).await;
        let response = self.guard(result)?;
        added(&mut self.stores.products, &response);
        Ok(response)
    }

    pub async fn update_product(
        &mut self,
        id: &str,
        update: &ProductUpdate,
    ) -> ClientResult<ActionResponse<Product>> {
        let result = self.api.update_product(id, update).await;
        let response = self.guard(result)?;
        replaced(&mut self.stores.products, &response);
        Ok(response)
    }

    pub async fn adjust_stock(
        &mut self,
        id: &str,
        adjustment: &StockAdjustment,
    ) -> ClientResult<ActionResponse<Product>> {
        let result = self.api.adjust_stock(id, adjustment).await;
        let response = self.guard(result)?;
        replaced(&mut self.stores.products, &response);
        Ok(response)
    }

    pub async fn delete_product(&mut self, id: &str) -> ClientResult<ActionResponse<()>> {
        let result = self.api.delete_product(id).await;
        let response = self.guard(result)?;
        removed(&mut self.stores.products, id, &response);
        Ok(response)
    }

    // =========================================================================
    // Sales & Debts
    // =========================================================================

    /// Records a sale. A debt opened for the unpaid part lands in the debts
    /// store too.
    pub async fn record_sale(&mut self, input: &NewSale) -> ClientResult<ActionResponse<RecordedSale>> {
        let result = self.api.create_sale(input).await;
        let response = self.guard(result)?;
        if let (true, Some(recorded)) = (response.success, &response.data) {
            self.stores.sales.add(recorded.sale.clone());
            if let Some(debt) = &recorded.debt {
                self.stores.debts.add(debt.clone());
            }
        }
        Ok(response)
    }

    pub async fn delete_sale(&mut self, id: &str) -> ClientResult<ActionResponse<()>> {
        let result = self.api.delete_sale(id).await;
        let response = self.guard(result)?;
        removed(&mut self.stores.sales, id, &response);
        Ok(response)
    }

    pub async fn create_debt(&mut self, input: &NewDebt) -> ClientResult<ActionResponse<Debt>> {
        let result = self.api.create_debt(input).await;
        let response = self.guard(result)?;
        added(&mut self.stores.debts, &response);
        Ok(response)
    }

    pub async fn record_payment(
        &mut self,
        debt_id: &str,
        payment: &NewDebtPayment,
    ) -> ClientResult<ActionResponse<Debt>> {
        let result = self.api.add_debt_payment(debt_id, payment).await;
        let response = self.guard(result)?;
        replaced(&mut self.stores.debts, &response);
        Ok(response)
    }

    pub async fn update_debt(
        &mut self,
        id: &str,
        update: &DebtUpdate,
    ) -> ClientResult<ActionResponse<Debt>> {
        let result = self.api.update_debt(id, update).await;
        let response = self.guard(result)?;
        replaced(&mut self.stores.debts, &response);
        Ok(response)
    }

    pub async fn delete_debt(&mut self, id: &str) -> ClientResult<ActionResponse<()>> {
        let result = self.api.delete_debt(id).await;
        let response = self.guard(result)?;
        removed(&mut self.stores.debts, id, &response);
        Ok(response)
    }

    // =========================================================================
    // Deliveries, Production, Suppliers, Employees
    // =========================================================================

    pub async fn create_delivery(&mut self, input: &NewDelivery) -> ClientResult<ActionResponse<Delivery>> {
        let result = self.api.create_delivery(input).await;
        let response = self.guard(result)?;
        added(&mut self.stores.deliveries, &response);
        Ok(response)
    }

    pub async fn update_delivery(
        &mut self,
        id: &str,
        update: &DeliveryUpdate,
    ) -> ClientResult<ActionResponse<Delivery>> {
        let result = self.api.update_delivery(id, update).await;
        let response = self.guard(result)?;
        replaced(&mut self.stores.deliveries, &response);
        Ok(response)
    }

    pub async fn delete_delivery(&mut self, id: &str) -> ClientResult<ActionResponse<()>> {
        let result = self.api.delete_delivery(id).await;
        let response = self.guard(result)?;
        removed(&mut self.stores.deliveries, id, &response);
        Ok(response)
    }

    pub async fn load_productions(&mut self) -> ClientResult<ActionResponse<Vec<Production>>> {
        let result = self.api.list_productions().await;
        let response = self.guard(result)?;
        replace_all(&mut self.stores.productions, &response);
        Ok(response)
    }

    pub async fn create_production(
        &mut self,
        input: &NewProduction,
    ) -> ClientResult<ActionResponse<Production>> {
        let result = self.api.create_production(input).await;
        let response = self.guard(result)?;
        added(&mut self.stores.productions, &response);
        Ok(response)
    }

    pub async fn update_production(
        &mut self,
        id: &str,
        update: &ProductionUpdate,
    ) -> ClientResult<ActionResponse<Production>> {
        let result = self.api.update_production(id, update).await;
        let response = self.guard(result)?;
        replaced(&mut self.stores.productions, &response);
        Ok(response)
    }

    pub async fn delete_production(&mut self, id: &str) -> ClientResult<ActionResponse<()>> {
        let result = self.api.delete_production(id).await;
        let response = self.guard(result)?;
        removed(&mut self.stores.productions, id, &response);
        Ok(response)
    }

    pub async fn load_suppliers(&mut self) -> ClientResult<ActionResponse<Vec<Supplier>>> {
        let result = self.api.list_suppliers().await;
        let response = self.guard(result)?;
        replace_all(&mut self.stores.suppliers, &response);
        Ok(response)
    }

    pub async fn create_supplier(&mut self, input: &NewSupplier) -> ClientResult<ActionResponse<Supplier>> {
        let result = self.api.create_supplier(input).await;
        let response = self.guard(result)?;
        added(&mut self.stores.suppliers, &response);
        Ok(response)
    }

    pub async fn update_supplier(
        &mut self,
        id: &str,
        update: &SupplierUpdate,
    ) -> ClientResult<ActionResponse<Supplier>> {
        let result = self.api.update_supplier(id, update).await;
        let response = self.guard(result)?;
        replaced(&mut self.stores.suppliers, &response);
        Ok(response)
    }

    pub async fn delete_supplier(&mut self, id: &str) -> ClientResult<ActionResponse<()>> {
        let result = self.api.delete_supplier(id).await;
        let response = self.guard(result)?;
        removed(&mut self.stores.suppliers, id, &response);
        Ok(response)
    }

    pub async fn load_employees(&mut self) -> ClientResult<ActionResponse<Vec<Employee>>> {
        let result = self.api.list_employees().await;
        let response = self.guard(result)?;
        replace_all(&mut self.stores.employees, &response);
        Ok(response)
    }

    pub async fn invite_employee(&mut self, input: &NewEmployee) -> ClientResult<ActionResponse<Employee>> {
        let result = self.api.create_employee(input).await;
        let response = self.guard(result)?;
        added(&mut self.stores.employees, &response);
        Ok(response)
    }

    pub async fn update_employee(
        &mut self,
        id: &str,
        update: &EmployeeUpdate,
    ) -> ClientResult<ActionResponse<Employee>> {
        let result = self.api.update_employee(id, update).await;
        let response = self.guard(result)?;
        replaced(&mut self.stores.employees, &response);
        Ok(response)
    }

    pub async fn delete_employee(&mut self, id: &str) -> ClientResult<ActionResponse<()>> {
        let result = self.api.delete_employee(id).await;
        let response = self.guard(result)?;
        removed(&mut self.stores.employees, id, &response);
        Ok(response)
    }
}

// =============================================================================
// Store writes
// =============================================================================

fn replace_all<T: Entity + Clone>(store: &mut EntityStore<T>, response: &ActionResponse<Vec<T>>) {
    if let (true, Some(items)) = (response.success, &response.data) {
        store.set(items.clone());
    }
}

fn added<T: Entity + Clone>(store: &mut EntityStore<T>, response: &ActionResponse<T>) {
    if let (true, Some(item)) = (response.success, &response.data) {
        store.add(item.clone());
    }
}

fn replaced<T: Entity + Clone>(store: &mut EntityStore<T>, response: &ActionResponse<T>) {
    if let (true, Some(item)) = (response.success, &response.data) {
        store.update(item.id(), item.clone());
    }
}

fn removed<T: Entity>(store: &mut EntityStore<T>, id: &str, response: &ActionResponse<()>) {
    if response.success {
        store.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{delete, get, post, put};
    use axum::{Json, Router};
    use chrono::Utc;
    use serde_json::{json, Value};

    fn business() -> Business {
        Business {
            id: "b1".to_string(),
            name: "Amaka Foods".to_string(),
            owner_id: Some("u1".to_string()),
            currency: "NGN".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn auth_session() -> Value {
        let session = AuthSession {
            token: "token-123".to_string(),
            user: UserProfile {
                id: "u1".to_string(),
                business_id: "b1".to_string(),
                name: "Amaka".to_string(),
                email: "amaka@example.com".to_string(),
                role: Role::Owner,
                email_verified: true,
            },
            business: business(),
        };
        serde_json::to_value(ActionResponse::ok(session)).unwrap()
    }

    fn product_json(id: &str, quantity: i64) -> Value {
        json!({
            "id": id,
            "business_id": "b1",
            "name": "Rice",
            "sku": null,
            "category": null,
            "description": null,
            "unit": "bag",
            "price_cents": 65000,
            "cost_cents": 50000,
            "quantity": quantity,
            "low_stock_threshold": 5,
            "is_active": true,
            "created_at": Utc::now(),
            "updated_at": Utc::now(),
        })
    }

    fn supplier(name: &str) -> Value {
        serde_json::to_value(ActionResponse::ok(Supplier {
            id: "s1".to_string(),
            business_id: "b1".to_string(),
            name: name.to_string(),
            contact_name: None,
            email: None,
            phone: None,
            address: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }))
        .unwrap()
    }

    fn delivery() -> Value {
        serde_json::to_value(ActionResponse::ok(Delivery {
            id: "v1".to_string(),
            business_id: "b1".to_string(),
            supplier_id: None,
            customer_name: Some("Ada".to_string()),
            address: None,
            status: DeliveryStatus::Pending,
            scheduled_at: None,
            delivered_at: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }))
        .unwrap()
    }

    fn expired() -> (StatusCode, Json<Value>) {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "error": "Session expired, please sign in again" })),
        )
    }

    /// A server that accepts every auth call and knows one product. The
    /// supplier and debt lists answer as if the session had expired.
    async fn stub_server() -> String {
        let router = Router::new()
            .route(
                "/api/auth/signup",
                post(|| async {
                    Json(json!({ "success": true, "data": { "email": "amaka@example.com", "purpose": "signup" } }))
                }),
            )
            .route("/api/auth/verify-otp", post(|| async { Json(auth_session()) }))
            .route("/api/auth/login", post(|| async { Json(auth_session()) }))
            .route(
                "/api/products",
                get(|| async { Json(json!({ "success": true, "data": [product_json("p1", 10)] })) })
                    .post(|| async { Json(json!({ "success": true, "data": product_json("p2", 4) })) }),
            )
            .route(
                "/api/products/{id}/stock",
                post(|| async { Json(json!({ "success": true, "data": product_json("p1", 25) })) }),
            )
            .route(
                "/api/suppliers",
                get(|| async { expired() }).post(|| async { Json(supplier("Flour Mills")) }),
            )
            .route("/api/suppliers/{id}", put(|| async { Json(supplier("Flour Mills Ltd")) }))
            .route("/api/sales", get(|| async { Json(json!({ "success": true, "data": [] })) }))
            .route("/api/debts", get(|| async { expired() }))
            .route(
                "/api/deliveries",
                get(|| async { Json(json!({ "success": true, "data": [] })) })
                    .post(|| async { Json(delivery()) }),
            )
            .route(
                "/api/deliveries/{id}",
                delete(|| async { Json(json!({ "success": true })) }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn session() -> ClientSession {
        ClientSession::new(ApiClient::new(&stub_server().await).unwrap())
    }

    #[tokio::test]
    async fn test_signup_verify_finish() {
        let mut session = session().await;
        session
            .auth_mut()
            .open_auth(AuthStep::Signup, Some("/dashboard/sales".to_string()));

        let outcome = session
            .signup(&SignupRequest {
                name: "Amaka".to_string(),
                email: "amaka@example.com".to_string(),
                password: "correct-horse".to_string(),
                business_name: "Amaka Foods".to_string(),
                currency: "NGN".to_string(),
            })
            .await
            .unwrap();
        assert!(outcome.response.success);
        assert!(outcome.navigation.is_none());
        assert_eq!(session.auth().step(), AuthStep::Otp);
        assert_eq!(session.auth().email(), Some("amaka@example.com"));

        let outcome = session.verify_otp("ABC123").await.unwrap();
        assert!(outcome.navigation.is_none());
        assert_eq!(session.auth().step(), AuthStep::Complete);
        assert!(session.is_signed_in());
        assert_eq!(session.current_user().unwrap().business.name, "Amaka Foods");

        let nav = session.finish().unwrap();
        assert_eq!(nav.path, "/dashboard/sales");
        assert!(!session.auth().is_open());
    }

    #[tokio::test]
    async fn test_login_closes_overlay_immediately() {
        let mut session = session().await;
        session.auth_mut().open_auth(AuthStep::Login, None);

        let outcome = session
            .login(&LoginRequest {
                email: "amaka@example.com".to_string(),
                password: "correct-horse".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(session.api().token(), Some("token-123"));
        assert_eq!(outcome.navigation.unwrap().path, DEFAULT_REDIRECT_PATH);
        assert!(!session.auth().is_open());
    }

    #[tokio::test]
    async fn test_store_follows_successful_actions() {
        let mut session = session().await;

        session.load_products().await.unwrap();
        assert_eq!(session.stores().products.len(), 1);

        session
            .create_product(&NewProduct {
                name: "Beans".to_string(),
                sku: None,
                category: None,
                description: None,
                unit: "bag".to_string(),
                price_cents: 40_000,
                cost_cents: 0,
                quantity: 4,
                low_stock_threshold: None,
            })
            .await
            .unwrap();
        assert_eq!(session.stores().products.len(), 2);

        session
            .adjust_stock("p1", &StockAdjustment { delta: 15, reason: None })
            .await
            .unwrap();
        assert_eq!(session.stores().products.get("p1").unwrap().quantity, 25);
    }

    #[tokio::test]
    async fn test_unauthorized_drops_session_and_reopens_login() {
        let mut session = session().await;
        session
            .login(&LoginRequest {
                email: "amaka@example.com".to_string(),
                password: "correct-horse".to_string(),
            })
            .await
            .unwrap();
        session.load_products().await.unwrap();
        assert!(!session.stores().is_empty());

        let err = session.load_suppliers().await.unwrap_err();

        assert!(err.is_unauthorized());
        assert!(!session.is_signed_in());
        assert!(session.current_user().is_none());
        assert!(session.stores().is_empty());
        assert!(session.auth().is_open());
        assert_eq!(session.auth().step(), AuthStep::Login);
    }

    #[tokio::test]
    async fn test_update_and_remove_follow_the_server() {
        let mut session = session().await;

        session
            .create_supplier(&NewSupplier {
                name: "Flour Mills".to_string(),
                contact_name: None,
                email: None,
                phone: None,
                address: None,
                notes: None,
            })
            .await
            .unwrap();
        session
            .update_supplier(
                "s1",
                &SupplierUpdate {
                    name: Some("Flour Mills Ltd".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(session.stores().suppliers.len(), 1);
        assert_eq!(session.stores().suppliers.get("s1").unwrap().name, "Flour Mills Ltd");

        session
            .create_delivery(&NewDelivery {
                supplier_id: None,
                customer_name: Some("Ada".to_string()),
                address: None,
                status: DeliveryStatus::Pending,
                scheduled_at: None,
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(session.stores().deliveries.len(), 1);

        let response = session.delete_delivery("v1").await.unwrap();
        assert!(response.success);
        assert!(session.stores().deliveries.is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_unauthorized_drops_session() {
        let mut session = session().await;
        session
            .login(&LoginRequest {
                email: "amaka@example.com".to_string(),
                password: "correct-horse".to_string(),
            })
            .await
            .unwrap();
        session.load_products().await.unwrap();

        let state = session.refresh_dashboard().await;

        assert!(state.unauthorized);
        assert!(!state.is_loading);
        assert!(!session.is_signed_in());
        assert!(session.current_user().is_none());
        assert!(session.stores().is_empty());
        assert!(session.auth().is_open());
        assert_eq!(session.auth().step(), AuthStep::Login);
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let mut session = session().await;
        session.auth_mut().open_auth(AuthStep::Login, None);
        session
            .login(&LoginRequest {
                email: "amaka@example.com".to_string(),
                password: "correct-horse".to_string(),
            })
            .await
            .unwrap();
        session.load_products().await.unwrap();

        session.logout();

        assert!(!session.is_signed_in());
        assert!(session.stores().is_empty());
        assert_eq!(session.auth().step(), AuthStep::Signup);
        assert!(session.auth().email().is_none());
    }
}
