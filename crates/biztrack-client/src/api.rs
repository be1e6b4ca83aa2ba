//! # Action Client
//!
//! One method per server action. Every method answers with the action's
//! envelope; only transport problems, decode problems and 401s become a
//! [`ClientError`].
//!
//! ```text
//! ApiClient::list_products()
//!     │  GET {base}/api/products   Authorization: Bearer <token>
//!     ▼
//!   401 ───────────────► Err(ClientError::Unauthorized)
//!   unreadable body ───► Err(ClientError::Decode)
//!   otherwise ─────────► Ok(ActionResponse<Vec<Product>>)
//! ```

use biztrack_core::*;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Client for the server at `base_url`, e.g. `http://localhost:3000`.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> ClientResult<Self> {
        let parsed = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "unsupported scheme {}",
                parsed.scheme()
            )));
        }

        Ok(ApiClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    // =========================================================================
    // Auth
    // =========================================================================

    pub async fn signup(&self, req: &SignupRequest) -> ClientResult<ActionResponse<CodeSent>> {
        self.post("/api/auth/signup", req).await
    }

    pub async fn verify_otp(
        &self,
        req: &VerifyOtpRequest,
    ) -> ClientResult<ActionResponse<AuthSession>> {
        self.post("/api/auth/verify-otp", req).await
    }

    pub async fn resend_otp(&self, req: &ResendOtpRequest) -> ClientResult<ActionResponse<CodeSent>> {
        self.post("/api/auth/resend-otp", req).await
    }

    pub async fn login(&self, req: &LoginRequest) -> ClientResult<ActionResponse<AuthSession>> {
        self.post("/api/auth/login", req).await
    }

    pub async fn forgot_password(
        &self,
        req: &ForgotPasswordRequest,
    ) -> ClientResult<ActionResponse<CodeSent>> {
        self.post("/api/auth/forgot-password", req).await
    }

    pub async fn reset_password(
        &self,
        req: &ResetPasswordRequest,
    ) -> ClientResult<ActionResponse<()>> {
        self.post("/api/auth/reset-password", req).await
    }

    pub async fn me(&self) -> ClientResult<ActionResponse<CurrentUser>> {
        self.get("/api/auth/me").await
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub async fn list_products(&self) -> ClientResult<ActionResponse<Vec<Product>>> {
        self.get("/api/products").await
    }

    pub async fn low_stock_products(&self) -> ClientResult<ActionResponse<Vec<Product>>> {
        self.get("/api/products?low_stock=true").await
    }

    pub async fn get_product(&self, id: &str) -> ClientResult<ActionResponse<Product>> {
        self.get(&format!("/api/products/{id}")).await
    }

    pub async fn create_product(&self, input: &NewProduct) -> ClientResult<ActionResponse<Product>> {
        self.post("/api/products", input).await
    }

    pub async fn update_product(
        &self,
        id: &str,
        update: &ProductUpdate,
    ) -> ClientResult<ActionResponse<Product>> {
        self.put(&format!("/api/products/{id}"), update).await
    }

    pub async fn delete_product(&self, id: &str) -> ClientResult<ActionResponse<()>> {
        self.delete(&format!("/api/products/{id}")).await
    }

    pub async fn adjust_stock(
        &self,
        id: &str,
        adjustment: &StockAdjustment,
    ) -> ClientResult<ActionResponse<Product>> {
        self.post(&format!("/api/products/{id}/stock"), adjustment).await
    }

    // =========================================================================
    // Sales & Debts
    // =========================================================================

    pub async fn list_sales(&self) -> ClientResult<ActionResponse<Vec<Sale>>> {
        self.get("/api/sales").await
    }

    pub async fn create_sale(&self, input: &NewSale) -> ClientResult<ActionResponse<RecordedSale>> {
        self.post("/api/sales", input).await
    }

    pub async fn delete_sale(&self, id: &str) -> ClientResult<ActionResponse<()>> {
        self.delete(&format!("/api/sales/{id}")).await
    }

    pub async fn list_debts(&self) -> ClientResult<ActionResponse<Vec<Debt>>> {
        self.get("/api/debts").await
    }

    pub async fn create_debt(&self, input: &NewDebt) -> ClientResult<ActionResponse<Debt>> {
        self.post("/api/debts", input).await
    }

    pub async fn update_debt(
        &self,
        id: &str,
        update: &DebtUpdate,
    ) -> ClientResult<ActionResponse<Debt>> {
        self.put(&format!("/api/debts/{id}"), update).await
    }

    pub async fn delete_debt(&self, id: &str) -> ClientResult<ActionResponse<()>> {
        self.delete(&format!("/api/debts/{id}")).await
    }

    pub async fn add_debt_payment(
        &self,
        debt_id: &str,
        payment: &NewDebtPayment,
    ) -> ClientResult<ActionResponse<Debt>> {
        self.post(&format!("/api/debts/{debt_id}/payments"), payment).await
    }

    // =========================================================================
    // Deliveries, Production, Suppliers, Employees
    // =========================================================================

    pub async fn list_deliveries(&self) -> ClientResult<ActionResponse<Vec<Delivery>>> {
        self.get("/api/deliveries").await
    }

    pub async fn create_delivery(&self, input: &NewDelivery) -> ClientResult<ActionResponse<Delivery>> {
        self.post("/api/deliveries", input).await
    }

    pub async fn update_delivery(
        &self,
        id: &str,
        update: &DeliveryUpdate,
    ) -> ClientResult<ActionResponse<Delivery>> {
        self.put(&format!("/api/deliveries/{id}"), update).await
    }

    pub async fn delete_delivery(&self, id: &str) -> ClientResult<ActionResponse<()>> {
        self.delete(&format!("/api/deliveries/{id}")).await
    }

    pub async fn list_productions(&self) -> ClientResult<ActionResponse<Vec<Production>>> {
        self.get("/api/productions").await
    }

    pub async fn create_production(
        &self,
        input: &NewProduction,
    ) -> ClientResult<ActionResponse<Production>> {
        self.post("/api/productions", input).await
    }

    pub async fn update_production(
        &self,
        id: &str,
        update: &ProductionUpdate,
    ) -> ClientResult<ActionResponse<Production>> {
        self.put(&format!("/api/productions/{id}"), update).await
    }

    pub async fn delete_production(&self, id: &str) -> ClientResult<ActionResponse<()>> {
        self.delete(&format!("/api/productions/{id}")).await
    }

    pub async fn list_suppliers(&self) -> ClientResult<ActionResponse<Vec<Supplier>>> {
        self.get("/api/suppliers").await
    }

    pub async fn create_supplier(&self, input: &NewSupplier) -> ClientResult<ActionResponse<Supplier>> {
        self.post("/api/suppliers", input).await
    }

    pub async fn update_supplier(
        &self,
        id: &str,
        update: &SupplierUpdate,
    ) -> ClientResult<ActionResponse<Supplier>> {
        self.put(&format!("/api/suppliers/{id}"), update).await
    }

    pub async fn delete_supplier(&self, id: &str) -> ClientResult<ActionResponse<()>> {
        self.delete(&format!("/api/suppliers/{id}")).await
    }

    pub async fn list_employees(&self) -> ClientResult<ActionResponse<Vec<Employee>>> {
        self.get("/api/employees").await
    }

    pub async fn create_employee(&self, input: &NewEmployee) -> ClientResult<ActionResponse<Employee>> {
        self.post("/api/employees", input).await
    }

    pub async fn update_employee(
        &self,
        id: &str,
        update: &EmployeeUpdate,
    ) -> ClientResult<ActionResponse<Employee>> {
        self.put(&format!("/api/employees/{id}"), update).await
    }

    pub async fn delete_employee(&self, id: &str) -> ClientResult<ActionResponse<()>> {
        self.delete(&format!("/api/employees/{id}")).await
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ActionResponse<T>> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ActionResponse<T>> {
        self.send(self.request(Method::DELETE, path)).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<ActionResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    async fn put<B, T>(&self, path: &str, body: &B) -> ClientResult<ActionResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> ClientResult<ActionResponse<T>> {
        let response = request.send().await?;
        let status = response.status();
        debug!(url = %response.url(), %status, "Action response");

        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Decode(format!("HTTP {status}: {e}")))
    }
}
