//! # biztrack-client: Client-Side State for BizTrack
//!
//! Talks to the BizTrack server and keeps what a signed-in tab holds between
//! requests.
//!
//! ## Modules
//!
//! - [`api`] - `ApiClient`, one typed method per server action
//! - [`session`] - `ClientSession`: token, current user, auth overlay, stores
//! - [`stores`] - One `EntityStore` per resource
//! - [`dashboard`] - Concurrent dashboard load with partial-failure tolerance
//! - [`error`] - `ClientError`
//!
//! ## Example
//!
//! ```rust,no_run
//! use biztrack_client::{ApiClient, ClientSession};
//! use biztrack_core::{AuthStep, LoginRequest};
//!
//! # async fn run() -> Result<(), biztrack_client::ClientError> {
//! let mut session = ClientSession::new(ApiClient::new("http://localhost:3000")?);
//! session.auth_mut().open_auth(AuthStep::Login, Some("/dashboard/sales".into()));
//!
//! let outcome = session
//!     .login(&LoginRequest {
//!         email: "demo@biztrack.local".into(),
//!         password: "demo-password".into(),
//!     })
//!     .await?;
//!
//! if let Some(nav) = outcome.navigation {
//!     println!("go to {}", nav.path);
//! }
//! let dashboard = session.refresh_dashboard().await;
//! println!("{} products", dashboard.products.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod dashboard;
pub mod error;
pub mod session;
pub mod stores;

pub use api::ApiClient;
pub use dashboard::{load_dashboard, DashboardSource, DashboardState, DashboardSummary};
pub use error::{ClientError, ClientResult};
pub use session::{AuthOutcome, ClientSession};
pub use stores::Stores;
