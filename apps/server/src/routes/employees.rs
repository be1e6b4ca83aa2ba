//! Employee actions. Adding an employee mails them an invitation link to
//! `{APP_URL}/signup`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::Router;
use biztrack_core::validation::Validate;
use biztrack_core::{Employee, EmployeeUpdate, NewEmployee};
use tracing::{error, info};
use url::Url;

use crate::auth::Session;
use crate::error::{respond, ActionError, ActionResult};
use crate::extract::ActionJson;
use crate::mailer::Email;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/employees", get(list_employees).post(create_employee))
        .route("/api/employees/{id}", put(update_employee).delete(delete_employee))
}

async fn list_employees(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> ActionResult<Vec<Employee>> {
    respond(state.db.employees().list(&session.business_id).await?)
}

async fn create_employee(
    State(state): State<Arc<AppState>>,
    session: Session,
    ActionJson(input): ActionJson<NewEmployee>,
) -> ActionResult<Employee> {
    input.validate()?;

    let business = state.db.businesses().get(&session.business_id).await?;
    let employee = state.db.employees().create(&session.business_id, input).await?;

    let link = invitation_link(&state.config.app_url, &employee)?;
    let message = Email::invitation(&employee.email, &employee.name, &business.name, link.as_str());

    // The record stands even if the mail API is down.
    match state.mailer.send(message).await {
        Ok(()) => info!(employee_id = %employee.id, "Invitation sent"),
        Err(e) => error!(employee_id = %employee.id, error = %e, "Failed to send invitation"),
    }

    respond(employee)
}

async fn update_employee(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    ActionJson(update): ActionJson<EmployeeUpdate>,
) -> ActionResult<Employee> {
    update.validate()?;
    let mut employee = state.db.employees().get(&session.business_id, &id).await?;
    update.apply(&mut employee);
    respond(state.db.employees().save(&employee).await?)
}

async fn delete_employee(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> ActionResult<()> {
    state.db.employees().delete(&session.business_id, &id).await?;
    respond(())
}

fn invitation_link(app_url: &str, employee: &Employee) -> Result<Url, ActionError> {
    Url::parse_with_params(
        &format!("{app_url}/signup"),
        &[("email", employee.email.as_str()), ("invite", employee.id.as_str())],
    )
    .map_err(|e| ActionError::internal(format!("Invalid APP_URL {app_url}: {e}")))
}
