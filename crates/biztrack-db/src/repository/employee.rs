//! Employee CRUD. New employees start as `invited`; sending the invitation
//! email is the server's job.

use biztrack_core::{Employee, EmployeeStatus, NewEmployee};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::{expect_one, new_id};
use crate::error::{DbError, DbResult};

const SELECT_EMPLOYEE: &str = "SELECT id, business_id, name, email, phone, role, position, \
     salary_cents, status, invited_at, created_at, updated_at FROM employees";

#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    pub async fn list(&self, business_id: &str) -> DbResult<Vec<Employee>> {
        let sql = format!("{SELECT_EMPLOYEE} WHERE business_id = ?1 ORDER BY name");
        let employees = sqlx::query_as::<_, Employee>(&sql)
            .bind(business_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(employees)
    }

    pub async fn get(&self, business_id: &str, id: &str) -> DbResult<Employee> {
        let sql = format!("{SELECT_EMPLOYEE} WHERE id = ?1 AND business_id = ?2");
        sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .bind(business_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Employee", id))
    }

    pub async fn create(&self, business_id: &str, input: NewEmployee) -> DbResult<Employee> {
        let now = Utc::now();
        let employee = Employee {
            id: new_id(),
            business_id: business_id.to_string(),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            phone: input.phone,
            role: input.role,
            position: input.position,
            salary_cents: input.salary_cents,
            status: EmployeeStatus::Invited,
            invited_at: Some(now),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO employees
                (id, business_id, name, email, phone, role, position, salary_cents, status,
                 invited_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )
        .bind(&employee.id)
        .bind(&employee.business_id)
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(employee.role)
        .bind(&employee.position)
        .bind(employee.salary_cents)
        .bind(employee.status)
        .bind(employee.invited_at)
        .bind(employee.created_at)
        .bind(employee.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email", &employee.email),
            other => other,
        })?;

        debug!(id = %employee.id, "Employee created");
        Ok(employee)
    }

    pub async fn save(&self, employee: &Employee) -> DbResult<Employee> {
        let result = sqlx::query(
            "UPDATE employees SET
                name = ?1, phone = ?2, role = ?3, position = ?4, salary_cents = ?5,
                status = ?6, updated_at = ?7
             WHERE id = ?8 AND business_id = ?9",
        )
        .bind(&employee.name)
        .bind(&employee.phone)
        .bind(employee.role)
        .bind(&employee.position)
        .bind(employee.salary_cents)
        .bind(employee.status)
        .bind(Utc::now())
        .bind(&employee.id)
        .bind(&employee.business_id)
        .execute(&self.pool)
        .await?;

        expect_one(result, "Employee", &employee.id)?;
        self.get(&employee.business_id, &employee.id).await
    }

    pub async fn delete(&self, business_id: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?1 AND business_id = ?2")
            .bind(id)
            .bind(business_id)
            .execute(&self.pool)
            .await?;
        expect_one(result, "Employee", id)
    }
}
