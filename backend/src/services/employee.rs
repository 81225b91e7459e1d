//! Employee records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{page_count, PageParams};

/// Employee service
#[derive(Clone)]
pub struct EmployeeService {
    db: PgPool,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub department: String,
    pub salary: Decimal,
    pub shift: String,
    pub contract_type: String,
    pub work_location: String,
    pub working_hours: i32,
    pub overtime_eligible: bool,
    pub emergency_contact: Option<String>,
    pub address: Option<String>,
    pub skills: Vec<String>,
    pub benefits: Vec<String>,
    pub certifications: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,

    #[validate(length(min = 1, message = "Position is required"))]
    pub position: String,

    #[validate(length(min = 1, message = "Department is required"))]
    pub department: String,

    pub salary: Decimal,

    #[validate(length(min = 1, message = "Shift is required"))]
    pub shift: String,

    #[validate(length(min = 1, message = "Contract type is required"))]
    pub contract_type: String,

    #[serde(default = "default_work_location")]
    pub work_location: String,

    #[serde(default = "default_working_hours")]
    pub working_hours: i32,

    #[serde(default)]
    pub overtime_eligible: bool,

    pub emergency_contact: Option<String>,
    pub address: Option<String>,

    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(default)]
    pub benefits: Vec<String>,

    #[serde(default)]
    pub certifications: Vec<String>,
}

fn default_work_location() -> String {
    "Head Office".to_string()
}

fn default_working_hours() -> i32 {
    40
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub salary: Option<Decimal>,
    pub shift: Option<String>,
    pub contract_type: Option<String>,
    pub work_location: Option<String>,
    pub working_hours: Option<i32>,
    pub overtime_eligible: Option<bool>,
    pub emergency_contact: Option<String>,
    pub address: Option<String>,
    pub skills: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    pub certifications: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct EmployeeListQuery {
    #[serde(flatten)]
    pub page: PageParams,
    pub q: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePage {
    pub employees: Vec<Employee>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

const EMPLOYEE_COLUMNS: &str = "id, name, email, phone, position, department, salary, shift, \
     contract_type, work_location, working_hours, overtime_eligible, emergency_contact, \
     address, skills, benefits, certifications, created_at, updated_at";

impl EmployeeService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateEmployeeInput) -> AppResult<Employee> {
        input.validate()?;
        if input.salary < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "salary".to_string(),
                message: "Salary cannot be negative".to_string(),
            });
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM employees WHERE email = $1)")
                .bind(&input.email)
                .fetch_one(&self.db)
                .await?;
        if exists {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        let employee = sqlx::query_as::<_, Employee>(&format!(
            r#"
            INSERT INTO employees
                (name, email, phone, position, department, salary, shift, contract_type,
                 work_location, working_hours, overtime_eligible, emergency_contact, address,
                 skills, benefits, certifications)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {EMPLOYEE_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.position)
        .bind(&input.department)
        .bind(input.salary)
        .bind(&input.shift)
        .bind(&input.contract_type)
        .bind(&input.work_location)
        .bind(input.working_hours)
        .bind(input.overtime_eligible)
        .bind(&input.emergency_contact)
        .bind(&input.address)
        .bind(&input.skills)
        .bind(&input.benefits)
        .bind(&input.certifications)
        .fetch_one(&self.db)
        .await?;

        Ok(employee)
    }

    pub async fn list(&self, query: &EmployeeListQuery) -> AppResult<EmployeePage> {
        let (page, limit) = query.page.resolve(20, 100);
        let search = query.q.as_ref().map(|q| format!("%{}%", q));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM employees
            WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1 OR position ILIKE $1)
              AND ($2::text IS NULL OR department = $2)
            "#,
        )
        .bind(&search)
        .bind(&query.department)
        .fetch_one(&self.db)
        .await?;

        let employees = sqlx::query_as::<_, Employee>(&format!(
            r#"
            SELECT {EMPLOYEE_COLUMNS} FROM employees
            WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1 OR position ILIKE $1)
              AND ($2::text IS NULL OR department = $2)
            ORDER BY name ASC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(&search)
        .bind(&query.department)
        .bind(i64::from(limit))
        .bind(PageParams::offset(page, limit))
        .fetch_all(&self.db)
        .await?;

        Ok(EmployeePage {
            employees,
            page,
            limit,
            total,
            total_pages: page_count(total, limit),
        })
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Employee> {
        sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee".to_string()))
    }

    pub async fn update(&self, id: Uuid, input: UpdateEmployeeInput) -> AppResult<Employee> {
        if input.salary.is_some_and(|s| s < Decimal::ZERO) {
            return Err(AppError::Validation {
                field: "salary".to_string(),
                message: "Salary cannot be negative".to_string(),
            });
        }

        sqlx::query_as::<_, Employee>(&format!(
            r#"
            UPDATE employees SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                position = COALESCE($4, position),
                department = COALESCE($5, department),
                salary = COALESCE($6, salary),
                shift = COALESCE($7, shift),
                contract_type = COALESCE($8, contract_type),
                work_location = COALESCE($9, work_location),
                working_hours = COALESCE($10, working_hours),
                overtime_eligible = COALESCE($11, overtime_eligible),
                emergency_contact = COALESCE($12, emergency_contact),
                address = COALESCE($13, address),
                skills = COALESCE($14, skills),
                benefits = COALESCE($15, benefits),
                certifications = COALESCE($16, certifications),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {EMPLOYEE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.position)
        .bind(&input.department)
        .bind(input.salary)
        .bind(&input.shift)
        .bind(&input.contract_type)
        .bind(&input.work_location)
        .bind(input.working_hours)
        .bind(input.overtime_eligible)
        .bind(&input.emergency_contact)
        .bind(&input.address)
        .bind(&input.skills)
        .bind(&input.benefits)
        .bind(&input.certifications)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Employee".to_string()));
        }
        Ok(())
    }
}
