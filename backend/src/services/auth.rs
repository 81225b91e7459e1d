//! Authentication and user management service

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::Claims;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt: JwtConfig,
}

/// Registration request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, message = "Department is required"))]
    pub department: String,

    #[serde(default)]
    pub level: String,

    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// User representation returned to clients (no password hash)
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub department: String,
    pub level: String,
    pub role: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, sqlx::FromRow)]
struct UserCredentials {
    id: Uuid,
    password_hash: String,
    role: String,
    approved: bool,
}

const USER_COLUMNS: &str = "id, name, email, department, level, role, approved, created_at";

impl AuthService {
    pub fn new(db: PgPool, jwt: JwtConfig) -> Self {
        Self { db, jwt }
    }

    /// Register a new user. Accounts start unapproved and cannot log in
    /// until an administrator approves them.
    pub async fn register(&self, input: RegisterInput) -> AppResult<UserResponse> {
        input.validate()?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(&input.email)
                .fetch_one(&self.db)
                .await?;
        if exists {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        let password_hash = hash(&input.password, DEFAULT_COST)?;

        let user = sqlx::query_as::<_, UserResponse>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, department, level, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(&input.department)
        .bind(&input.level)
        .bind(&input.role)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(user_id = %user.id, "registered user");
        Ok(user)
    }

    pub async fn login(&self, input: LoginInput) -> AppResult<AuthResponse> {
        input.validate()?;

        let credentials = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, password_hash, role, approved FROM users WHERE email = $1",
        )
        .bind(&input.email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        if !verify(&input.password, &credentials.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }
        if !credentials.approved {
            return Err(AppError::ValidationError(
                "Account is pending approval".to_string(),
            ));
        }

        let token = issue_token(&self.jwt, credentials.id, &credentials.role)?;
        let user = self.get_user(credentials.id).await?;

        Ok(AuthResponse { token, user })
    }

    pub async fn get_user(&self, id: Uuid) -> AppResult<UserResponse> {
        sqlx::query_as::<_, UserResponse>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    pub async fn list_users(&self) -> AppResult<Vec<UserResponse>> {
        let users = sqlx::query_as::<_, UserResponse>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    pub async fn set_approval(&self, id: Uuid, approved: bool) -> AppResult<UserResponse> {
        sqlx::query_as::<_, UserResponse>(&format!(
            r#"
            UPDATE users SET approved = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(approved)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
    }
}

fn issue_token(jwt: &JwtConfig, user_id: Uuid, role: &str) -> AppResult<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        iat: now,
        exp: now + jwt.access_token_expiry,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt.secret.as_bytes()),
    )?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    #[test]
    fn issued_token_round_trips() {
        let jwt = JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry: 3600,
        };
        let user_id = Uuid::new_v4();
        let token = issue_token(&jwt, user_id, "admin").unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(jwt.secret.as_bytes()),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(decoded.claims.sub, user_id);
        assert_eq!(decoded.claims.role, "admin");
        assert_eq!(decoded.claims.exp - decoded.claims.iat, 3600);
    }

    #[test]
    fn register_input_validation() {
        let input = RegisterInput {
            name: "".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            department: "Procurement".to_string(),
            level: "".to_string(),
            role: "staff".to_string(),
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
