//! Acting-user context extracted from request headers.
//!
//! The headers are set by the upstream auth layer after it authenticates the
//! session; the role matrix itself lives there, this service only enforces
//! the admin gate on destructive operations.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The acting user for role-gated operations.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub role: Role,
}

impl AuthContext {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("X-User-ID")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::AuthError(anyhow::anyhow!(
                    "Missing X-User-ID header (required from auth layer)"
                ))
            })?;

        // Absent or unrecognized role gets least privilege.
        let role = match parts
            .headers
            .get("X-User-Role")
            .and_then(|v| v.to_str().ok())
        {
            Some(r) if r.eq_ignore_ascii_case("admin") => Role::Admin,
            _ => Role::Staff,
        };

        let span = tracing::Span::current();
        span.record("user_id", user_id);
        span.record("role", role.as_str());

        Ok(AuthContext::new(user_id.to_string(), role))
    }
}
