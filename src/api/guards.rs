use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::types::UserRole;

/// The resolved `{email, role, companyId}` triple carried by the session token.
#[derive(Debug, Clone)]
pub(crate) struct Identity {
    pub(crate) email: String,
    pub(crate) role: UserRole,
    pub(crate) company_id: Option<String>,
}

impl Identity {
    /// Company a request acts for. Company users are pinned to their own
    /// company; staff must name one explicitly.
    pub(crate) fn resolve_company(&self, requested: Option<&str>) -> Result<String, ApiError> {
        let requested = requested.map(str::trim).filter(|value| !value.is_empty());

        if self.role.is_staff() {
            return requested
                .map(str::to_string)
                .ok_or_else(|| ApiError::BadRequest("companyId is required".to_string()));
        }

        let own =
            self.company_id.as_deref().ok_or(ApiError::Forbidden("Company account required"))?;
        match requested {
            Some(other) if other != own => {
                Err(ApiError::Forbidden("Access to this company is not allowed"))
            }
            _ => Ok(own.to_string()),
        }
    }

    /// Staff see every company; company users only their own.
    pub(crate) fn ensure_company_access(&self, company_id: &str) -> Result<(), ApiError> {
        if self.role.is_staff() || self.company_id.as_deref() == Some(company_id) {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Access to this company is not allowed"))
        }
    }
}

pub(crate) struct CurrentUser(pub(crate) Identity);
pub(crate) struct StaffUser(pub(crate) Identity);
pub(crate) struct AdminUser(pub(crate) Identity);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(token, app_state.settings())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

        let company_id = claims.company_id.filter(|value| !value.trim().is_empty());
        if claims.role == UserRole::Firma && company_id.is_none() {
            return Err(ApiError::Forbidden("Company account required"));
        }

        Ok(CurrentUser(Identity { email: claims.sub, role: claims.role, company_id }))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for StaffUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(identity) = CurrentUser::from_request_parts(parts, state).await?;

        if identity.role.is_staff() {
            Ok(StaffUser(identity))
        } else {
            Err(ApiError::Forbidden("Staff access required"))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(identity) = CurrentUser::from_request_parts(parts, state).await?;

        if identity.role.is_admin() {
            Ok(AdminUser(identity))
        } else {
            Err(ApiError::Forbidden("Admin access required"))
        }
    }
}

/// Per-user fixed window for bulk mutations. Redis errors let the call through.
pub(crate) async fn enforce_bulk_rate_limit(
    state: &AppState,
    identity: &Identity,
) -> Result<(), ApiError> {
    let bulk = state.settings().bulk();
    let allowed = state
        .redis()
        .rate_limit("bulk", &identity.email, bulk.rate_limit, bulk.rate_window_seconds)
        .await
        .unwrap_or(true);

    if allowed {
        Ok(())
    } else {
        Err(ApiError::TooManyRequests("Bulk operation rate limit exceeded"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: UserRole, company_id: Option<&str>) -> Identity {
        Identity {
            email: "someone@portal.example".to_string(),
            role,
            company_id: company_id.map(str::to_string),
        }
    }

    #[test]
    fn firma_is_pinned_to_own_company() {
        let firma = identity(UserRole::Firma, Some("c-1"));
        assert_eq!(firma.resolve_company(None).unwrap(), "c-1");
        assert_eq!(firma.resolve_company(Some("c-1")).unwrap(), "c-1");
        assert!(matches!(firma.resolve_company(Some("c-2")), Err(ApiError::Forbidden(_))));
        assert!(firma.ensure_company_access("c-2").is_err());
    }

    #[test]
    fn staff_must_name_a_company() {
        let consultant = identity(UserRole::Consultant, None);
        assert!(matches!(consultant.resolve_company(None), Err(ApiError::BadRequest(_))));
        assert_eq!(consultant.resolve_company(Some(" c-9 ")).unwrap(), "c-9");
        assert!(consultant.ensure_company_access("c-9").is_ok());
    }
}
