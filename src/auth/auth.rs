use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::model::role::Role;
use crate::models::Claims;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl AuthUser {
    pub fn from_claims(claims: Claims) -> AppResult<Self> {
        let role = Role::from_id(claims.role)
            .ok_or_else(|| AppError::Unauthorized("Invalid role".into()))?;

        Ok(AuthUser {
            user_id: claims.user_id,
            username: claims.sub,
            role,
            employee_id: claims.employee_id,
        })
    }
}

fn authenticate(req: &HttpRequest) -> AppResult<AuthUser> {
    // Already resolved by auth_middleware
    if let Some(user) = req.extensions().get::<AuthUser>() {
        return Ok(user.clone());
    }

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing token".into()))?;

    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| AppError::Internal("Config missing".into()))?;

    let claims = verify_token(token, &config.jwt_secret)
        .map_err(|_| AppError::Unauthorized("Invalid token".into()))?;

    AuthUser::from_claims(claims)
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> AppResult<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin only".into()))
        }
    }

    pub fn require_hr_or_admin(&self) -> AppResult<()> {
        if self.role.is_back_office() {
            Ok(())
        } else {
            Err(AppError::Forbidden("HR/Admin only".into()))
        }
    }

    /// The linked employee id, required for leave self-service.
    pub fn require_employee(&self) -> AppResult<u64> {
        self.employee_id
            .ok_or_else(|| AppError::Forbidden("No employee profile".into()))
    }

    /// Back office sees everyone; others only themselves.
    pub fn can_view_employee(&self, employee_id: u64) -> bool {
        self.role.is_back_office() || self.employee_id == Some(employee_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TokenType;

    fn claims(role: u8) -> Claims {
        Claims {
            user_id: 7,
            sub: "asha".to_string(),
            role,
            exp: 0,
            jti: "jti-7".to_string(),
            token_type: TokenType::Access,
            employee_id: Some(1000),
        }
    }

    #[test]
    fn test_from_claims_keeps_identity() {
        let user = AuthUser::from_claims(claims(3)).unwrap();
        assert_eq!(user.user_id, 7);
        assert_eq!(user.username, "asha");
        assert_eq!(user.role, Role::Employee);
        assert_eq!(user.require_employee().unwrap(), 1000);
        assert!(user.can_view_employee(1000));
        assert!(!user.can_view_employee(1001));
    }

    #[test]
    fn test_from_claims_rejects_unknown_role() {
        assert!(matches!(
            AuthUser::from_claims(claims(9)),
            Err(AppError::Unauthorized(_))
        ));
    }
}
