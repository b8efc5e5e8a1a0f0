use async_graphql::Context;

use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
};

/// Only employers and admins author tests.
pub fn require_author_role(claims: &Claims) -> AppResult<()> {
    if !claims.role.can_author() {
        return Err(AppError::Forbidden(
            "Only employers and admins can manage tests".to_string(),
        ));
    }
    Ok(())
}

pub fn is_owner_or_admin(claims: &Claims, resource_owner: &str) -> bool {
    claims.is_admin() || claims.sub == resource_owner
}

pub fn require_owner_or_admin(claims: &Claims, resource_owner: &str) -> AppResult<()> {
    if !is_owner_or_admin(claims, resource_owner) {
        return Err(AppError::Forbidden(
            "You are not the author of this test".to_string(),
        ));
    }
    Ok(())
}

pub fn extract_claims_from_context(ctx: &Context<'_>) -> AppResult<Claims> {
    ctx.data::<Claims>()
        .cloned()
        .map_err(|_| AppError::Unauthorized("Authentication required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::user::UserRole;

    fn create_test_claims(sub: &str, role: UserRole) -> Claims {
        Claims {
            sub: sub.to_string(),
            email: format!("{}@example.com", sub),
            role,
            iat: 0,
            exp: 9999999999,
        }
    }

    #[test]
    fn test_require_author_role() {
        assert!(require_author_role(&create_test_claims("e", UserRole::Employer)).is_ok());
        assert!(require_author_role(&create_test_claims("a", UserRole::Admin)).is_ok());
        assert!(matches!(
            require_author_role(&create_test_claims("s", UserRole::Student)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_require_owner_or_admin_as_owner() {
        let claims = create_test_claims("john", UserRole::Employer);
        assert!(require_owner_or_admin(&claims, "john").is_ok());
    }

    #[test]
    fn test_require_owner_or_admin_as_admin() {
        let claims = create_test_claims("admin", UserRole::Admin);
        assert!(require_owner_or_admin(&claims, "other_user").is_ok());
    }

    #[test]
    fn test_require_owner_or_admin_failure() {
        let claims = create_test_claims("john", UserRole::Employer);
        assert!(matches!(
            require_owner_or_admin(&claims, "jane"),
            Err(AppError::Forbidden(_))
        ));
    }
}
