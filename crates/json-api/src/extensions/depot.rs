//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::Depot;

use townhall_app::auth::{AdminRecord, has_permission};

use crate::errors::ApiError;

/// Helpers for reading request-scoped values out of the depot.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, ApiError>;

    fn insert_admin(&mut self, admin: AdminRecord);

    /// The authenticated admin, provided their role grants `permission`.
    fn authorize(&self, permission: &'static str) -> Result<&AdminRecord, ApiError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, ApiError> {
        self.obtain::<T>()
            .map_err(|_ignored| ApiError::internal("Internal Server Error"))
    }

    fn insert_admin(&mut self, admin: AdminRecord) {
        self.inject(admin);
    }

    fn authorize(&self, permission: &'static str) -> Result<&AdminRecord, ApiError> {
        let admin = self
            .obtain::<AdminRecord>()
            .map_err(|_ignored| ApiError::unauthorized("Authentication required"))?;

        if has_permission(admin.role, permission) {
            Ok(admin)
        } else {
            Err(ApiError::forbidden(permission, admin.role))
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use townhall_app::auth::{Role, permissions::permission};

    use crate::test_helpers::make_admin;

    use super::*;

    #[test]
    fn authorize_without_admin_is_unauthorized() {
        let depot = Depot::new();

        let result = depot.authorize(permission::READ_COMMUNITIES);

        assert!(
            matches!(result, Err(ApiError { status: StatusCode::UNAUTHORIZED, .. })),
            "expected 401, got {result:?}"
        );
    }

    #[test]
    fn authorize_checks_role_permissions() {
        let mut depot = Depot::new();

        depot.insert_admin(make_admin(Role::Admin));

        assert!(depot.authorize(permission::WRITE_COMMUNITIES).is_ok());

        let denied = depot.authorize(permission::DELETE_CRITICAL);

        assert!(
            matches!(denied, Err(ApiError { status: StatusCode::FORBIDDEN, .. })),
            "expected 403, got {denied:?}"
        );
    }
}
