//! Auth service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{
    AuthServiceError, BearerToken,
    models::{AdminRecord, AdminUuid, ApiTokenMetadata, IssuedApiToken, NewAdmin, NewApiToken},
    repository::PgAuthRepository,
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    repository: PgAuthRepository,
}

impl PgAuthService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgAuthRepository::new(pool),
        }
    }

    /// Register an admin console user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::AlreadyExists`] when the email is taken.
    pub async fn create_admin(&self, admin: NewAdmin) -> Result<AdminRecord, AuthServiceError> {
        Ok(self.repository.create_admin(&admin).await?)
    }

    /// Issue a new API token for the given admin.
    ///
    /// # Errors
    ///
    /// Returns an error if the admin does not exist or the insert fails.
    pub async fn issue_api_token(
        &self,
        admin_uuid: AdminUuid,
    ) -> Result<IssuedApiToken, AuthServiceError> {
        self.repository
            .find_admin(admin_uuid)
            .await?
            .ok_or(AuthServiceError::AdminNotFound)?;

        let token = BearerToken::generate();

        let metadata = self
            .repository
            .create_api_token(&NewApiToken {
                uuid: token.uuid,
                admin_uuid,
                version: token.version,
                token_hash: token.verifier(admin_uuid),
            })
            .await?;

        Ok(IssuedApiToken {
            token: token.to_string(),
            metadata,
        })
    }

    /// List all tokens for the given admin.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_api_tokens(
        &self,
        admin_uuid: AdminUuid,
    ) -> Result<Vec<ApiTokenMetadata>, AuthServiceError> {
        Ok(self.repository.list_api_tokens_by_admin(admin_uuid).await?)
    }

    /// Revoke a token by UUID. Returns `true` if the token was active.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn revoke_api_token(&self, token_uuid: Uuid) -> Result<bool, AuthServiceError> {
        self.repository
            .revoke_api_token(token_uuid)
            .await
            .map(|record| record.is_some())
            .map_err(AuthServiceError::from)
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn authenticate_bearer(
        &self,
        bearer_token: &str,
    ) -> Result<AdminRecord, AuthServiceError> {
        let presented: BearerToken = bearer_token.parse().or(Err(AuthServiceError::NotFound))?;

        let stored = self
            .repository
            .find_active_api_token_by_uuid(presented.uuid, presented.version)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        if !presented.verifies(stored.admin.uuid, &stored.token_hash) {
            return Err(AuthServiceError::NotFound);
        }

        if let Err(error) = self
            .repository
            .touch_api_token_last_used(presented.uuid)
            .await
        {
            tracing::debug!(%error, "failed to record api token use");
        }

        Ok(stored.admin)
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a bearer token to the admin it was issued to.
    async fn authenticate_bearer(
        &self,
        bearer_token: &str,
    ) -> Result<AdminRecord, AuthServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{auth::permissions::Role, test::TestContext};

    use super::*;

    #[tokio::test]
    async fn issued_token_authenticates_as_its_admin() -> TestResult {
        let ctx = TestContext::new().await;

        let issued = ctx.auth.issue_api_token(ctx.admin.uuid).await?;
        let admin = ctx.auth.authenticate_bearer(&issued.token).await?;

        assert_eq!(admin.uuid, ctx.admin.uuid);
        assert_eq!(admin.role, Role::SuperAdmin);

        let tokens = ctx.auth.list_api_tokens(ctx.admin.uuid).await?;

        assert!(
            tokens.iter().any(|token| token.last_used_at.is_some()),
            "successful authentication should record last use"
        );

        Ok(())
    }

    #[tokio::test]
    async fn tampered_secret_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;

        let issued = ctx.auth.issue_api_token(ctx.admin.uuid).await?;
        let (id, _) = issued.token.split_once('.').ok_or("token has no secret")?;
        let tampered = format!("{id}.{}", "0".repeat(64));

        let result = ctx.auth.authenticate_bearer(&tampered).await;

        assert!(matches!(result, Err(AuthServiceError::NotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn revoked_token_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;

        let issued = ctx.auth.issue_api_token(ctx.admin.uuid).await?;

        assert!(ctx.auth.revoke_api_token(issued.metadata.uuid).await?);
        assert!(!ctx.auth.revoke_api_token(issued.metadata.uuid).await?);

        let result = ctx.auth.authenticate_bearer(&issued.token).await;

        assert!(matches!(result, Err(AuthServiceError::NotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn malformed_token_is_rejected() {
        let ctx = TestContext::new().await;

        let result = ctx.auth.authenticate_bearer("not-a-token").await;

        assert!(matches!(result, Err(AuthServiceError::NotFound)));
    }

    #[tokio::test]
    async fn duplicate_admin_email_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .auth
            .create_admin(NewAdmin {
                email: ctx.admin.email.clone(),
                role: Role::Support,
            })
            .await;

        assert!(matches!(result, Err(AuthServiceError::AlreadyExists)));

        Ok(())
    }

    #[tokio::test]
    async fn token_for_unknown_admin_is_rejected() {
        let ctx = TestContext::new().await;

        let result = ctx.auth.issue_api_token(AdminUuid::new()).await;

        assert!(matches!(result, Err(AuthServiceError::AdminNotFound)));
    }
}
