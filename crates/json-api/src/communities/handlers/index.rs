//! List Communities Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use townhall_app::auth::permissions::permission;

use crate::{
    communities::{errors::from_communities_error, responses::CommunityResponse},
    errors::ApiError,
    extensions::*,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CommunitiesResponse {
    pub success: bool,
    pub communities: Vec<CommunityResponse>,
}

/// List Communities Handler
///
/// Newest first.
#[endpoint(
    tags("communities"),
    summary = "List Communities",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CommunitiesResponse>, ApiError> {
    depot.authorize(permission::READ_COMMUNITIES)?;

    let state = depot.obtain_or_500::<Arc<State>>()?;

    let communities = state
        .app
        .communities
        .list_communities()
        .await
        .map_err(|error| from_communities_error(error, "Failed to get communities"))?;

    Ok(Json(CommunitiesResponse {
        success: true,
        communities: communities.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use townhall_app::{
        auth::Role,
        domain::communities::{CommunitiesServiceError, records::CommunityUuid},
    };

    use crate::test_helpers::{Mocks, make_community, service_as, storage_error};

    use super::*;

    fn make_service(role: Role, mocks: Mocks) -> Service {
        service_as(role, mocks, Router::with_path("communities").get(handler))
    }

    #[tokio::test]
    async fn test_index_returns_communities() -> TestResult {
        let first = make_community(CommunityUuid::new());
        let second = make_community(CommunityUuid::new());
        let expected = vec![first.uuid.into_uuid(), second.uuid.into_uuid()];

        let mut mocks = Mocks::default();

        mocks
            .communities
            .expect_list_communities()
            .once()
            .return_once(move || Ok(vec![first, second]));

        let mut res = TestClient::get("http://example.com/communities")
            .send(&make_service(Role::Support, mocks))
            .await;

        let body: CommunitiesResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.success, "expected success flag");
        assert_eq!(
            body.communities.iter().map(|c| c.id).collect::<Vec<_>>(),
            expected
        );

        let first = body.communities.first().ok_or("missing community")?;

        assert_eq!(first.total_units, 24);
        assert_eq!(first.subscription_status, "active");

        Ok(())
    }

    #[tokio::test]
    async fn test_index_storage_failure_returns_500() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .communities
            .expect_list_communities()
            .once()
            .return_once(|| Err(CommunitiesServiceError::Sql(storage_error())));

        let res = TestClient::get("http://example.com/communities")
            .send(&make_service(Role::Admin, mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));

        Ok(())
    }
}
