//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use townhall_app::{
    auth::{AdminRecord, AdminUuid, MockAuthService, Role},
    context::AppContext,
    database::DatabaseError,
    domain::{
        audit::MockAuditLogService,
        communities::{
            MockCommunitiesService,
            records::{
                BlockLayout, CommunityLayout, CommunityRecord, CommunityUuid, SubscriptionStatus,
            },
        },
        deletion::MockCommunityDeletionService,
        dependents::{DependentCounts, DependentKind},
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_ADMIN_UUID: AdminUuid = AdminUuid::from_uuid(Uuid::nil());

/// Service mocks backing a test [`State`]. Any call without an expectation panics.
#[derive(Default)]
pub(crate) struct Mocks {
    pub communities: MockCommunitiesService,
    pub deletions: MockCommunityDeletionService,
    pub audit_logs: MockAuditLogService,
    pub auth: MockAuthService,
}

impl Mocks {
    pub(crate) fn into_state(self) -> Arc<State> {
        State::shared(AppContext {
            communities: Arc::new(self.communities),
            deletions: Arc::new(self.deletions),
            audit_logs: Arc::new(self.audit_logs),
            auth: Arc::new(self.auth),
        })
    }
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    Mocks {
        auth,
        ..Mocks::default()
    }
    .into_state()
}

/// Injects a fixed admin with the given role, standing in for the auth middleware.
struct InjectAdmin(Role);

#[handler]
impl InjectAdmin {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        depot.insert_admin(make_admin(self.0));
        ctrl.call_next(req, depot, res).await;
    }
}

/// A service running `route` against `mocks` as an admin with `role`.
pub(crate) fn service_as(role: Role, mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .hoop(InjectAdmin(role))
            .push(route),
    )
}

pub(crate) fn make_admin(role: Role) -> AdminRecord {
    AdminRecord {
        uuid: TEST_ADMIN_UUID,
        email: format!("{role}@townhall.test"),
        role,
        created_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_community(uuid: CommunityUuid) -> CommunityRecord {
    CommunityRecord {
        uuid,
        name: "Maple Court".to_string(),
        location: "12 Harbour Road".to_string(),
        subscription_plan: Some("standard".to_string()),
        subscription_status: SubscriptionStatus::Active,
        plan_starts_at: None,
        plan_ends_at: None,
        layout: CommunityLayout {
            blocks: vec![BlockLayout {
                name: "A".to_string(),
                floors: 4,
                units_per_floor: 6,
            }],
        },
        total_members: 30,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

/// Counts from the worked example: two residents, one worker, one manager,
/// two notifications and one payment.
pub(crate) fn example_counts() -> DependentCounts {
    let mut counts = DependentCounts::new();

    counts.set(DependentKind::Residents, 2);
    counts.set(DependentKind::Workers, 1);
    counts.set(DependentKind::CommunityManagers, 1);
    counts.set(DependentKind::Notifications, 2);
    counts.set(DependentKind::Payments, 1);

    counts
}

pub(crate) fn storage_error() -> DatabaseError {
    DatabaseError::PoolClosed
}
