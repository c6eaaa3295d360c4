//! Bearer token authentication middleware.

use std::sync::Arc;

use salvo::{http::header::AUTHORIZATION, prelude::*};
use serde_json::json;
use tracing::error;

use townhall_app::{
    auth::AuthServiceError,
    domain::audit::{data::NewAuditEntry, record_after_commit},
};

use crate::{errors::ApiError, extensions::*, state::State};

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(token) = extract_bearer_token(req) else {
        res.render(ApiError::unauthorized("No token provided"));
        ctrl.skip_rest();

        return;
    };

    let state = match depot.obtain_or_500::<Arc<State>>() {
        Ok(state) => state,
        Err(error) => {
            res.render(error);
            ctrl.skip_rest();

            return;
        }
    };

    let admin = match state.app.auth.authenticate_bearer(token).await {
        Ok(admin) => admin,
        Err(AuthServiceError::NotFound | AuthServiceError::Token(_)) => {
            let entry =
                NewAuditEntry::failed_login(req.client_ip(), req.user_agent(), "Invalid token")
                    .with_metadata(json!({
                        "method": req.method().as_str(),
                        "path": req.uri().path(),
                    }));

            record_after_commit(state.app.audit_logs.as_ref(), entry).await;

            res.render(ApiError::unauthorized("Invalid token"));
            ctrl.skip_rest();

            return;
        }
        Err(source) => {
            error!("failed to validate api token: {source}");

            res.render(ApiError::internal("Authentication failed"));
            ctrl.skip_rest();

            return;
        }
    };

    depot.insert_admin(admin);

    ctrl.call_next(req, depot, res).await;
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}
