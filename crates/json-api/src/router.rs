//! App Router

use salvo::Router;

use crate::{activity, auth, backups, communities, healthcheck, observability::metrics_handler};

/// Routes that require a bearer token.
pub fn api_router() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(
            Router::with_path("communities")
                .get(communities::index::handler)
                .post(communities::create::handler)
                .push(
                    Router::with_path("{community}")
                        .get(communities::get::handler)
                        .put(communities::update::handler)
                        .delete(communities::delete::handler)
                        .push(
                            Router::with_path("delete-preview").get(communities::preview::handler),
                        ),
                )
                .push(Router::with_path("{backup}/restore").post(communities::restore::handler)),
        )
        .push(Router::with_path("backups/{backup}").get(backups::get::handler))
        .push(Router::with_path("admin/activity").get(activity::index::handler))
        .push(
            Router::with_path("admin/security/failed-logins")
                .get(activity::failed_logins::handler),
        )
}

pub fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(metrics_handler))
        .push(api_router())
}
