//! Shared handler state, injected into the depot once per request.

use std::sync::Arc;

use townhall_app::context::AppContext;

/// The service handles every route works against.
#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
}

impl From<AppContext> for State {
    fn from(app: AppContext) -> Self {
        Self { app }
    }
}

impl State {
    pub(crate) fn shared(app: AppContext) -> Arc<Self> {
        Arc::new(app.into())
    }
}
