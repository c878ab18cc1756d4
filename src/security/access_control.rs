//! Permission gate middleware.
//! Compares the role a path requires with the role the caller holds.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::http::server::AppState;
use crate::scripting::exchange::RequestInfo;
use crate::security::registry::Role;

/// Decides which role the caller of a request holds.
///
/// User accounts and sessions live outside this crate; implementors plug
/// them in here.
pub trait RoleResolver: Send + Sync {
    fn resolve(&self, req: &Request<Body>) -> Role;
}

impl<F> RoleResolver for F
where
    F: Fn(&Request<Body>) -> Role + Send + Sync,
{
    fn resolve(&self, req: &Request<Body>) -> Role {
        self(req)
    }
}

/// Treats every caller as anonymous.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousResolver;

impl RoleResolver for AnonymousResolver {
    fn resolve(&self, _req: &Request<Body>) -> Role {
        Role::Public
    }
}

/// Denied requests go to the deny dispatcher; the rest continue.
pub async fn permission_gate(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let required = state.registry.role(req.uri().path());
    if required == Role::Public {
        return next.run(req).await;
    }

    let granted = state.resolver.resolve(&req);
    if granted >= required {
        return next.run(req).await;
    }

    tracing::debug!(
        path = %req.uri().path(),
        required = %required,
        granted = %granted,
        "Permission denied"
    );
    state.deny.dispatch(RequestInfo::from_request(&req)).await
}
