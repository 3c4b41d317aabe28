use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::AppState;

/// Authorization claims attached to the caller by the invocation boundary.
#[derive(Debug, Clone, Default)]
pub struct CallerClaims {
    pub super_admin: bool,
    pub ip_whitelisted: bool,
}

/// Who is calling, as established by the transport. Read-only to the
/// provisioning workflow: the authorization gate consumes it, nothing
/// mutates it.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub authenticated: bool,
    pub claims: CallerClaims,
    pub caller_uid: String,
    pub caller_ip: String,
    pub user_agent: Option<String>,
}

/// Assemble the [`CallerContext`] for every request: bearer token claims,
/// source IP (x-forwarded-for wins over the socket address), IP whitelist
/// membership, user agent.
///
/// Never rejects on its own. An unauthenticated or unprivileged context is
/// recorded as such and the authorization gate turns it into a uniform
/// permission denial.
pub async fn caller_context_middleware(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    mut req: Request,
    next: Next,
) -> Response {
    let caller_ip = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| addr.ip().to_string());

    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let (authenticated, super_admin, caller_uid) = match token
        .and_then(|t| state.verifier.decode(t).ok())
    {
        Some(claims) => (true, claims.super_admin, claims.sub),
        None => (false, false, String::new()),
    };

    let ip_whitelisted = state
        .config
        .security
        .admin_ip_whitelist
        .iter()
        .any(|allowed| allowed == &caller_ip);

    let context = CallerContext {
        authenticated,
        claims: CallerClaims {
            super_admin,
            ip_whitelisted,
        },
        caller_uid,
        caller_ip,
        user_agent,
    };

    req.extensions_mut().insert(context);
    next.run(req).await
}
