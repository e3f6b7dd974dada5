use axum::extract::{ConnectInfo, Request};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use std::net::SocketAddr;
use tracing::warn;

/// The Control Interface has no authentication — the loopback bind is
/// the entire trust boundary (§4.5). This rejects any request whose
/// reported peer address is not loopback, as a second line of defense
/// in case the listener is ever accidentally bound wider.
pub async fn loopback_only(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if !peer.ip().is_loopback() {
        warn!(%peer, "rejected control interface request from non-loopback peer");
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(next.run(request).await)
}
