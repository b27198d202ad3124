// handlers/public/ping.rs - GET /ping handler

/// GET /ping - Liveness probe
pub async fn ping_get() -> &'static str {
    "pong"
}
