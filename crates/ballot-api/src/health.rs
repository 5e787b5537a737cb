//! Handler for `GET /`.

/// Plain-text readiness line.
pub const READY_MESSAGE: &str = "✅ Voting System Backend is running!";

/// `GET /`: liveness check, touches no storage.
pub async fn handler() -> &'static str { READY_MESSAGE }
