use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use seedwatch_core::PeerEndpoint;

use crate::state::AppState;

/// Upper bound on a connectability check made on behalf of an HTTP caller,
/// including time spent waiting for a probe slot.
const CHECK_DEADLINE: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
pub struct ConnectableParams {
    pub ip: String,
    pub port: u16,
    #[serde(default)]
    pub agent: String,
}

#[derive(Debug, Serialize)]
pub struct ConnectableResponse {
    pub ip: String,
    pub port: u16,
    pub connectable: bool,
}

/// Report whether a peer accepts incoming connections.
///
/// Always answers 200; failures of any kind read as not connectable.
pub async fn check_connectable(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConnectableParams>,
) -> Json<ConnectableResponse> {
    let endpoint = PeerEndpoint::new(params.ip, params.port, params.agent);
    let connectable = state
        .checker()
        .is_connectable_within(&endpoint, CHECK_DEADLINE)
        .await;

    Json(ConnectableResponse {
        ip: endpoint.ip,
        port: endpoint.port,
        connectable,
    })
}
