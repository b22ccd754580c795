pub mod health;
pub mod storage;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use panicguard_core::{FaultSink, RecoveryLayer};
use panicguard_storage::FileStorage;

use crate::config::PanicguardConfig;

/// Shared application state for all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend the file routes run against.
    pub storage: Arc<dyn FileStorage>,
}

/// Build the application router.
///
/// Every route runs inside a [`RecoveryLayer`]: a handler that raises a
/// fault (or panics) is answered with the mapped status and reported
/// through `sink`.
pub fn router(state: AppState, config: &PanicguardConfig, sink: Arc<dyn FaultSink>) -> Router {
    let recovery = RecoveryLayer::new(
        config.recovery.system.clone(),
        config.recovery.message.clone(),
        sink,
    );

    Router::new()
        .route("/health", get(health::health))
        .route(
            &config.server.storage_route,
            get(storage::list)
                .post(storage::upload)
                .put(storage::publicize)
                .delete(storage::remove),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.server.max_body_bytes))
        .layer(recovery)
        .layer(TraceLayer::new_for_http())
}
