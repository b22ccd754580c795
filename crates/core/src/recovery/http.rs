use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::Json;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::FutureExt;
use tower::{Layer, Service};

use super::{INTERNAL_MESSAGE, Recovered, report};
use crate::fault::ReturnedFault;
use crate::sink::FaultSink;

struct Boundary {
    system: String,
    message: String,
    sink: Arc<dyn FaultSink>,
}

/// Tower layer that installs the request-pipeline recovery boundary.
///
/// Every downstream call runs inside a recovery region. A raised
/// [`Fault`](crate::Fault) is bound to `system`, reported with `message` and
/// translated into its HTTP status; any other panic becomes a 500.
#[derive(Clone)]
pub struct RecoveryLayer {
    boundary: Arc<Boundary>,
}

impl RecoveryLayer {
    pub fn new(
        system: impl Into<String>,
        message: impl Into<String>,
        sink: Arc<dyn FaultSink>,
    ) -> Self {
        Self {
            boundary: Arc::new(Boundary {
                system: system.into(),
                message: message.into(),
                sink,
            }),
        }
    }
}

impl<S> Layer<S> for RecoveryLayer {
    type Service = RecoveryService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RecoveryService {
            inner,
            boundary: Arc::clone(&self.boundary),
        }
    }
}

/// Tower service that recovers raised faults from the wrapped service.
#[derive(Clone)]
pub struct RecoveryService<S> {
    inner: S,
    boundary: Arc<Boundary>,
}

impl<S> Service<Request<Body>> for RecoveryService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let boundary = Arc::clone(&self.boundary);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            // The inner `call` runs inside the region too, so panics raised
            // before the handler future is first polled are caught as well.
            let outcome = AssertUnwindSafe(async move { inner.call(req).await })
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(mut response)) => {
                    if let Some(ReturnedFault(fault)) =
                        response.extensions_mut().remove::<ReturnedFault>()
                    {
                        fault.report_as(
                            boundary.sink.as_ref(),
                            &boundary.message,
                            Some(&boundary.system),
                        );
                    }
                    Ok(response)
                }
                Ok(Err(e)) => Err(e),
                Err(payload) => {
                    let mut recovered = Recovered::from_payload(payload);
                    report(
                        &mut recovered,
                        boundary.sink.as_ref(),
                        &boundary.system,
                        &boundary.message,
                    );
                    Ok(respond(&recovered))
                }
            }
        })
    }
}

fn respond(recovered: &Recovered) -> Response {
    match recovered {
        Recovered::Fault(fault) => fault.translate_http(),
        Recovered::Other(_) => {
            let body = serde_json::json!({ "error": INTERNAL_MESSAGE });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
