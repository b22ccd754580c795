use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tonic::Status;

use super::{INTERNAL_MESSAGE, Recovered, report};
use crate::fault::prefixed;
use crate::sink::FaultSink;

/// RPC recovery boundary.
///
/// Wrap each handler body with [`RpcRecovery::guard`] (or
/// [`RpcRecovery::guard_async`] for async handlers). The guard runs at
/// every handler exit: a normal result passes through unchanged, a raised
/// [`Fault`](crate::Fault) becomes its mapped status with the message
/// `"<message>: <cause>"`, and any other panic becomes `Internal`.
///
/// ```
/// use panicguard_core::{Fault, MemorySink, RpcRecovery};
/// use std::sync::Arc;
///
/// let recovery = RpcRecovery::new("billing", "charge failed", Arc::new(MemorySink::new()));
/// let result: Result<(), _> = recovery.guard(|| Fault::variable("amount missing").raise());
/// let status = result.unwrap_err();
/// assert_eq!(status.code(), tonic::Code::InvalidArgument);
/// assert_eq!(status.message(), "charge failed: amount missing");
/// ```
#[derive(Clone)]
pub struct RpcRecovery {
    system: String,
    message: String,
    sink: Arc<dyn FaultSink>,
}

impl RpcRecovery {
    pub fn new(
        system: impl Into<String>,
        message: impl Into<String>,
        sink: Arc<dyn FaultSink>,
    ) -> Self {
        Self {
            system: system.into(),
            message: message.into(),
            sink,
        }
    }

    /// Run a synchronous handler body inside the boundary.
    pub fn guard<T, F>(&self, handler: F) -> Result<T, Status>
    where
        F: FnOnce() -> Result<T, Status>,
    {
        match std::panic::catch_unwind(AssertUnwindSafe(handler)) {
            Ok(result) => result,
            Err(payload) => Err(self.recover(payload)),
        }
    }

    /// Run an async handler body inside the boundary.
    pub async fn guard_async<T, Fut>(&self, handler: Fut) -> Result<T, Status>
    where
        Fut: Future<Output = Result<T, Status>>,
    {
        match AssertUnwindSafe(handler).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(self.recover(payload)),
        }
    }

    fn recover(&self, payload: Box<dyn Any + Send>) -> Status {
        let mut recovered = Recovered::from_payload(payload);
        report(
            &mut recovered,
            self.sink.as_ref(),
            &self.system,
            &self.message,
        );

        match recovered {
            Recovered::Fault(fault) => fault.translate_rpc(&self.message),
            Recovered::Other(_) => Status::internal(prefixed(&self.message, &INTERNAL_MESSAGE)),
        }
    }
}
