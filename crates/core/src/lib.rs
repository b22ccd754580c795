//! Fault taxonomy and dual-transport recovery for panicguard services.
//!
//! Collaborators wrap a failure into a [`Fault`] and raise it. The HTTP
//! [`RecoveryLayer`] or the [`RpcRecovery`] guard catches it, reports it
//! through an injected [`FaultSink`], and answers with the kind's mapped
//! HTTP status or RPC code.

pub mod fault;
pub mod kind;
pub mod recovery;
pub mod sentinel;
pub mod sink;

pub use fault::{BoxError, Fault, Raise, rpc_error_string};
pub use kind::{FaultKind, UnknownFaultKind};
pub use recovery::{
    INTERNAL_MESSAGE, Recovered, RecoveryLayer, RecoveryService, RpcRecovery, install_panic_hook,
};
pub use sentinel::Sentinel;
pub use sink::{FaultRecord, FaultSink, MemorySink, TracingSink};
