use std::error::Error;
use std::fmt;
use std::sync::Arc;

use axum::Json;
use axum::response::{IntoResponse, Response};
use tonic::Status;

use crate::kind::FaultKind;
use crate::sentinel::Sentinel;
use crate::sink::{FaultRecord, FaultSink};

/// Boxed cause carried by a [`Fault`].
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// A classified fault: a [`FaultKind`] wrapping the underlying cause.
///
/// A fault is created by a collaborator at the point of failure and then
/// either raised with [`Fault::raise`] (caught by a recovery boundary) or
/// returned as an ordinary error. The cause is fixed at construction; only
/// the subsystem label may be bound later, and only once.
#[derive(Debug)]
pub struct Fault {
    kind: FaultKind,
    cause: BoxError,
    system: Option<String>,
}

impl Fault {
    /// Wrap `cause` into a fault of the given kind. No system label is bound.
    pub fn new(kind: FaultKind, cause: impl Into<BoxError>) -> Self {
        Self {
            kind,
            cause: cause.into(),
            system: None,
        }
    }

    /// Bind the subsystem label. The first label wins; later calls are no-ops.
    pub fn set_system(&mut self, system: impl Into<String>) -> &mut Self {
        if self.system.is_none() {
            self.system = Some(system.into());
        }
        self
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    /// The stable identifier of this fault's kind.
    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// The wrapped cause, unmodified.
    pub fn error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.cause.as_ref()
    }

    /// Iterate the cause chain, starting with the wrapped cause.
    pub fn chain(&self) -> impl Iterator<Item = &(dyn Error + 'static)> {
        let first: &(dyn Error + 'static) = self.cause.as_ref();
        std::iter::successors(Some(first), |&err| err.source())
    }

    /// The innermost error of the cause chain.
    pub fn root_cause(&self) -> &(dyn Error + 'static) {
        self.chain().last().unwrap_or(self.cause.as_ref())
    }

    /// Returns `true` if any error in the cause chain equals `target`.
    pub fn is<E>(&self, target: &E) -> bool
    where
        E: Error + PartialEq + 'static,
    {
        self.chain()
            .any(|err| err.downcast_ref::<E>().is_some_and(|e| e == target))
    }

    /// Returns `true` if the cause chain holds `target` or a refinement of it.
    pub fn is_sentinel(&self, target: Sentinel) -> bool {
        self.chain()
            .any(|err| err.downcast_ref::<Sentinel>().is_some_and(|s| s.is(target)))
    }

    /// Emit one warning-level record through `sink`.
    pub fn report(&self, sink: &dyn FaultSink, message: &str) {
        self.report_as(sink, message, None);
    }

    /// Like [`Fault::report`], labelling the record with `fallback` when no
    /// system is bound on the fault itself.
    pub(crate) fn report_as(&self, sink: &dyn FaultSink, message: &str, fallback: Option<&str>) {
        sink.warn(FaultRecord {
            message: message.to_owned(),
            kind: self.kind,
            system: self.system.as_deref().or(fallback).map(str::to_owned),
            error: self.cause.to_string(),
            root: self.root_cause().to_string(),
        });
    }

    /// Build the HTTP response for this fault: the kind's status with the
    /// cause as error detail.
    pub fn translate_http(&self) -> Response {
        let body = serde_json::json!({
            "error": self.cause.to_string(),
            "kind": self.kind.as_str(),
        });
        (self.kind.http_status(), Json(body)).into_response()
    }

    /// Build the RPC status for this fault with the message
    /// `"<prefix>: <cause>"`.
    pub fn translate_rpc(&self, prefix: &str) -> Status {
        Status::new(self.kind.rpc_code(), prefixed(prefix, &self.cause))
    }

    /// Raise this fault as an abnormal termination of the current handler.
    ///
    /// The nearest recovery boundary catches it and translates it for its
    /// transport.
    pub fn raise(self) -> ! {
        std::panic::panic_any(self)
    }
}

macro_rules! constructors {
    ($($(#[$doc:meta])* $name:ident => $kind:ident,)*) => {
        impl Fault {
            $(
                $(#[$doc])*
                pub fn $name(cause: impl Into<BoxError>) -> Self {
                    Self::new(FaultKind::$kind, cause)
                }
            )*
        }
    };
}

constructors! {
    /// `errAuthenticate`
    authenticate => Authenticate,
    /// `errDBAlreadyExists`
    db_already_exists => DbAlreadyExists,
    /// `errDBConnection`
    db_connection => DbConnection,
    /// `errDBDisConnection`
    db_disconnection => DbDisconnection,
    /// `errDBExecute`
    db_execute => DbExecute,
    /// `errDBRowNotFound`
    db_row_not_found => DbRowNotFound,
    /// `errDBUpdateNoEffect`
    db_update_no_effect => DbUpdateNoEffect,
    /// `errExecute`
    execute => Execute,
    /// `errGRPCConnection`
    grpc_connection => GrpcConnection,
    /// `errGRPCExecute`
    grpc_execute => GrpcExecute,
    /// `errProcessInvalidArgument`
    invalid_argument => InvalidArgument,
    /// `errJSONMarshal`
    json_marshal => JsonMarshal,
    /// `errJSONUnmarshal`
    json_unmarshal => JsonUnmarshal,
    /// `errJWTExecute`
    jwt_execute => JwtExecute,
    /// `errDataNotFound`
    data_not_found => DataNotFound,
    /// `errPermissionDeny`
    permission_deny => PermissionDeny,
    /// `errServerExecute`
    server_execute => ServerExecute,
    /// `errVariable`
    variable => Variable,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[ERROR]: {}", self.cause)
    }
}

impl Error for Fault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.cause.as_ref())
    }
}

/// Marker attached to responses built from a returned (not raised) fault,
/// so the HTTP boundary can still report it.
#[derive(Debug, Clone)]
pub(crate) struct ReturnedFault(pub(crate) Arc<Fault>);

impl IntoResponse for Fault {
    fn into_response(self) -> Response {
        let mut response = self.translate_http();
        response
            .extensions_mut()
            .insert(ReturnedFault(Arc::new(self)));
        response
    }
}

/// Raise the error of a `Result` as a fault.
///
/// ```should_panic
/// use panicguard_core::{FaultKind, Raise};
///
/// let port = "eighty".parse::<u16>().or_raise(FaultKind::Variable);
/// # let _ = port;
/// ```
pub trait Raise<T, E> {
    /// Unwrap the value, or raise the error wrapped into a fault of `kind`.
    fn or_raise(self, kind: FaultKind) -> T;

    /// Unwrap the value, or raise the fault built from the error.
    fn or_raise_with<F>(self, f: F) -> T
    where
        F: FnOnce(E) -> Fault;
}

impl<T, E> Raise<T, E> for Result<T, E>
where
    E: Into<BoxError>,
{
    fn or_raise(self, kind: FaultKind) -> T {
        self.or_raise_with(|e| Fault::new(kind, e))
    }

    fn or_raise_with<F>(self, f: F) -> T
    where
        F: FnOnce(E) -> Fault,
    {
        match self {
            Ok(value) => value,
            Err(e) => f(e).raise(),
        }
    }
}

/// Render a status the way RPC clients print it:
/// `"rpc error: code = <Code> desc = <message>"`.
pub fn rpc_error_string(status: &Status) -> String {
    format!(
        "rpc error: code = {:?} desc = {}",
        status.code(),
        status.message()
    )
}

pub(crate) fn prefixed(prefix: &str, cause: &dyn fmt::Display) -> String {
    if prefix.is_empty() {
        cause.to_string()
    } else {
        format!("{prefix}: {cause}")
    }
}
