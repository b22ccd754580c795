use std::fmt;
use std::str::FromStr;

use axum::http::StatusCode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tonic::Code;

/// The closed catalog of fault categories.
///
/// Each kind carries a stable string identifier and a fixed outcome on
/// both transports. Identifiers never change across releases; clients and
/// log queries match on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// The caller could not be authenticated.
    Authenticate,
    /// The record being created already exists.
    DbAlreadyExists,
    /// A connection to the database could not be established.
    DbConnection,
    /// The database connection was lost.
    DbDisconnection,
    /// A database statement failed.
    DbExecute,
    /// A lookup matched no row.
    DbRowNotFound,
    /// An update matched no row.
    DbUpdateNoEffect,
    /// A generic processing step failed.
    Execute,
    /// A connection to a downstream RPC service failed.
    GrpcConnection,
    /// A downstream RPC call was rejected.
    GrpcExecute,
    /// An argument failed validation.
    InvalidArgument,
    /// A value could not be serialized to JSON.
    JsonMarshal,
    /// A request body could not be parsed as JSON.
    JsonUnmarshal,
    /// A token could not be issued or verified.
    JwtExecute,
    /// The requested data does not exist.
    DataNotFound,
    /// The caller lacks permission for the operation.
    PermissionDeny,
    /// The server failed while handling the request.
    ServerExecute,
    /// A request variable is missing or malformed.
    Variable,
}

impl FaultKind {
    /// Every kind, in catalog order.
    pub const ALL: [Self; 18] = [
        Self::Authenticate,
        Self::DbAlreadyExists,
        Self::DbConnection,
        Self::DbDisconnection,
        Self::DbExecute,
        Self::DbRowNotFound,
        Self::DbUpdateNoEffect,
        Self::Execute,
        Self::GrpcConnection,
        Self::GrpcExecute,
        Self::InvalidArgument,
        Self::JsonMarshal,
        Self::JsonUnmarshal,
        Self::JwtExecute,
        Self::DataNotFound,
        Self::PermissionDeny,
        Self::ServerExecute,
        Self::Variable,
    ];

    /// The stable identifier of this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authenticate => "errAuthenticate",
            Self::DbAlreadyExists => "errDBAlreadyExists",
            Self::DbConnection => "errDBConnection",
            Self::DbDisconnection => "errDBDisConnection",
            Self::DbExecute => "errDBExecute",
            Self::DbRowNotFound => "errDBRowNotFound",
            Self::DbUpdateNoEffect => "errDBUpdateNoEffect",
            Self::Execute => "errExecute",
            Self::GrpcConnection => "errGRPCConnection",
            Self::GrpcExecute => "errGRPCExecute",
            Self::InvalidArgument => "errProcessInvalidArgument",
            Self::JsonMarshal => "errJSONMarshal",
            Self::JsonUnmarshal => "errJSONUnmarshal",
            Self::JwtExecute => "errJWTExecute",
            Self::DataNotFound => "errDataNotFound",
            Self::PermissionDeny => "errPermissionDeny",
            Self::ServerExecute => "errServerExecute",
            Self::Variable => "errVariable",
        }
    }

    /// HTTP status written by the request-pipeline boundary.
    pub const fn http_status(self) -> StatusCode {
        match self {
            Self::Authenticate => StatusCode::UNAUTHORIZED,
            Self::DbAlreadyExists => StatusCode::CONFLICT,
            Self::DbConnection | Self::DbDisconnection => StatusCode::SERVICE_UNAVAILABLE,
            Self::DbRowNotFound | Self::DbUpdateNoEffect | Self::DataNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::DbExecute | Self::Execute | Self::JsonMarshal | Self::ServerExecute => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::GrpcConnection => StatusCode::BAD_GATEWAY,
            Self::GrpcExecute => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidArgument | Self::JsonUnmarshal | Self::Variable => {
                StatusCode::BAD_REQUEST
            }
            Self::JwtExecute | Self::PermissionDeny => StatusCode::FORBIDDEN,
        }
    }

    /// RPC status code written by the RPC boundary.
    pub const fn rpc_code(self) -> Code {
        match self {
            Self::Authenticate => Code::Unauthenticated,
            Self::DbAlreadyExists => Code::AlreadyExists,
            Self::DbConnection | Self::DbDisconnection | Self::GrpcConnection => {
                Code::Unavailable
            }
            Self::DbRowNotFound | Self::DbUpdateNoEffect | Self::DataNotFound => Code::NotFound,
            Self::DbExecute | Self::Execute | Self::JsonMarshal | Self::ServerExecute => {
                Code::Internal
            }
            Self::GrpcExecute => Code::FailedPrecondition,
            Self::InvalidArgument | Self::JsonUnmarshal | Self::Variable => Code::InvalidArgument,
            Self::JwtExecute | Self::PermissionDeny => Code::PermissionDenied,
        }
    }

    /// Returns `true` if the fault reflects a backend that may recover on
    /// its own, so the caller may retry.
    pub const fn is_retryable(self) -> bool {
        matches!(self.rpc_code(), Code::Unavailable)
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown fault identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fault kind: {0}")]
pub struct UnknownFaultKind(pub String);

impl FromStr for FaultKind {
    type Err = UnknownFaultKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownFaultKind(s.to_owned()))
    }
}

impl Serialize for FaultKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FaultKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
