//! Recovery boundaries: one per transport.
//!
//! A boundary wraps a handler invocation, catches an unwinding [`Fault`]
//! and turns it into the transport's native failure. Anything else that
//! unwinds through a boundary degrades to a generic internal error.

pub mod http;
pub mod rpc;

use std::any::Any;

use crate::fault::Fault;
use crate::kind::FaultKind;
use crate::sink::FaultSink;

pub use self::http::{RecoveryLayer, RecoveryService};
pub use self::rpc::RpcRecovery;

/// Generic detail returned to callers for unrecognized failures.
pub const INTERNAL_MESSAGE: &str = "internal server error";

/// Kind recorded for panics that do not carry a [`Fault`].
pub const UNCLASSIFIED_KIND: FaultKind = FaultKind::Execute;

/// What a boundary caught.
#[derive(Debug)]
pub enum Recovered {
    /// A classified fault raised with [`Fault::raise`].
    Fault(Box<Fault>),
    /// Any other panic payload, rendered as text.
    Other(String),
}

impl Recovered {
    /// Classify a panic payload.
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        match payload.downcast::<Fault>() {
            Ok(fault) => Self::Fault(fault),
            Err(payload) => Self::Other(payload_text(payload.as_ref())),
        }
    }
}

fn payload_text(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

/// Install a panic hook that stays silent for raised faults.
///
/// Raised faults are reported by the boundary that catches them. Every
/// other panic is passed on to the previously installed hook.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if info.payload().is::<Fault>() {
            return;
        }
        previous(info);
    }));
}

/// Report a caught value. Faults get the boundary's label bound first.
fn report(recovered: &mut Recovered, sink: &dyn FaultSink, system: &str, message: &str) {
    match recovered {
        Recovered::Fault(fault) => {
            fault.set_system(system);
            fault.report(sink, message);
        }
        Recovered::Other(text) => {
            let mut fault = Fault::new(UNCLASSIFIED_KIND, text.clone());
            fault.set_system(system);
            fault.report(sink, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    #[test]
    fn classifies_fault_payload() {
        let payload: Box<dyn Any + Send> = Box::new(Fault::variable("bad"));
        match Recovered::from_payload(payload) {
            Recovered::Fault(fault) => assert_eq!(fault.kind(), FaultKind::Variable),
            Recovered::Other(text) => panic!("expected fault, got {text}"),
        }
    }

    #[test]
    fn unclassified_payload_is_reported_as_execute() {
        let sink = MemorySink::new();
        let mut recovered = Recovered::Other("boom".to_owned());
        report(&mut recovered, &sink, "worker", "job failed");

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, FaultKind::Execute);
        assert_eq!(records[0].system.as_deref(), Some("worker"));
        assert_eq!(records[0].message, "job failed");
        assert_eq!(records[0].error, "boom");
        assert_eq!(records[0].root, "boom");
    }

    #[test]
    fn classifies_string_payloads() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert!(matches!(Recovered::from_payload(payload), Recovered::Other(t) if t == "boom"));

        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert!(matches!(Recovered::from_payload(payload), Recovered::Other(t) if t == "bang"));

        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert!(
            matches!(Recovered::from_payload(payload), Recovered::Other(t) if t == "unknown panic payload")
        );
    }
}
