//! Policy gate: batch verification against a host change source.

pub mod policy_gate;
pub mod source;
pub mod types;

pub use policy_gate::{gate_batch, load_policy, PolicyGate};
pub use source::{ChangeSource, MemorySource};
pub use types::{GateDecision, GateReport, RejectReason};
