//! Hand labeling of tabular rows.
//!
//! A [`HandLabelSession`] finds rows whose label column is null, asks a
//! [`LabelOracle`] for each label, and can re-check a random sample of the
//! collected labels blind to measure how consistent the operator is.

pub mod consistency;
mod error;
pub mod label;
pub mod oracle;
pub mod session;

pub use consistency::{ConsistencyReport, DEFAULT_SAMPLE_FRACTION, Disagreement};
pub use error::LabelError;
pub use label::{Label, LabelType};
pub use oracle::{ConsoleOracle, FnOracle, LabelContext, LabelOracle, OracleError, ScriptedOracle};
pub use session::{HandLabelSession, RunOutcome, RunPolicy, RunStatus};
