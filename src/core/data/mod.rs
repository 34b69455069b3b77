//! Canonical record model shared by every pipeline phase.
//!
//! ## Module Structure
//!
//! - `declaration`: Provenance of a record (name, scope, file, line)
//! - `ops`: Canonical operator vocabularies and builder tables
//! - `query`: Query bodies and query references
//! - `board`: Boards and their panels
//! - `slo`: Service level objectives
//! - `trigger`: Alert triggers
//! - `alerting`: Recipients, time periods and burn alerts
//! - `record`: The `Record` sum type and the `Resource` accessor trait

pub mod alerting;
pub mod board;
pub mod declaration;
pub mod ops;
pub mod query;
pub mod record;
pub mod slo;
pub mod trigger;

pub use alerting::{BurnAlert, BurnAlertType, Recipient, RecipientType, TimePeriod};
pub use board::{BoardRecord, BoardSpec, Panel, PanelContent, Position, SloRef, Tag};
pub use declaration::Declaration;
pub use ops::{CalcOp, Direction, FilterCombination, FilterOp, ThresholdOp};
pub use query::{
    Calculation, Filter, FilterValue, Order, OrderTarget, QueryRecord, QueryRef, QuerySpec,
    TimeRange,
};
pub use record::{Record, Resource, ResourceKind};
pub use slo::{Sli, SloRecord, SloSpec};
pub use trigger::{Threshold, TriggerRecord, TriggerSpec};
