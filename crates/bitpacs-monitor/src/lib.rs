//! # bitpacs-monitor
//!
//! Change-poll reconciler for the Orthanc changes feed: tracks the
//! last-seen change sequence per facility, classifies change batches, and
//! decides when a full listing reload is justified — without a push
//! channel from the PACS.

pub mod reconciler;
pub mod runner;

pub use reconciler::{ChangesSource, PollState, Reconciler, TickOutcome};
pub use runner::ChangeMonitor;
