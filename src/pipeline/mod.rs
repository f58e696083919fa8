//! The two-phase run: resolve everything, ask once, then tag.
//!
//! # Module layout
//!
//! - [`state`] -- Run-level state machine.
//! - [`confirm`] -- The yes/no gate between the phases.
//! - [`writer`] -- Tagging step behind a trait.
//! - [`outcome`] -- Scan and run reports.
//! - [`orchestrator`] -- Drives a run.

pub mod confirm;
pub mod orchestrator;
pub mod outcome;
pub mod state;
pub mod writer;

pub use confirm::{parse_answer, AssumeYes, Confirmation, ConsoleConfirmation};
pub use orchestrator::{
    Orchestrator, PipelineSettings, DEFAULT_EMBEDDED_LANGUAGE, DEFAULT_SKIP_AUDIO_LANGUAGE,
};
pub use outcome::{
    FileReport, PendingWorkItem, ProcessingOutcome, RunReport, ScanReport, SubtitleOutcome,
    Unresolved, UnresolvedReason,
};
pub use state::{IllegalTransition, PipelineState};
pub use writer::{tag_set, MetadataWriter};
