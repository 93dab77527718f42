//! Voice collaboration orchestration: the approval engine (C3), voice
//! registry and selector (C4), synthesis engine (C5), council orchestrator
//! (C6), and orchestration planner (C8). I/O-bound algorithms live here;
//! the pure math they're built on lives in `brain-core`
//! (`SPEC_FULL.md` §2 workspace layout).

pub mod approval;
pub mod council;
pub mod orchestrator;
pub mod selector;
pub mod synthesis;
pub mod voices;

pub use approval::ApprovalEngine;
pub use council::Council;
