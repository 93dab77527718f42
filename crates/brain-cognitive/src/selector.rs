//! C4 voice selector: wraps `brain_core::selection`'s pure ROI math with a
//! live `VoiceRegistry` lookup so callers get back real `Voice` records
//! instead of bare ids (`SPEC_FULL.md` §4.4).

use crate::voices::VoiceRegistry;
use brain_core::selection::{self, SelectionResult, TaskContext};
use brain_types::domain::Voice;
use brain_types::{BrainResult, SelectorConfig};

/// Run the complexity/ROI heuristic against everything currently in
/// `registry` and resolve the winning voice ids back into `Voice` records.
pub fn select_team(
    ctx: &TaskContext,
    registry: &VoiceRegistry,
    config: &SelectorConfig,
) -> BrainResult<(SelectionResult, Vec<Voice>)> {
    let available = registry.all()?;
    let result = selection::select(ctx, &available, config);
    let voices: Vec<Voice> = result
        .voices
        .iter()
        .filter_map(|id| available.iter().find(|v| &v.id == id).cloned())
        .collect();
    Ok((result, voices))
}
