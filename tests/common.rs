//! Common test utilities for building workflow diagrams.
use stageline::prelude::*;

/// A complete pipeline definition in JSON form.
#[allow(dead_code)]
pub const PIPELINE_JSON: &str = r#"{
    "options": { "height": 300 },
    "stages": ["Start", "Validate", "Process", "Success"],
    "error_stage": {}
}"#;

/// The standard four-stage pipeline with a failure sink.
#[allow(dead_code)]
pub fn pipeline_flow() -> Flow<SvgCanvas> {
    let mut flow = Flow::svg(FlowOptions::default());
    flow.chain(["Start", "Validate", "Process", "Success"])
        .add_error_stage();
    flow
}

/// The same chain without a failure sink.
#[allow(dead_code)]
pub fn bare_flow() -> Flow<SvgCanvas> {
    let mut flow = Flow::svg(FlowOptions::default());
    flow.chain(["Start", "Validate", "Process", "Success"]);
    flow
}

/// Looks a chain stage up by label.
#[allow(dead_code)]
pub fn stage_named(flow: &Flow<SvgCanvas>, label: &str) -> StageId {
    flow.stage_ids()
        .find(|&id| flow.stage(id).label() == label)
        .expect("stage exists")
}

/// Number of stages currently in `Active` status, failure stage included.
#[allow(dead_code)]
pub fn active_count(flow: &Flow<SvgCanvas>) -> usize {
    let chain = flow
        .stages()
        .filter(|stage| stage.status() == StageStatus::Active)
        .count();
    let fail = flow
        .fail_stage()
        .map_or(0, |stage| usize::from(stage.status() == StageStatus::Active));
    chain + fail
}

/// Outgoing links of `stage` that end in the failure stage.
#[allow(dead_code)]
pub fn fail_links_of(flow: &Flow<SvgCanvas>, stage: StageId) -> Vec<LinkId> {
    let Some(fail) = flow.fail_stage_id() else {
        return Vec::new();
    };
    flow.stage(stage)
        .outgoing()
        .iter()
        .copied()
        .filter(|&link| flow.link_ref(link).to() == fail)
        .collect()
}
