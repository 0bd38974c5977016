//! End-to-end tests: definition JSON in, driven flow, SVG document out.
mod common;
use common::*;
use stageline::outline::outline;
use stageline::prelude::*;

#[test]
fn test_definition_builds_the_pipeline() {
    let definition = DiagramDefinition::from_json(PIPELINE_JSON).expect("definition parses");
    let flow = definition.build_svg().expect("diagram builds");
    assert_eq!(flow.stage_count(), 4);
    assert_eq!(flow.links().count(), 5);
    assert_eq!(flow.fail_stage().unwrap().label(), "FAIL");
}

#[test]
fn test_stage_placement_and_link_geometry() {
    let flow = pipeline_flow();
    let svg = flow.to_svg();

    // Start centres on (100.5, 150.5), Validate on (200.5, 150.5); the
    // connecting link leaves the right pivot into the left pivot.
    assert!(svg.contains("points=\"130.5,150.5 170.5,150.5\""));

    // The fail links bend: down from the bottom pivot, then across into the
    // failure stage's left pivot.
    assert!(svg.contains("points=\"200.5,180.5 200.5,250.5 370.5,250.5\""));
    assert!(svg.contains("points=\"300.5,180.5 300.5,250.5 370.5,250.5\""));

    // Every link carries the arrowhead marker.
    assert_eq!(svg.matches("marker-end=\"url(#arrowhead)\"").count(), 5);
}

#[test]
fn test_driving_the_flow_updates_the_document() {
    let definition = DiagramDefinition::from_json(PIPELINE_JSON).unwrap();
    let mut flow = definition.build_svg().unwrap();

    flow.next().unwrap();
    flow.next().unwrap();
    let validate = stage_named(&flow, "Validate");
    flow.progress(validate, (3u32, 10u32));

    let svg = flow.to_svg();
    assert!(svg.contains("class=\"stage-1 stage done\""));
    assert!(svg.contains("class=\"stage-2 stage active\""));
    assert!(svg.contains(">3/10</text>"));
    assert!(svg.contains(">In progress...</text>"));

    flow.fail().unwrap();
    let svg = flow.to_svg();
    assert!(svg.contains("class=\"stage-2 stage error\""));
    assert!(svg.contains("class=\"stage-5 stage active\""));
    assert!(svg.contains(">ERROR</text>"));
    assert!(svg.contains(">FAIL</text>"));
    // Only done() clears progress; an errored stage keeps its last value.
    assert!(svg.contains(">3/10</text>"));
}

#[test]
fn test_custom_options_shift_the_layout() {
    let definition = DiagramDefinition::from_json(
        r#"{
            "options": { "width": "800", "height": 200, "dx": 50 },
            "stages": ["Fetch", "Store"]
        }"#,
    )
    .unwrap();
    let flow = definition.build_svg().unwrap();
    let svg = flow.to_svg();
    assert!(svg.contains("width=\"800\""));
    assert!(svg.contains("height=\"200\""));
    // Fetch centres on (100 + 50 + 0.5, 100 + 0.5): link pivots follow.
    assert!(svg.contains("points=\"180.5,100.5 220.5,100.5\""));
}

#[test]
fn test_per_stage_offset_creates_an_elbow() {
    let mut flow = Flow::svg(FlowOptions::default());
    flow.chain([
        StageOptions::labelled("Fetch"),
        StageOptions {
            dy: 80.0,
            ..StageOptions::labelled("Store")
        },
    ]);
    let svg = flow.to_svg();
    // Fetch sits 80 above Store, beyond half a frame height: the link drops
    // from Fetch's bottom pivot and bends into Store's left pivot.
    assert!(svg.contains("points=\"100.5,180.5 100.5,230.5 170.5,230.5\""));
}

#[test]
fn test_initial_status_option_renders_a_state_label() {
    let mut flow = Flow::svg(FlowOptions::default());
    flow.chain([
        StageOptions {
            status: "Queued".to_string(),
            ..StageOptions::labelled("Fetch")
        },
        StageOptions::labelled("Store"),
    ]);
    assert!(flow.to_svg().contains(">Queued</text>"));
    // The machine state is untouched by the display-only option.
    assert_eq!(
        flow.stage(stage_named(&flow, "Fetch")).status(),
        StageStatus::Inactive
    );
}

#[test]
fn test_stage_icons_render_when_configured() {
    let definition = DiagramDefinition::from_json(
        r#"{
            "options": { "default_image": "icons/gear.svg" },
            "stages": ["Fetch", {"label": "Store", "image": "icons/disk.svg"}]
        }"#,
    )
    .unwrap();
    let flow = definition.build_svg().unwrap();
    let svg = flow.to_svg();
    assert!(svg.contains("href=\"icons/gear.svg\""));
    assert!(svg.contains("href=\"icons/disk.svg\""));
}

#[test]
fn test_outline_snapshot() {
    let mut flow = pipeline_flow();
    flow.goto_stage("Process").unwrap();
    let text = outline(&flow);

    assert!(text.contains(&format!("[0] {:<16} done", "Start")));
    assert!(text.contains(&format!("[1] {:<16} done", "Validate")));
    assert!(text.contains(&format!("[2] {:<16} active", "Process")));
    assert!(text.contains(&format!("[3] {:<16} inactive", "Success")));
    assert!(text.contains(&format!("[F] {:<16} inactive", "FAIL")));
    assert!(text.contains("Start -> Validate [active]"));
    assert!(text.contains("Process -> Success [idle]"));
    assert!(text.contains("Process -> FAIL [idle]"));
}

#[test]
fn test_outline_shows_progress() {
    let mut flow = pipeline_flow();
    flow.next().unwrap();
    flow.progress(stage_named(&flow, "Start"), 42u32);
    assert!(outline(&flow).contains("(42%)"));
}

#[test]
fn test_into_diagram_conversion() {
    struct HostSteps(Vec<&'static str>);

    impl IntoDiagram for HostSteps {
        fn into_diagram(self) -> Result<DiagramDefinition, DefinitionError> {
            Ok(DiagramDefinition {
                stages: self
                    .0
                    .into_iter()
                    .map(|label| StageSpec::Label(label.to_string()))
                    .collect(),
                ..DiagramDefinition::default()
            })
        }
    }

    let flow = HostSteps(vec!["Plan", "Apply", "Verify"])
        .into_diagram()
        .and_then(DiagramDefinition::build_svg)
        .expect("host format converts and builds");
    assert_eq!(flow.stage_count(), 3);
    assert!(flow.stages().last().unwrap().is_success());
}
