//! Data-driven diagram construction.
//!
//! A [`DiagramDefinition`] is the canonical, serde-deserializable model of a
//! whole diagram: flow options, the stage chain and an optional failure
//! stage. Hosts with their own configuration format implement
//! [`IntoDiagram`] as a translation layer instead of building stages by
//! hand.

use ahash::AHashSet;
use serde::Deserialize;

use crate::canvas::{Canvas, SvgCanvas};
use crate::error::DefinitionError;
use crate::flow::{Flow, FlowOptions};
use crate::stage::StageOptions;

/// The complete definition of a workflow diagram, ready to build.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiagramDefinition {
    pub options: FlowOptions,
    pub stages: Vec<StageSpec>,
    pub error_stage: Option<ErrorStageDefinition>,
}

/// One chain entry: a bare label or a full option set.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StageSpec {
    Label(String),
    Options(StageOptions),
}

impl StageSpec {
    fn label(&self) -> &str {
        match self {
            StageSpec::Label(label) => label,
            StageSpec::Options(options) => &options.label,
        }
    }
}

impl From<StageSpec> for StageOptions {
    fn from(spec: StageSpec) -> Self {
        match spec {
            StageSpec::Label(label) => StageOptions::labelled(label),
            StageSpec::Options(options) => options,
        }
    }
}

/// Overrides for the failure stage; anything left unset falls back to the
/// defaults of [`Flow::add_error_stage`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorStageDefinition {
    pub label: Option<String>,
    pub dx: Option<f64>,
    pub dy: Option<f64>,
    pub id: Option<String>,
    pub image: Option<String>,
}

impl ErrorStageDefinition {
    fn into_options(self) -> StageOptions {
        StageOptions {
            label: self.label.unwrap_or_else(|| "FAIL".to_string()),
            dx: self.dx.unwrap_or(-100.0),
            dy: self.dy.unwrap_or(100.0),
            id: self.id,
            image: self.image,
            ..StageOptions::default()
        }
    }
}

impl DiagramDefinition {
    /// Parses a definition from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the flow on the given canvas.
    pub fn build<C: Canvas>(self, canvas: C) -> Result<Flow<C>, DefinitionError> {
        self.validate()?;
        let DiagramDefinition {
            options,
            stages,
            error_stage,
        } = self;
        let mut flow = Flow::new(canvas, options);
        flow.chain(stages);
        if let Some(error_stage) = error_stage {
            flow.add_error_stage_with(error_stage.into_options());
        }
        Ok(flow)
    }

    /// Builds the flow on a fresh [`SvgCanvas`] sized from the options.
    pub fn build_svg(self) -> Result<Flow<SvgCanvas>, DefinitionError> {
        let canvas = SvgCanvas::new(self.options.width.clone(), self.options.height);
        self.build(canvas)
    }

    fn validate(&self) -> Result<(), DefinitionError> {
        if self.stages.is_empty() {
            return Err(DefinitionError::EmptyChain);
        }
        let mut seen = AHashSet::new();
        for stage in &self.stages {
            if !seen.insert(stage.label()) {
                return Err(DefinitionError::DuplicateLabel(stage.label().to_string()));
            }
        }
        Ok(())
    }
}

/// A translation layer from a custom host format into a
/// [`DiagramDefinition`].
///
/// # Example
///
/// ```rust
/// use stageline::definition::{DiagramDefinition, IntoDiagram, StageSpec};
/// use stageline::error::DefinitionError;
///
/// struct MyPipeline {
///     steps: Vec<String>,
/// }
///
/// impl IntoDiagram for MyPipeline {
///     fn into_diagram(self) -> Result<DiagramDefinition, DefinitionError> {
///         Ok(DiagramDefinition {
///             stages: self.steps.into_iter().map(StageSpec::Label).collect(),
///             ..DiagramDefinition::default()
///         })
///     }
/// }
///
/// let pipeline = MyPipeline {
///     steps: vec!["Fetch".into(), "Build".into(), "Publish".into()],
/// };
/// let flow = pipeline.into_diagram()?.build_svg()?;
/// assert_eq!(flow.stage_count(), 3);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait IntoDiagram {
    /// Consumes the object and converts it into a diagram definition.
    fn into_diagram(self) -> Result<DiagramDefinition, DefinitionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_specs_parse() {
        let definition = DiagramDefinition::from_json(
            r#"{
                "stages": [
                    "Start",
                    {"label": "Build", "failable": true},
                    "Finish"
                ],
                "error_stage": {}
            }"#,
        )
        .unwrap();
        assert_eq!(definition.stages.len(), 3);
        assert_eq!(definition.stages[1].label(), "Build");
        assert!(definition.error_stage.is_some());
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let definition = DiagramDefinition::from_json(r#"{"stages": ["A", "B", "A"]}"#).unwrap();
        let err = definition.build_svg().unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateLabel(label) if label == "A"));
    }

    #[test]
    fn test_empty_chain_rejected() {
        let definition = DiagramDefinition::from_json(r#"{"stages": []}"#).unwrap();
        assert!(matches!(
            definition.build_svg(),
            Err(DefinitionError::EmptyChain)
        ));
    }

    #[test]
    fn test_error_stage_defaults_merge() {
        let spec = ErrorStageDefinition {
            label: Some("Abort".to_string()),
            ..ErrorStageDefinition::default()
        };
        let options = spec.into_options();
        assert_eq!(options.label, "Abort");
        assert_eq!(options.dx, -100.0);
        assert_eq!(options.dy, 100.0);
    }
}
