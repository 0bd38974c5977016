//! Stages: the nodes of the workflow diagram.
//!
//! A stage owns its visual elements (frame, icon, label plus the transient
//! status and progress labels) through canvas handles and runs a small state
//! machine: `Inactive` → `Active` → {`Done`, `Error`}. Link activation and
//! the failure cascade are orchestrated by [`Flow`](crate::flow::Flow); this
//! module only mutates the stage's own state and rendering.

use std::fmt;

use serde::Deserialize;

use crate::canvas::{Canvas, ShapeId};
use crate::flow::LinkId;
use crate::geometry::{self, BBox, Point, Side};

/// Side length of the square stage frame.
pub const STAGE_SIZE: f64 = 100.0;

/// Side length of the stage icon.
pub const ICON_SIZE: f64 = 40.0;

// Vertical offsets of the text rows, relative to the frame centre.
const LABEL_RISE: f64 = 30.0;
const STATE_DROP: f64 = 30.0;
const PROGRESS_DROP: f64 = 45.0;

/// Processing state of a single stage.
///
/// `Done` and `Error` are terminal for normal, forward-driven flows;
/// backward navigation re-activates an earlier stage (see
/// [`Flow::goto_stage`](crate::flow::Flow::goto_stage)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StageStatus {
    #[default]
    Inactive,
    Active,
    Done,
    Error,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageStatus::Inactive => "inactive",
            StageStatus::Active => "active",
            StageStatus::Done => "done",
            StageStatus::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// A progress display value, independent of the stage status.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// Rendered as `"n%"`.
    Percent(f64),
    /// Rendered as `"current/total"`.
    Fraction(f64, f64),
    /// Rendered verbatim.
    Text(String),
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::Percent(n) => write!(f, "{}%", geometry::fmt_number(*n)),
            Progress::Fraction(current, total) => write!(
                f,
                "{}/{}",
                geometry::fmt_number(*current),
                geometry::fmt_number(*total)
            ),
            Progress::Text(text) => write!(f, "{}", text),
        }
    }
}

impl From<f64> for Progress {
    fn from(value: f64) -> Self {
        Progress::Percent(value)
    }
}

impl From<u32> for Progress {
    fn from(value: u32) -> Self {
        Progress::Percent(value as f64)
    }
}

impl From<(f64, f64)> for Progress {
    fn from((current, total): (f64, f64)) -> Self {
        Progress::Fraction(current, total)
    }
}

impl From<(u32, u32)> for Progress {
    fn from((current, total): (u32, u32)) -> Self {
        Progress::Fraction(current as f64, total as f64)
    }
}

impl From<&str> for Progress {
    fn from(value: &str) -> Self {
        Progress::Text(value.to_string())
    }
}

impl From<String> for Progress {
    fn from(value: String) -> Self {
        Progress::Text(value)
    }
}

/// Construction options for a single stage.
///
/// Defaults match the documented construction surface: a placeholder label,
/// no flags, no offsets, a generated element id and the flow's default icon.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StageOptions {
    /// Display name, rendered above the icon.
    pub label: String,
    /// Marks this stage as the flow's failure sink.
    pub fail: bool,
    /// Marks this stage as the success stage.
    pub success: bool,
    /// Eligibility for an automatic link to the failure stage. Left unset,
    /// [`Flow::chain`](crate::flow::Flow::chain) applies its middle-stage
    /// default.
    pub failable: Option<bool>,
    /// Relative shift on the x axis.
    pub dx: f64,
    /// Relative shift on the y axis.
    pub dy: f64,
    /// Element id class on the stage group; generated when absent.
    pub id: Option<String>,
    /// Icon image reference; falls back to the flow's default image.
    pub image: Option<String>,
    /// Initial status label text; empty means none.
    pub status: String,
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            label: "LABEL".to_string(),
            fail: false,
            success: false,
            failable: None,
            dx: 0.0,
            dy: 0.0,
            id: None,
            image: None,
            status: String::new(),
        }
    }
}

impl StageOptions {
    /// Options with a label and everything else defaulted.
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}

impl From<&str> for StageOptions {
    fn from(label: &str) -> Self {
        StageOptions::labelled(label)
    }
}

impl From<String> for StageOptions {
    fn from(label: String) -> Self {
        StageOptions::labelled(label)
    }
}

/// A single stage in a workflow diagram.
///
/// Created once at diagram-build time and alive for the flow's lifetime;
/// afterwards only its visual state changes.
#[derive(Debug)]
pub struct Stage {
    seq: usize,
    options: StageOptions,
    status: StageStatus,
    state_text: Option<String>,
    progress: Option<Progress>,
    links_in: Vec<LinkId>,
    links_out: Vec<LinkId>,
    group: ShapeId,
    frame_box: BBox,
    state_label: Option<ShapeId>,
    progress_label: Option<ShapeId>,
}

impl Stage {
    /// Renders a new stage on the canvas at `center`.
    pub(crate) fn create<C: Canvas>(
        canvas: &mut C,
        seq: usize,
        options: StageOptions,
        center: Point,
        default_image: Option<&str>,
    ) -> Self {
        let root = canvas.root();
        let group = canvas.group(root);
        let id_class = options
            .id
            .clone()
            .unwrap_or_else(|| format!("stage-{}", seq + 1));
        canvas.add_class(group, &id_class);
        canvas.add_class(group, "stage");

        let frame = canvas.rect(group, STAGE_SIZE, STAGE_SIZE);
        canvas.add_class(frame, "stage-frame");
        let frame_box = canvas.bbox(frame);

        let image = options.image.as_deref().or(default_image);
        if let Some(href) = image {
            let icon = canvas.image(group, href, ICON_SIZE, ICON_SIZE);
            canvas.add_class(icon, "stage-icon");
            canvas.set_center(icon, frame_box.center());
        }

        let label = canvas.text(group, &options.label);
        canvas.add_class(label, "stage-label");
        canvas.set_center(label, Point::new(frame_box.cx, frame_box.cy - LABEL_RISE));

        canvas.set_center(group, center);

        let mut stage = Self {
            seq,
            options,
            status: StageStatus::Inactive,
            state_text: None,
            progress: None,
            links_in: Vec::new(),
            links_out: Vec::new(),
            group,
            frame_box,
            state_label: None,
            progress_label: None,
        };
        if !stage.options.status.is_empty() {
            let initial = stage.options.status.clone();
            stage.set_state(canvas, Some(&initial));
        }
        stage
    }

    /// Marks the stage active: status label, `active` class, machine state.
    ///
    /// Incoming-link activation and the flow's active pointer are handled by
    /// the owning flow.
    pub(crate) fn activate<C: Canvas>(&mut self, canvas: &mut C) {
        let text = if self.options.fail {
            "FAIL"
        } else if self.options.success {
            "SUCCESS"
        } else {
            "In progress..."
        };
        self.status = StageStatus::Active;
        canvas.add_class(self.group, "active");
        self.set_state(canvas, Some(text));
    }

    /// Clears the status display and the active flag. Sub-step of
    /// [`done`](Self::done) and [`mark_error`](Self::mark_error).
    pub(crate) fn deactivate<C: Canvas>(&mut self, canvas: &mut C) {
        self.status = StageStatus::Inactive;
        canvas.remove_class(self.group, "active");
        self.set_state(canvas, None);
    }

    /// Marks the stage done and removes any progress display.
    pub(crate) fn done<C: Canvas>(&mut self, canvas: &mut C) {
        self.deactivate(canvas);
        self.status = StageStatus::Done;
        canvas.add_class(self.group, "done");
        self.set_state(canvas, Some("Done"));
        self.clear_progress(canvas);
    }

    /// Marks the stage as failed. The reroute to the failure stage is the
    /// owning flow's job.
    pub(crate) fn mark_error<C: Canvas>(&mut self, canvas: &mut C) {
        self.deactivate(canvas);
        self.status = StageStatus::Error;
        canvas.add_class(self.group, "error");
        self.set_state(canvas, Some("ERROR"));
    }

    /// Replaces the status label. `None` removes it.
    pub(crate) fn set_state<C: Canvas>(&mut self, canvas: &mut C, text: Option<&str>) {
        if let Some(label) = self.state_label.take() {
            canvas.remove(label);
        }
        self.state_text = text.map(str::to_string);
        if let Some(text) = text {
            let label = canvas.text(self.group, text);
            canvas.add_class(label, "stage-state");
            canvas.set_center(
                label,
                Point::new(self.frame_box.cx, self.frame_box.cy + STATE_DROP),
            );
            self.state_label = Some(label);
        }
    }

    /// Replaces the progress display. Independent of the stage status.
    pub(crate) fn set_progress<C: Canvas>(&mut self, canvas: &mut C, value: Progress) {
        if let Some(label) = self.progress_label.take() {
            canvas.remove(label);
        }
        let label = canvas.text(self.group, &value.to_string());
        canvas.add_class(label, "stage-progress");
        canvas.set_center(
            label,
            Point::new(self.frame_box.cx, self.frame_box.cy + PROGRESS_DROP),
        );
        self.progress_label = Some(label);
        self.progress = Some(value);
    }

    /// Removes the progress display, if any.
    pub(crate) fn clear_progress<C: Canvas>(&mut self, canvas: &mut C) {
        if let Some(label) = self.progress_label.take() {
            canvas.remove(label);
        }
        self.progress = None;
    }

    /// Connection point on the given side, computed from the group's
    /// bounding box at the moment of the read.
    pub fn pivot_point<C: Canvas>(&self, canvas: &C, side: Side) -> Point {
        geometry::pivot(&canvas.bbox(self.group), side)
    }

    pub(crate) fn group(&self) -> ShapeId {
        self.group
    }

    pub(crate) fn register_incoming(&mut self, link: LinkId) {
        self.links_in.push(link);
    }

    pub(crate) fn register_outgoing(&mut self, link: LinkId) {
        self.links_out.push(link);
    }

    /// Creation ordinal. For chain stages this is the chain position.
    pub fn seq(&self) -> usize {
        self.seq
    }

    pub fn label(&self) -> &str {
        &self.options.label
    }

    pub fn status(&self) -> StageStatus {
        self.status
    }

    /// Current status label text, if one is displayed.
    pub fn state_text(&self) -> Option<&str> {
        self.state_text.as_deref()
    }

    /// Current progress value, if one is displayed.
    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }

    pub fn is_fail(&self) -> bool {
        self.options.fail
    }

    pub fn is_success(&self) -> bool {
        self.options.success
    }

    /// Whether this stage is eligible for an automatic link to the failure
    /// stage.
    pub fn failable(&self) -> bool {
        self.options.failable.unwrap_or(false)
    }

    pub fn incoming(&self) -> &[LinkId] {
        &self.links_in
    }

    pub fn outgoing(&self) -> &[LinkId] {
        &self.links_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_display_modes() {
        assert_eq!(Progress::from(42u32).to_string(), "42%");
        assert_eq!(Progress::from(42.5).to_string(), "42.5%");
        assert_eq!(Progress::from((3u32, 10u32)).to_string(), "3/10");
        assert_eq!(Progress::from("custom").to_string(), "custom");
    }

    #[test]
    fn test_stage_options_from_label() {
        let options = StageOptions::from("Validate");
        assert_eq!(options.label, "Validate");
        assert!(!options.fail);
        assert!(options.failable.is_none());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(StageStatus::Inactive.to_string(), "inactive");
        assert_eq!(StageStatus::Error.to_string(), "error");
    }
}
