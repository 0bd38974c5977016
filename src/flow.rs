//! The flow aggregate root.
//!
//! A [`Flow`] exclusively owns its stages and links (arena storage with
//! index handles) and orchestrates every state transition. Stage handles
//! carry the owning flow's identity so cross-flow wiring is rejected by
//! identity comparison, never through back-references.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;

use crate::canvas::{Canvas, SvgCanvas};
use crate::chain;
use crate::error::FlowError;
use crate::geometry::Point;
use crate::link::{self, Direction, Link};
use crate::stage::{Progress, Stage, StageOptions, StageStatus};

// Keeps 1-unit strokes on pixel centres.
const HALF_PIXEL: f64 = 0.5;

static NEXT_FLOW_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a flow instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowId(u64);

impl FlowId {
    fn next() -> Self {
        FlowId(NEXT_FLOW_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Non-owning handle to a stage, valid for the flow that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageId {
    pub(crate) flow: FlowId,
    pub(crate) index: usize,
}

/// Non-owning handle to a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(pub(crate) usize);

/// Construction options for a flow.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlowOptions {
    /// Shift applied to every stage on the x axis.
    pub dx: f64,
    /// Shift applied to every stage on the y axis.
    pub dy: f64,
    /// SVG width attribute.
    pub width: String,
    /// Diagram height in user units; stages centre on half of it.
    pub height: f64,
    /// Icon used by stages that do not set their own.
    pub default_image: Option<String>,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            width: "100%".to_string(),
            height: 300.0,
            default_image: None,
        }
    }
}

/// A navigation target: a 0-based chain index or a stage label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageTarget {
    Index(usize),
    Label(String),
}

impl From<usize> for StageTarget {
    fn from(index: usize) -> Self {
        StageTarget::Index(index)
    }
}

impl From<&str> for StageTarget {
    fn from(label: &str) -> Self {
        StageTarget::Label(label.to_string())
    }
}

impl From<String> for StageTarget {
    fn from(label: String) -> Self {
        StageTarget::Label(label)
    }
}

impl fmt::Display for StageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageTarget::Index(index) => write!(f, "{}", index),
            StageTarget::Label(label) => write!(f, "{}", label),
        }
    }
}

/// A linear workflow diagram: an ordered chain of stages, their links and
/// an optional failure sink, drawn on a [`Canvas`].
#[derive(Debug)]
pub struct Flow<C: Canvas> {
    id: FlowId,
    options: FlowOptions,
    canvas: C,
    arena: Vec<Stage>,
    order: Vec<usize>,
    links: Vec<Link>,
    fail_stage: Option<usize>,
    active: Option<usize>,
}

impl Flow<SvgCanvas> {
    /// Creates a flow on a fresh [`SvgCanvas`] sized from the options.
    pub fn svg(options: FlowOptions) -> Self {
        let canvas = SvgCanvas::new(options.width.clone(), options.height);
        Self::new(canvas, options)
    }

    /// Serializes the current diagram state as an SVG document.
    pub fn to_svg(&self) -> String {
        self.canvas.to_svg()
    }
}

impl<C: Canvas> Flow<C> {
    pub fn new(canvas: C, options: FlowOptions) -> Self {
        Self {
            id: FlowId::next(),
            options,
            canvas,
            arena: Vec::new(),
            order: Vec::new(),
            links: Vec::new(),
            fail_stage: None,
            active: None,
        }
    }

    /// Renders a new stage with the given options.
    ///
    /// A stage flagged `fail` becomes the flow's failure sink (replacing any
    /// previous one) and is retroactively linked from every chain stage
    /// flagged failable; it is not appended to the chain. Any other stage is
    /// appended to the chain in creation order.
    pub fn add_stage(&mut self, options: impl Into<StageOptions>) -> StageId {
        let options = options.into();
        let seq = self.order.len();
        let center = Point::new(
            (seq as f64 + 1.0) * crate::stage::STAGE_SIZE
                + options.dx
                + self.options.dx
                + HALF_PIXEL,
            self.options.height / 2.0 + options.dy + self.options.dy + HALF_PIXEL,
        );
        let stage = Stage::create(
            &mut self.canvas,
            seq,
            options,
            center,
            self.options.default_image.as_deref(),
        );
        let index = self.arena.len();
        let is_fail = stage.is_fail();
        self.arena.push(stage);
        let id = StageId {
            flow: self.id,
            index,
        };
        if is_fail {
            self.fail_stage = Some(index);
            self.wire_fail_links(id);
        } else {
            self.order.push(index);
        }
        id
    }

    /// Adds the failure sink with its default label and below-left offset.
    ///
    /// Links are created from every stage flagged failable; the chain
    /// endpoints are assumed unable to fail unless flagged otherwise.
    pub fn add_error_stage(&mut self) -> StageId {
        self.add_error_stage_with(StageOptions {
            dx: -100.0,
            dy: 100.0,
            ..StageOptions::labelled("FAIL")
        })
    }

    /// [`add_error_stage`](Self::add_error_stage) with caller-supplied
    /// options; the `fail` flag is forced on.
    pub fn add_error_stage_with(&mut self, mut options: StageOptions) -> StageId {
        options.fail = true;
        self.add_stage(options)
    }

    /// Builds a full linear chain in one call.
    ///
    /// Bare strings become labelled options. Every stage except the first
    /// and last defaults to failable (overridable per stage); the last is
    /// marked the success stage. Stages are created in order and wired with
    /// consecutive links.
    pub fn chain<I>(&mut self, specs: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<StageOptions>,
    {
        let mut specs: Vec<StageOptions> = specs.into_iter().map(Into::into).collect();
        let last = specs.len().saturating_sub(1);
        for (i, spec) in specs.iter_mut().enumerate() {
            if i != 0 && i != last && spec.failable.is_none() {
                spec.failable = Some(true);
            }
            if i == last {
                spec.success = true;
            }
        }
        let ids: Vec<StageId> = specs.into_iter().map(|spec| self.add_stage(spec)).collect();
        chain::wire(self, &ids);
        self
    }

    /// Creates a horizontal link between two stages of this flow.
    pub fn link(&mut self, from: StageId, to: StageId) -> Result<LinkId, FlowError> {
        self.link_directed(from, to, Direction::default())
    }

    /// Creates a link with an explicit direction.
    ///
    /// Fails before any registration, so a rejected link never leaves a
    /// partial edge on either stage.
    pub fn link_directed(
        &mut self,
        from: StageId,
        to: StageId,
        direction: Direction,
    ) -> Result<LinkId, FlowError> {
        if from.flow != self.id || to.flow != self.id {
            return Err(FlowError::DifferentFlows);
        }
        match direction {
            Direction::Horizontal => Ok(self.insert_link(from, to)),
            Direction::Vertical => Err(FlowError::VerticalNotImplemented),
        }
    }

    /// Creates and registers a link between two stages known to belong to
    /// this flow.
    pub(crate) fn insert_link(&mut self, from: StageId, to: StageId) -> LinkId {
        let source_box = self.canvas.bbox(self.arena[from.index].group());
        let target_box = self.canvas.bbox(self.arena[to.index].group());
        let (p1, p2) = link::select_pivots(&source_box, &target_box);
        let points = link::route(p1, p2);
        let root = self.canvas.root();
        let line = self.canvas.polyline(root, &points, true);
        self.canvas.add_class(line, "link");
        let id = LinkId(self.links.len());
        self.links.push(Link::new(from, to, Direction::Horizontal, line));
        self.arena[from.index].register_outgoing(id);
        self.arena[to.index].register_incoming(id);
        id
    }

    fn wire_fail_links(&mut self, fail: StageId) {
        let eligible: Vec<StageId> = self
            .order
            .iter()
            .filter(|&&index| self.arena[index].failable())
            .map(|&index| StageId {
                flow: self.id,
                index,
            })
            .collect();
        for stage in eligible {
            self.insert_link(stage, fail);
        }
    }

    /// Activates a stage by chain index or label.
    ///
    /// Every stage before the first match is marked done; the match is
    /// activated; stages after it are left untouched. Backward targets are
    /// permitted and re-activate the earlier stage. Fails without mutating
    /// anything when the target is the failure stage, an out-of-range index
    /// or an unknown label.
    pub fn goto_stage(&mut self, target: impl Into<StageTarget>) -> Result<(), FlowError> {
        let target = target.into();
        if let (Some(fail), StageTarget::Label(label)) = (self.fail_stage, &target) {
            if self.arena[fail].label() == label.as_str() {
                return Err(FlowError::FailStageTarget);
            }
        }
        let position = match &target {
            StageTarget::Index(index) => {
                if *index >= self.order.len() {
                    return Err(FlowError::IndexOutOfRange {
                        index: *index,
                        len: self.order.len(),
                    });
                }
                *index
            }
            StageTarget::Label(label) => self
                .order
                .iter()
                .position(|&index| self.arena[index].label() == label.as_str())
                .ok_or_else(|| FlowError::UnknownStage {
                    target: label.clone(),
                })?,
        };
        for chain_pos in 0..position {
            let index = self.order[chain_pos];
            self.done_at(index);
        }
        self.activate_at(self.order[position]);
        Ok(())
    }

    /// Activates the stage after the currently active one, or the first
    /// stage when nothing is active.
    pub fn next(&mut self) -> Result<(), FlowError> {
        let target = match self.active {
            Some(index) => self.arena[index].seq() + 1,
            None => 0,
        };
        self.goto_stage(target)
    }

    /// Fails the currently active stage, rerouting to the failure stage.
    pub fn fail(&mut self) -> Result<(), FlowError> {
        let index = self.active.ok_or(FlowError::NothingActive)?;
        self.error_at(index);
        Ok(())
    }

    /// Replaces the progress display of a stage.
    pub fn progress(&mut self, stage: StageId, value: impl Into<Progress>) {
        debug_assert_eq!(stage.flow, self.id);
        self.arena[stage.index].set_progress(&mut self.canvas, value.into());
    }

    /// Marks a link's transition as occurred. Never re-runs the geometry.
    pub fn activate_link(&mut self, link: LinkId) {
        self.links[link.0].activate(&mut self.canvas);
    }

    /// Clears a link's transition mark.
    pub fn deactivate_link(&mut self, link: LinkId) {
        self.links[link.0].deactivate(&mut self.canvas);
    }

    fn activate_at(&mut self, index: usize) {
        // A forward goto has already marked the previous stage done; this
        // only matters for backward navigation, where it upholds the
        // single-active invariant.
        if let Some(previous) = self.active {
            if previous != index && self.arena[previous].status() == StageStatus::Active {
                self.arena[previous].deactivate(&mut self.canvas);
            }
        }
        self.arena[index].activate(&mut self.canvas);
        if !self.arena[index].is_fail() {
            let incoming = self.arena[index].incoming().to_vec();
            for link in incoming {
                self.activate_link(link);
            }
        }
        self.active = Some(index);
    }

    fn done_at(&mut self, index: usize) {
        self.arena[index].done(&mut self.canvas);
        let incoming = self.arena[index].incoming().to_vec();
        for link in incoming {
            self.activate_link(link);
        }
    }

    fn error_at(&mut self, index: usize) {
        self.arena[index].mark_error(&mut self.canvas);
        match self.fail_stage {
            Some(fail) => {
                // First outgoing link into the failure stage wins; a stage
                // is expected to have at most one.
                let outgoing = self.arena[index].outgoing().to_vec();
                if let Some(link) = outgoing
                    .into_iter()
                    .find(|link| self.links[link.0].to().index == fail)
                {
                    self.activate_link(link);
                }
                self.activate_at(fail);
            }
            None => log::debug!(
                "no FAIL stage in this workflow; error on '{}' not escalated",
                self.arena[index].label()
            ),
        }
    }

    pub fn id(&self) -> FlowId {
        self.id
    }

    pub fn options(&self) -> &FlowOptions {
        &self.options
    }

    /// Number of stages in the chain (the failure stage not included).
    pub fn stage_count(&self) -> usize {
        self.order.len()
    }

    /// The stage behind a handle issued by this flow.
    pub fn stage(&self, id: StageId) -> &Stage {
        debug_assert_eq!(id.flow, self.id);
        &self.arena[id.index]
    }

    /// Chain stages in execution order.
    pub fn stages(&self) -> impl Iterator<Item = &Stage> {
        self.order.iter().map(|&index| &self.arena[index])
    }

    /// Handles of the chain stages in execution order.
    pub fn stage_ids(&self) -> impl Iterator<Item = StageId> + '_ {
        self.order.iter().map(|&index| StageId {
            flow: self.id,
            index,
        })
    }

    pub fn fail_stage_id(&self) -> Option<StageId> {
        self.fail_stage.map(|index| StageId {
            flow: self.id,
            index,
        })
    }

    pub fn fail_stage(&self) -> Option<&Stage> {
        self.fail_stage.map(|index| &self.arena[index])
    }

    pub fn active_id(&self) -> Option<StageId> {
        self.active.map(|index| StageId {
            flow: self.id,
            index,
        })
    }

    pub fn active_stage(&self) -> Option<&Stage> {
        self.active.map(|index| &self.arena[index])
    }

    pub fn link_ref(&self, id: LinkId) -> &Link {
        &self.links[id.0]
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }
}
