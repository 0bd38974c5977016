//! # Stageline - Workflow Diagram Engine
//!
//! **Stageline** models a linear workflow as a chain of stages joined by
//! arrow links, runs the activate/done/error state machine over them, and
//! renders the result as an SVG document. It is meant for embedding a
//! visual status tracker for a multi-step process (a build pipeline, an
//! import job, a provisioning sequence) into a page.
//!
//! ## Core Workflow
//!
//! 1.  **Build the diagram**: create a [`flow::Flow`] and describe the
//!     chain, either fluently with [`flow::Flow::chain`] or from data with
//!     a [`definition::DiagramDefinition`].
//! 2.  **Add the failure sink**: [`flow::Flow::add_error_stage`] links
//!     every failable stage to a terminal FAIL stage.
//! 3.  **Drive it**: [`flow::Flow::next`], [`flow::Flow::goto_stage`] and
//!     [`flow::Flow::fail`] advance the diagram; progress labels are
//!     independent of the state machine.
//! 4.  **Render**: serialize the canvas whenever the host wants the current
//!     picture.
//!
//! ## Quick Start
//!
//! ```rust
//! use stageline::prelude::*;
//!
//! fn main() -> Result<(), FlowError> {
//!     let mut flow = Flow::svg(FlowOptions::default());
//!     flow.chain(["Start", "Validate", "Process", "Success"])
//!         .add_error_stage();
//!
//!     // Drive the workflow forward.
//!     flow.next()?; // Start
//!     flow.goto_stage("Process")?;
//!     let process = flow.active_id().expect("Process is active");
//!     flow.progress(process, (3u32, 10u32));
//!
//!     // Something went wrong on the active stage: reroute to FAIL.
//!     flow.fail()?;
//!     assert_eq!(flow.active_stage().unwrap().label(), "FAIL");
//!
//!     let svg = flow.to_svg();
//!     assert!(svg.contains("class=\"stage-3 stage error\""));
//!     Ok(())
//! }
//! ```
//!
//! Rendering goes through the [`canvas::Canvas`] trait; the bundled
//! [`canvas::SvgCanvas`] produces a standalone document, and hosts with
//! their own drawing surface can implement the trait instead.

pub mod canvas;
pub mod definition;
pub mod error;
pub mod flow;
pub mod geometry;
pub mod link;
pub mod outline;
pub mod prelude;
pub mod stage;

mod chain;
