//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types from the stageline crate so a
//! host can bring the whole construction and transition surface in with a
//! single import.
//!
//! # Example
//!
//! ```rust
//! use stageline::prelude::*;
//!
//! # fn run_example() -> Result<(), FlowError> {
//! let mut flow = Flow::svg(FlowOptions::default());
//! flow.chain(["Fetch", "Build", "Publish"]).add_error_stage();
//! flow.next()?;
//! # Ok(())
//! # }
//! ```

// The aggregate root and its handles
pub use crate::flow::{Flow, FlowId, FlowOptions, LinkId, StageId, StageTarget};

// Stages and links
pub use crate::link::{Direction, Link};
pub use crate::stage::{Progress, Stage, StageOptions, StageStatus};

// Rendering collaborator
pub use crate::canvas::{Canvas, ShapeId, SvgCanvas};

// Data-driven construction
pub use crate::definition::{DiagramDefinition, ErrorStageDefinition, IntoDiagram, StageSpec};

// Error types
pub use crate::error::{DefinitionError, FlowError};

// Debug formatting
pub use crate::outline::outline;
