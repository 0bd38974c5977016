use thiserror::Error;

/// Errors raised by flow construction and navigation.
///
/// These are the fail-fast preconditions of the state-transition model: all
/// of them are raised synchronously at the violating call and are expected
/// to propagate to the caller. Nothing here is retried or recovered
/// internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// Linking two stages that belong to different flow instances.
    #[error("cannot connect stages that belong to different flows")]
    DifferentFlows,

    /// The vertical layout is declared but not implemented.
    #[error("vertical direction workflow is not yet implemented")]
    VerticalNotImplemented,

    /// Navigating directly to the failure stage; it is only ever reached
    /// through an error escalation.
    #[error("cannot go to the FAIL stage directly")]
    FailStageTarget,

    /// A numeric navigation target outside the chain.
    #[error("stage index {index} is out of range for a flow with {len} stages")]
    IndexOutOfRange { index: usize, len: usize },

    /// A label that matches no stage in the chain.
    #[error("no stage matches '{target}'")]
    UnknownStage { target: String },

    /// An operation on the active stage while nothing is active.
    #[error("no stage is active")]
    NothingActive,
}

/// Errors raised while loading or validating a diagram definition.
#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("failed to parse diagram JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("a diagram definition needs at least one stage")]
    EmptyChain,

    /// `goto_stage` resolves stages by label, so labels must be unique.
    #[error("duplicate stage label '{0}'")]
    DuplicateLabel(String),
}
