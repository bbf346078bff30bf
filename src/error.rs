use thiserror::Error;

/// Errors raised while turning a flow document into a runnable flow.
///
/// Execution itself never surfaces through this type: a failing step is a
/// `false` return, an unresolved binding reads as a zero value and an
/// out-of-range jump is treated as a stop.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("unregistered action kind '{kind}'")]
    UnknownActionKind { kind: String },

    #[error("invalid parameters for action kind '{kind}': {message}")]
    InvalidParams { kind: String, message: String },

    #[error("{operand} comparison does not support the '{op}' operator")]
    UnsupportedOperator { operand: &'static str, op: String },

    #[error("sub-flow dispatch targets unknown flow '{flow}'")]
    UnknownSubFlow { flow: String },

    #[error("finish type is go_to but no goto target is set")]
    MissingGotoTarget,

    #[error("step {index}: {source}")]
    Step {
        index: usize,
        #[source]
        source: Box<BuildError>,
    },
}

impl BuildError {
    /// Wraps an error with the index of the step it was raised for.
    pub fn at_step(self, index: usize) -> Self {
        BuildError::Step {
            index,
            source: Box::new(self),
        }
    }
}

/// Errors raised when converting a custom authoring format into a
/// [`FlowDocument`](crate::document::FlowDocument).
#[derive(Error, Debug, Clone)]
pub enum DocumentError {
    #[error("invalid flow document: {0}")]
    Validation(String),
}
