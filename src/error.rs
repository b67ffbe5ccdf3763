use thiserror::Error;

use crate::{TextRange, TextSize};

/// Lookup failures for positions and ranges that do not lie within a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("position {position:?} is outside of the node's full span {full_span:?}")]
    PositionOutOfRange { position: TextSize, full_span: TextRange },
    #[error("span {span:?} is not contained in the node's full span {full_span:?}")]
    SpanOutOfRange { span: TextRange, full_span: TextRange },
}
