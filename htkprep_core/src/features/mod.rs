mod codec;
mod concat;
mod header;
mod parm_kind;

use thiserror::Error;

pub use codec::{decode, encode};
pub use concat::concatenate_along_feature_axis;
pub use header::{ByteOrder, FeatureHeader, FeatureMatrix, HEADER_SIZE};
pub use parm_kind::{BASE_TYPES, ParmKind, QUALIFIERS};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    /// Unsupported or malformed header contents.
    #[error("unsupported feature format: {0}")]
    Format(String),

    #[error("feature data truncated: expected {expected} bytes, found {actual}")]
    Truncation { expected: usize, actual: usize },

    #[error("left and right features have different {what} ({left} vs {right})")]
    Mismatch {
        what: &'static str,
        left: u64,
        right: u64,
    },

    #[error("unknown parm kind token `{0}`")]
    UnknownType(String),
}

pub type FeatureResult<T> = Result<T, FeatureError>;
