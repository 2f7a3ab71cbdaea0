use thiserror::Error;

/// Failure to demangle one input. The session that produced it stays usable.
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum DemangleError {
    /// The input does not match the grammar at `offset`.
    #[error("expected {expected} at offset {offset}")]
    ParseFailure {
        /// Byte offset into the input where the grammar gave up.
        offset: usize,
        /// Human-readable name of the production that was expected.
        expected: &'static str,
    },

    /// The input nests deeper than the configured limit.
    #[error("nesting depth exceeds the limit of {limit} at offset {offset}")]
    RecursionLimitExceeded {
        /// Byte offset into the input where the limit was hit.
        offset: usize,
        /// The configured limit.
        limit: usize,
    },
}

impl DemangleError {
    /// Byte offset into the input where demangling stopped.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match *self {
            Self::ParseFailure { offset, .. } | Self::RecursionLimitExceeded { offset, .. } => offset,
        }
    }
}

/// Low level failures of the cursor. They never escape the grammar engine.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub(crate) enum CursorError {
    #[error("read past the end of the input")]
    OutOfBounds,
    #[error("malformed number")]
    MalformedNumber,
}

/// Errors raised while resolving configuration values.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ConfigError {
    /// The key is not a known configuration key.
    #[error("unknown configuration key `{0}`")]
    UnknownKey(String),

    /// The value cannot be interpreted for the key.
    #[error("invalid value `{value}` for configuration key `{key}`")]
    InvalidValue {
        /// The configuration key.
        key: String,
        /// The rejected value.
        value: String,
    },
}
