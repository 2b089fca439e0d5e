use std::fmt;

use thiserror::Error;

/// Result type for core operations.
pub type DiaryResult<T> = Result<T, DiaryError>;

/// Message used when an entry is dated after today.
pub const FUTURE_DATE_MESSAGE: &str = "Future date is not allowed";
/// Message used when content exceeds the length bound.
pub const CONTENT_TOO_LONG_MESSAGE: &str = "Content exceeds maximum length (10,000 characters)";
/// Message used when a date already holds an entry.
pub const DUPLICATE_DATE_MESSAGE: &str = "An entry for this date already exists";

/// Boxed underlying cause carried by a [`DiaryError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Machine-readable error codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Input or invariant violation.
    Validation,
    /// A date after the current local day.
    FutureDateNotAllowed,
    /// Content over the length bound.
    ContentTooLong,
    /// A second entry for an occupied date.
    DuplicateDateEntry,
    /// A persistence write failed.
    SaveFailed,
    /// A persistence read failed or found nothing.
    FetchFailed,
    /// The backing store misbehaved.
    Storage,
}

impl ErrorCode {
    /// Stable string form of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::FutureDateNotAllowed => "FUTURE_DATE_NOT_ALLOWED",
            Self::ContentTooLong => "CONTENT_TOO_LONG",
            Self::DuplicateDateEntry => "DUPLICATE_DATE_ENTRY",
            Self::SaveFailed => "SAVE_FAILED",
            Self::FetchFailed => "FETCH_FAILED",
            Self::Storage => "STORAGE_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by domain rules, repositories, and use cases.
///
/// Every kind carries a message and may wrap the error that caused it.
#[derive(Debug, Error)]
pub enum DiaryError {
    /// Generic input or invariant violation.
    #[error("{message}")]
    Validation {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
    /// The date lies after the current local day.
    #[error("{message}")]
    FutureDate {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
    /// Content exceeds the length bound.
    #[error("{message}")]
    ContentTooLong {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
    /// Another entry already occupies the date.
    #[error("{message}")]
    DuplicateDateEntry {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
    /// A persistence write failed.
    #[error("{message}")]
    SaveFailed {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
    /// A persistence read failed or the requested entry does not exist.
    #[error("{message}")]
    FetchFailed {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
    /// The backing store could not be read or written.
    #[error("storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl DiaryError {
    /// A validation failure with `message` and no cause.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    /// The standard future-date rejection.
    pub fn future_date() -> Self {
        Self::FutureDate {
            message: FUTURE_DATE_MESSAGE.into(),
            source: None,
        }
    }

    /// The standard over-length rejection.
    pub fn content_too_long() -> Self {
        Self::ContentTooLong {
            message: CONTENT_TOO_LONG_MESSAGE.into(),
            source: None,
        }
    }

    /// The standard occupied-date rejection.
    pub fn duplicate_date() -> Self {
        Self::DuplicateDateEntry {
            message: DUPLICATE_DATE_MESSAGE.into(),
            source: None,
        }
    }

    /// A write failure wrapping `cause`.
    pub fn save_failed(message: impl Into<String>, cause: DiaryError) -> Self {
        Self::SaveFailed {
            message: message.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// A read failure wrapping `cause`.
    pub fn fetch_failed(message: impl Into<String>, cause: DiaryError) -> Self {
        Self::FetchFailed {
            message: message.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// A fetch failure with no underlying cause, used for missing entries.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::FetchFailed {
            message: message.into(),
            source: None,
        }
    }

    /// A backing-store failure with no cause.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Attach `cause` as the underlying error, replacing any previous one.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        *self.source_slot() = Some(cause.into());
        self
    }

    /// The machine-readable code for this kind.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::Validation,
            Self::FutureDate { .. } => ErrorCode::FutureDateNotAllowed,
            Self::ContentTooLong { .. } => ErrorCode::ContentTooLong,
            Self::DuplicateDateEntry { .. } => ErrorCode::DuplicateDateEntry,
            Self::SaveFailed { .. } => ErrorCode::SaveFailed,
            Self::FetchFailed { .. } => ErrorCode::FetchFailed,
            Self::Storage { .. } => ErrorCode::Storage,
        }
    }

    /// The wrapped cause when it is itself a [`DiaryError`].
    pub fn cause(&self) -> Option<&DiaryError> {
        self.source_ref()?.downcast_ref::<DiaryError>()
    }

    /// True for errors the user resolves by changing the input.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::FutureDate { .. }
                | Self::ContentTooLong { .. }
                | Self::DuplicateDateEntry { .. }
        )
    }

    /// True for errors where retrying the operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SaveFailed { .. } | Self::FetchFailed { .. } | Self::Storage { .. }
        )
    }

    fn source_ref(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Validation { source, .. }
            | Self::FutureDate { source, .. }
            | Self::ContentTooLong { source, .. }
            | Self::DuplicateDateEntry { source, .. }
            | Self::SaveFailed { source, .. }
            | Self::FetchFailed { source, .. }
            | Self::Storage { source, .. } => source.as_deref(),
        }
    }

    fn source_slot(&mut self) -> &mut Option<BoxError> {
        match self {
            Self::Validation { source, .. }
            | Self::FutureDate { source, .. }
            | Self::ContentTooLong { source, .. }
            | Self::DuplicateDateEntry { source, .. }
            | Self::SaveFailed { source, .. }
            | Self::FetchFailed { source, .. }
            | Self::Storage { source, .. } => source,
        }
    }
}
