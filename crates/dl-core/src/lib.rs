//! Core domain entities, rules, and traits for Dialy.

mod clock;
mod date_value;
mod entry;
mod error;
mod repository;
mod service;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use date_value::DateValue;
pub use entry::{content_length, DiaryEntry, DEFAULT_PREVIEW_LENGTH, MAX_CONTENT_LENGTH};
pub use error::{
    BoxError, DiaryError, DiaryResult, ErrorCode, CONTENT_TOO_LONG_MESSAGE, DUPLICATE_DATE_MESSAGE,
    FUTURE_DATE_MESSAGE,
};
pub use repository::{DiaryRepository, DEFAULT_LOOKBACK_YEARS};
pub use service::{is_same_date_in_past_years, DiaryService};
