//! Declarative input schemas for the diary use cases.
//!
//! Each schema runs its field rules in order and stops at the first
//! violation. [`SchemaIssue::into_error`] maps the violation onto the most
//! specific [`DiaryError`] kind.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use dl_utils::is_future_date;

use crate::entry::{content_length, MAX_CONTENT_LENGTH};
use crate::error::FUTURE_DATE_MESSAGE;
use crate::{Clock, DiaryError, DiaryResult, DEFAULT_LOOKBACK_YEARS};

/// Upper bound for same-date lookback.
pub const MAX_LOOKBACK_YEARS: u32 = 50;

const HYPHENATED_UUID_LEN: usize = 36;

/// What kind of rule a field broke.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IssueKind {
    /// Date after today.
    FutureDate,
    /// Length or number above `maximum`.
    TooBig { maximum: i64 },
    /// Number below `minimum`.
    TooSmall { minimum: i64 },
    /// Not a hyphenated UUID.
    InvalidUuid,
}

/// The first rule violation found by a schema.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{path}: {message}")]
pub struct SchemaIssue {
    /// Name of the offending field.
    pub path: &'static str,
    pub kind: IssueKind,
    pub message: String,
}

impl SchemaIssue {
    fn new(path: &'static str, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }

    /// Translate into the matching [`DiaryError`], keeping `self` as its cause.
    pub fn into_error(self) -> DiaryError {
        let message = self.message.clone();
        let err = match self.kind {
            IssueKind::FutureDate => DiaryError::FutureDate {
                message,
                source: None,
            },
            IssueKind::TooBig { .. } if self.path == "content" => DiaryError::ContentTooLong {
                message,
                source: None,
            },
            _ => DiaryError::validation(message),
        };
        err.with_cause(self)
    }
}

/// A validation schema turning raw input into checked output.
pub trait Schema {
    type Input;
    type Output;

    /// Run every rule against `input`, reporting the first violation.
    fn check(&self, input: Self::Input, today: NaiveDate) -> Result<Self::Output, SchemaIssue>;

    /// Like [`Schema::check`], translated into a [`DiaryError`].
    fn parse(&self, input: Self::Input, clock: &dyn Clock) -> DiaryResult<Self::Output> {
        self.check(input, clock.today())
            .map_err(SchemaIssue::into_error)
    }
}

fn not_future(
    path: &'static str,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<NaiveDate, SchemaIssue> {
    if is_future_date(date, today) {
        return Err(SchemaIssue::new(path, IssueKind::FutureDate, FUTURE_DATE_MESSAGE));
    }
    Ok(date)
}

fn max_length(path: &'static str, value: &str, maximum: usize) -> Result<(), SchemaIssue> {
    if content_length(value) > maximum {
        return Err(SchemaIssue::new(
            path,
            IssueKind::TooBig {
                maximum: i64::try_from(maximum).unwrap_or(i64::MAX),
            },
            "Content exceeds maximum length (10,000 characters)",
        ));
    }
    Ok(())
}

fn uuid_shape(path: &'static str, value: &str) -> Result<Uuid, SchemaIssue> {
    let invalid = || SchemaIssue::new(path, IssueKind::InvalidUuid, "Invalid ID format");
    if value.len() != HYPHENATED_UUID_LEN {
        return Err(invalid());
    }
    Uuid::try_parse(value).map_err(|_| invalid())
}

fn bounded_int(
    path: &'static str,
    value: i64,
    minimum: u32,
    maximum: u32,
) -> Result<u32, SchemaIssue> {
    if value < i64::from(minimum) {
        return Err(SchemaIssue::new(
            path,
            IssueKind::TooSmall {
                minimum: i64::from(minimum),
            },
            format!("{path} must be at least {minimum}"),
        ));
    }
    if value > i64::from(maximum) {
        return Err(SchemaIssue::new(
            path,
            IssueKind::TooBig {
                maximum: i64::from(maximum),
            },
            format!("{path} must be at most {maximum}"),
        ));
    }
    u32::try_from(value).map_err(|_| {
        SchemaIssue::new(
            path,
            IssueKind::TooBig {
                maximum: i64::from(maximum),
            },
            format!("{path} must be at most {maximum}"),
        )
    })
}

/// Input for creating an entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateDiaryEntryInput {
    pub date: NaiveDate,
    pub content: String,
}

/// Input for replacing an entry's content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateDiaryEntryInput {
    pub id: String,
    pub content: String,
}

/// Checked update input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedUpdate {
    pub id: Uuid,
    pub content: String,
}

/// Input for deleting an entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteDiaryEntryInput {
    pub id: String,
}

/// Input for a same-date query. A missing `years` means the default lookback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetEntriesBySameDateInput {
    pub date: NaiveDate,
    pub years: Option<i64>,
}

/// Checked same-date query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SameDateQuery {
    pub date: NaiveDate,
    pub years: u32,
}

/// Date not in the future, content within bounds.
#[derive(Clone, Copy, Debug, Default)]
pub struct CreateDiaryEntrySchema;

impl Schema for CreateDiaryEntrySchema {
    type Input = CreateDiaryEntryInput;
    type Output = CreateDiaryEntryInput;

    fn check(&self, input: Self::Input, today: NaiveDate) -> Result<Self::Output, SchemaIssue> {
        not_future("date", input.date, today)?;
        max_length("content", &input.content, MAX_CONTENT_LENGTH)?;
        Ok(input)
    }
}

/// Hyphenated UUID id, content within bounds.
#[derive(Clone, Copy, Debug, Default)]
pub struct UpdateDiaryEntrySchema;

impl Schema for UpdateDiaryEntrySchema {
    type Input = UpdateDiaryEntryInput;
    type Output = ValidatedUpdate;

    fn check(&self, input: Self::Input, _today: NaiveDate) -> Result<Self::Output, SchemaIssue> {
        let id = uuid_shape("id", &input.id)?;
        max_length("content", &input.content, MAX_CONTENT_LENGTH)?;
        Ok(ValidatedUpdate {
            id,
            content: input.content,
        })
    }
}

/// Hyphenated UUID id.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeleteDiaryEntrySchema;

impl Schema for DeleteDiaryEntrySchema {
    type Input = DeleteDiaryEntryInput;
    type Output = Uuid;

    fn check(&self, input: Self::Input, _today: NaiveDate) -> Result<Self::Output, SchemaIssue> {
        uuid_shape("id", &input.id)
    }
}

/// A date that is not in the future.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiaryDateSchema;

impl Schema for DiaryDateSchema {
    type Input = NaiveDate;
    type Output = NaiveDate;

    fn check(&self, input: Self::Input, today: NaiveDate) -> Result<Self::Output, SchemaIssue> {
        not_future("date", input, today)
    }
}

/// A past or present date and a lookback of 1 to 50 years.
#[derive(Clone, Copy, Debug, Default)]
pub struct GetEntriesBySameDateSchema;

impl Schema for GetEntriesBySameDateSchema {
    type Input = GetEntriesBySameDateInput;
    type Output = SameDateQuery;

    fn check(&self, input: Self::Input, today: NaiveDate) -> Result<Self::Output, SchemaIssue> {
        let date = not_future("date", input.date, today)?;
        let years = match input.years {
            Some(years) => bounded_int("years", years, 1, MAX_LOOKBACK_YEARS)?,
            None => DEFAULT_LOOKBACK_YEARS,
        };
        Ok(SameDateQuery { date, years })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedClock;

    const ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock::on(ymd(2026, 2, 8))
    }

    #[test]
    fn create_rejects_future_date() {
        let input = CreateDiaryEntryInput {
            date: ymd(2999, 1, 1),
            content: "future".into(),
        };
        let issue = CreateDiaryEntrySchema.check(input.clone(), clock().today()).unwrap_err();
        assert_eq!(issue.kind, IssueKind::FutureDate);
        assert_eq!(issue.message, "Future date is not allowed");
        assert!(matches!(
            CreateDiaryEntrySchema.parse(input, &clock()),
            Err(DiaryError::FutureDate { .. })
        ));
    }

    #[test]
    fn create_rejects_long_content() {
        let input = CreateDiaryEntryInput {
            date: ymd(2026, 2, 8),
            content: "a".repeat(10_001),
        };
        let err = CreateDiaryEntrySchema.parse(input, &clock()).unwrap_err();
        assert!(matches!(err, DiaryError::ContentTooLong { .. }));
        assert_eq!(err.to_string(), "Content exceeds maximum length (10,000 characters)");
    }

    #[test]
    fn future_date_is_reported_before_length() {
        let input = CreateDiaryEntryInput {
            date: ymd(2999, 1, 1),
            content: "a".repeat(10_001),
        };
        assert!(matches!(
            CreateDiaryEntrySchema.parse(input, &clock()),
            Err(DiaryError::FutureDate { .. })
        ));
    }

    #[test]
    fn create_accepts_today_and_empty_content() {
        let input = CreateDiaryEntryInput {
            date: ymd(2026, 2, 8),
            content: String::new(),
        };
        assert_eq!(CreateDiaryEntrySchema.parse(input.clone(), &clock()).unwrap(), input);
    }

    #[test]
    fn update_rejects_invalid_id() {
        let input = UpdateDiaryEntryInput {
            id: "invalid-id".into(),
            content: "ok".into(),
        };
        let err = UpdateDiaryEntrySchema.parse(input, &clock()).unwrap_err();
        assert!(matches!(err, DiaryError::Validation { .. }));
        assert_eq!(err.to_string(), "Invalid ID format");
    }

    #[test]
    fn update_requires_hyphenated_uuid() {
        let input = UpdateDiaryEntryInput {
            id: ID.replace('-', ""),
            content: "ok".into(),
        };
        assert!(UpdateDiaryEntrySchema.parse(input, &clock()).is_err());
    }

    #[test]
    fn update_rejects_long_content_as_too_long() {
        let input = UpdateDiaryEntryInput {
            id: ID.into(),
            content: "a".repeat(10_001),
        };
        assert!(matches!(
            UpdateDiaryEntrySchema.parse(input, &clock()),
            Err(DiaryError::ContentTooLong { .. })
        ));
    }

    #[test]
    fn delete_parses_id() {
        let id = DeleteDiaryEntrySchema
            .parse(DeleteDiaryEntryInput { id: ID.into() }, &clock())
            .unwrap();
        assert_eq!(id.to_string(), ID);

        let err = DeleteDiaryEntrySchema
            .parse(DeleteDiaryEntryInput { id: "invalid-id".into() }, &clock())
            .unwrap_err();
        assert!(matches!(err, DiaryError::Validation { .. }));
    }

    #[test]
    fn errors_keep_the_failing_field() {
        let err = DeleteDiaryEntrySchema
            .parse(DeleteDiaryEntryInput { id: "bad".into() }, &clock())
            .unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::Validation);

        let issue = std::error::Error::source(&err)
            .and_then(|source| source.downcast_ref::<SchemaIssue>())
            .expect("schema issue kept as cause");
        assert_eq!(issue.path, "id");
        assert_eq!(issue.kind, IssueKind::InvalidUuid);
        assert_eq!(issue.message, "Invalid ID format");
    }

    #[test]
    fn content_issue_survives_translation() {
        let input = CreateDiaryEntryInput {
            date: ymd(2026, 2, 8),
            content: "a".repeat(10_001),
        };
        let err = CreateDiaryEntrySchema.parse(input, &clock()).unwrap_err();
        let issue = std::error::Error::source(&err)
            .and_then(|source| source.downcast_ref::<SchemaIssue>())
            .expect("schema issue kept as cause");
        assert!(matches!(err, DiaryError::ContentTooLong { .. }));
        assert_eq!(issue.path, "content");
        assert_eq!(issue.kind, IssueKind::TooBig { maximum: 10_000 });
    }

    #[test]
    fn diary_date_rejects_tomorrow() {
        assert!(DiaryDateSchema.parse(ymd(2026, 2, 8), &clock()).is_ok());
        assert!(matches!(
            DiaryDateSchema.parse(ymd(2026, 2, 9), &clock()),
            Err(DiaryError::FutureDate { .. })
        ));
    }

    #[test]
    fn same_date_years_default_and_bounds() {
        let parse = |years| {
            GetEntriesBySameDateSchema.parse(
                GetEntriesBySameDateInput {
                    date: ymd(2026, 2, 8),
                    years,
                },
                &clock(),
            )
        };

        assert_eq!(parse(None).unwrap().years, DEFAULT_LOOKBACK_YEARS);
        assert_eq!(parse(Some(1)).unwrap().years, 1);
        assert_eq!(parse(Some(50)).unwrap().years, 50);
        assert!(matches!(parse(Some(0)), Err(DiaryError::Validation { .. })));
        assert!(matches!(parse(Some(-3)), Err(DiaryError::Validation { .. })));
        assert!(matches!(parse(Some(51)), Err(DiaryError::Validation { .. })));
    }

    #[test]
    fn too_big_outside_content_stays_generic() {
        let issue = SchemaIssue::new("years", IssueKind::TooBig { maximum: 50 }, "too big");
        assert!(matches!(issue.into_error(), DiaryError::Validation { .. }));
    }
}
