use std::collections::HashMap;

use sqlx::PgPool;
use thiserror::Error;
use time::Date;

use crate::core::metrics;
use crate::core::time::{parse_date, primitive_now_utc};
use crate::db::models::CompanyDates;
use crate::db::types::AssignmentLevel;
use crate::repositories;
use crate::repositories::dates::UpsertDates;
use crate::schemas::assignment::ItemError;

#[derive(Debug, Clone, Copy)]
pub(crate) struct DatePairInput<'a> {
    pub(crate) item_id: &'a str,
    pub(crate) company_id: &'a str,
    pub(crate) start_date: Option<&'a str>,
    pub(crate) end_date: Option<&'a str>,
    pub(crate) is_flexible: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum DateRangeError {
    #[error("startDate and endDate are required for each pair")]
    MissingDates,
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("startDate must not be after endDate")]
    InvertedRange,
}

#[derive(Debug, Default)]
pub(crate) struct DatesOutcome {
    pub(crate) results: Vec<CompanyDates>,
    pub(crate) successful: usize,
    pub(crate) errors: Vec<ItemError>,
}

fn parse_optional(raw: Option<&str>) -> Result<Option<Date>, DateRangeError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => parse_date(value)
            .map(Some)
            .ok_or_else(|| DateRangeError::InvalidDate(value.to_string())),
    }
}

/// Parses one pair's range. With `require_both`, blank dates are rejected
/// instead of being stored as an open range.
pub(crate) fn parse_range(
    start: Option<&str>,
    end: Option<&str>,
    require_both: bool,
) -> Result<(Option<Date>, Option<Date>), DateRangeError> {
    let start = parse_optional(start)?;
    let end = parse_optional(end)?;

    if require_both && (start.is_none() || end.is_none()) {
        return Err(DateRangeError::MissingDates);
    }
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(DateRangeError::InvertedRange);
        }
    }
    Ok((start, end))
}

/// Membership of each item in the project, looked up once per item.
struct ProjectScope<'a> {
    pool: &'a PgPool,
    level: AssignmentLevel,
    project_id: &'a str,
    known: HashMap<String, bool>,
}

impl<'a> ProjectScope<'a> {
    fn new(pool: &'a PgPool, level: AssignmentLevel, project_id: &'a str) -> Self {
        Self { pool, level, project_id, known: HashMap::new() }
    }

    async fn contains(&mut self, item_id: &str) -> Result<bool, sqlx::Error> {
        if let Some(known) = self.known.get(item_id) {
            return Ok(*known);
        }
        let belongs = repositories::dates::item_belongs_to_project(
            self.pool,
            self.level,
            item_id,
            self.project_id,
        )
        .await?;
        self.known.insert(item_id.to_string(), belongs);
        Ok(belongs)
    }
}

fn outside_project(level: AssignmentLevel, item_id: &str) -> ItemError {
    ItemError {
        entity_id: item_id.to_string(),
        company_id: None,
        message: format!("{} does not belong to this project", level.as_str()),
    }
}

fn record_failure(
    outcome: &mut DatesOutcome,
    item_id: &str,
    company_id: Option<&str>,
    message: String,
) {
    metrics::record_date_pair("failed");
    tracing::warn!(item_id, company_id, message = %message, "Date pair failed");
    outcome.errors.push(ItemError {
        entity_id: item_id.to_string(),
        company_id: company_id.map(str::to_string),
        message,
    });
}

/// Upserts a date row per pair. Pairs fail independently.
pub(crate) async fn set_dates(
    pool: &PgPool,
    project_id: &str,
    level: AssignmentLevel,
    pairs: &[DatePairInput<'_>],
    require_both: bool,
) -> DatesOutcome {
    let mut outcome = DatesOutcome::default();
    let mut scope = ProjectScope::new(pool, level, project_id);

    for pair in pairs {
        let (start_date, end_date) = match parse_range(pair.start_date, pair.end_date, require_both)
        {
            Ok(range) => range,
            Err(error) => {
                let message = error.to_string();
                record_failure(&mut outcome, pair.item_id, Some(pair.company_id), message);
                continue;
            }
        };

        match scope.contains(pair.item_id).await {
            Ok(true) => {}
            Ok(false) => {
                metrics::record_date_pair("failed");
                outcome.errors.push(ItemError {
                    company_id: Some(pair.company_id.to_string()),
                    ..outside_project(level, pair.item_id)
                });
                continue;
            }
            Err(error) => {
                tracing::error!(error = %error, item_id = pair.item_id, "Failed to resolve item");
                record_failure(
                    &mut outcome,
                    pair.item_id,
                    Some(pair.company_id),
                    "Failed to save dates".to_string(),
                );
                continue;
            }
        }

        let saved = repositories::dates::upsert(
            pool,
            level,
            UpsertDates {
                entity_id: pair.item_id,
                company_id: pair.company_id,
                start_date,
                end_date,
                is_flexible: pair.is_flexible,
                now: primitive_now_utc(),
            },
        )
        .await;

        match saved {
            Ok(dates) => {
                metrics::record_date_pair("saved");
                outcome.successful += 1;
                outcome.results.push(dates);
            }
            Err(error) => {
                let message = if crate::db::is_foreign_key_violation(&error) {
                    "Referenced company does not exist".to_string()
                } else {
                    tracing::error!(error = %error, "Failed to upsert dates");
                    "Failed to save dates".to_string()
                };
                record_failure(&mut outcome, pair.item_id, Some(pair.company_id), message);
            }
        }
    }

    outcome
}

/// Nulls the range of every company row for each selected item.
pub(crate) async fn remove_dates(
    pool: &PgPool,
    project_id: &str,
    level: AssignmentLevel,
    item_ids: &[String],
) -> DatesOutcome {
    let mut outcome = DatesOutcome::default();
    let mut scope = ProjectScope::new(pool, level, project_id);

    for item_id in item_ids {
        match scope.contains(item_id).await {
            Ok(true) => {}
            Ok(false) => {
                metrics::record_date_pair("failed");
                outcome.errors.push(outside_project(level, item_id));
                continue;
            }
            Err(error) => {
                tracing::error!(error = %error, item_id = %item_id, "Failed to resolve item");
                record_failure(&mut outcome, item_id, None, "Failed to clear dates".to_string());
                continue;
            }
        }

        match repositories::dates::clear_for_entity(pool, level, item_id, primitive_now_utc()).await
        {
            Ok(cleared) => {
                metrics::record_date_pair("cleared");
                tracing::debug!(item_id = %item_id, cleared, "Dates cleared");
                outcome.successful += 1;
            }
            Err(error) => {
                tracing::error!(error = %error, item_id = %item_id, "Failed to clear dates");
                record_failure(&mut outcome, item_id, None, "Failed to clear dates".to_string());
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn uniform_range_may_be_open() {
        assert_eq!(
            parse_range(Some("2026-01-01"), None, false),
            Ok((Some(date!(2026 - 01 - 01)), None))
        );
        assert_eq!(parse_range(Some(""), Some("  "), false), Ok((None, None)));
    }

    #[test]
    fn per_pair_range_requires_both_dates() {
        assert_eq!(
            parse_range(Some("2026-01-01"), Some(""), true),
            Err(DateRangeError::MissingDates)
        );
        assert_eq!(parse_range(None, None, true), Err(DateRangeError::MissingDates));
    }

    #[test]
    fn inverted_and_malformed_ranges_are_rejected() {
        assert_eq!(
            parse_range(Some("2026-02-01"), Some("2026-01-31"), false),
            Err(DateRangeError::InvertedRange)
        );
        assert_eq!(
            parse_range(Some("01/02/2026"), None, false),
            Err(DateRangeError::InvalidDate("01/02/2026".to_string()))
        );
        assert!(parse_range(Some("2026-01-31"), Some("2026-01-31"), true).is_ok());
    }
}
