//! Cron expression parsing
//!
//! Supports standard 5-field cron syntax:
//! ```text
//! ┌───────────── minute (0-59)
//! │ ┌───────────── hour (0-23)
//! │ │ ┌───────────── day of month (1-31)
//! │ │ │ ┌───────────── month (1-12)
//! │ │ │ │ ┌───────────── day of week (1-7, 1=Monday, or mon..sun)
//! │ │ │ │ │
//! * * * * *
//! ```
//!
//! Parsing also composes an English description of the schedule, e.g.
//! `"5 0 * 8 *"` reads "At 00:05 in August".

use crate::error::{CronError, Result};
use crate::field::{ParsedField, Unit};
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Day-of-week literals accepted as the fifth field, in 1..=7 order
const DAY_TOKENS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// A parsed cron expression: five value matrices plus the composed
/// English description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronExpression {
    /// Original expression string, trimmed
    pub expression: String,
    minute: ParsedField,
    hour: ParsedField,
    day_of_month: ParsedField,
    month: ParsedField,
    day_of_week: ParsedField,
    description: String,
}

impl CronExpression {
    /// Parse a cron expression string
    ///
    /// Fails with a field-specific error when any field is unparseable,
    /// and with [`CronError::InvalidSpec`] when the spec does not have
    /// exactly five fields.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use cronrun::CronExpression;
    ///
    /// let expr = CronExpression::parse("*/5 * * * *")?;
    /// let expr = CronExpression::parse("5 0 * 8 *")?;
    /// assert_eq!(expr.description(), "At 00:05 in August");
    /// ```
    pub fn parse(expression: &str) -> Result<Self> {
        let parsed = Self::parse_tokens(expression)
            .ok_or_else(|| CronError::InvalidSpec(expression.to_string()))?;

        for (field, unit) in [
            (&parsed.minute, Unit::Minute),
            (&parsed.hour, Unit::Hour),
            (&parsed.day_of_month, Unit::DayOfMonth),
            (&parsed.month, Unit::Month),
            (&parsed.day_of_week, Unit::DayOfWeek),
        ] {
            if field.is_empty() {
                return Err(CronError::UnparseableField {
                    unit,
                    spec: expression.to_string(),
                });
            }
        }

        Ok(parsed)
    }

    /// Parse without failing: malformed input yields an expression whose
    /// [`is_valid`](Self::is_valid) is false
    pub fn parse_lenient(expression: &str) -> Self {
        Self::parse_tokens(expression).unwrap_or_else(|| Self::empty(expression))
    }

    /// Split, normalize and parse the five fields; `None` when the spec
    /// does not have exactly five whitespace-separated tokens
    fn parse_tokens(expression: &str) -> Option<Self> {
        // Non-breaking spaces sneak in from copy-pasted crontab lines
        let cleaned = expression.replace('\u{a0}', " ").to_lowercase();
        let mut tokens: Vec<String> = cleaned.split_whitespace().map(str::to_string).collect();
        if tokens.len() != 5 {
            return None;
        }

        if let Some(day) = DAY_TOKENS.iter().position(|d| *d == tokens[4]) {
            tokens[4] = (day + 1).to_string();
        }

        let minute = ParsedField::parse(&tokens[0], Unit::Minute);
        let hour = ParsedField::parse(&tokens[1], Unit::Hour);
        let day_of_month = ParsedField::parse(&tokens[2], Unit::DayOfMonth);
        let month = ParsedField::parse(&tokens[3], Unit::Month);
        let day_of_week = ParsedField::parse(&tokens[4], Unit::DayOfWeek);
        let description =
            compose_description(&tokens, &minute, &hour, &day_of_month, &month, &day_of_week);

        Some(Self {
            expression: expression.trim().to_string(),
            minute,
            hour,
            day_of_month,
            month,
            day_of_week,
            description,
        })
    }

    /// The invalid result returned by lenient parsing on a wrong field count
    fn empty(expression: &str) -> Self {
        Self {
            expression: expression.trim().to_string(),
            minute: ParsedField::invalid(Unit::Minute),
            hour: ParsedField::invalid(Unit::Hour),
            day_of_month: ParsedField::invalid(Unit::DayOfMonth),
            month: ParsedField::invalid(Unit::Month),
            day_of_week: ParsedField::invalid(Unit::DayOfWeek),
            description: String::new(),
        }
    }

    /// True when every field parsed to a non-empty matrix
    pub fn is_valid(&self) -> bool {
        !(self.minute.is_empty()
            || self.hour.is_empty()
            || self.day_of_month.is_empty()
            || self.month.is_empty()
            || self.day_of_week.is_empty())
    }

    /// The composed English description of the schedule
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Check whether a timestamp satisfies all five field matrices
    ///
    /// The calendar weekday is normalized to the 1-7 convention used by
    /// the parser, with Sunday mapping to 7.
    pub fn matches(&self, dt: &DateTime<Utc>) -> bool {
        self.minute.contains(dt.minute())
            && self.hour.contains(dt.hour())
            && self.day_of_month.contains(dt.day())
            && self.month.contains(dt.month())
            && self.day_of_week.contains(dt.weekday().number_from_monday())
    }

    /// The minute field
    pub fn minute(&self) -> &ParsedField {
        &self.minute
    }

    /// The hour field
    pub fn hour(&self) -> &ParsedField {
        &self.hour
    }

    /// The day-of-month field
    pub fn day_of_month(&self) -> &ParsedField {
        &self.day_of_month
    }

    /// The month field
    pub fn month(&self) -> &ParsedField {
        &self.month
    }

    /// The day-of-week field
    pub fn day_of_week(&self) -> &ParsedField {
        &self.day_of_week
    }
}

/// Compose the full sentence from the per-field fragments
///
/// Hour, day-of-month, day-of-week and month clauses are omitted when
/// their raw token is `*`. When both the minute and hour fields are
/// single plain integers the leading clause collapses to a zero-padded
/// clock time ("At 00:05" instead of "At minute 5 past hour 0").
fn compose_description(
    tokens: &[String],
    minute: &ParsedField,
    hour: &ParsedField,
    day_of_month: &ParsedField,
    month: &ParsedField,
    day_of_week: &ParsedField,
) -> String {
    let mut text = match (minute.single_value(), hour.single_value()) {
        (Some(m), Some(h)) => format!("At {:02}:{:02}", h, m),
        _ => {
            let mut lead = format!("At {}", minute.text());
            if tokens[1] != "*" {
                lead.push_str(&format!(" past {}", hour.text()));
            }
            lead
        }
    };
    if tokens[2] != "*" {
        text.push_str(&format!(" on {}", day_of_month.text()));
    }
    if tokens[4] != "*" {
        text.push_str(&format!(" and on {}", day_of_week.text()));
    }
    if tokens[3] != "*" {
        text.push_str(&format!(" in {}", month.text()));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    fn describe(spec: &str) -> String {
        CronExpression::parse(spec)
            .expect("spec should parse")
            .description()
            .to_string()
    }

    #[test]
    fn test_parse_every_minute() {
        let expr = CronExpression::parse("* * * * *").unwrap();
        assert_eq!(expr.minute().values().len(), 60);
        assert_eq!(expr.hour().values().len(), 24);
        assert_eq!(expr.day_of_month().values().len(), 31);
        assert_eq!(expr.month().values().len(), 12);
        assert_eq!(expr.day_of_week().values().len(), 7);
        assert_eq!(expr.description(), "At every minute");
    }

    #[test]
    fn test_describe_clock_collapse() {
        assert_eq!(describe("5 0 * 8 *"), "At 00:05 in August");
        assert_eq!(describe("0 22 * * 1-5"), "At 22:00 and on every day-of-week from Monday through Friday");
        assert_eq!(describe("0 4 8-14 * *"), "At 04:00 on every day-of-month from 8 through 14");
        assert_eq!(describe("15 14 1 * *"), "At 14:15 on day-of-month 1");
    }

    #[test]
    fn test_describe_without_collapse() {
        // Hour has two values, so the clause stays in long form
        assert_eq!(
            describe("0 0,12 1 */2 *"),
            "At minute 0 past hour 0 and 12 on day-of-month 1 in every 2nd month"
        );
        assert_eq!(
            describe("23 0-20/2 * * *"),
            "At minute 23 past every 2nd hour from 0 through 20"
        );
        assert_eq!(
            describe("15 */4 2 4 2"),
            "At minute 15 past every 4th hour on day-of-month 2 and on Tuesday in April"
        );
        assert_eq!(
            describe("15 14/4 1 * *"),
            "At minute 15 past every 4th hour from 14 through 23 on day-of-month 1"
        );
    }

    #[test]
    fn test_describe_combined_clauses() {
        assert_eq!(
            describe("0 0 1,15 * 3"),
            "At 00:00 on day-of-month 1 and 15 and on Wednesday"
        );
        assert_eq!(
            describe("15 14/4 1 5,4,2 */2"),
            "At minute 15 past every 4th hour from 14 through 23 on day-of-month 1 and on every 2nd day-of-week in May, April, and February"
        );
        assert_eq!(
            describe("3 3/4 8 10-11 6"),
            "At minute 3 past every 4th hour from 3 through 23 on day-of-month 8 and on Saturday in every month from October through November"
        );
        assert_eq!(
            describe("0 22 4/3 2,3,1-5 1-5"),
            "At 22:00 on every 3rd day-of-month from 4 through 31 and on every day-of-week from Monday through Friday in February, March, and every month from January through May"
        );
    }

    #[test]
    fn test_day_name_token() {
        let expr = CronExpression::parse("5 4 * * sun").unwrap();
        assert_eq!(expr.description(), "At 04:05 and on Sunday");
        assert_eq!(expr.day_of_week().values(), &BTreeSet::from([7]));

        let expr = CronExpression::parse("0 9 * * MON").unwrap();
        assert_eq!(expr.day_of_week().values(), &BTreeSet::from([1]));
    }

    #[test]
    fn test_whitespace_normalization() {
        let expr = CronExpression::parse("  5   0\t* 8  * ").unwrap();
        assert_eq!(expr.description(), "At 00:05 in August");

        // Non-breaking spaces from copy-pasted crontab lines
        let expr = CronExpression::parse("5\u{a0}0 * 8 *").unwrap();
        assert_eq!(expr.description(), "At 00:05 in August");
    }

    #[test]
    fn test_parse_invalid_field_count() {
        let err = CronExpression::parse("* * *").unwrap_err();
        assert_eq!(err.to_string(), "unable to parse cron spec provided: [* * *]");
    }

    #[test]
    fn test_parse_field_specific_errors() {
        let err = CronExpression::parse("a b c d e").unwrap_err();
        assert_eq!(err.to_string(), "unable to parse minute from spec: [a b c d e]");

        let err = CronExpression::parse("* * / * *").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unable to parse day of month from spec: [* * / * *]"
        );

        let err = CronExpression::parse("* * * 13 *").unwrap_err();
        assert!(matches!(
            err,
            CronError::UnparseableField {
                unit: Unit::Month,
                ..
            }
        ));

        let err = CronExpression::parse("60 * * * *").unwrap_err();
        assert!(matches!(
            err,
            CronError::UnparseableField {
                unit: Unit::Minute,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_lenient() {
        let expr = CronExpression::parse_lenient("not a cron spec");
        assert!(!expr.is_valid());
        assert!(expr.minute().is_empty());
        assert_eq!(expr.description(), "");

        let expr = CronExpression::parse_lenient("60 * * * *");
        assert!(!expr.is_valid());
        assert!(expr.minute().is_empty());
        assert!(!expr.hour().is_empty());

        assert!(CronExpression::parse_lenient("* * * * *").is_valid());
    }

    #[test]
    fn test_matches() {
        let expr = CronExpression::parse("30 14 * * 1").unwrap();
        // Monday, Feb 2 2026 at 14:30
        let dt = Utc.with_ymd_and_hms(2026, 2, 2, 14, 30, 0).unwrap();
        assert!(expr.matches(&dt));

        // Same time on Tuesday
        let dt = Utc.with_ymd_and_hms(2026, 2, 3, 14, 30, 0).unwrap();
        assert!(!expr.matches(&dt));
    }

    #[test]
    fn test_matches_sunday_normalization() {
        let expr = CronExpression::parse("0 0 * * 7").unwrap();
        // Sunday, Feb 8 2026
        let sunday = Utc.with_ymd_and_hms(2026, 2, 8, 0, 0, 0).unwrap();
        assert!(expr.matches(&sunday));

        let expr = CronExpression::parse("0 0 * * sun").unwrap();
        assert!(expr.matches(&sunday));

        let monday = Utc.with_ymd_and_hms(2026, 2, 9, 0, 0, 0).unwrap();
        assert!(!expr.matches(&monday));
    }

    #[test]
    fn test_serde_roundtrip() {
        let expr = CronExpression::parse("*/5 9-17 * * 1-5").unwrap();
        let json = serde_json::to_string(&expr).unwrap();
        let back: CronExpression = serde_json::from_str(&json).unwrap();
        assert_eq!(back.expression, expr.expression);
        assert_eq!(back.description(), expr.description());
        assert_eq!(back.minute().values(), expr.minute().values());
    }
}
