//! Cron field parsing
//!
//! Each of the five cron fields is a comma-separated list of
//! sub-expressions:
//!
//! - `5` — a single value
//! - `1-5` — an inclusive range
//! - `*` — every value the unit allows
//! - `*/6`, `4/3`, `2-10/2` — a stepped form over a wildcard, an open
//!   range starting at a value, or an explicit range
//!
//! Parsing one field yields a [`ParsedField`]: the sorted, deduplicated
//! set of allowed values (the "matrix") plus an English fragment
//! describing it. A malformed sub-expression invalidates the whole field,
//! which parses to an empty matrix and empty text; the expression-level
//! parser decides whether that is an error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The five cron field units, in field order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// Minute of the hour (0-59)
    Minute,
    /// Hour of the day (0-23)
    Hour,
    /// Day of the month (1-31)
    DayOfMonth,
    /// Month of the year (1-12)
    Month,
    /// Day of the week (1-7, Monday = 1, Sunday = 7)
    DayOfWeek,
}

/// Bounds and naming for one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitSpec {
    /// Singular name used in description fragments
    pub singular: &'static str,
    /// Plural name
    pub plural: &'static str,
    /// Smallest allowed value
    pub min: u32,
    /// Largest allowed value
    pub max: u32,
}

impl Unit {
    /// Bounds and names for this unit
    pub const fn spec(&self) -> UnitSpec {
        match self {
            Unit::Minute => UnitSpec {
                singular: "minute",
                plural: "minutes",
                min: 0,
                max: 59,
            },
            Unit::Hour => UnitSpec {
                singular: "hour",
                plural: "hours",
                min: 0,
                max: 23,
            },
            Unit::DayOfMonth => UnitSpec {
                singular: "day-of-month",
                plural: "days-of-month",
                min: 1,
                max: 31,
            },
            Unit::Month => UnitSpec {
                singular: "month",
                plural: "months",
                min: 1,
                max: 12,
            },
            Unit::DayOfWeek => UnitSpec {
                singular: "day-of-week",
                plural: "days-of-week",
                min: 1,
                max: 7,
            },
        }
    }
}

impl fmt::Display for Unit {
    // Label used in parse error messages ("unable to parse {unit} ...")
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Unit::Minute => "minute",
            Unit::Hour => "hour",
            Unit::DayOfMonth => "day of month",
            Unit::Month => "month",
            Unit::DayOfWeek => "day of week",
        };
        write!(f, "{label}")
    }
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// One validated sub-expression of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expr {
    Value(u32),
    Range(u32, u32),
    Wildcard,
    Step { base: StepBase, step: u32 },
}

/// What a stepped sub-expression steps over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepBase {
    Wildcard,
    From(u32),
    Range(u32, u32),
}

/// The parsed form of one cron field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedField {
    unit: Unit,
    values: BTreeSet<u32>,
    text: String,
    single_value: bool,
}

impl ParsedField {
    /// Parse one field string for the given unit
    ///
    /// The input is expected to be trimmed and lower-cased already (the
    /// expression parser normalizes the whole spec). Any malformed
    /// sub-expression invalidates the entire field.
    pub fn parse(input: &str, unit: Unit) -> Self {
        let mut exprs = Vec::new();
        for part in input.trim().split(',') {
            match classify(part.trim(), unit) {
                Some(expr) => exprs.push(expr),
                None => return Self::invalid(unit),
            }
        }

        let spec = unit.spec();
        let mut values = BTreeSet::new();
        for expr in &exprs {
            fill(expr, &spec, &mut values);
        }

        let single_value = matches!(exprs.as_slice(), [Expr::Value(_)]);
        let text = render(&exprs, unit);
        Self {
            unit,
            values,
            text,
            single_value,
        }
    }

    /// An unparseable field: empty matrix, empty text
    pub(crate) fn invalid(unit: Unit) -> Self {
        Self {
            unit,
            values: BTreeSet::new(),
            text: String::new(),
            single_value: false,
        }
    }

    /// The unit this field was parsed for
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// The allowed values, ascending and deduplicated
    pub fn values(&self) -> &BTreeSet<u32> {
        &self.values
    }

    /// The rendered English fragment
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when the field could not be parsed
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Membership test against the matrix
    pub fn contains(&self, value: u32) -> bool {
        self.values.contains(&value)
    }

    /// The value, when the field was exactly one plain integer
    pub(crate) fn single_value(&self) -> Option<u32> {
        if self.single_value {
            self.values.iter().next().copied()
        } else {
            None
        }
    }
}

/// Parse a non-negative integer: digits only, no sign, no decimals
fn parse_number(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Classify and validate one sub-expression, in precedence order:
/// plain integer, range, wildcard, stepped form. Returns `None` for
/// anything malformed or out of the unit's bounds.
fn classify(part: &str, unit: Unit) -> Option<Expr> {
    let spec = unit.spec();

    if let Some(value) = parse_number(part) {
        if value < spec.min || value > spec.max {
            return None;
        }
        return Some(Expr::Value(value));
    }

    let hyphens = part.matches('-').count();
    let slashes = part.matches('/').count();

    if hyphens == 1 && slashes == 0 {
        let (start, end) = part.split_once('-')?;
        let start = parse_number(start)?;
        let end = parse_number(end)?;
        if end < start || start < spec.min || end > spec.max {
            return None;
        }
        return Some(Expr::Range(start, end));
    }

    if part == "*" {
        return Some(Expr::Wildcard);
    }

    if slashes == 1 {
        let (base, step) = part.split_once('/')?;
        if base.is_empty() || step.is_empty() {
            return None;
        }
        let step = parse_number(step)?;
        if step == 0 || step > spec.max {
            return None;
        }
        let base = if base == "*" {
            StepBase::Wildcard
        } else if let Some(value) = parse_number(base) {
            if value < spec.min || value > spec.max {
                return None;
            }
            StepBase::From(value)
        } else if base.matches('-').count() == 1 {
            let (start, end) = base.split_once('-')?;
            let start = parse_number(start)?;
            let end = parse_number(end)?;
            if end < start || start < spec.min || end > spec.max {
                return None;
            }
            StepBase::Range(start, end)
        } else {
            return None;
        };
        return Some(Expr::Step { base, step });
    }

    None
}

/// Add a sub-expression's values to the matrix
fn fill(expr: &Expr, spec: &UnitSpec, values: &mut BTreeSet<u32>) {
    match expr {
        Expr::Value(value) => {
            values.insert(*value);
        }
        Expr::Range(start, end) => {
            for value in *start..=*end {
                values.insert(value);
            }
        }
        Expr::Wildcard => {
            for value in spec.min..=spec.max {
                values.insert(value);
            }
        }
        Expr::Step { base, step } => {
            let (start, end) = match base {
                StepBase::Wildcard => (spec.min, spec.max),
                StepBase::From(value) => (*value, spec.max),
                StepBase::Range(start, end) => (*start, *end),
            };
            let mut value = start;
            while value <= end {
                values.insert(value);
                value += step;
            }
        }
    }
}

/// Render the description fragment for a list of sub-expressions
///
/// Two fragments join with a bare "and"; three or more use commas with
/// "and" before the last. Month and day-of-week values render as names.
fn render(exprs: &[Expr], unit: Unit) -> String {
    let spec = unit.spec();
    let count = exprs.len();
    let mut text = String::new();

    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            text.push_str(if count > 2 { ", " } else { " " });
            if i == count - 1 {
                text.push_str("and ");
            }
        }
        match expr {
            Expr::Value(value) => {
                if i == 0 {
                    text.push_str(&labeled_value(unit, &spec, *value));
                } else {
                    text.push_str(&bare_value(unit, *value));
                }
            }
            Expr::Range(start, end) => {
                text.push_str(&format!(
                    "every {} from {} through {}",
                    spec.singular,
                    bare_value(unit, *start),
                    bare_value(unit, *end)
                ));
            }
            Expr::Wildcard => {
                if unit == Unit::DayOfWeek {
                    text.push_str("every day");
                } else {
                    text.push_str(&format!("every {}", spec.singular));
                }
            }
            Expr::Step { base, step } => {
                let range_phrase = match base {
                    StepBase::Wildcard => String::new(),
                    StepBase::From(value) => format!(
                        " from {} through {}",
                        bare_value(unit, *value),
                        bare_value(unit, spec.max)
                    ),
                    StepBase::Range(start, end) => format!(
                        " from {} through {}",
                        bare_value(unit, *start),
                        bare_value(unit, *end)
                    ),
                };
                if *step == 1 {
                    text.push_str(&format!("every {}{}", spec.singular, range_phrase));
                } else {
                    text.push_str(&format!(
                        "every {}{} {}{}",
                        step,
                        ordinal(unit, *step),
                        spec.singular,
                        range_phrase
                    ));
                }
            }
        }
    }

    text
}

/// A value with its unit label, as used for the first fragment
/// ("minute 5"); month and day-of-week render the name alone
fn labeled_value(unit: Unit, spec: &UnitSpec, value: u32) -> String {
    match unit {
        Unit::Month | Unit::DayOfWeek => bare_value(unit, value),
        _ => format!("{} {}", spec.singular, value),
    }
}

/// A value without its unit label; months and weekdays become names
fn bare_value(unit: Unit, value: u32) -> String {
    match unit {
        Unit::Month => MONTH_NAMES[(value - 1) as usize].to_string(),
        Unit::DayOfWeek => DAY_NAMES[(value - 1) as usize].to_string(),
        _ => value.to_string(),
    }
}

/// Ordinal suffix for a step, chosen by its last digit; the month unit
/// keeps "th" for anything beyond 3
fn ordinal(unit: Unit, step: u32) -> &'static str {
    if unit == Unit::Month {
        return match step {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        };
    }
    match step % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}
