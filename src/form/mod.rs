pub mod run_rate;

pub use run_rate::RunRates;

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::cricket::{City, Team, BALLS_PER_INNINGS, WICKETS_PER_INNINGS};

/// Inputs of the match-situation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    BattingTeam,
    BowlingTeam,
    City,
    TargetRuns,
    RunsLeft,
    BallsLeft,
    WicketsLeft,
    Crr,
    Rrr,
}

impl Field {
    /// Every field, in the order the page lays them out.
    pub const ALL: [Field; 9] = [
        Field::BattingTeam,
        Field::BowlingTeam,
        Field::City,
        Field::TargetRuns,
        Field::RunsLeft,
        Field::BallsLeft,
        Field::WicketsLeft,
        Field::Crr,
        Field::Rrr,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::BattingTeam => "Batting team",
            Field::BowlingTeam => "Bowling team",
            Field::City => "City",
            Field::TargetRuns => "Target runs",
            Field::RunsLeft => "Runs left",
            Field::BallsLeft => "Balls left",
            Field::WicketsLeft => "Wickets left",
            Field::Crr => "Current run rate",
            Field::Rrr => "Required run rate",
        }
    }

    pub fn description(self) -> Option<&'static str> {
        match self {
            Field::TargetRuns => Some("Total runs to be chased"),
            Field::RunsLeft => Some("Runs needed to win"),
            Field::BallsLeft => Some("Remaining balls to be bowled"),
            Field::WicketsLeft => Some("Remaining wickets (0-10)"),
            Field::Crr => Some("Auto-calculated based on runs scored and balls faced"),
            Field::Rrr => Some("Auto-calculated based on runs left and balls left"),
            _ => None,
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Field::BattingTeam => "Select batting team",
            Field::BowlingTeam => "Select bowling team",
            Field::City => "Select city",
            Field::TargetRuns => "Enter target runs",
            Field::RunsLeft => "Enter runs left",
            Field::BallsLeft => "Enter balls left",
            Field::WicketsLeft => "Enter wickets left (0-10)",
            Field::Crr | Field::Rrr => "",
        }
    }

    /// Derived fields are shown read-only and never accepted from the user.
    pub fn is_derived(self) -> bool {
        matches!(self, Field::Crr | Field::Rrr)
    }
}

/// Page metadata for a single field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldInfo {
    pub name: Field,
    pub label: &'static str,
    pub description: Option<&'static str>,
    pub placeholder: &'static str,
    pub derived: bool,
}

impl From<Field> for FieldInfo {
    fn from(field: Field) -> Self {
        FieldInfo {
            name: field,
            label: field.label(),
            description: field.description(),
            placeholder: field.placeholder(),
            derived: field.is_derived(),
        }
    }
}

/// A rule violated by one form field. `Display` is the inline message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{} is required", .0.label())]
    Required(Field),
    #[error("Unknown team: {0}")]
    UnknownTeam(String),
    #[error("Unknown city: {0}")]
    UnknownCity(String),
    #[error("{} must be a whole number", .0.label())]
    NotWholeNumber(Field),
    #[error("{} cannot be negative", .0.label())]
    Negative(Field),
    #[error("{} cannot be more than {max}", .field.label())]
    AboveMaximum { field: Field, max: u32 },
    #[error("Target runs must be at least 1")]
    TargetTooSmall,
    #[error("Batting and bowling teams must be different")]
    SameTeams,
    #[error("Runs left cannot be greater than target runs")]
    RunsExceedTarget,
}

/// One inline error as sent to the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// Every rule the submitted form violates, keyed by the field that shows it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(Vec<(Field, ValidationError)>);

impl ValidationErrors {
    fn push(&mut self, field: Field, error: ValidationError) {
        self.0.push((field, error));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Errors reported against `field`.
    pub fn for_field(&self, field: Field) -> impl Iterator<Item = &ValidationError> {
        self.0
            .iter()
            .filter(move |(f, _)| *f == field)
            .map(|(_, e)| e)
    }

    #[cfg(test)]
    pub fn has(&self, field: Field, error: &ValidationError) -> bool {
        self.for_field(field).any(|e| e == error)
    }

    pub fn to_field_errors(&self) -> Vec<FieldError> {
        self.0
            .iter()
            .map(|(field, error)| FieldError {
                field: *field,
                message: error.to_string(),
            })
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, error)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.label(), error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// The form exactly as submitted. Numeric inputs arrive as the text typed into
/// them (numbers are accepted too); an empty string means the field is unset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MatchForm {
    pub batting_team: String,
    pub bowling_team: String,
    pub city: String,
    #[serde(deserialize_with = "text_or_number")]
    pub target_runs: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub runs_left: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub balls_left: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub wickets_left: Option<String>,
}

/// A validated match situation, ready to be sent for prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSituation {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub city: City,
    pub target_runs: u32,
    pub runs_left: u32,
    pub balls_left: u32,
    pub wickets_left: u32,
}

impl MatchSituation {
    /// Rates for display, rounded to two decimals.
    pub fn rates(&self) -> RunRates {
        run_rate::derive(self.target_runs, self.runs_left, self.balls_left)
    }
}

enum Parsed {
    Missing,
    Invalid,
    Value(i64),
}

fn parse_count(raw: Option<&str>) -> Parsed {
    let text = match raw.map(str::trim) {
        None | Some("") => return Parsed::Missing,
        Some(t) => t,
    };
    if let Ok(v) = text.parse::<i64>() {
        return Parsed::Value(v);
    }
    // "12.0" is still a whole number
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Parsed::Value(f as i64)
        }
        _ => Parsed::Invalid,
    }
}

impl MatchForm {
    /// Check every rule and either return the typed situation or all the
    /// inline errors at once.
    pub fn validate(&self) -> Result<MatchSituation, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let batting_team = parse_choice::<Team>(
            &self.batting_team,
            Field::BattingTeam,
            ValidationError::UnknownTeam,
            &mut errors,
        );
        let bowling_team = parse_choice::<Team>(
            &self.bowling_team,
            Field::BowlingTeam,
            ValidationError::UnknownTeam,
            &mut errors,
        );
        let city = parse_choice::<City>(
            &self.city,
            Field::City,
            ValidationError::UnknownCity,
            &mut errors,
        );

        let target_runs = self.count(Field::TargetRuns, &mut errors).and_then(|v| {
            if v < 1 {
                errors.push(Field::TargetRuns, ValidationError::TargetTooSmall);
                None
            } else {
                bounded(Field::TargetRuns, v, u32::MAX, &mut errors)
            }
        });
        let runs_left = self
            .count(Field::RunsLeft, &mut errors)
            .and_then(|v| bounded(Field::RunsLeft, v, u32::MAX, &mut errors));
        let balls_left = self
            .count(Field::BallsLeft, &mut errors)
            .and_then(|v| bounded(Field::BallsLeft, v, BALLS_PER_INNINGS, &mut errors));
        let wickets_left = self
            .count(Field::WicketsLeft, &mut errors)
            .and_then(|v| bounded(Field::WicketsLeft, v, WICKETS_PER_INNINGS, &mut errors));

        if let (Some(bat), Some(bowl)) = (batting_team, bowling_team) {
            if bat == bowl {
                errors.push(Field::BowlingTeam, ValidationError::SameTeams);
            }
        }
        if let (Some(runs), Some(target)) = (runs_left, target_runs) {
            if runs > target {
                errors.push(Field::RunsLeft, ValidationError::RunsExceedTarget);
            }
        }

        match (
            batting_team,
            bowling_team,
            city,
            target_runs,
            runs_left,
            balls_left,
            wickets_left,
        ) {
            (
                Some(batting_team),
                Some(bowling_team),
                Some(city),
                Some(target_runs),
                Some(runs_left),
                Some(balls_left),
                Some(wickets_left),
            ) if errors.is_empty() => Ok(MatchSituation {
                batting_team,
                bowling_team,
                city,
                target_runs,
                runs_left,
                balls_left,
                wickets_left,
            }),
            _ => Err(errors),
        }
    }

    /// Rates for whatever has been typed so far. Unparsable or negative
    /// inputs count as unset.
    pub fn rates(&self) -> RunRates {
        let lenient = |raw: &Option<String>| match parse_count(raw.as_deref()) {
            Parsed::Value(v) => u32::try_from(v).ok(),
            _ => None,
        };
        run_rate::derive_partial(
            lenient(&self.target_runs),
            lenient(&self.runs_left),
            lenient(&self.balls_left),
        )
    }

    fn raw(&self, field: Field) -> Option<&str> {
        match field {
            Field::TargetRuns => self.target_runs.as_deref(),
            Field::RunsLeft => self.runs_left.as_deref(),
            Field::BallsLeft => self.balls_left.as_deref(),
            Field::WicketsLeft => self.wickets_left.as_deref(),
            _ => None,
        }
    }

    fn count(&self, field: Field, errors: &mut ValidationErrors) -> Option<i64> {
        match parse_count(self.raw(field)) {
            Parsed::Missing => {
                errors.push(field, ValidationError::Required(field));
                None
            }
            Parsed::Invalid => {
                errors.push(field, ValidationError::NotWholeNumber(field));
                None
            }
            Parsed::Value(v) => Some(v),
        }
    }
}

fn parse_choice<T: std::str::FromStr>(
    raw: &str,
    field: Field,
    unknown: fn(String) -> ValidationError,
    errors: &mut ValidationErrors,
) -> Option<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.push(field, ValidationError::Required(field));
        return None;
    }
    match trimmed.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            errors.push(field, unknown(trimmed.to_string()));
            None
        }
    }
}

fn bounded(field: Field, value: i64, max: u32, errors: &mut ValidationErrors) -> Option<u32> {
    if value < 0 {
        errors.push(field, ValidationError::Negative(field));
        return None;
    }
    if value > max as i64 {
        errors.push(field, ValidationError::AboveMaximum { field, max });
        return None;
    }
    Some(value as u32)
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}
