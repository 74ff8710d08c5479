//! Form input: the fixed level/period/week choices and the submission rule.

use std::fmt;
use std::str::FromStr;

use crate::plan::types::LessonContext;

/// Errors from parsing or validating form input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("a subject is required when no file is attached")]
    MissingSubjectOrFiles,

    #[error("invalid level {0:?} (expected 1-6 or \"Niveau N\")")]
    InvalidLevel(String),

    #[error("invalid period {0:?} (expected 1-4 or \"Période N\")")]
    InvalidPeriod(String),

    #[error("invalid week {0:?} (expected 1-5 or \"Semaine N\")")]
    InvalidWeek(String),
}

/// Parse `"3"` or `"<prefix> 3"` into a number within `1..=max`.
fn parse_numbered(raw: &str, prefix: &str, max: u8) -> Option<u8> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix(prefix)
        .map(str::trim)
        .unwrap_or(trimmed);
    digits.parse::<u8>().ok().filter(|n| (1..=max).contains(n))
}

/// Primary-school grade, `Niveau 1` to `Niveau 6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level(u8);

impl Level {
    pub const COUNT: u8 = 6;

    pub fn new(n: u8) -> Option<Self> {
        (1..=Self::COUNT).contains(&n).then_some(Self(n))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Label sent to the model, e.g. "Niveau 4".
    pub fn label(self) -> String {
        format!("Niveau {}", self.0)
    }

    /// Grade caption shown next to the label, e.g. "4AEP".
    pub fn caption(self) -> String {
        format!("{}AEP", self.0)
    }

    pub fn all() -> impl Iterator<Item = Level> {
        (1..=Self::COUNT).map(Level)
    }
}

impl Default for Level {
    fn default() -> Self {
        Self(4)
    }
}

impl FromStr for Level {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_numbered(s, "Niveau", Self::COUNT)
            .map(Self)
            .ok_or_else(|| FormError::InvalidLevel(s.to_string()))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Niveau {}", self.0)
    }
}

/// School period, `Période 1` to `Période 4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period(u8);

impl Period {
    pub const COUNT: u8 = 4;

    pub fn new(n: u8) -> Option<Self> {
        (1..=Self::COUNT).contains(&n).then_some(Self(n))
    }

    pub fn label(self) -> String {
        format!("Période {}", self.0)
    }

    pub fn all() -> impl Iterator<Item = Period> {
        (1..=Self::COUNT).map(Period)
    }
}

impl Default for Period {
    fn default() -> Self {
        Self(3)
    }
}

impl FromStr for Period {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_numbered(s, "Période", Self::COUNT)
            .map(Self)
            .ok_or_else(|| FormError::InvalidPeriod(s.to_string()))
    }
}

/// Week within a period, `Semaine 1` to `Semaine 5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Week(u8);

impl Week {
    pub const COUNT: u8 = 5;

    pub fn new(n: u8) -> Option<Self> {
        (1..=Self::COUNT).contains(&n).then_some(Self(n))
    }

    pub fn label(self) -> String {
        format!("Semaine {}", self.0)
    }

    pub fn all() -> impl Iterator<Item = Week> {
        (1..=Self::COUNT).map(Week)
    }
}

impl Default for Week {
    fn default() -> Self {
        Self(2)
    }
}

impl FromStr for Week {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_numbered(s, "Semaine", Self::COUNT)
            .map(Self)
            .ok_or_else(|| FormError::InvalidWeek(s.to_string()))
    }
}

/// The form fields of one generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonForm {
    pub level: Level,
    pub period: Period,
    pub week: Week,
    pub subject: String,
}

impl LessonForm {
    pub fn context(&self) -> LessonContext {
        LessonContext::new(
            self.level.label(),
            self.period.label(),
            self.week.label(),
            self.subject.clone(),
        )
    }
}

/// A request needs a non-blank subject or at least one attached file.
pub fn check_submission(subject: &str, file_count: usize) -> Result<(), FormError> {
    if subject.trim().is_empty() && file_count == 0 {
        return Err(FormError::MissingSubjectOrFiles);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_initial_form() {
        let form = LessonForm::default();
        let ctx = form.context();
        assert_eq!(ctx.level, "Niveau 4");
        assert_eq!(ctx.period, "Période 3");
        assert_eq!(ctx.week, "Semaine 2");
        assert_eq!(ctx.subject, "");
    }

    #[test]
    fn parses_numbers_and_labels() {
        assert_eq!("6".parse::<Level>().unwrap().number(), 6);
        assert_eq!("Niveau 1".parse::<Level>().unwrap().label(), "Niveau 1");
        assert_eq!("Période 4".parse::<Period>().unwrap().label(), "Période 4");
        assert_eq!(" 5 ".parse::<Week>().unwrap().label(), "Semaine 5");
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            "7".parse::<Level>().unwrap_err(),
            FormError::InvalidLevel("7".to_string())
        );
        assert!("0".parse::<Period>().is_err());
        assert!("Période 5".parse::<Period>().is_err());
        assert!("Semaine 6".parse::<Week>().is_err());
        assert!("deux".parse::<Week>().is_err());
    }

    #[test]
    fn choice_sets_have_fixed_sizes() {
        assert_eq!(Level::all().count(), 6);
        assert_eq!(Period::all().count(), 4);
        assert_eq!(Week::all().count(), 5);
        assert_eq!(Level::new(3).unwrap().caption(), "3AEP");
        assert!(Level::new(0).is_none());
    }

    #[test]
    fn submission_requires_subject_or_files() {
        assert!(check_submission("La forêt", 0).is_ok());
        assert!(check_submission("", 1).is_ok());
        assert!(check_submission("La forêt", 2).is_ok());
        assert_eq!(
            check_submission("", 0),
            Err(FormError::MissingSubjectOrFiles)
        );
        assert_eq!(
            check_submission("  \t", 0),
            Err(FormError::MissingSubjectOrFiles)
        );
    }
}
