use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// Best-effort calorie figure pulled from the model's free text. `Unparsed`
/// is an explicit signal for the caller; it is never stored as a sentinel
/// string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "status", content = "kcal")]
pub enum CalorieEstimate {
    Parsed(i32),
    Unparsed,
}

impl CalorieEstimate {
    pub fn kcal(self) -> Option<i32> {
        match self {
            CalorieEstimate::Parsed(v) => Some(v),
            CalorieEstimate::Unparsed => None,
        }
    }

    pub fn is_parsed(self) -> bool {
        matches!(self, CalorieEstimate::Parsed(_))
    }
}

lazy_static! {
    static ref CALORIES_RE: Regex =
        Regex::new(r"(?i)total caloric intake from this meal is (\d+) calories").unwrap();
}

/// Match the fixed sentence requested by the analysis prompt. The figure is
/// advisory; anything that doesn't parse as i32 counts as unparsed.
pub fn extract_calories(text: &str) -> CalorieEstimate {
    CALORIES_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .map_or(CalorieEstimate::Unparsed, CalorieEstimate::Parsed)
}
