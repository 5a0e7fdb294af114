use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle stage of a syllabus record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyllabusStatus {
    Draft,
    #[serde(rename = "In Review")]
    InReview,
    Approved,
    Deleted,
}

impl SyllabusStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SyllabusStatus::Draft => "Draft",
            SyllabusStatus::InReview => "In Review",
            SyllabusStatus::Approved => "Approved",
            SyllabusStatus::Deleted => "Deleted",
        }
    }

    /// Parses a dashboard status filter: the stored name or the label shown
    /// on the Hebrew dashboard.
    pub fn from_filter_label(label: &str) -> Option<Self> {
        match label {
            "סילבוס" => Some(SyllabusStatus::Draft),
            "בבחינה" => Some(SyllabusStatus::InReview),
            "מאושר" => Some(SyllabusStatus::Approved),
            other => other.parse().ok(),
        }
    }

    pub fn can_transition_to(self, next: SyllabusStatus) -> bool {
        use SyllabusStatus::*;
        matches!(
            (self, next),
            (Draft, InReview)
                | (InReview, InReview)
                | (InReview, Approved)
                | (Draft | InReview | Approved, Deleted)
        )
    }

    /// Whether the draft content may still be changed.
    pub fn is_editable(self) -> bool {
        matches!(self, SyllabusStatus::Draft | SyllabusStatus::InReview)
    }
}

impl fmt::Display for SyllabusStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown syllabus status {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for SyllabusStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(SyllabusStatus::Draft),
            "In Review" => Ok(SyllabusStatus::InReview),
            "Approved" => Ok(SyllabusStatus::Approved),
            "Deleted" => Ok(SyllabusStatus::Deleted),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A persisted syllabus. `data` is the JSON-encoded draft.
#[derive(Debug, Clone, Serialize)]
pub struct Syllabus {
    pub id: i64,
    pub course_id: Option<i64>,
    pub lecturer_id: i64,
    pub status: SyllabusStatus,
    pub submission_date: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip)]
    pub data: String,
}

/// Dashboard card for one syllabus.
#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub id: i64,
    pub title: String,
    /// `DD/MM/YYYY`, as shown on the card.
    pub date: String,
    #[serde(skip)]
    pub submitted_on: NaiveDate,
    pub lecturer: String,
    pub field: String,
    pub status: SyllabusStatus,
}

/// Narrows the cards listed on the dashboard.
#[derive(Debug, Clone, Default)]
pub struct CardFilter {
    /// Restrict to one lecturer; `None` lists everyone's.
    pub lecturer_id: Option<i64>,
    pub search: Option<String>,
    /// Inclusive bounds, `YYYY-MM-DD`.
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub statuses: Vec<SyllabusStatus>,
    pub deleted: bool,
}
