use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Text layout of every stored timestamp, in local time.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One department's absentees as submitted at a given moment.
///
/// The timestamp is kept as the stored text so reports can echo it verbatim;
/// [`AbsenceRecord::recorded_at`] parses it on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceRecord {
    #[serde(rename = "name")]
    pub department: String,
    pub details: String,
    #[serde(rename = "date")]
    pub timestamp: String,
}

impl AbsenceRecord {
    pub fn new(
        department: impl Into<String>,
        details: impl Into<String>,
        recorded_at: NaiveDateTime,
    ) -> Self {
        Self {
            department: department.into(),
            details: details.into(),
            timestamp: recorded_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn recorded_at(&self) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT)
    }

    pub fn recorded_on(&self) -> Result<NaiveDate, chrono::ParseError> {
        self.recorded_at().map(|at| at.date())
    }
}
