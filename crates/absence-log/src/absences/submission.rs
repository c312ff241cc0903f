use serde::{Deserialize, Serialize};

/// Separator placed between `person (reason)` pairs in `details`.
pub const DETAILS_SEPARATOR: &str = ", ";

/// A department's absentee list as posted by the submission form.
///
/// `absent_person` and `reason` are paired by position; surplus entries on
/// either side are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceSubmission {
    pub name: String,
    #[serde(default)]
    pub absent_person: Vec<String>,
    #[serde(default)]
    pub reason: Vec<String>,
}

impl AbsenceSubmission {
    /// Collects url-encoded `key=value` pairs where the list fields repeat.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        pairs
            .into_iter()
            .fold(Self::default(), |mut submission, (key, value)| {
                match key.as_str() {
                    "name" => submission.name = value,
                    "absent_person" | "absent_person[]" => submission.absent_person.push(value),
                    "reason" | "reason[]" => submission.reason.push(value),
                    _ => {}
                }
                submission
            })
    }

    pub fn validate(&self) -> Result<(), SubmissionError> {
        if self.name.trim().is_empty() {
            return Err(SubmissionError::MissingDepartment);
        }
        Ok(())
    }

    /// Renders the free-text `details` column.
    pub fn details(&self) -> String {
        self.absent_person
            .iter()
            .zip(&self.reason)
            .map(|(person, reason)| format!("{person} ({reason})"))
            .collect::<Vec<_>>()
            .join(DETAILS_SEPARATOR)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("department name is required")]
    MissingDepartment,
}
