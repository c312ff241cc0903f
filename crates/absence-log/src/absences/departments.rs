use std::path::Path;

use serde::Serialize;

const STANDARD_DEPARTMENTS: [&str; 16] = [
    "Бухгалтерія",
    "Бюджетний відділ",
    "Розвиток",
    "Тендерний",
    "Обслуговування",
    "Відділ Продажу",
    "Фарм Отдел",
    "Маркетинг",
    "Зовнішня служба",
    "Відділ закупівель",
    "Фінансовий відділ",
    "Відділ IT",
    "Відділ персоналу",
    "Відділ контролю якості",
    "Відділ економ безпеки",
    "Керівники",
];

/// Fixed priority list deciding the row order of a report.
///
/// Names are compared byte-for-byte. Anything not listed ranks after every
/// listed department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentOrder {
    names: Vec<String>,
}

impl DepartmentOrder {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The office's built-in department list.
    pub fn standard() -> Self {
        Self::new(STANDARD_DEPARTMENTS)
    }

    /// Reads one department per line. Blank lines are skipped, other lines are
    /// kept exactly as written apart from the line terminator.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DepartmentOrderError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|source| DepartmentOrderError::Io {
                path: path.display().to_string(),
                source,
            })?;
        let order = Self::parse(&contents);
        if order.is_empty() {
            return Err(DepartmentOrderError::Empty {
                path: path.display().to_string(),
            });
        }
        Ok(order)
    }

    fn parse(contents: &str) -> Self {
        Self::new(
            contents
                .lines()
                .map(|line| line.strip_suffix('\r').unwrap_or(line))
                .filter(|line| !line.trim().is_empty()),
        )
    }

    /// Position of `department` in the list, or `len()` for unknown names.
    pub fn rank(&self, department: &str) -> usize {
        self.names
            .iter()
            .position(|name| name == department)
            .unwrap_or(self.names.len())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for DepartmentOrder {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DepartmentOrderError {
    #[error("failed to read department list {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("department list {path} contains no names")]
    Empty { path: String },
}
