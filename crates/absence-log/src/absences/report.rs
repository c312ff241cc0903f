use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use super::departments::DepartmentOrder;
use super::domain::AbsenceRecord;
use super::store::{RecordStore, StoreError};

/// One display row. `index` is 1-based and assigned after ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub index: usize,
    pub department: String,
    pub details: String,
    pub timestamp: String,
}

/// A day's absences in department order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbsenceReport {
    pub day: NaiveDate,
    pub rows: Vec<ReportRow>,
}

impl AbsenceReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Orders a day's records by [`DepartmentOrder`].
#[derive(Debug, Clone, Default)]
pub struct ReportAssembler {
    order: DepartmentOrder,
}

impl ReportAssembler {
    pub fn new(order: DepartmentOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> &DepartmentOrder {
        &self.order
    }

    /// Loads the records dated `now.date()` and orders them.
    pub fn build_today_report<S>(
        &self,
        store: &S,
        now: NaiveDateTime,
    ) -> Result<AbsenceReport, StoreError>
    where
        S: RecordStore + ?Sized,
    {
        let day = now.date();
        let records = store.load_for_date(day)?;
        let report = self.assemble(day, records);
        debug!(%day, rows = report.len(), "assembled absence report");
        Ok(report)
    }

    /// Sorts `records` by department rank and numbers them.
    ///
    /// The sort is stable: records sharing a rank, including every unknown
    /// department, keep the order they were given in.
    pub fn assemble(&self, day: NaiveDate, mut records: Vec<AbsenceRecord>) -> AbsenceReport {
        records.sort_by_key(|record| self.order.rank(&record.department));

        let rows = records
            .into_iter()
            .enumerate()
            .map(|(position, record)| ReportRow {
                index: position + 1,
                department: record.department,
                details: record.details,
                timestamp: record.timestamp,
            })
            .collect();

        AbsenceReport { day, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::absences::store::MemoryRecordStore;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        day().and_hms_opt(hour, minute, 0).unwrap()
    }

    fn record(department: &str, details: &str, when: NaiveDateTime) -> AbsenceRecord {
        AbsenceRecord::new(department, details, when)
    }

    fn departments(report: &AbsenceReport) -> Vec<&str> {
        report.rows.iter().map(|row| row.department.as_str()).collect()
    }

    #[test]
    fn known_departments_precede_unknown_ones() {
        let store = MemoryRecordStore::with_records(vec![
            record("Бухгалтерія", "Іванов (лікарняний)", at(9, 0)),
            record("Unknown Dept", "Петров (відпустка)", at(9, 5)),
            record("Бюджетний відділ", "Сидоров (відрядження)", at(9, 10)),
        ]);

        let report = ReportAssembler::default()
            .build_today_report(&store, at(12, 0))
            .expect("report builds");

        assert_eq!(
            departments(&report),
            ["Бухгалтерія", "Бюджетний відділ", "Unknown Dept"]
        );
        let indices: Vec<_> = report.rows.iter().map(|row| row.index).collect();
        assert_eq!(indices, [1, 2, 3]);
    }

    #[test]
    fn ties_keep_append_order() {
        let records = vec![
            record("Керівники", "first", at(8, 0)),
            record("Розвиток", "second", at(9, 0)),
            record("Керівники", "third", at(7, 0)),
            record("Розвиток", "fourth", at(6, 0)),
        ];

        let report = ReportAssembler::default().assemble(day(), records);
        let details: Vec<_> = report.rows.iter().map(|row| row.details.as_str()).collect();
        assert_eq!(details, ["second", "fourth", "first", "third"]);
    }

    #[test]
    fn unknown_departments_keep_submission_order_regardless_of_time() {
        let records = vec![
            record("Zeta", "z", at(11, 0)),
            record("Alpha", "a", at(8, 0)),
            record("Керівники", "k", at(17, 0)),
            record("Бухгалтерія ", "near miss", at(7, 0)),
        ];

        let report = ReportAssembler::default().assemble(day(), records);
        assert_eq!(
            departments(&report),
            ["Керівники", "Zeta", "Alpha", "Бухгалтерія "]
        );
    }

    #[test]
    fn other_days_are_excluded() {
        let yesterday = day().pred_opt().unwrap().and_hms_opt(23, 59, 59).unwrap();
        let tomorrow = day().succ_opt().unwrap().and_hms_opt(0, 0, 0).unwrap();
        let store = MemoryRecordStore::with_records(vec![
            record("Розвиток", "late", yesterday),
            record("Тендерний", "today", at(10, 0)),
            record("Маркетинг", "early", tomorrow),
        ]);

        let report = ReportAssembler::default()
            .build_today_report(&store, at(0, 0))
            .expect("report builds");
        assert_eq!(departments(&report), ["Тендерний"]);
        assert_eq!(report.day, day());
    }

    #[test]
    fn empty_day_yields_empty_report() {
        let store = MemoryRecordStore::default();
        let report = ReportAssembler::default()
            .build_today_report(&store, at(9, 0))
            .expect("empty store is not an error");
        assert!(report.is_empty());
    }

    #[test]
    fn repeated_builds_are_identical() {
        let store = MemoryRecordStore::with_records(vec![
            record("Unknown", "u", at(9, 0)),
            record("Маркетинг", "m", at(9, 1)),
        ]);
        let assembler = ReportAssembler::default();

        let first = assembler.build_today_report(&store, at(15, 0)).unwrap();
        let second = assembler.build_today_report(&store, at(15, 0)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn timestamps_are_echoed_verbatim() {
        let records = vec![AbsenceRecord {
            department: "Розвиток".to_string(),
            details: "A (x)".to_string(),
            timestamp: "2025-03-07 09:00:00".to_string(),
        }];
        let report = ReportAssembler::default().assemble(day(), records);
        assert_eq!(report.rows[0].timestamp, "2025-03-07 09:00:00");
    }

    #[test]
    fn custom_order_is_honoured() {
        let assembler = ReportAssembler::new(DepartmentOrder::new(["Ops", "Sales"]));
        let records = vec![
            record("Sales", "s", at(9, 0)),
            record("Бухгалтерія", "b", at(9, 1)),
            record("Ops", "o", at(9, 2)),
        ];
        let report = assembler.assemble(day(), records);
        assert_eq!(departments(&report), ["Ops", "Sales", "Бухгалтерія"]);
    }

    #[test]
    fn malformed_date_fails_the_report() {
        let store = MemoryRecordStore::with_records(vec![AbsenceRecord {
            department: "Розвиток".to_string(),
            details: "A (x)".to_string(),
            timestamp: "not a date".to_string(),
        }]);
        let error = ReportAssembler::default()
            .build_today_report(&store, at(9, 0))
            .expect_err("fail fast");
        assert!(error.is_parse_error());
    }
}
