use std::sync::Arc;

use super::common::*;
use crate::absences::export::{document_xml, DOCUMENT_FILE_NAME};
use crate::absences::notify::NotifyError;
use crate::absences::service::{AbsenceService, AbsenceServiceError};
use crate::absences::store::{RecordStore, StoreError};
use crate::absences::submission::SubmissionError;
use crate::absences::{DepartmentOrder, MemoryRecordStore};

#[test]
fn submit_stamps_record_with_supplied_time() {
    let (service, store, _) = build_service(Vec::new());

    let record = service
        .submit(
            submission("Маркетинг", &[("Коваль", "лікарняний"), ("Мельник", "відпустка")]),
            at(8, 45),
        )
        .expect("submission stored");

    assert_eq!(record.department, "Маркетинг");
    assert_eq!(record.details, "Коваль (лікарняний), Мельник (відпустка)");
    assert_eq!(record.timestamp, "2025-03-07 08:45:00");
    assert_eq!(store.load_all().expect("load"), vec![record]);
}

#[test]
fn submit_rejects_blank_department_without_writing() {
    let (service, store, _) = build_service(Vec::new());

    let error = service
        .submit(submission("  ", &[("Коваль", "лікарняний")]), at(8, 45))
        .expect_err("blank department");

    assert!(matches!(
        error,
        AbsenceServiceError::Submission(SubmissionError::MissingDepartment)
    ));
    assert!(store.load_all().expect("load").is_empty());
}

#[test]
fn today_report_orders_seeded_scenario() {
    let (service, _, _) = build_service(seeded_records());

    let report = service.today_report(fixed_clock()).expect("report");
    let rows: Vec<_> = report
        .rows
        .iter()
        .map(|row| (row.index, row.department.as_str()))
        .collect();
    assert_eq!(
        rows,
        [
            (1, "Бухгалтерія"),
            (2, "Бюджетний відділ"),
            (3, "Unknown Dept")
        ]
    );
}

#[test]
fn email_sends_the_document_export_would_produce() {
    let (service, _, notifier) = build_service(seeded_records());

    let report = service
        .email_today("director@example.com", fixed_clock())
        .expect("email sent");
    let exported = service.export_today(fixed_clock()).expect("export");

    let deliveries = notifier.deliveries();
    assert_eq!(deliveries.len(), 1);
    let (recipient, document) = &deliveries[0];
    assert_eq!(recipient, "director@example.com");
    assert_eq!(document.file_name, DOCUMENT_FILE_NAME);
    assert_eq!(document, &exported);
    assert_eq!(report.len(), 3);
    assert!(document_xml(&report).contains("Сидоров (відрядження)"));
}

#[test]
fn notifier_failures_surface_to_caller() {
    let store = Arc::new(MemoryRecordStore::with_records(seeded_records()));
    let service = AbsenceService::new(store, Arc::new(FailingNotifier), DepartmentOrder::standard());

    let error = service
        .email_today("director@example.com", fixed_clock())
        .expect_err("transport failure");
    assert!(matches!(
        error,
        AbsenceServiceError::Notify(NotifyError::Transport(_))
    ));
}

#[test]
fn storage_failures_are_not_retried() {
    let service = AbsenceService::new(
        Arc::new(UnavailableStore),
        Arc::new(RecordingNotifier::default()),
        DepartmentOrder::standard(),
    );

    assert!(matches!(
        service.today_report(fixed_clock()),
        Err(AbsenceServiceError::Store(StoreError::Storage(_)))
    ));
    assert!(matches!(
        service.submit(submission("Розвиток", &[("A", "x")]), at(9, 0)),
        Err(AbsenceServiceError::Store(StoreError::Storage(_)))
    ));
}

#[test]
fn configured_order_changes_report_order() {
    let store = Arc::new(MemoryRecordStore::with_records(seeded_records()));
    let order = DepartmentOrder::new(["Unknown Dept", "Бюджетний відділ"]);
    let service = AbsenceService::new(store, Arc::new(RecordingNotifier::default()), order);

    let report = service.today_report(fixed_clock()).expect("report");
    let departments: Vec<_> = report.rows.iter().map(|row| row.department.as_str()).collect();
    assert_eq!(
        departments,
        ["Unknown Dept", "Бюджетний відділ", "Бухгалтерія"]
    );
}
