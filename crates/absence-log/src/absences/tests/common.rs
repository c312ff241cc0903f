use std::sync::{Arc, Mutex};

use axum::http::{header, StatusCode};
use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::absences::auth::StaticUserDirectory;
use crate::absences::domain::AbsenceRecord;
use crate::absences::export::ExportedDocument;
use crate::absences::notify::{NotifyError, ReportNotifier};
use crate::absences::router::{absence_router, AbsencePortal};
use crate::absences::service::AbsenceService;
use crate::absences::store::{MemoryRecordStore, RecordStore, StoreError};
use crate::absences::submission::AbsenceSubmission;
use crate::absences::DepartmentOrder;

pub(super) const ADMIN_USER: &str = "admin";
pub(super) const ADMIN_PASSWORD: &str = "admin";

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 7).expect("valid date")
}

pub(super) fn at(hour: u32, minute: u32) -> NaiveDateTime {
    today().and_hms_opt(hour, minute, 0).expect("valid time")
}

pub(super) fn fixed_clock() -> NaiveDateTime {
    at(12, 0)
}

pub(super) fn seeded_records() -> Vec<AbsenceRecord> {
    vec![
        AbsenceRecord::new("Бухгалтерія", "Іванов (лікарняний)", at(9, 0)),
        AbsenceRecord::new("Unknown Dept", "Петров (відпустка)", at(9, 5)),
        AbsenceRecord::new("Бюджетний відділ", "Сидоров (відрядження)", at(9, 10)),
        AbsenceRecord::new(
            "Розвиток",
            "Вчорашній (відгул)",
            today()
                .pred_opt()
                .expect("valid date")
                .and_hms_opt(17, 0, 0)
                .expect("valid time"),
        ),
    ]
}

pub(super) fn submission(name: &str, pairs: &[(&str, &str)]) -> AbsenceSubmission {
    AbsenceSubmission {
        name: name.to_string(),
        absent_person: pairs.iter().map(|(person, _)| person.to_string()).collect(),
        reason: pairs.iter().map(|(_, reason)| reason.to_string()).collect(),
    }
}

#[derive(Debug, Default)]
pub(super) struct RecordingNotifier {
    deliveries: Mutex<Vec<(String, ExportedDocument)>>,
}

impl RecordingNotifier {
    pub(super) fn deliveries(&self) -> Vec<(String, ExportedDocument)> {
        self.deliveries
            .lock()
            .expect("notifier mutex poisoned")
            .clone()
    }
}

impl ReportNotifier for RecordingNotifier {
    fn send(&self, recipient: &str, document: &ExportedDocument) -> Result<(), NotifyError> {
        self.deliveries
            .lock()
            .expect("notifier mutex poisoned")
            .push((recipient.to_string(), document.clone()));
        Ok(())
    }
}

pub(super) struct FailingNotifier;

impl ReportNotifier for FailingNotifier {
    fn send(&self, _recipient: &str, _document: &ExportedDocument) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("relay refused connection".to_string()))
    }
}

pub(super) struct UnavailableStore;

impl RecordStore for UnavailableStore {
    fn append(&self, _record: &AbsenceRecord) -> Result<(), StoreError> {
        Err(StoreError::Storage(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only volume",
        )))
    }

    fn load_all(&self) -> Result<Vec<AbsenceRecord>, StoreError> {
        Err(StoreError::Storage(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only volume",
        )))
    }
}

pub(super) type MemoryService = AbsenceService<MemoryRecordStore, RecordingNotifier>;

pub(super) fn build_service(
    records: Vec<AbsenceRecord>,
) -> (MemoryService, Arc<MemoryRecordStore>, Arc<RecordingNotifier>) {
    let store = Arc::new(MemoryRecordStore::with_records(records));
    let notifier = Arc::new(RecordingNotifier::default());
    let service = AbsenceService::new(store.clone(), notifier.clone(), DepartmentOrder::standard());
    (service, store, notifier)
}

pub(super) fn portal<S, N>(service: AbsenceService<S, N>) -> AbsencePortal<S, N>
where
    S: RecordStore + ?Sized + 'static,
    N: ReportNotifier + ?Sized + 'static,
{
    let users = StaticUserDirectory::default().with_account(ADMIN_USER, ADMIN_PASSWORD);
    AbsencePortal::new(Arc::new(service), Arc::new(users)).with_clock(fixed_clock)
}

pub(super) fn router_for<S, N>(portal: AbsencePortal<S, N>) -> axum::Router
where
    S: RecordStore + ?Sized + 'static,
    N: ReportNotifier + ?Sized + 'static,
{
    absence_router(portal)
}

pub(super) fn session_header<S: ?Sized, N: ?Sized>(portal: &AbsencePortal<S, N>) -> String {
    let user = portal
        .users
        .find_by_credentials(ADMIN_USER, ADMIN_PASSWORD)
        .expect("admin exists");
    format!("absence_session={}", portal.sessions.open(user))
}

pub(super) fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

pub(super) fn assert_redirect(response: &Response, target: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response), Some(target));
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_slice(&read_body(response).await).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    String::from_utf8(read_body(response).await).expect("utf-8 body")
}
