//! Daily absence log: the record store, department-ordered reporting, and the
//! adapters that present a report as HTML, a Word document, or an e-mail.

pub mod auth;
pub mod departments;
pub mod domain;
pub mod export;
pub mod notify;
pub mod report;
pub mod router;
pub mod service;
pub mod store;
pub mod submission;
pub mod views;

#[cfg(test)]
mod tests;

pub use auth::{AdminUser, SessionRegistry, StaticUserDirectory, UserDirectory};
pub use departments::{DepartmentOrder, DepartmentOrderError};
pub use domain::{AbsenceRecord, TIMESTAMP_FORMAT};
pub use export::{render_docx, ExportError, ExportedDocument, DOCUMENT_FILE_NAME, DOCX_MIME};
pub use notify::{DisabledNotifier, NotifyError, ReportNotifier, SmtpNotifier};
pub use report::{AbsenceReport, ReportAssembler, ReportRow};
pub use router::{absence_router, local_now, AbsencePortal, Clock};
pub use service::{AbsenceService, AbsenceServiceError};
pub use store::{CsvRecordStore, MemoryRecordStore, RecordStore, StoreError};
pub use submission::{AbsenceSubmission, SubmissionError};
