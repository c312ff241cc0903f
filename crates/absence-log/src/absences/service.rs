use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::info;

use super::departments::DepartmentOrder;
use super::domain::AbsenceRecord;
use super::export::{render_docx, ExportError, ExportedDocument};
use super::notify::{NotifyError, ReportNotifier};
use super::report::{AbsenceReport, ReportAssembler};
use super::store::{RecordStore, StoreError};
use super::submission::{AbsenceSubmission, SubmissionError};

/// Composes the record store, report assembler, exporter, and notifier.
///
/// Every operation takes `now` from the caller so a request works on one
/// consistent notion of "today".
pub struct AbsenceService<S: ?Sized, N: ?Sized> {
    store: Arc<S>,
    notifier: Arc<N>,
    assembler: ReportAssembler,
}

impl<S, N> AbsenceService<S, N>
where
    S: RecordStore + ?Sized + 'static,
    N: ReportNotifier + ?Sized + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, order: DepartmentOrder) -> Self {
        Self {
            store,
            notifier,
            assembler: ReportAssembler::new(order),
        }
    }

    pub fn assembler(&self) -> &ReportAssembler {
        &self.assembler
    }

    /// Records a form submission stamped with `now`.
    pub fn submit(
        &self,
        submission: AbsenceSubmission,
        now: NaiveDateTime,
    ) -> Result<AbsenceRecord, AbsenceServiceError> {
        submission.validate()?;
        let record = AbsenceRecord::new(submission.name.clone(), submission.details(), now);
        self.store.append(&record)?;
        info!(
            department = %record.department,
            absentees = submission.absent_person.len().min(submission.reason.len()),
            "recorded absence submission"
        );
        Ok(record)
    }

    pub fn today_report(&self, now: NaiveDateTime) -> Result<AbsenceReport, AbsenceServiceError> {
        Ok(self.assembler.build_today_report(self.store.as_ref(), now)?)
    }

    /// Today's report rendered as a `.docx`.
    pub fn export_today(
        &self,
        now: NaiveDateTime,
    ) -> Result<ExportedDocument, AbsenceServiceError> {
        let report = self.today_report(now)?;
        let document = render_docx(&report)?;
        info!(day = %report.day, rows = report.len(), "exported absence report");
        Ok(document)
    }

    /// Renders today's report once and mails that same document.
    pub fn email_today(
        &self,
        recipient: &str,
        now: NaiveDateTime,
    ) -> Result<AbsenceReport, AbsenceServiceError> {
        let report = self.today_report(now)?;
        let document = render_docx(&report)?;
        self.notifier.send(recipient, &document)?;
        Ok(report)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AbsenceServiceError {
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}
