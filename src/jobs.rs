use crate::error::WidgetError;
use crate::modal::{DialogOwner, ModalContent, ModalHost};
use tracing::debug;

/// Rendered for absent dates.
pub const NONE_LABEL: &str = "None";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub start: String,
    pub end: String,
    pub status: String,
    pub log: Option<String>,
}

impl Job {
    /// Status shown when the portal reports completion flags instead of
    /// a status string.
    pub fn status_from_flags(complete: bool, success: Option<bool>) -> &'static str {
        match (complete, success) {
            (false, _) => "Running",
            (true, Some(true)) => "Succeeded",
            (true, _) => "Failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView<'a> {
    pub start: &'a str,
    pub end: &'a str,
    pub status: &'a str,
    pub log_enabled: bool,
}

#[derive(Debug)]
pub struct JobRow {
    job: Job,
    dialog: DialogOwner,
}

impl JobRow {
    pub fn mount(owner_id: String, job: Job, host: &ModalHost) -> Self {
        JobRow {
            job,
            dialog: DialogOwner::mount(owner_id, host),
        }
    }

    pub fn dialog(&self) -> &DialogOwner {
        &self.dialog
    }

    pub fn view_log_enabled(&self) -> bool {
        self.job.log.is_some()
    }

    pub fn view(&self) -> JobRowView<'_> {
        JobRowView {
            start: &self.job.start,
            end: &self.job.end,
            status: &self.job.status,
            log_enabled: self.view_log_enabled(),
        }
    }

    /// Show the log dialog. Returns `Ok(false)` when the control is
    /// disabled because the job has no log.
    pub fn open_log(&self, host: &mut ModalHost) -> Result<bool, WidgetError> {
        let Some(log) = &self.job.log else {
            return Ok(false);
        };
        debug!(owner = self.dialog.id(), "log requested");
        let title = format!("{} ({} → {})", self.job.status, self.job.start, self.job.end);
        self.dialog.request(
            host,
            ModalContent::Log {
                title,
                text: log.clone(),
            },
        )?;
        Ok(true)
    }
}

/// A titled, read-only list of job rows.
#[derive(Debug)]
pub struct JobList {
    title: String,
    rows: Vec<JobRow>,
}

impl JobList {
    /// Owner ids are `job-<list_key>-<index>`.
    pub fn mount(list_key: usize, title: String, jobs: Vec<Job>, host: &ModalHost) -> Self {
        let rows = jobs
            .into_iter()
            .enumerate()
            .map(|(idx, job)| JobRow::mount(format!("job-{list_key}-{idx}"), job, host))
            .collect();
        JobList { title, rows }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn rows(&self) -> &[JobRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
