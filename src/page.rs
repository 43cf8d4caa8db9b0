//! The page document handed over by the portal, and the checks that turn
//! it into widget input.

use crate::error::WidgetError;
use crate::jobs::{Job, NONE_LABEL};
use crate::tree_builder::DirMapping;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// One archived bundle row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub display_name: String,
    pub timestamp: Option<String>,
    pub delete_url: String,
    /// Absent only on read-only pages, where renaming is disabled.
    pub rename_url: Option<String>,
}

impl Item {
    pub fn date_label(&self) -> &str {
        self.timestamp.as_deref().unwrap_or(NONE_LABEL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobGroup {
    pub title: String,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub submit_url: Option<String>,
    pub mutable: bool,
    pub rows: Vec<Item>,
    pub job_groups: Vec<JobGroup>,
    pub file_tree: DirMapping,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPage {
    submit_url: Option<String>,
    #[serde(default = "default_mutable")]
    mutable: bool,
    #[serde(default)]
    rows: Vec<RawItem>,
    #[serde(default)]
    job_lists: Vec<RawJobList>,
    #[serde(default)]
    file_tree: Option<DirMapping>,
}

fn default_mutable() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    id: Option<String>,
    #[serde(alias = "displayName")]
    file_name: Option<String>,
    date: Option<String>,
    delete_url: Option<String>,
    rename_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawJobList {
    title: String,
    #[serde(default)]
    jobs: Vec<RawJob>,
}

#[derive(Debug, Deserialize)]
struct RawJob {
    start: Option<String>,
    end: Option<String>,
    status: Option<String>,
    complete: Option<bool>,
    success: Option<bool>,
    log: Option<String>,
}

/// Read and validate a page document from `path`, or stdin for `-`.
pub fn load_page(path: &Path) -> Result<Page> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Could not read page document from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Could not read page document {}", path.display()))?
    };
    parse_page(&text).with_context(|| format!("Rejected page document {}", path.display()))
}

pub fn parse_page(json: &str) -> Result<Page> {
    let raw: RawPage = serde_json::from_str(json).context("Page document is not valid JSON")?;
    Ok(validate(raw)?)
}

fn validate(raw: RawPage) -> Result<Page, WidgetError> {
    let rows = validate_rows(raw.rows, raw.mutable)?;
    let submit_url = raw.submit_url.filter(|url| !url.trim().is_empty());
    if !rows.is_empty() && submit_url.is_none() {
        return Err(WidgetError::MissingSubmitUrl { rows: rows.len() });
    }

    let job_groups = raw
        .job_lists
        .into_iter()
        .map(validate_job_list)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page {
        submit_url,
        mutable: raw.mutable,
        rows,
        job_groups,
        file_tree: raw.file_tree.unwrap_or_default(),
    })
}

fn validate_rows(raw_rows: Vec<RawItem>, mutable: bool) -> Result<Vec<Item>, WidgetError> {
    let mut seen = HashSet::with_capacity(raw_rows.len());
    let mut rows = Vec::with_capacity(raw_rows.len());

    for (index, raw) in raw_rows.into_iter().enumerate() {
        let id = required(raw.id, index, "id")?;
        if !is_element_id_safe(&id) {
            return Err(WidgetError::InvalidId { id });
        }
        if !seen.insert(id.clone()) {
            return Err(WidgetError::DuplicateId { id });
        }
        let display_name = required(raw.file_name, index, "fileName")?;
        let delete_url = required(raw.delete_url, index, "deleteUrl")?;
        let rename_url = raw.rename_url.filter(|url| !url.trim().is_empty());
        if mutable && rename_url.is_none() {
            return Err(WidgetError::MissingField {
                index,
                field: "renameUrl",
            });
        }

        rows.push(Item {
            id,
            display_name,
            timestamp: raw.date,
            delete_url,
            rename_url,
        });
    }
    Ok(rows)
}

fn required(value: Option<String>, index: usize, field: &'static str) -> Result<String, WidgetError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(WidgetError::MissingField { index, field })
}

/// Ids double as element ids and form values: ASCII alphanumerics plus
/// `-_.:`, starting with an alphanumeric.
pub fn is_element_id_safe(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

fn validate_job_list(raw: RawJobList) -> Result<JobGroup, WidgetError> {
    let title = raw.title;
    let jobs = raw
        .jobs
        .into_iter()
        .enumerate()
        .map(|(index, job)| {
            let start = job
                .start
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| WidgetError::MissingJobField {
                    list: title.clone(),
                    index,
                    field: "start",
                })?;
            let status = match (job.status, job.complete) {
                (Some(status), _) => status,
                (None, Some(complete)) => Job::status_from_flags(complete, job.success).to_string(),
                (None, None) => {
                    return Err(WidgetError::MissingJobField {
                        list: title.clone(),
                        index,
                        field: "status",
                    });
                }
            };
            Ok(Job {
                start,
                end: job.end.unwrap_or_else(|| NONE_LABEL.to_string()),
                status,
                log: job.log,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(JobGroup { title, jobs })
}
