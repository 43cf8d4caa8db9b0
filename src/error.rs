use thiserror::Error;

/// Integration errors between the widgets and the page that hosts them.
///
/// None of these are user-facing conditions: each one means the portal
/// handed over data (or scaffolding) that breaks the widget contract, so
/// the page load is rejected instead of rendering a broken control.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    #[error("row {index}: missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("job {index} in list {list:?}: missing required field `{field}`")]
    MissingJobField {
        list: String,
        index: usize,
        field: &'static str,
    },

    #[error("row id {id:?} cannot be used as an element id")]
    InvalidId { id: String },

    #[error("row id {id:?} appears more than once")]
    DuplicateId { id: String },

    #[error("page has {rows} row(s) but no `submitUrl` to post the selection to")]
    MissingSubmitUrl { rows: usize },

    #[error(
        "no dialog mount point is attached to the page; `{owner}` cannot open a dialog \
         until the host page provides one"
    )]
    MissingMount { owner: String },

    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}
