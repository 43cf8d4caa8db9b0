use crate::error::WidgetError;
use crate::form::{FormSubmission, RENAME_FIELD, SELECTION_FIELD};
use crate::modal::{DialogOwner, ModalContent, ModalHost};
use crate::page::Item;
use std::collections::HashSet;
use tracing::{debug, info};

/// What one row shows: checkbox, labels and which controls are live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub date: &'a str,
    pub checked: bool,
    pub rename_enabled: bool,
    pub delete_href: &'a str,
}

/// Why the bulk submit control is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitBlocker {
    ReadOnly,
    NoSubmitUrl,
}

impl std::fmt::Display for SubmitBlocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitBlocker::ReadOnly => write!(f, "read-only"),
            SubmitBlocker::NoSubmitUrl => write!(f, "no submit URL"),
        }
    }
}

/// A bundle row plus the dialog it may open for renaming.
#[derive(Debug)]
pub struct SelectableRow {
    item: Item,
    dialog: DialogOwner,
}

impl SelectableRow {
    pub fn mount(item: Item, host: &ModalHost) -> Self {
        let dialog = DialogOwner::mount(format!("rename-{}", item.id), host);
        SelectableRow { item, dialog }
    }

    pub fn dialog(&self) -> &DialogOwner {
        &self.dialog
    }
}

/// Rows wrapped in the bulk-submission form, with the selection set.
///
/// Rename is gated by `mutable`; delete is not. Delete links stay live on
/// read-only pages.
#[derive(Debug)]
pub struct SelectableTable {
    rows: Vec<SelectableRow>,
    selected: HashSet<String>,
    submit_url: Option<String>,
    mutable: bool,
    pub(crate) cursor: usize,
}

impl SelectableTable {
    pub fn mount(
        items: Vec<Item>,
        submit_url: Option<String>,
        mutable: bool,
        host: &ModalHost,
    ) -> Self {
        SelectableTable {
            rows: items
                .into_iter()
                .map(|item| SelectableRow::mount(item, host))
                .collect(),
            selected: HashSet::new(),
            submit_url,
            mutable,
            cursor: 0,
        }
    }

    /// Swap in a new row list. The previous selection is discarded and the
    /// old rows drop their dialog subscriptions.
    pub fn replace_rows(&mut self, items: Vec<Item>, host: &ModalHost) {
        self.rows = items
            .into_iter()
            .map(|item| SelectableRow::mount(item, host))
            .collect();
        self.selected.clear();
        self.cursor = 0;
    }

    /// Point the bulk form at a new action and read-only state.
    pub fn set_form(&mut self, submit_url: Option<String>, mutable: bool) {
        self.submit_url = submit_url;
        self.mutable = mutable;
    }

    pub fn rows(&self) -> &[SelectableRow] {
        &self.rows
    }

    pub fn submit_blocker(&self) -> Option<SubmitBlocker> {
        if !self.mutable {
            Some(SubmitBlocker::ReadOnly)
        } else if self.submit_url.is_none() {
            Some(SubmitBlocker::NoSubmitUrl)
        } else {
            None
        }
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_blocker().is_none()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    fn has_row(&self, id: &str) -> bool {
        self.rows.iter().any(|row| row.item.id == id)
    }

    /// Set `id`'s membership to `desired`. Unknown ids are ignored; a
    /// late event from a row that is gone is not an error.
    ///
    /// Returns whether the selection changed.
    pub fn toggle(&mut self, id: &str, desired: bool) -> bool {
        if !self.has_row(id) {
            debug!(id, "toggle for unknown row ignored");
            return false;
        }
        if desired {
            self.selected.insert(id.to_string())
        } else {
            self.selected.remove(id)
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self.rows.iter().map(|row| row.item.id.clone()).collect();
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    /// Selected ids in row order.
    pub fn selected_ids(&self) -> Vec<&str> {
        self.rows
            .iter()
            .map(|row| row.item.id.as_str())
            .filter(|id| self.selected.contains(*id))
            .collect()
    }

    pub fn views(&self) -> Vec<RowView<'_>> {
        self.rows
            .iter()
            .map(|row| RowView {
                id: &row.item.id,
                name: &row.item.display_name,
                date: row.item.date_label(),
                checked: self.is_selected(&row.item.id),
                rename_enabled: self.mutable,
                delete_href: &row.item.delete_url,
            })
            .collect()
    }

    /// The bulk form, or `None` while the page is read-only or has no
    /// action to post to.
    pub fn submission(&self) -> Option<FormSubmission> {
        if !self.mutable {
            return None;
        }
        let action = self.submit_url.as_deref()?;
        let form = self
            .selected_ids()
            .into_iter()
            .fold(FormSubmission::post(action), |form, id| {
                form.field(SELECTION_FIELD, id)
            });
        info!(
            action = %form.action,
            count = form.values(SELECTION_FIELD).count(),
            "bulk submission prepared"
        );
        Some(form)
    }

    /// Open the rename dialog for row `idx`. Returns `Ok(false)` when the
    /// control is disabled or the row does not exist.
    pub fn open_rename(&self, idx: usize, host: &mut ModalHost) -> Result<bool, WidgetError> {
        if !self.mutable {
            return Ok(false);
        }
        let Some(row) = self.rows.get(idx) else {
            return Ok(false);
        };
        let Some(action) = row.item.rename_url.as_deref() else {
            return Ok(false);
        };
        row.dialog
            .request(host, ModalContent::rename(action, &row.item.display_name))?;
        Ok(true)
    }

    /// Follow row `idx`'s delete link. Independent of selection and of
    /// `mutable`.
    pub fn delete_link(&self, idx: usize) -> Option<FormSubmission> {
        self.rows
            .get(idx)
            .map(|row| FormSubmission::link(&row.item.delete_url))
    }

    pub fn move_cursor(&mut self, delta: i32) {
        if self.rows.is_empty() {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor as i32 + delta).rem_euclid(self.rows.len() as i32) as usize;
    }

    /// Checkbox interaction on the cursor row: the intended value is
    /// computed once, here, and handed to [`toggle`](Self::toggle).
    pub fn check_at_cursor(&mut self) -> bool {
        let Some(row) = self.rows.get(self.cursor) else {
            return false;
        };
        let id = row.item.id.clone();
        let desired = !self.is_selected(&id);
        self.toggle(&id, desired)
    }
}

/// The rename form for a submitted dialog.
pub fn rename_submission(content: &ModalContent) -> Option<FormSubmission> {
    match content {
        ModalContent::Rename {
            action, new_name, ..
        } => Some(FormSubmission::post(action).field(RENAME_FIELD, new_name)),
        ModalContent::Log { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Method;

    fn item(id: &str) -> Item {
        Item {
            id: id.to_string(),
            display_name: format!("{id}.tar"),
            timestamp: None,
            delete_url: format!("/results/1/cfmm2tar/{id}/delete"),
            rename_url: Some(format!("/results/1/cfmm2tar/{id}/rename")),
        }
    }

    fn table(ids: &[&str], mutable: bool) -> (SelectableTable, ModalHost) {
        let host = ModalHost::with_mount("dialog");
        let table = SelectableTable::mount(
            ids.iter().map(|id| item(id)).collect(),
            Some("/results/1/tar2bids".to_string()),
            mutable,
            &host,
        );
        (table, host)
    }

    fn selected(table: &SelectableTable) -> HashSet<&str> {
        table.selected_ids().into_iter().collect()
    }

    #[test]
    fn toggle_is_idempotent() {
        let (mut table, _host) = table(&["a", "b"], true);
        assert!(table.toggle("a", true));
        assert_eq!(selected(&table), HashSet::from(["a"]));
        assert!(!table.toggle("a", true));
        assert_eq!(selected(&table), HashSet::from(["a"]));
        assert!(table.toggle("a", false));
        assert!(selected(&table).is_empty());
        assert!(!table.toggle("a", false));
    }

    #[test]
    fn toggle_for_unknown_id_is_ignored() {
        let (mut table, _host) = table(&["a"], true);
        assert!(!table.toggle("gone", true));
        assert!(selected(&table).is_empty());
    }

    #[test]
    fn select_all_replaces_previous_selection() {
        let (mut table, _host) = table(&["x", "y", "z"], true);
        table.toggle("y", true);
        table.select_all();
        assert_eq!(selected(&table), HashSet::from(["x", "y", "z"]));
        table.deselect_all();
        assert!(selected(&table).is_empty());
        table.deselect_all();
        assert!(selected(&table).is_empty());
    }

    #[test]
    fn replacing_rows_drops_stale_selection() {
        let (mut table, host) = table(&["x", "y"], true);
        table.select_all();
        table.replace_rows(vec![item("y"), item("w")], &host);
        assert!(selected(&table).is_empty());
        assert_eq!(host.bus().subscriber_count(), 2);
        table.select_all();
        assert_eq!(selected(&table), HashSet::from(["y", "w"]));
    }

    #[test]
    fn submission_carries_selected_ids() {
        let (mut table, _host) = table(&["12", "15", "18"], true);
        table.toggle("18", true);
        table.toggle("12", true);

        let form = table.submission().unwrap();
        assert_eq!(form.method, Method::Post);
        assert_eq!(form.action, "/results/1/tar2bids");
        let ids: HashSet<&str> = form.values(SELECTION_FIELD).collect();
        assert_eq!(ids, HashSet::from(["12", "18"]));
        assert_eq!(form.fields.len(), 2);
    }

    #[test]
    fn missing_submit_url_disables_submission() {
        let host = ModalHost::with_mount("dialog");
        let mut table = SelectableTable::mount(vec![], None, true, &host);
        table.select_all();
        assert_eq!(table.submit_blocker(), Some(SubmitBlocker::NoSubmitUrl));
        assert!(!table.submit_enabled());
        assert!(table.submission().is_none());

        table.set_form(Some("/results/1/tar2bids".into()), true);
        assert_eq!(table.submission().unwrap().action, "/results/1/tar2bids");
    }

    #[test]
    fn read_only_disables_submit_and_rename_but_not_delete() {
        let (mut table, mut host) = table(&["a", "b"], false);
        table.select_all();

        assert!(!table.submit_enabled());
        assert_eq!(table.submit_blocker(), Some(SubmitBlocker::ReadOnly));
        assert!(table.submission().is_none());
        assert!(table.views().iter().all(|v| !v.rename_enabled));
        assert!(!table.open_rename(0, &mut host).unwrap());
        assert!(host.visible().is_none());

        let delete = table.delete_link(1).unwrap();
        assert_eq!(delete.method, Method::Get);
        assert_eq!(delete.action, "/results/1/cfmm2tar/b/delete");
        assert_eq!(table.views()[1].delete_href, "/results/1/cfmm2tar/b/delete");
    }

    #[test]
    fn rename_opens_prefilled_dialog() {
        let (table, mut host) = table(&["a"], true);
        assert!(table.open_rename(0, &mut host).unwrap());
        let content = &host.visible().unwrap().content;
        assert_eq!(
            *content,
            ModalContent::rename("/results/1/cfmm2tar/a/rename", "a.tar")
        );
        let form = rename_submission(content).unwrap();
        assert_eq!(form.encoded_body(), "new_name=a.tar");
        assert!(table.rows()[0].dialog().is_showing(&host));
    }

    #[test]
    fn rename_then_log_then_single_dismiss_closes_both() {
        use crate::jobs::{Job, JobRow};

        let (table, mut host) = table(&["a"], true);
        let job = JobRow::mount(
            "job-0-0".into(),
            Job {
                start: "s".into(),
                end: "e".into(),
                status: "Failed".into(),
                log: Some("trace".into()),
            },
            &host,
        );
        table.open_rename(0, &mut host).unwrap();
        job.open_log(&mut host).unwrap();

        host.dismiss();
        assert!(!table.rows()[0].dialog().is_open());
        assert!(!job.dialog().is_open());
    }

    #[test]
    fn row_views_reflect_membership() {
        let (mut table, _host) = table(&["a", "b"], true);
        table.toggle("b", true);
        let views = table.views();
        assert!(!views[0].checked);
        assert!(views[1].checked);
        assert_eq!(views[0].date, "None");
        assert!(views[0].rename_enabled);
    }

    #[test]
    fn check_at_cursor_flips_cursor_row() {
        let (mut table, _host) = table(&["a", "b"], true);
        table.move_cursor(1);
        assert!(table.check_at_cursor());
        assert_eq!(selected(&table), HashSet::from(["b"]));
        assert!(table.check_at_cursor());
        assert!(selected(&table).is_empty());
    }
}
