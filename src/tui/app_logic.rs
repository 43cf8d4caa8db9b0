use super::app_state::{DIALOG_MOUNT, Focus};
use crate::error::WidgetError;
use crate::form::FormSubmission;
use crate::jobs::{JobList, JobRow};
use crate::modal::{ModalContent, ModalHost};
use crate::page::Page;
use crate::selection::{SelectableTable, rename_submission};
use crate::tree_builder::{TreeNode, build_tree};
use crate::tree_view::TreeViewState;
use crossterm::event::{KeyCode, KeyEvent};
use tracing::{debug, info, warn};

pub struct TuiApp {
    pub(super) host: ModalHost,
    pub(super) tree: TreeNode,
    pub(super) tree_view: TreeViewState,
    pub(super) table: SelectableTable,
    pub(super) job_lists: Vec<JobList>,
    pub(super) job_cursor: usize,
    pub(super) focus: Focus,
    pub(super) log_scroll: u16,
    pub(super) quit: bool,
    pub(super) reload_requested: bool,
    pub(super) status: Option<String>,
    pending: Vec<FormSubmission>,
}

fn job_row(lists: &[JobList], cursor: usize) -> Option<&JobRow> {
    lists.iter().flat_map(|list| list.rows()).nth(cursor)
}

enum DialogAction {
    Close,
    SubmitRename,
    Scroll(i16),
    None,
}

impl TuiApp {
    pub fn new(page: Page) -> Self {
        Self::with_host(page, ModalHost::with_mount(DIALOG_MOUNT))
    }

    pub(super) fn with_host(page: Page, host: ModalHost) -> Self {
        let tree = build_tree(&page.file_tree);
        debug!(nodes = tree.node_count(), "dataset tree built");
        let table = SelectableTable::mount(
            page.rows,
            page.submit_url,
            page.mutable,
            &host,
        );
        let job_lists = page
            .job_groups
            .into_iter()
            .enumerate()
            .map(|(idx, group)| JobList::mount(idx, group.title, group.jobs, &host))
            .collect();
        let focus = if table.rows().is_empty() {
            Focus::Tree
        } else {
            Focus::Table
        };

        TuiApp {
            host,
            tree,
            tree_view: TreeViewState::new(),
            table,
            job_lists,
            job_cursor: 0,
            focus,
            log_scroll: 0,
            quit: false,
            reload_requested: false,
            status: None,
            pending: Vec::new(),
        }
    }

    /// Replace everything the portal supplied with a freshly loaded page.
    /// The selection is discarded; directory flags carry over because
    /// directory ids are derived from paths.
    pub fn reload(&mut self, page: Page) {
        self.host.dismiss();
        self.tree = build_tree(&page.file_tree);
        self.tree_view.clamp_cursor(&self.tree);
        self.table.replace_rows(page.rows, &self.host);
        self.table
            .set_form(page.submit_url, page.mutable);
        self.job_lists = page
            .job_groups
            .into_iter()
            .enumerate()
            .map(|(idx, group)| JobList::mount(idx, group.title, group.jobs, &self.host))
            .collect();
        self.job_cursor = 0;
        info!(
            rows = self.table.rows().len(),
            subscribers = self.host.bus().subscriber_count(),
            "page reloaded"
        );
    }

    /// Submissions queued by the last key presses, oldest first.
    pub fn take_pending(&mut self) -> Vec<FormSubmission> {
        std::mem::take(&mut self.pending)
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub(super) fn job_count(&self) -> usize {
        self.job_lists.iter().map(JobList::len).sum()
    }

    fn move_cursor(&mut self, delta: i32) {
        match self.focus {
            Focus::Tree => self.tree_view.move_cursor(&self.tree, delta),
            Focus::Table => self.table.move_cursor(delta),
            Focus::Jobs => {
                let count = self.job_count();
                if count > 0 {
                    self.job_cursor =
                        (self.job_cursor as i32 + delta).rem_euclid(count as i32) as usize;
                }
            }
        }
    }

    /// Apply one key press. Errors are integration failures and end the
    /// session; everything else is reflected in state or the status line.
    pub fn handle_key(&mut self, key_event: KeyEvent) -> Result<(), WidgetError> {
        if self.host.visible().is_some() {
            self.handle_dialog_input(key_event);
            Ok(())
        } else {
            self.handle_normal_mode_input(key_event)
        }
    }

    pub(super) fn handle_normal_mode_input(&mut self, key_event: KeyEvent) -> Result<(), WidgetError> {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Char('s') => self.submit_selection(),
            KeyCode::Char('R') => self.reload_requested = true,
            code => match self.focus {
                Focus::Tree => self.handle_tree_input(code),
                Focus::Table => self.handle_table_input(code)?,
                Focus::Jobs => self.handle_jobs_input(code)?,
            },
        }
        Ok(())
    }

    fn handle_tree_input(&mut self, code: KeyCode) {
        if matches!(code, KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('o')) {
            self.tree_view.toggle_at_cursor(&self.tree);
        }
    }

    fn handle_table_input(&mut self, code: KeyCode) -> Result<(), WidgetError> {
        match code {
            KeyCode::Char(' ') => {
                self.table.check_at_cursor();
            }
            KeyCode::Char('a') => self.table.select_all(),
            KeyCode::Char('d') => self.table.deselect_all(),
            KeyCode::Char('r') => {
                if self.table.rows().is_empty() {
                    self.set_status("No bundle to rename");
                } else if !self.table.open_rename(self.table.cursor, &mut self.host)? {
                    self.set_status("Rename is disabled: this page is read-only");
                }
            }
            KeyCode::Char('x') => {
                if let Some(link) = self.table.delete_link(self.table.cursor) {
                    self.pending.push(link);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_jobs_input(&mut self, code: KeyCode) -> Result<(), WidgetError> {
        if !matches!(code, KeyCode::Enter | KeyCode::Char('l')) {
            return Ok(());
        }
        let Some(row) = job_row(&self.job_lists, self.job_cursor) else {
            return Ok(());
        };
        if !row.open_log(&mut self.host)? {
            self.set_status("No log recorded for this job");
        }
        self.log_scroll = 0;
        Ok(())
    }

    fn submit_selection(&mut self) {
        if let Some(blocker) = self.table.submit_blocker() {
            self.set_status(format!("Submit is disabled: {blocker}"));
            return;
        }
        if let Some(form) = self.table.submission() {
            self.pending.push(form);
        }
    }

    pub(super) fn handle_dialog_input(&mut self, key_event: KeyEvent) {
        let action = match self.host.visible_content_mut() {
            None => DialogAction::None,
            Some(_) if key_event.code == KeyCode::Esc => DialogAction::Close,
            Some(ModalContent::Rename { new_name, .. }) => match key_event.code {
                KeyCode::Char(c) => {
                    new_name.push(c);
                    DialogAction::None
                }
                KeyCode::Backspace => {
                    new_name.pop();
                    DialogAction::None
                }
                KeyCode::Enter if new_name.trim().is_empty() => {
                    self.status = Some("A new name is required".to_string());
                    DialogAction::None
                }
                KeyCode::Enter => DialogAction::SubmitRename,
                _ => DialogAction::None,
            },
            Some(ModalContent::Log { .. }) => match key_event.code {
                KeyCode::Down | KeyCode::Char('j') => DialogAction::Scroll(1),
                KeyCode::Up | KeyCode::Char('k') => DialogAction::Scroll(-1),
                KeyCode::Enter | KeyCode::Char('q') => DialogAction::Close,
                _ => DialogAction::None,
            },
        };

        match action {
            DialogAction::Close => self.close_dialog(),
            DialogAction::SubmitRename => {
                let form = self
                    .host
                    .visible()
                    .and_then(|request| rename_submission(&request.content));
                if let Some(form) = form {
                    debug!(%form, "rename submitted");
                    self.pending.push(form);
                }
                self.close_dialog();
            }
            DialogAction::Scroll(delta) => {
                self.log_scroll = self.log_scroll.saturating_add_signed(delta);
            }
            DialogAction::None => {}
        }
    }

    fn close_dialog(&mut self) {
        if self.host.dismiss().is_none() {
            warn!("dismiss requested with no dialog showing");
        }
        self.log_scroll = 0;
    }
}
