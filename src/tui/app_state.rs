/// Mount point the dialog chrome draws into.
pub(super) const DIALOG_MOUNT: &str = "dialog";

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub(super) enum Focus {
    Tree,
    Table,
    Jobs,
}

impl Focus {
    pub(super) fn next(self) -> Self {
        match self {
            Focus::Tree => Focus::Table,
            Focus::Table => Focus::Jobs,
            Focus::Jobs => Focus::Tree,
        }
    }

    pub(super) fn previous(self) -> Self {
        match self {
            Focus::Tree => Focus::Jobs,
            Focus::Table => Focus::Tree,
            Focus::Jobs => Focus::Table,
        }
    }
}
