use super::app_logic::TuiApp;
use super::app_state::Focus;
use crate::modal::ModalContent;
use crate::tree_view::VisibleKind;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

const DISABLED: Style = Style::new().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT);

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(Style::default().fg(Color::Yellow))
    } else {
        block
    }
}

fn highlight_style() -> Style {
    Style::default()
        .add_modifier(Modifier::BOLD)
        .bg(Color::DarkGray)
}

fn draw_help_block(f: &mut Frame, _app: &TuiApp, area: Rect) {
    let help_text_lines_content = vec![
        Line::from("Tab: Next pane | Arrows/jk: Nav | Space: Check/Fold | s: Submit | q/Esc: Quit"),
        Line::from("a: Select all | d: Deselect all | r: Rename | x: Delete | Enter/l: View log | R: Reload"),
    ];
    let help_paragraph = Paragraph::new(help_text_lines_content).block(
        Block::default()
            .borders(Borders::ALL)
            .title("tarpick: archived bundles"),
    );
    f.render_widget(help_paragraph, area);
}

fn draw_tree_block(f: &mut Frame, app: &TuiApp, area: Rect) {
    let rows = app.tree_view.visible_rows(&app.tree);
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let indent = "  ".repeat(row.depth);
            let line = match row.kind {
                VisibleKind::File => format!("{indent}  {}", row.name),
                VisibleKind::Dir { is_open, .. } => {
                    let marker = if is_open { "▾ " } else { "▸ " };
                    format!("{indent}{marker}{}/", row.name)
                }
            };
            ListItem::new(line)
        })
        .collect();

    let focused = app.focus == Focus::Tree;
    let list = List::new(items)
        .block(pane_block("Dataset".to_string(), focused))
        .highlight_style(highlight_style());
    let mut state = ListState::default();
    if focused && !rows.is_empty() {
        state.select(Some(app.tree_view.cursor));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_table_block(f: &mut Frame, app: &TuiApp, area: Rect) {
    let focused = app.focus == Focus::Table;
    let title = format!(
        "Archived bundles ({} of {} selected)",
        app.table.selected_count(),
        app.table.rows().len()
    );
    let block = pane_block(title, focused);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let items: Vec<ListItem> = app
        .table
        .views()
        .into_iter()
        .zip(app.table.rows())
        .enumerate()
        .map(|(idx, (view, row))| {
            let checkbox = if view.checked { "[x] " } else { "[ ] " };
            let rename = if view.rename_enabled {
                Span::styled("rename", Style::default().fg(Color::Cyan))
            } else {
                Span::styled("rename", DISABLED)
            };
            let mut spans = vec![
                Span::raw(checkbox),
                Span::styled(format!("{:<6}", view.id), Style::default().fg(Color::Gray)),
                Span::raw(format!("{}  ", view.name)),
                Span::styled(format!("{}  ", view.date), Style::default().fg(Color::Gray)),
                rename,
                Span::raw(" "),
                Span::styled("delete", Style::default().fg(Color::Red)),
            ];
            if row.dialog().is_showing(&app.host) {
                spans.push(Span::raw(" ✎"));
            }
            if focused && idx == app.table.cursor {
                spans.push(Span::styled(
                    format!("  {}", view.delete_href),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(highlight_style())
        .highlight_symbol("❯ ");
    let mut state = ListState::default();
    if focused && !app.table.rows().is_empty() {
        state.select(Some(app.table.cursor));
    }
    f.render_stateful_widget(list, chunks[0], &mut state);

    let submit = match app.table.submit_blocker() {
        None => Span::styled(
            format!("[ Submit {} for conversion (s) ]", app.table.selected_count()),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Some(blocker) => Span::styled(format!("[ Submit disabled: {blocker} ]"), DISABLED),
    };
    f.render_widget(Paragraph::new(Line::from(submit)), chunks[1]);
}

fn draw_jobs_block(f: &mut Frame, app: &TuiApp, area: Rect) {
    let mut items = Vec::new();
    let mut cursor_line = None;
    let mut job_idx = 0;
    for list in &app.job_lists {
        items.push(ListItem::new(Line::styled(
            list.title().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        if list.is_empty() {
            items.push(ListItem::new(Line::styled("  (no runs yet)", DISABLED)));
        }
        for row in list.rows() {
            let view = row.view();
            let log = if view.log_enabled {
                Span::styled("view log", Style::default().fg(Color::Cyan))
            } else {
                Span::styled("view log", DISABLED)
            };
            if job_idx == app.job_cursor {
                cursor_line = Some(items.len());
            }
            items.push(ListItem::new(Line::from(vec![
                Span::raw(format!("  {}  {}  {}  ", view.start, view.end, view.status)),
                log,
            ])));
            job_idx += 1;
        }
    }

    let focused = app.focus == Focus::Jobs;
    let list = List::new(items)
        .block(pane_block("Jobs".to_string(), focused))
        .highlight_style(highlight_style());
    let mut state = ListState::default();
    if focused {
        state.select(cursor_line);
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_status_line(f: &mut Frame, app: &TuiApp, area: Rect) {
    let text = app.status.as_deref().unwrap_or("");
    f.render_widget(Paragraph::new(text.to_string()), area);
}

/// Renders the dialog, if any, on top of everything else. Only the
/// host's visible request is drawn.
fn draw_dialog(f: &mut Frame, app: &TuiApp) {
    let Some(request) = app.host.visible() else {
        return;
    };
    let area = centered_rect(70, 60, f.area());
    f.render_widget(Clear, area);

    match &request.content {
        ModalContent::Rename {
            current_name,
            new_name,
            ..
        } => {
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!("Rename {current_name} (Enter: save, Esc: cancel)"));
            let paragraph = Paragraph::new(vec![
                Line::from("New name:"),
                Line::from(new_name.as_str()),
            ])
            .block(block)
            .wrap(Wrap { trim: false });
            f.render_widget(paragraph, area);
            let cursor_x = area.x + 1 + new_name.chars().count() as u16;
            f.set_cursor_position((cursor_x.min(area.right().saturating_sub(2)), area.y + 2));
        }
        ModalContent::Log { title, text } => {
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!("Log: {title} (jk: scroll, Esc: close)"));
            let paragraph = Paragraph::new(text.as_str())
                .block(block)
                .wrap(Wrap { trim: false })
                .scroll((app.log_scroll, 0));
            f.render_widget(paragraph, area);
        }
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

pub(super) fn ui_frame(frame: &mut Frame, app: &TuiApp) {
    let help_lines = 2;
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(help_lines + 2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_help_block(frame, app, main_chunks[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(main_chunks[1]);
    draw_tree_block(frame, app, panes[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(panes[1]);
    draw_table_block(frame, app, right[0]);
    draw_jobs_block(frame, app, right[1]);

    draw_status_line(frame, app, main_chunks[2]);
    draw_dialog(frame, app);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app_logic::tests::sample_page;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;

    fn render(app: &TuiApp) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| ui_frame(f, app)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut text = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    /// Style of the first cell of the first occurrence of `needle`.
    fn style_of(buffer: &Buffer, needle: &str) -> Style {
        let area = buffer.area;
        for y in area.top()..area.bottom() {
            let line: String = (area.left()..area.right())
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect();
            if let Some(byte_idx) = line.find(needle) {
                let x = line[..byte_idx].chars().count() as u16;
                return buffer[(area.left() + x, y)].style();
            }
        }
        panic!("{needle:?} not rendered");
    }

    /// Style of `needle` on the first line that also contains `marker`.
    fn style_in_line(buffer: &Buffer, marker: &str, needle: &str) -> Style {
        let area = buffer.area;
        for y in area.top()..area.bottom() {
            let line: String = (area.left()..area.right())
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect();
            if !line.contains(marker) {
                continue;
            }
            if let Some(byte_idx) = line.find(needle) {
                let x = line[..byte_idx].chars().count() as u16;
                return buffer[(area.left() + x, y)].style();
            }
        }
        panic!("{needle:?} not rendered on a line with {marker:?}");
    }

    #[test]
    fn read_only_page_renders_disabled_controls() {
        let app = TuiApp::new(sample_page(false));
        let buffer = render(&app);
        let text = buffer_text(&buffer);

        assert!(text.contains("Submit disabled: read-only"));
        assert!(style_of(&buffer, "rename").add_modifier.contains(Modifier::CROSSED_OUT));
        assert!(!style_of(&buffer, "delete").add_modifier.contains(Modifier::CROSSED_OUT));
    }

    #[test]
    fn mutable_page_renders_live_controls() {
        let app = TuiApp::new(sample_page(true));
        let buffer = render(&app);
        let text = buffer_text(&buffer);

        assert!(text.contains("Submit 0 for conversion"));
        assert!(text.contains("P_S_12.tar"));
        assert!(text.contains("2024-03-01"));
        assert!(!style_of(&buffer, "rename").add_modifier.contains(Modifier::CROSSED_OUT));
    }

    #[test]
    fn job_without_log_renders_disabled_viewer() {
        let app = TuiApp::new(sample_page(true));
        let buffer = render(&app);

        // First "view log" belongs to the job that has a log.
        assert!(!style_of(&buffer, "view log").add_modifier.contains(Modifier::CROSSED_OUT));

        let running = style_in_line(&buffer, "Running", "view log");
        assert!(running.add_modifier.contains(Modifier::CROSSED_OUT));
        assert_eq!(running.fg, Some(Color::DarkGray));
    }

    #[test]
    fn page_without_submit_url_renders_submit_disabled() {
        let app = TuiApp::new(crate::page::parse_page("{}").unwrap());
        let buffer = render(&app);
        assert!(buffer_text(&buffer).contains("Submit disabled: no submit URL"));
        assert!(style_of(&buffer, "Submit disabled").add_modifier.contains(Modifier::CROSSED_OUT));
    }

    #[test]
    fn open_log_renders_exact_text() {
        let mut app = TuiApp::new(sample_page(true));
        app.job_lists[0].rows()[0]
            .open_log(&mut app.host)
            .unwrap();
        let text = buffer_text(&render(&app));
        assert!(text.contains("converted 3 series"));
        assert!(text.contains("Log: Succeeded"));
    }

    #[test]
    fn only_visible_request_is_drawn() {
        let mut app = TuiApp::new(sample_page(true));
        app.table.open_rename(0, &mut app.host).unwrap();
        app.job_lists[0].rows()[0]
            .open_log(&mut app.host)
            .unwrap();
        let text = buffer_text(&render(&app));
        assert!(text.contains("converted 3 series"));
        assert!(!text.contains("New name:"));
    }

    #[test]
    fn tree_shows_closed_directories() {
        let app = TuiApp::new(sample_page(true));
        let text = buffer_text(&render(&app));
        assert!(text.contains("▸ sub-01/"));
        assert!(!text.contains("a.nii"));
    }
}
