mod app_logic;
mod app_state;
mod event_handler;
mod ui_renderer;

pub use self::run_tui::run_tui_with_page;

// Terminal setup/teardown and the main loop
mod run_tui {
    use super::app_logic::TuiApp;
    use super::event_handler::handle_events;
    use super::ui_renderer::ui_frame;
    use crate::page::Page;
    use crate::submit::Submitter;
    use anyhow::Result;
    use crossterm::{
        event::{DisableMouseCapture, EnableMouseCapture},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };
    use ratatui::prelude::{CrosstermBackend, Terminal};
    use std::io::{self, Stdout};
    use tracing::{info, warn};

    pub fn run_tui_with_page(
        page: Page,
        submitter: &mut dyn Submitter,
        reload: &dyn Fn() -> Result<Page>,
    ) -> Result<()> {
        let mut app = TuiApp::new(page);
        let mut terminal = init_terminal()?;

        // Restore the terminal before reporting any error from the loop.
        let outcome = run_loop(&mut terminal, &mut app, submitter, reload);
        restore_terminal(terminal)?;
        outcome
    }

    fn run_loop(
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        app: &mut TuiApp,
        submitter: &mut dyn Submitter,
        reload: &dyn Fn() -> Result<Page>,
    ) -> Result<()> {
        while !app.quit {
            terminal.draw(|frame| ui_frame(frame, app))?;
            handle_events(app)?;
            for form in app.take_pending() {
                match submitter.submit(&form) {
                    Ok(status) => {
                        info!(%form, "submitted");
                        app.set_status(status);
                    }
                    Err(e) => {
                        warn!(%form, "submission failed: {e:#}");
                        app.set_status(format!("Submission failed: {e:#}"));
                    }
                }
            }
            if std::mem::take(&mut app.reload_requested) {
                match reload() {
                    Ok(page) => {
                        app.reload(page);
                        app.set_status("Page reloaded");
                    }
                    Err(e) => {
                        warn!("reload failed: {e:#}");
                        app.set_status(format!("Reload failed: {e:#}"));
                    }
                }
            }
        }
        Ok(())
    }

    fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend).map_err(Into::into)
    }

    fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor().map_err(Into::into)
    }
}
