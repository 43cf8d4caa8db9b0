use crate::submit::{DryRunSubmitter, HttpSubmitter, Submitter};
use crate::{cli, dir_scan, page, tree_builder, tui};
use anyhow::{Context, Result};
use tracing::info;

// Loads the page document and, when asked, swaps in a tree scanned from disk.
fn load_page_for_cli(cli_args: &cli::Cli) -> Result<page::Page> {
    let mut page = page::load_page(&cli_args.page)?;
    if let Some(dir) = &cli_args.tree_dir {
        page.file_tree = dir_scan::scan_dir(dir)
            .with_context(|| format!("Could not scan dataset directory {}", dir.display()))?;
    }
    info!(
        rows = page.rows.len(),
        job_lists = page.job_groups.len(),
        mutable = page.mutable,
        "page loaded"
    );
    Ok(page)
}

/// Plain-text rendition of the page for `--headless`.
pub fn summarize_page(page: &page::Page) -> String {
    let mut out = String::new();
    let tree = tree_builder::build_tree(&page.file_tree);
    for label in tree_builder::build_tree_labels(&tree) {
        out.push_str(&label);
        out.push('\n');
    }

    out.push_str(&format!(
        "\nArchived bundles{}:\n",
        if page.mutable { "" } else { " (read-only)" }
    ));
    for item in &page.rows {
        out.push_str(&format!(
            "  {:<8} {}  {}\n",
            item.id,
            item.display_name,
            item.date_label()
        ));
    }

    for group in &page.job_groups {
        out.push_str(&format!("\n{}:\n", group.title));
        for job in &group.jobs {
            let log = if job.log.is_some() { "log" } else { "no log" };
            out.push_str(&format!(
                "  {}  {}  {}  [{log}]\n",
                job.start, job.end, job.status
            ));
        }
    }
    out
}

pub fn run_tarpick(cli_args: cli::Cli) -> Result<()> {
    let page = load_page_for_cli(&cli_args)?;

    if cli_args.headless {
        print!("{}", summarize_page(&page));
        return Ok(());
    }

    let reload = || load_page_for_cli(&cli_args);
    if cli_args.dry_run {
        let mut submitter = DryRunSubmitter::default();
        tui::run_tui_with_page(page, &mut submitter, &reload)?;
        for form in &submitter.sent {
            println!("{form}");
        }
        return Ok(());
    }

    let mut submitter = HttpSubmitter::new(cli_args.portal_url.clone())?;
    run_interactive(page, &mut submitter, &reload)
}

fn run_interactive(
    page: page::Page,
    submitter: &mut dyn Submitter,
    reload: &dyn Fn() -> Result<page::Page>,
) -> Result<()> {
    tui::run_tui_with_page(page, submitter, reload)?;
    info!("session closed");
    Ok(())
}
