use clap::Parser;
use std::path::PathBuf;
use url::Url;

/// tarpick – pick archived DICOM-tar bundles for conversion and follow job logs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Page document (JSON) exported by the portal; `-` reads stdin
    #[arg(value_name = "PAGE", default_value = "-")]
    pub page: PathBuf,

    /// Base URL that relative row and form URLs are resolved against
    #[arg(long, env = "TARPICK_PORTAL_URL", value_name = "URL")]
    pub portal_url: Option<Url>,

    /// Build the dataset tree from this local directory instead of the
    /// page document's `fileTree`.
    #[arg(long, value_name = "DIR")]
    pub tree_dir: Option<PathBuf>,

    /// Print form submissions instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Print the dataset tree, rows and jobs, then exit without the TUI.
    #[arg(long)]
    pub headless: bool,

    /// Where to write the log (the terminal belongs to the TUI)
    #[arg(long, value_name = "FILE", default_value = "tarpick.log")]
    pub log_file: PathBuf,
}
