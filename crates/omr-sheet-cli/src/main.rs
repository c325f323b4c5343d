//! OMR Sheet CLI - Command line tool for generating printable answer sheets.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use omr_sheet_core::{AppConfig, Color, DocumentConfig, PageLayout, SheetGenerator};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, ValueEnum)]
enum AccentOption {
    Navy,
    Black,
    DarkRed,
    DarkGreen,
    Purple,
}

impl From<AccentOption> for Color {
    fn from(opt: AccentOption) -> Self {
        match opt {
            AccentOption::Navy => Self::navy(),
            AccentOption::Black => Self::black(),
            AccentOption::DarkRed => Self::dark_red(),
            AccentOption::DarkGreen => Self::dark_green(),
            AccentOption::Purple => Self::purple(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "omr-sheet")]
#[command(author, version, about = "Generate printable OMR answer sheets", long_about = None)]
struct Args {
    /// Number of questions on the sheet
    #[arg(required = true)]
    questions: usize,

    /// Institute name printed in the title ribbon
    #[arg(short, long, env = "OMR_INSTITUTE_NAME")]
    name: Option<String>,

    /// Logo image placed at the top left of every page
    #[arg(long)]
    logo: Option<PathBuf>,

    /// QR code image placed at the bottom right of every page
    #[arg(long)]
    qr: Option<PathBuf>,

    /// Output PDF file (default: output.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bubble colour
    #[arg(long, value_enum)]
    accent: Option<AccentOption>,

    /// Question columns per page
    #[arg(long)]
    columns: Option<usize>,

    /// Print the page plan without writing a file
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[allow(clippy::print_stdout)]
fn print_plan(pages: &[PageLayout]) {
    for page in pages {
        println!(
            "Page {}: questions {}-{} ({} column(s), {} rows)",
            page.page_index + 1,
            page.first_question,
            page.last_question,
            page.columns_used,
            page.max_rows
        );
    }
}

fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    // Load or create config
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };

    // Override config with CLI arguments
    if let Some(accent) = args.accent {
        config.theme.accent = accent.into();
    }
    if let Some(columns) = args.columns {
        config.geometry.columns = columns;
    }
    let institute_name = args.name.unwrap_or_else(|| config.institute_name.clone());
    let output_path = args.output.unwrap_or_else(|| config.output.clone());

    let document = DocumentConfig::new(args.questions, institute_name)
        .with_logo(args.logo)
        .with_qr(args.qr);
    let generator = SheetGenerator::from_config(&config, document);

    if args.dry_run {
        let pages = generator.plan().context("Failed to lay out sheet")?;
        print_plan(&pages);
        return Ok(());
    }

    let spinner = ProgressBar::new_spinner();
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}").unwrap());
    spinner.set_message(format!("Laying out {} questions", args.questions));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = generator.write_pdf(&output_path);
    spinner.finish_and_clear();
    let report =
        result.context(format!("Failed to generate sheet: {}", output_path.display()))?;

    info!("{} asset warning(s)", report.warnings.len());

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        println!(
            "Answer sheet saved to: {} ({} page{})",
            output_path.display(),
            report.page_count(),
            if report.page_count() == 1 { "" } else { "s" }
        );
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["omr-sheet", "60"]).unwrap();
        assert_eq!(args.questions, 60);
        assert!(args.output.is_none());
        assert!(!args.dry_run);
    }

    #[test]
    fn test_args_overrides() {
        let args = Args::try_parse_from([
            "omr-sheet", "120", "--accent", "dark-red", "--columns", "4", "-o", "exam.pdf", "-vv",
        ])
        .unwrap();
        assert_eq!(args.columns, Some(4));
        assert_eq!(args.verbose, 2);
        assert_eq!(Color::from(args.accent.unwrap()), Color::dark_red());
    }

    #[test]
    fn test_question_count_required() {
        assert!(Args::try_parse_from(["omr-sheet"]).is_err());
        assert!(Args::try_parse_from(["omr-sheet", "many"]).is_err());
    }
}
