//! chatlog-view - headless entry point
//!
//! Loads a JSONL chat log, drives the view engine (jump, search, select) and
//! prints the resulting window.

use chatlog_view::config::{resolve, ResolvedConfig};
use chatlog_view::model::error::AppError;
use chatlog_view::model::{LogIndex, SearchFilter, SearchParams, SearchPeriod, SenderId};
use chatlog_view::source::load_log;
use chatlog_view::state::{ChatView, SearchOutcome};
use chatlog_view::view_state::renderer::typing_notice;
use chatlog_view::view_state::{ColumnRole, LineMeasurer, RenderedLine, ViewportDimensions};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// chatlog-view - bounded rendered window over a JSONL chat log
#[derive(Parser, Debug)]
#[command(name = "chatlog-view")]
#[command(version)]
#[command(about = "Render a window of a JSONL chat log, with jump, search and selection")]
pub struct Args {
    /// Path to the JSONL log file
    pub file: PathBuf,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Maximum number of materialized entries
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_window: Option<u32>,

    /// Path of the diagnostics log file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Viewport width in cells
    #[arg(long, default_value = "80", value_parser = clap::value_parser!(u16).range(20..))]
    pub width: u16,

    /// Viewport height in rows
    #[arg(long, default_value = "24", value_parser = clap::value_parser!(u16).range(1..))]
    pub height: u16,

    /// Sender id of the local user
    #[arg(long, value_parser = parse_sender)]
    pub me: Option<SenderId>,

    /// Jump to a log index
    #[arg(long, conflicts_with = "date")]
    pub jump: Option<u64>,

    /// Jump to the first entry on or after a date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Search for a phrase
    #[arg(short, long)]
    pub search: Option<String>,

    /// Where the search starts
    #[arg(long, value_enum, default_value_t = SearchFrom::End, requires = "search")]
    pub search_from: SearchFrom,

    /// Date for `--search-from after|before` (YYYY-MM-DD)
    #[arg(long, requires = "search")]
    pub search_date: Option<NaiveDate>,

    /// Extra search steps after the first hit
    #[arg(long, default_value = "0", requires = "search")]
    pub search_steps: usize,

    /// Match letter case exactly
    #[arg(long, requires = "search")]
    pub case_sensitive: bool,

    /// Only match whole words
    #[arg(long, requires = "search")]
    pub whole_words: bool,

    /// Treat the phrase as a regular expression
    #[arg(long, requires = "search")]
    pub regex: bool,

    /// Show a typing notification for this peer
    #[arg(long, value_name = "NAME")]
    pub typing: Option<String>,

    /// Select every materialized line and print the selection
    #[arg(long)]
    pub select_all: bool,

    /// Print every materialized line instead of only the visible ones
    #[arg(long)]
    pub all: bool,
}

/// Search starting point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchFrom {
    /// Forward from the oldest entry
    Beginning,
    /// Backward from the newest entry
    End,
    /// Forward from `--search-date`
    After,
    /// Backward from `--search-date`
    Before,
}

fn parse_sender(raw: &str) -> Result<SenderId, String> {
    SenderId::new(raw).map_err(|e| e.to_string())
}

impl Args {
    fn search_params(&self) -> Result<SearchParams, String> {
        let period = match (self.search_from, self.search_date) {
            (SearchFrom::Beginning, _) => SearchPeriod::FromBeginning,
            (SearchFrom::End, _) => SearchPeriod::FromEnd,
            (SearchFrom::After, Some(date)) => SearchPeriod::AfterDate(date),
            (SearchFrom::Before, Some(date)) => SearchPeriod::BeforeDate(date),
            (SearchFrom::After | SearchFrom::Before, None) => {
                return Err("--search-from after/before requires --search-date".to_string())
            }
        };
        Ok(SearchParams {
            period,
            filter: SearchFilter {
                case_sensitive: self.case_sensitive,
                whole_words: self.whole_words,
                regex: self.regex,
            },
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = resolve(
        args.config.clone(),
        args.max_window.map(|n| n as usize),
        args.log_file.clone(),
    )?;

    let _log_guard = chatlog_view::logging::init(&config.log_file_path)?;
    info!(config = ?config, "Configuration loaded and resolved");

    let search_params = match &args.search {
        Some(_) => Some(args.search_params()?),
        None => None,
    };

    let stdout = std::io::stdout();
    run(&args, &config, search_params, &mut stdout.lock())?;
    Ok(())
}

fn run(
    args: &Args,
    config: &ResolvedConfig,
    search_params: Option<SearchParams>,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let loaded = load_log(&args.file)?;
    if !loaded.errors.is_empty() {
        writeln!(out, "skipped {} malformed line(s)", loaded.errors.len())?;
    }

    let dimensions = ViewportDimensions::new(args.width, args.height);
    let mut view = ChatView::new(loaded.log, config.view_options(dimensions, args.me.clone()));
    view.run_until_settled();

    if let Some(index) = args.jump {
        view.jump_to_index(LogIndex::new(index));
    } else if let Some(date) = args.date {
        view.jump_to_date(date);
    }
    view.run_until_settled();

    if let (Some(phrase), Some(params)) = (&args.search, search_params) {
        let mut outcome = view.start_search(phrase, params)?;
        view.run_until_settled();
        for _ in 0..args.search_steps {
            outcome = view.search_next();
            view.run_until_settled();
        }
        writeln!(out, "{}", describe_outcome(&outcome))?;
    }

    if let Some(name) = &args.typing {
        view.set_typing(Some(typing_notice(name)));
        view.run_until_settled();
    }

    let window = view.window();
    match (window.store().first_index(), window.store().last_index()) {
        (Some(first), Some(last)) => writeln!(out, "window {first}..={last}")?,
        _ => writeln!(out, "window empty")?,
    }
    for line in window.store().iter() {
        if args.all || line.visible {
            writeln!(out, "{}", format_line(line, window.measurer()))?;
        }
    }
    if let Some(typing) = window.typing() {
        writeln!(out, "{}", typing.text)?;
    }

    if args.select_all {
        view.select_all();
        writeln!(out, "--- selection ---")?;
        writeln!(out, "{}", view.selected_text())?;
    }

    Ok(())
}

fn describe_outcome(outcome: &SearchOutcome) -> String {
    match outcome {
        SearchOutcome::Found(hit) => format!(
            "found {} at {}..{}",
            hit.pos.index,
            hit.span.start,
            hit.span.end()
        ),
        SearchOutcome::NotFound(direction) => format!("not found ({direction:?})"),
        SearchOutcome::Inactive => "no search".to_string(),
    }
}

/// One line of output per rendered line; wrapped content continues on
/// indented rows.
fn format_line<M: LineMeasurer>(line: &RenderedLine, measurer: &M) -> String {
    if line.is_separator() {
        return format!("--- {} ---", line.column(ColumnRole::Content).text);
    }

    let author = line.column(ColumnRole::Author);
    let content = line.column(ColumnRole::Content);
    let timestamp = line.column(ColumnRole::Timestamp);

    let name = if author.hidden { "" } else { author.text.as_str() };
    let mut rows = measurer
        .wrap(&content.text, content.width)
        .into_iter()
        .map(|range| &content.text[range]);
    let first_row = rows.next().unwrap_or_default();

    let mut text = format!(
        "{:<name_width$} {:<content_width$} {}",
        name,
        first_row,
        timestamp.text,
        name_width = author.width as usize,
        content_width = content.width as usize,
    );
    for row in rows {
        text.push('\n');
        text.push_str(&" ".repeat(content.x as usize));
        text.push_str(row);
    }
    text.trim_end().to_string()
}
