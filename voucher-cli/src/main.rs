//! Voucher desk command line
//!
//! Looks students up in the roster, prints or downloads their vouchers, and
//! records attendance against the log API.
//!
//! Run with: cargo run -p voucher-cli -- --roster students.csv interactive

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use voucher::{
    ActionReceipt, Config, HighlightDirection, SearchOutcome, SearchState, VoucherDesk,
    NOT_FOUND_MESSAGE,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Roster export (.csv or .json); defaults to VOUCHER_ROSTER_PATH or the demo roster
    #[arg(short, long)]
    roster: Option<PathBuf>,

    /// Log API base URL; defaults to VOUCHER_LOG_API_URL or an in-memory log
    #[arg(long)]
    log_api: Option<String>,

    /// Debounce window in milliseconds
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Event title printed on vouchers
    #[arg(long)]
    title: Option<String>,

    /// Directory downloaded vouchers are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one search and show suggestions and selection
    Lookup { query: String },
    /// Type queries line by line and drive the desk with `:` commands
    Interactive,
    /// Show the voucher for a student id
    Render {
        id: String,
        /// Write the voucher file and log a download
        #[arg(long)]
        download: bool,
    },
    /// List every logged event
    Logs,
    /// Show the attendance count
    Attendance,
}

impl Args {
    /// Flags win over environment
    fn apply(&self, config: &mut Config) {
        if let Some(roster) = &self.roster {
            config.roster_path = Some(roster.clone());
        }
        if let Some(url) = &self.log_api {
            config.log_api_url = Some(url.clone());
        }
        if let Some(ms) = self.debounce_ms {
            config.debounce = Duration::from_millis(ms);
        }
        if let Some(title) = &self.title {
            config.event_title = title.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so vouchers on stdout stay clean
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("voucher=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = Config::from_env().context("Failed to read configuration")?;
    args.apply(&mut config);

    let desk = VoucherDesk::from_config(&config).context("Failed to set up voucher desk")?;
    info!(records = desk.engine().roster().len(), "Desk ready");

    match args.command {
        Command::Lookup { query } => {
            desk.engine().set_query(query);
            let state = desk.engine().settled().await;
            print_state(&state);
        }
        Command::Interactive => interactive(&desk, &config).await?,
        Command::Render { id, download } => {
            let record = desk
                .engine()
                .roster()
                .find_by_id(&id)
                .cloned()
                .with_context(|| format!("{NOT_FOUND_MESSAGE}: {id}"))?;
            desk.engine().select_explicit(record);
            if download {
                let receipt = desk.download_voucher(&config.output_dir).await?;
                println!("Saved {}", receipt.output.display());
                report_logging(&receipt);
            } else {
                print!("{}", desk.preview()?.to_thermal_text());
            }
        }
        Command::Logs => {
            for event in desk.fetch_logs().await? {
                println!(
                    "{}  {:<10}  {}  {}",
                    event.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    event.action.as_str(),
                    event.student_id,
                    event.student_name.unwrap_or_default()
                );
            }
        }
        Command::Attendance => {
            let summary = desk.fetch_attendance().await?;
            println!("Attendance: {}", summary.count);
        }
    }

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// INTERACTIVE MODE
// ─────────────────────────────────────────────────────────────────────────────

const HELP: &str = "\
Type a student ID or name to search.
  :up / :down   move the highlight
  :enter        select the highlighted suggestion
  :clear        reset the search
  :dismiss      hide suggestions
  :print        print the selected voucher
  :download     save the selected voucher
  :mark         mark the selected student present
  :logs         list logged events
  :count        show attendance count
  :quit         exit";

async fn interactive(desk: &VoucherDesk, config: &Config) -> Result<()> {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let engine = desk.engine();
        match line.trim() {
            ":quit" | ":q" => break,
            ":help" => println!("{HELP}"),
            ":up" => engine.move_highlight(HighlightDirection::Up),
            ":down" => engine.move_highlight(HighlightDirection::Down),
            ":enter" => {
                if engine.confirm_highlighted().is_none() {
                    println!("Nothing highlighted");
                }
            }
            ":clear" => engine.clear(),
            ":dismiss" => engine.dismiss_suggestions(),
            ":print" => match desk.print_voucher().await {
                Ok(receipt) => {
                    print!("{}", receipt.output);
                    report_logging(&receipt);
                }
                Err(e) => println!("{e}"),
            },
            ":download" => match desk.download_voucher(&config.output_dir).await {
                Ok(receipt) => {
                    println!("Saved {}", receipt.output.display());
                    report_logging(&receipt);
                }
                Err(e) => println!("{e}"),
            },
            ":mark" => match desk.mark_attendance().await {
                Ok(receipt) => {
                    println!("Marked {} present", receipt.record);
                    report_logging(&receipt);
                }
                Err(e) => println!("{e}"),
            },
            ":logs" => match desk.fetch_logs().await {
                Ok(events) => println!("{} events logged", events.len()),
                Err(e) => println!("{e}"),
            },
            ":count" => match desk.fetch_attendance().await {
                Ok(summary) => println!("Attendance: {}", summary.count),
                Err(e) => println!("{e}"),
            },
            command if command.starts_with(':') => println!("Unknown command {command}, try :help"),
            _ => {
                engine.set_query(line.as_str());
                engine.settled().await;
            }
        }
        print_state(&engine.state());
    }

    Ok(())
}

fn print_state(state: &SearchState) {
    for (i, record) in state.suggestions.iter().enumerate() {
        let cursor = if state.highlight == Some(i) { '>' } else { ' ' };
        println!("{cursor} {record}");
    }
    match state.outcome() {
        SearchOutcome::Idle => {}
        SearchOutcome::Matched => {
            if let Some(record) = &state.selection {
                println!("Selected: {record} ({})", record.serial_label());
            }
        }
        SearchOutcome::AmbiguousPartial => println!("Pick a suggestion to select it"),
        SearchOutcome::NoMatch => println!("{NOT_FOUND_MESSAGE}"),
    }
}

fn report_logging<T>(receipt: &ActionReceipt<T>) {
    if let Err(e) = &receipt.logged {
        println!("Warning: event was not logged: {e}");
    }
}
