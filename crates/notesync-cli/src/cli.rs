use clap::{ArgAction, Args, Parser, Subcommand};
use notesync_core::{FencePolicy, NoteCategory, NoteStatus};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "notesync")]
#[command(author, version)]
#[command(about = "Turn quick markdown notes into Notion blocks")]
#[command(after_help = "\
EXAMPLES:

    # Show the blocks a note turns into
    notesync parse note.md

    # Read from stdin and print JSON
    cat note.md | notesync parse --json -

    # Print the Notion request bodies for a task list
    notesync payload tasks.md --title \"Errands\" --category task --tags home,weekend --database-id <id>

CONFIGURATION:

Settings are layered in this order, later layers winning:
  1. Built-in defaults
  2. notesync.toml in the current directory, if present
  3. Explicit --config path
  4. NOTESYNC__SECTION__KEY environment variables
  5. Command-line flags such as --fence-policy")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v warn, -vv info, -vvv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// What to do with a code fence left open at end of input
    #[arg(long, global = true, value_parser = parse_fence_policy)]
    pub fence_policy: Option<FencePolicy>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a note and print its blocks
    Parse {
        /// Input file, or "-" for stdin
        input: PathBuf,

        /// Print blocks as JSON
        #[arg(short, long)]
        json: bool,

        /// Print full block text instead of a one-line summary
        #[arg(long)]
        full: bool,
    },

    /// Count blocks per kind
    Stats {
        /// Input file, or "-" for stdin
        input: PathBuf,

        /// Print counts as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print the Notion request bodies for a note
    Payload(PayloadArgs),

    /// List recorded notes, newest first
    History {
        /// Show at most this many entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print entries as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[derive(Args)]
pub struct PayloadArgs {
    /// Formatted note body, or "-" for stdin
    pub input: PathBuf,

    /// Note title
    #[arg(long)]
    pub title: String,

    /// note, idea or task
    #[arg(long, default_value = "note", value_parser = parse_category)]
    pub category: NoteCategory,

    /// Target date as YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub date: Option<chrono::NaiveDate>,

    /// Comma-separated tags
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Active, "To Do", Draft or any other status name
    #[arg(long, default_value = "Active", value_parser = parse_status)]
    pub status: NoteStatus,

    /// Database new pages are created in (overrides notion.database_id)
    #[arg(long)]
    pub database_id: Option<String>,

    /// Append the note to the local history file
    #[arg(long)]
    pub record: bool,
}

fn parse_fence_policy(value: &str) -> Result<FencePolicy, String> {
    value.parse()
}

fn parse_category(value: &str) -> Result<NoteCategory, String> {
    value.parse()
}

fn parse_status(value: &str) -> Result<NoteStatus, String> {
    value.parse()
}
