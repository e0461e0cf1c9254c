//! notesync CLI - inspect notes and the Notion payloads they turn into
//!
//! Usage:
//!   notesync [OPTIONS] <COMMAND>
//!
//! Commands:
//!   parse     Parse a note and print its blocks
//!   stats     Count blocks per kind
//!   payload   Print the Notion request bodies for a note
//!   history   List recorded notes

mod cli;

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process;

use anyhow::{bail, Context, Result};
use chrono::{Local, Utc};
use clap::Parser as _;
use log::LevelFilter;
use notesync_config::{Loader, NotesyncConfig};
use notesync_core::note::merge_tags;
use notesync_core::notion::{self, PagePlan};
use notesync_core::{Block, BlockKind, Diagnostics, HistoryEntry, Parser, ProcessedNote};
use serde::Serialize;
use serde_json::json;

use cli::{Cli, Commands, PayloadArgs};

/// Optional config file picked up from the working directory.
const LOCAL_CONFIG: &str = "notesync.toml";

/// Stands in for the id Notion assigns to the page being written.
const PAGE_ID_PLACEHOLDER: &str = "{page_id}";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("error: {:#}", err);
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error"));
    if verbose > 0 {
        builder.filter_level(match verbose {
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        });
    }
    builder.format_timestamp(None).init();
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Parse { input, json, full } => cmd_parse(&config, &input, json, full),
        Commands::Stats { input, json } => cmd_stats(&config, &input, json),
        Commands::Payload(args) => cmd_payload(&config, &args),
        Commands::History { limit, json } => cmd_history(&config, limit, json),
    }
}

fn load_config(cli: &Cli) -> Result<NotesyncConfig> {
    let mut loader = Loader::new().with_optional_file(LOCAL_CONFIG);
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    loader = loader.with_environment();
    if let Some(policy) = cli.fence_policy {
        loader = loader.set_override("parser.unterminated_fence", policy.as_str())?;
    }
    let config = loader.build().context("failed to load configuration")?;
    log::debug!("fence policy: {}", config.parser.unterminated_fence);
    Ok(config)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        return Ok(buffer);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read '{}'", path.display()))
}

fn report_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        eprintln!("warning: {}", diagnostic);
    }
}

// =============================================================================
// Parse Command
// =============================================================================

fn cmd_parse(config: &NotesyncConfig, input: &Path, json: bool, full: bool) -> Result<()> {
    let text = read_input(input)?;
    let result = Parser::from(&config.parser).parse_str_with_diagnostics(&text);
    report_diagnostics(&result.diagnostics);

    if json {
        println!("{}", serde_json::to_string_pretty(&result.blocks)?);
        return Ok(());
    }

    for (index, block) in result.blocks.iter().enumerate() {
        println!("{:>3}  {:<20} {}", index + 1, block.kind().as_str(), describe(block, full));
    }
    Ok(())
}

fn describe(block: &Block, full: bool) -> String {
    let text = match block {
        Block::Divider => String::new(),
        Block::Code { language, text } => format!("[{}] {}", language, text),
        Block::ChecklistItem { checked, text } => {
            format!("[{}] {}", if *checked { "x" } else { " " }, text)
        }
        other => other.text().unwrap_or_default().to_string(),
    };
    if full {
        text
    } else {
        summarize(&text, 60)
    }
}

fn summarize(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    let more_lines = text.lines().nth(1).is_some();
    if first_line.chars().count() > max_chars {
        let cut: String = first_line.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else if more_lines {
        format!("{}...", first_line)
    } else {
        first_line.to_string()
    }
}

// =============================================================================
// Stats Command
// =============================================================================

#[derive(Serialize)]
struct NoteStats {
    lines: usize,
    blocks: usize,
    diagnostics: usize,
    kinds: BTreeMap<&'static str, usize>,
}

fn cmd_stats(config: &NotesyncConfig, input: &Path, json: bool) -> Result<()> {
    let text = read_input(input)?;
    let result = Parser::from(&config.parser).parse_str_with_diagnostics(&text);

    let mut kinds = BTreeMap::new();
    for kind in BlockKind::ALL {
        let count = result.blocks.iter().filter(|b| b.kind() == kind).count();
        kinds.insert(kind.as_str(), count);
    }
    let stats = NoteStats {
        lines: text.lines().count(),
        blocks: result.blocks.len(),
        diagnostics: result.diagnostics.len(),
        kinds,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Note Statistics");
    println!("---------------");
    println!("Lines:        {}", stats.lines);
    println!("Blocks:       {}", stats.blocks);
    println!("Diagnostics:  {}", stats.diagnostics);
    println!();
    for kind in BlockKind::ALL {
        let count = stats.kinds.get(kind.as_str()).copied().unwrap_or(0);
        if count > 0 {
            println!("  {:<20} {}", kind.as_str(), count);
        }
    }
    Ok(())
}

// =============================================================================
// Payload Command
// =============================================================================

fn cmd_payload(config: &NotesyncConfig, args: &PayloadArgs) -> Result<()> {
    let content = read_input(&args.input)?;
    let note = ProcessedNote {
        category: args.category,
        title: args.title.trim().to_string(),
        target_date: args.date.unwrap_or_else(|| Local::now().date_naive()),
        formatted_content: content,
        status: args.status.clone(),
        tags: merge_tags(&[], &args.tags),
    };

    let mut options = config.sync_options();
    if let Some(database_id) = &args.database_id {
        options.database_id = database_id.clone();
    }
    if options.database_id.trim().is_empty() {
        bail!("no database id; pass --database-id or set notion.database_id");
    }
    let api = config.api();

    let result = Parser::new()
        .with_fence_policy(options.fence_policy)
        .parse_str_with_diagnostics(&note.formatted_content);
    report_diagnostics(&result.diagnostics);

    let container = note.category.container_title(note.target_date);
    let name = container.clone().unwrap_or_else(|| note.title.clone());
    let plan = PagePlan::new(
        &options.database_id,
        &note,
        &name,
        &result.blocks,
        options.max_children_per_request,
    );

    let append_requests = |bodies: Vec<serde_json::Value>| -> Vec<notion::Request> {
        bodies
            .into_iter()
            .map(|body| api.append_children(PAGE_ID_PLACEHOLDER, body))
            .collect()
    };

    // Daily containers are looked up first and only created when missing.
    let existing = container.as_ref().map(|_| {
        json!({
            "query": api.query_title(&options.database_id, &name),
            "appends": append_requests(notion::append_plan(
                &result.blocks,
                options.max_children_per_request,
            )),
        })
    });
    let payload = json!({
        "page": name,
        "notion_version": api.version(),
        "blocks": result.blocks.len(),
        "if_exists": existing,
        "create": api.create_page(plan.create),
        "appends": append_requests(plan.appends),
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);

    if args.record {
        let history = config.history();
        let entry = history
            .record(&note, None, Utc::now())
            .with_context(|| format!("failed to record note in '{}'", history.path().display()))?;
        log::info!("recorded '{}' as history entry {}", entry.title, entry.id);
    }
    Ok(())
}

// =============================================================================
// History Command
// =============================================================================

fn cmd_history(config: &NotesyncConfig, limit: Option<usize>, json: bool) -> Result<()> {
    let history = config.history();
    let entries = history
        .list(limit)
        .with_context(|| format!("failed to read history '{}'", history.path().display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No notes recorded yet");
        return Ok(());
    }
    for entry in &entries {
        print_entry(entry);
    }
    Ok(())
}

fn print_entry(entry: &HistoryEntry) {
    println!(
        "#{:<4} {}  {:<5} {:<6} {}",
        entry.id,
        entry.target_date,
        entry.category.as_str(),
        entry.status.as_str(),
        entry.title
    );
    if !entry.tags.is_empty() {
        println!("      tags: {}", entry.tags.join(", "));
    }
}
