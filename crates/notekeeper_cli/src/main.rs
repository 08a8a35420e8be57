//! Command-line front end for a notes REST API.
//!
//! # Responsibility
//! - Map subcommands onto `notekeeper_core` coordinator actions.
//! - Print results as plain text; diagnostics go through `log`.

use clap::{Parser, Subcommand};
use log::debug;
use notekeeper_core::{
    default_log_level, init_logging, Category, ClientConfig, Coordinator, HttpNoteStore,
    LogTarget, Note, NoteStore, DEFAULT_EXCERPT_CHARS,
};
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Parser, Debug)]
#[command(name = "notekeeper", version, about = "Notes API client")]
struct Cli {
    /// Server origin used when the API base is relative.
    #[arg(long, global = true)]
    origin: Option<String>,
    /// API base path or absolute URL (default `/api`).
    #[arg(long, global = true)]
    base: Option<String>,
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute directory for rolling log files; stderr when omitted.
    #[arg(long, global = true)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List notes, newest first.
    List {
        #[arg(long, short)]
        query: Option<String>,
        /// Only starred notes.
        #[arg(long)]
        starred: bool,
    },
    /// Show one note.
    Get { id: String },
    /// Create a note.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long)]
        star: bool,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Change title and/or content of a note.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Toggle the star flag of a note.
    Star { id: String },
    /// Delete a note.
    Delete { id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult {
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    init_logging(level, LogTarget::from_dir(cli.log_dir.as_deref())?)?;

    let mut config = ClientConfig::from_env();
    if let Some(origin) = cli.origin {
        config = config.with_origin(origin);
    }
    if let Some(base) = cli.base {
        config = config.with_api_base(base);
    }
    config.validate()?;
    debug!(
        "event=cli_start module=cli status=ok api_url={}",
        config.api_url()
    );

    let store: Arc<dyn NoteStore> = Arc::new(HttpNoteStore::new(&config)?);
    let mut coordinator = Coordinator::new(store.clone());

    match cli.command {
        Command::List { query, starred } => {
            coordinator
                .search_changed(query.unwrap_or_default())
                .await?;
            if starred {
                coordinator.filter_changed(Category::Starred);
            }
            let visible = coordinator.visible();
            if visible.is_empty() {
                println!("no notes");
            }
            for note in &visible {
                print_row(note);
            }
        }
        Command::Get { id } => print_note(&store.get(&id).await?),
        Command::Create {
            title,
            content,
            star,
            tags,
        } => {
            coordinator.create_new();
            let editor = coordinator.editor_mut();
            editor.set_title(title);
            editor.set_content(content);
            editor.set_tags(tags);
            if star {
                editor.toggle_star();
            }
            coordinator.save().await?;
            print_open(&coordinator);
        }
        Command::Edit { id, title, content } => {
            let note = store.get(&id).await?;
            coordinator.select_note(&note);
            let editor = coordinator.editor_mut();
            if let Some(title) = title {
                editor.set_title(title);
            }
            if let Some(content) = content {
                editor.set_content(content);
            }
            coordinator.save().await?;
            print_open(&coordinator);
        }
        Command::Star { id } => {
            let note = store.get(&id).await?;
            coordinator.select_note(&note);
            coordinator.toggle_star(&note).await?;
            print_open(&coordinator);
        }
        Command::Delete { id } => {
            coordinator.load().await?;
            let target = Note {
                id: Some(id.clone()),
                ..Note::draft()
            };
            coordinator.delete_note(&target).await?;
            println!("deleted {id}");
        }
    }

    Ok(())
}

fn print_row(note: &Note) {
    let star = if note.is_starred() { '*' } else { ' ' };
    let title = if note.title.is_empty() {
        "(untitled)"
    } else {
        note.title.as_str()
    };
    println!(
        "{star} {:<36} {:<24} {title}",
        note.id().unwrap_or("-"),
        note.recency_key()
    );
    let excerpt = note.excerpt(DEFAULT_EXCERPT_CHARS);
    if !excerpt.is_empty() {
        println!("    {excerpt}");
    }
}

fn print_note(note: &Note) {
    print_row(note);
    if let Some(tags) = note.tags.as_ref().filter(|tags| !tags.is_empty()) {
        println!("    tags: {}", tags.join(", "));
    }
    if !note.content.is_empty() {
        println!();
        println!("{}", note.content);
    }
}

fn print_open(coordinator: &Coordinator<dyn NoteStore>) {
    if let Some(note) = coordinator.editor().note() {
        print_note(note);
    }
}
