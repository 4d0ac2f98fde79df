use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mononote::{
    AppConfig, AppEvent, FileService, FixedPathPicker, LoopClock, NoteApp, read_note,
    render_blocks, render_session_rows,
};
use mononote_core::{Document, Editor, KeyEvent, render_document, session_rows};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "mononote")]
#[command(about = "Minimal rich-text notes with live arithmetic")]
struct Cli {
    /// Quiet period before an edited note is saved, in milliseconds
    #[arg(long, global = true)]
    autosave_ms: Option<u64>,

    /// Undo steps kept per note
    #[arg(long, global = true)]
    max_undo: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a note with its formatting and math results
    Show {
        file: PathBuf,

        /// No ANSI styling; headings are prefixed with `#`
        #[arg(long)]
        plain: bool,
    },
    /// List the sessions recorded in a note, newest first
    Sessions { file: PathBuf },
    /// Append lines to a note from stdin; `:help` lists commands
    Edit { file: PathBuf },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "mononote=info".into()),
    );

    // stdout carries the note itself
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = AppConfig::from_env();
    if let Some(ms) = cli.autosave_ms {
        config.autosave_delay = Duration::from_millis(ms);
    }
    if let Some(max_undo) = cli.max_undo {
        config.max_undo = max_undo;
    }
    let config = config.with_defaults();

    match cli.command {
        Commands::Show { file, plain } => {
            let note = read_note(&file).await?;
            let editor = Editor::notepad(note.content, config.editor_config());
            let blocks = render_document(editor.doc(), &editor.decorations());
            let ansi = !plain && std::io::stdout().is_terminal();
            print!("{}", render_blocks(&blocks, ansi));
        }
        Commands::Sessions { file } => {
            let note = read_note(&file).await?;
            if note.sessions.is_empty() {
                println!("No sessions recorded");
            } else {
                print!("{}", render_session_rows(&session_rows(&note.sessions, None)));
            }
        }
        Commands::Edit { file } => edit(&file, config).await?,
    }

    Ok(())
}

const EDIT_HELP: &str = "\
:w          save
:saveas     save to the same path and rebind
:u / :r     undo / redo
:b          toggle bold at the caret
:h1 / :h2   toggle heading kind of the current line
:color HEX  color following text; :nocolor clears it
:show       print the note
:history    list sessions
:q          quit (pending edits are saved first)";

async fn edit(path: &Path, config: AppConfig) -> anyhow::Result<()> {
    let exists = tokio::fs::try_exists(path)
        .await
        .with_context(|| format!("cannot access {}", path.display()))?;

    let clock = LoopClock::start();
    let app = NoteApp::new(config, clock.now_ms());
    let files = FileService::new(FixedPathPicker::new(path));
    let (events, task) = mononote::spawn(app, files, clock);

    if exists {
        send(&events, AppEvent::Open).await?;
        send(&events, AppEvent::CaretToEnd).await?;
    }
    send(&events, AppEvent::inspect(print_note)).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut at_line_start = !exists;
    while let Some(line) = lines.next_line().await? {
        let event = match line.trim_end() {
            ":q" | ":quit" => break,
            ":help" => {
                println!("{EDIT_HELP}");
                continue;
            }
            ":w" => AppEvent::Save,
            ":saveas" => AppEvent::SaveAs,
            ":u" => AppEvent::Undo,
            ":r" => AppEvent::Redo,
            ":b" => AppEvent::Key(KeyEvent::with_ctrl('b')),
            ":h1" => toggle_kind("heading-one"),
            ":h2" => toggle_kind("heading-two"),
            ":nocolor" => AppEvent::command("marks.unset_color", None),
            ":show" => AppEvent::inspect(print_note),
            ":history" => AppEvent::inspect(|app| {
                print!("{}", render_session_rows(&app.history_rows()));
            }),
            command if command.starts_with(":color ") => {
                let hex = command.trim_start_matches(":color ").trim();
                AppEvent::command(
                    "marks.set_color",
                    Some(serde_json::json!({ "color": hex })),
                )
            }
            command if command.starts_with(':') => {
                eprintln!("unknown command {command}; :help lists commands");
                continue;
            }
            text => {
                let text = if at_line_start {
                    text.to_string()
                } else {
                    format!("\n{text}")
                };
                at_line_start = false;
                AppEvent::Type(text)
            }
        };
        send(&events, event).await?;
    }

    send(&events, AppEvent::Shutdown).await?;
    let app = task.await.context("event loop stopped unexpectedly")?;
    if let Some(notice) = app.notice() {
        eprintln!("{}: {}", notice.title, notice.detail);
    }
    if app.last_saved_at().is_some() {
        println!("Saved {}", app.file_name());
    }
    Ok(())
}

async fn send(events: &mpsc::Sender<AppEvent>, event: AppEvent) -> anyhow::Result<()> {
    events
        .send(event)
        .await
        .map_err(|_| anyhow::anyhow!("event loop stopped unexpectedly"))
}

fn toggle_kind(kind: &str) -> AppEvent {
    AppEvent::command("block.toggle_kind", Some(serde_json::json!({ "kind": kind })))
}

fn print_note(app: &NoteApp) {
    let saving = if app.is_saving() { " (saving)" } else { "" };
    println!("── {}{saving} ──", app.file_name());
    if app.doc() != &Document::empty() {
        print!("{}", render_blocks(&app.rendered(), std::io::stdout().is_terminal()));
    }
    if let Some(notice) = app.notice() {
        eprintln!("{}: {}", notice.title, notice.detail);
    }
}
