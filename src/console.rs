//! Console channel: reads lines from stdin, routes them, prints the reply.
//!
//! Commands (everything else is routed as a chat message):
//!   :load <path>    load a document or table from disk
//!   :helper <name>  override the active helper
//!   :reset          clear the conversation and all loaded resources
//!   :save           export the transcript to the work directory
//!   :quit           exit
//!
//! Runs until the `shutdown` token is cancelled (Ctrl-C) or stdin closes.

use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::blackboard::Blackboard;
use crate::error::AppError;
use crate::reader::{self, LoadedFile};
use crate::router::Router;

#[derive(Debug, PartialEq)]
enum Command<'a> {
    Load(&'a str),
    Helper(&'a str),
    Reset,
    Save,
    Quit,
    Chat(&'a str),
}

fn parse_command(input: &str) -> Command<'_> {
    if let Some(rest) = input.strip_prefix(":load") {
        return Command::Load(rest.trim());
    }
    if let Some(rest) = input.strip_prefix(":helper") {
        return Command::Helper(rest.trim());
    }
    match input {
        ":reset" => Command::Reset,
        ":save" => Command::Save,
        ":quit" | ":q" => Command::Quit,
        other => Command::Chat(other),
    }
}

pub async fn run(
    mut router: Router,
    shutdown: CancellationToken,
    work_dir: PathBuf,
) -> Result<(), AppError> {
    info!("console channel started");
    println!("─────────────────────────────────");
    println!(" Mynah console  (:quit to exit)");
    println!("─────────────────────────────────");

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    loop {
        print!("> ");
        use std::io::Write as _;
        let _ = std::io::stdout().flush();

        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                println!();
                info!("console channel shutting down");
                break;
            }

            line = lines.next_line() => {
                match line {
                    Err(e) => {
                        warn!("console read error: {e}");
                        break;
                    }
                    Ok(None) => {
                        info!("stdin closed");
                        break;
                    }
                    Ok(Some(input)) => {
                        let input = input.trim().to_string();
                        if input.is_empty() {
                            continue;
                        }
                        debug!(input = %input, "console received line");
                        match parse_command(&input) {
                            Command::Quit => break,
                            Command::Load(path) => handle_load(&mut router, path),
                            Command::Helper(name) => {
                                let kind = router.set_active_helper(name);
                                println!("Active helper: {}", kind.name());
                            }
                            Command::Reset => match router.reset() {
                                Ok(()) => println!("Memory cleared."),
                                Err(e) => println!("error: {e}"),
                            },
                            Command::Save => match export_transcript(router.board(), &work_dir) {
                                Ok(path) => println!("Transcript saved: {}", path.display()),
                                Err(e) => println!("error: {e}"),
                            },
                            Command::Chat(message) => {
                                let reply = router.route(message).await;
                                println!("{reply}");
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn handle_load(router: &mut Router, path: &str) {
    if path.is_empty() {
        println!("usage: :load <path>");
        return;
    }
    let path = Path::new(path);
    let id = reader::file_id(path);
    match reader::read(path) {
        Ok(LoadedFile::Text(text)) => {
            let chars = text.chars().count();
            match router.load_document(&id, text) {
                Ok(()) => println!("Document loaded: {id} ({chars} chars). Document helper is active."),
                Err(e) => println!("error: {e}"),
            }
        }
        Ok(LoadedFile::Table(frame)) => {
            let blob = reader::spreadsheet_preview(&frame);
            match router.load_table(&id, frame) {
                Ok(()) => println!("Table loaded: {id}. Tabular helper is active.\n{blob}"),
                Err(e) => println!("error: {e}"),
            }
        }
        Err(e) => println!("error: {e}"),
    }
}

/// Write the conversation as Markdown under `{work_dir}/transcripts/`.
fn export_transcript(board: &Blackboard, work_dir: &Path) -> Result<PathBuf, AppError> {
    let dir = work_dir.join("transcripts");
    std::fs::create_dir_all(&dir)?;

    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("transcript-{stamp}.md"));

    let mut out = String::from("# Transcript\n\n");
    for turn in &board.history {
        out.push_str(&format!("**{}**: {}\n\n", turn.role.prompt_label(), turn.content));
    }
    std::fs::write(&path, out)?;
    Ok(path)
}
