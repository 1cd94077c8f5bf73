//! notemark entrypoint: open a note, run toolbar actions, print buffer and preview.
use anyhow::{Context, Result};
use clap::Parser;
use core_config::load_from;
use core_preview::{LineDescriptor, render_plain};
use core_session::{Document, EditorSession, MemoryNoteStore, SessionView};
use core_text::Selection;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "notemark", version, about = "Markdown-lite note editing engine")]
struct Args {
    /// Optional note body to open (UTF-8 text). If omitted an empty note is used.
    pub path: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `notemark.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Selection before the first tool, as `START..END` or a caret offset (chars).
    #[arg(long = "select", value_parser = parse_selection)]
    pub select: Option<Selection>,
    /// Toolbar action to apply; repeat to chain (bold, italic, heading1, bullet, ordered, checklist, code).
    #[arg(long = "tool")]
    pub tools: Vec<String>,
    /// Note title recorded on save.
    #[arg(long = "title")]
    pub title: Option<String>,
    /// Write the edited body here.
    #[arg(long = "output")]
    pub output: Option<PathBuf>,
    /// Print the session view and preview as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

fn parse_selection(raw: &str) -> Result<Selection, String> {
    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid offset `{s}`: {e}"))
    };
    match raw.split_once("..") {
        Some((a, b)) => Ok(Selection::new(parse(a)?, parse(b)?)),
        None => Ok(Selection::caret(parse(raw)?)),
    }
}

#[derive(Serialize)]
struct Report<'a> {
    view: SessionView<'a>,
    preview: &'a [LineDescriptor],
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("notemark.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "notemark.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global subscriber already installed; dropping the guard shuts the writer down.
        Err(_err) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn load_document(path: Option<&Path>) -> Result<Document> {
    let Some(path) = path else {
        return Ok(Document::untitled("scratch"));
    };
    let content = std::fs::read_to_string(path)
        .inspect_err(|e| error!(target: "io", file = %path.display(), ?e, "file_open_error"))
        .with_context(|| format!("reading {}", path.display()))?;
    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("note")
        .to_string();
    debug!(target: "io", file = %path.display(), size_bytes = content.len(), "file_read_ok");
    let mut doc = Document::untitled(id.clone());
    doc.title = id;
    doc.content = content;
    Ok(doc)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    let args = Args::parse();
    let config = load_from(args.config.clone())?;
    let document = load_document(args.path.as_deref())?;
    let note_id = document.id.clone();
    let store = Arc::new(MemoryNoteStore::with_notes([document]));
    let mut session = EditorSession::open(Arc::clone(&store), &note_id, &config).await?;
    let path_str = args.path.as_ref().map(|p| p.to_string_lossy().to_string());
    info!(
        target: "runtime.startup",
        note = note_id.as_str(),
        path = path_str.as_deref(),
        config_override = args.config.is_some(),
        history_capacity = config.effective_history_capacity,
        "bootstrap_complete"
    );

    if let Some(title) = args.title {
        session.set_title(title);
    }
    if let Some(sel) = args.select {
        session.set_selection(sel);
    }
    for tool in &args.tools {
        session
            .apply_tool(tool)
            .with_context(|| format!("applying tool `{tool}`"))?;
    }

    let saved = session.save().await?.into_document();
    if let Some(out) = args.output.as_ref() {
        std::fs::write(out, &saved.content).with_context(|| format!("writing {}", out.display()))?;
        debug!(target: "io", file = %out.display(), size_bytes = saved.content.len(), "file_write_ok");
    }

    let preview = session.preview();
    if args.json {
        let report = Report {
            view: session.view(),
            preview: &preview,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", session.buffer());
        println!("--- preview ---");
        println!("{}", render_plain(&preview));
    }

    info!(target: "runtime", "shutdown");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_argument_forms() {
        assert_eq!(parse_selection("2..5"), Ok(Selection::new(2, 5)));
        assert_eq!(parse_selection("9..3"), Ok(Selection::new(3, 9)));
        assert_eq!(parse_selection("4"), Ok(Selection::caret(4)));
        assert!(parse_selection("x..1").is_err());
    }

    #[test]
    fn cli_accepts_repeated_tools() {
        let args = Args::try_parse_from([
            "notemark", "note.md", "--select", "0..3", "--tool", "bold", "--tool", "bullet",
        ])
        .unwrap();
        assert_eq!(args.tools, ["bold", "bullet"]);
        assert_eq!(args.select, Some(Selection::new(0, 3)));
        assert!(!args.json);
    }

    #[test]
    fn missing_path_opens_scratch_note() {
        let doc = load_document(None).unwrap();
        assert_eq!(doc.id, "scratch");
        assert!(doc.content.is_empty());
    }
}
