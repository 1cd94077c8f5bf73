//! Configuration loading and parsing.
//!
//! Parses `notemark.toml` (or an override path supplied by the binary):
//!
//! ```toml
//! [history]
//! capacity = 50          # snapshots kept per undo/redo stack
//!
//! [editor]
//! empty_wrap = "markers" # or "placeholder"
//! placeholder = "text"   # word inserted by wraps on a bare caret
//! ```
//!
//! Missing files and parse errors fall back to defaults. Unknown fields are
//! ignored. The raw history capacity is kept as written; the effective value
//! is clamped to `1..=MAX_HISTORY_CAPACITY` when the config is loaded.
//! The resulting [`Config`] is handed to the session explicitly; nothing here
//! is global.

use anyhow::Result;
use core_history::DEFAULT_HISTORY_CAP;
use core_text::EmptyWrap;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "notemark.toml";
pub const MAX_HISTORY_CAPACITY: usize = 1000;

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "HistoryConfig::default_capacity")]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: Self::default_capacity(),
        }
    }
}

impl HistoryConfig {
    const fn default_capacity() -> usize {
        DEFAULT_HISTORY_CAP
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmptyWrapMode {
    #[default]
    Markers,
    Placeholder,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditorConfig {
    #[serde(default)]
    pub empty_wrap: EmptyWrapMode,
    #[serde(default = "EditorConfig::default_placeholder")]
    pub placeholder: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            empty_wrap: EmptyWrapMode::default(),
            placeholder: Self::default_placeholder(),
        }
    }
}

impl EditorConfig {
    fn default_placeholder() -> String {
        "text".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub editor: EditorConfig,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub raw: Option<String>,              // original file string (optional)
    pub file: ConfigFile,                 // parsed (or default) data
    pub effective_history_capacity: usize, // clamped
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(None, ConfigFile::default())
    }
}

/// Best-effort config path: working directory first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("notemark").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Ok(Config::from_file(Some(content), file)),
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn from_file(raw: Option<String>, file: ConfigFile) -> Self {
        let requested = file.history.capacity;
        let effective = requested.clamp(1, MAX_HISTORY_CAPACITY);
        if effective != requested {
            info!(
                target: "config",
                requested,
                effective,
                max = MAX_HISTORY_CAPACITY,
                "history_capacity_clamped"
            );
        }
        Self {
            raw,
            file,
            effective_history_capacity: effective,
        }
    }

    /// Wrap policy for tools invoked on a bare caret.
    pub fn empty_wrap(&self) -> EmptyWrap {
        match self.file.editor.empty_wrap {
            EmptyWrapMode::Markers => EmptyWrap::Markers,
            EmptyWrapMode::Placeholder => EmptyWrap::Placeholder(self.file.editor.placeholder.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), body).unwrap();
        tmp
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.raw.is_none());
        assert_eq!(cfg.effective_history_capacity, DEFAULT_HISTORY_CAP);
        assert_eq!(cfg.empty_wrap(), EmptyWrap::Markers);
    }

    #[test]
    fn parses_history_and_editor_sections() {
        let tmp = write_config(
            "[history]\ncapacity = 12\n[editor]\nempty_wrap = \"placeholder\"\nplaceholder = \"word\"\n",
        );
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.history.capacity, 12);
        assert_eq!(cfg.effective_history_capacity, 12);
        assert_eq!(cfg.empty_wrap(), EmptyWrap::Placeholder("word".into()));
    }

    #[test]
    fn placeholder_defaults_to_text() {
        let tmp = write_config("[editor]\nempty_wrap = \"placeholder\"\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.empty_wrap(), EmptyWrap::Placeholder("text".into()));
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let tmp = write_config("[history\ncapacity = ");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(cfg.raw.is_none());
        assert_eq!(cfg.effective_history_capacity, DEFAULT_HISTORY_CAP);
    }

    #[test]
    fn unknown_wrap_mode_falls_back_to_defaults() {
        let tmp = write_config("[editor]\nempty_wrap = \"sparkles\"\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.empty_wrap(), EmptyWrap::Markers);
    }

    #[test]
    fn zero_capacity_clamped_to_one() {
        let tmp = write_config("[history]\ncapacity = 0\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.history.capacity, 0);
        assert_eq!(cfg.effective_history_capacity, 1);
    }

    #[test]
    fn clamp_logging_uses_config_target() {
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let cfg = with_default(subscriber, || {
            let tmp = write_config("[history]\ncapacity = 5000\n");
            load_from(Some(tmp.path().to_path_buf())).unwrap()
        });

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("INFO config:"));
        assert!(log_output.contains("history_capacity_clamped"));
        assert_eq!(cfg.effective_history_capacity, MAX_HISTORY_CAPACITY);
    }
}
