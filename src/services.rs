//! Synchronous services consumed by applications built on the engine.
//!
//! The engine never calls these itself. They are the boundary a UI crosses
//! to fetch content: a failure is turned into fallback text at the
//! boundary ([`read_file`], [`list_directory`], [`system_status`]) so it can
//! be rendered in place of the content and never reaches the render loop.

use crate::color::Rgba;
use crate::error::Result;
use crate::event::{LogLevel, emit_log};
use crate::style::TextAttributes;
use std::fs;
use std::path::{Path, PathBuf};

/// A run of text sharing one style.
#[derive(Clone, Debug, PartialEq)]
pub struct StyledSpan {
    pub text: String,
    pub fg: Option<Rgba>,
    pub attributes: TextAttributes,
}

impl StyledSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fg: None,
            attributes: TextAttributes::empty(),
        }
    }
}

pub trait SyntaxHighlighter {
    /// Style `text`, choosing a grammar from the file extension (no dot).
    fn highlight(&self, text: &str, extension: &str) -> Vec<StyledSpan>;
}

pub trait FuzzyMatcher {
    /// Candidates that match `query`, best first.
    fn rank(&self, query: &str, candidates: &[String]) -> Vec<String>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_directory: bool,
    pub size: u64,
}

pub trait DirectoryLister {
    fn list(&self, path: &Path) -> Result<Vec<DirEntry>>;
}

pub trait FileReader {
    fn read(&self, path: &Path) -> Result<String>;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SystemStatus {
    /// Percent, 0 to 100.
    pub cpu_usage: f64,
    /// Percent, 0 to 100.
    pub memory_usage: f64,
    pub uptime_seconds: u64,
    pub process_list: Vec<String>,
    pub status_message: String,
}

pub trait StatusSource {
    fn read_status(&self) -> Result<SystemStatus>;
}

// ============================================================================
// Boundary
// ============================================================================

/// Result of a service call after the boundary: the content, or the text
/// to show instead.
#[derive(Clone, Debug, PartialEq)]
pub enum Loaded<T> {
    Ready(T),
    Fallback(String),
}

impl<T> Loaded<T> {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Render ready content with `render`; fallback text passes through.
    pub fn into_text(self, render: impl FnOnce(T) -> String) -> String {
        match self {
            Self::Ready(value) => render(value),
            Self::Fallback(text) => text,
        }
    }

    fn settle(result: Result<T>, prefix: &str) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(e) => {
                let text = format!("{prefix}: {e}");
                emit_log(LogLevel::Warn, &text);
                Self::Fallback(text)
            }
        }
    }
}

pub fn read_file(reader: &dyn FileReader, path: &Path) -> Loaded<String> {
    Loaded::settle(reader.read(path), "Error reading file")
}

pub fn list_directory(lister: &dyn DirectoryLister, path: &Path) -> Loaded<Vec<DirEntry>> {
    Loaded::settle(lister.list(path), "Error listing directory")
}

pub fn system_status(source: &dyn StatusSource) -> Loaded<SystemStatus> {
    Loaded::settle(source.read_status(), "Status unavailable")
}

// ============================================================================
// Implementations
// ============================================================================

/// Reads files from the local filesystem as UTF-8.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsReader;

impl FileReader for FsReader {
    fn read(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path)?)
    }
}

/// Lists a local directory, directories first, then by name.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsLister;

impl DirectoryLister for FsLister {
    fn list(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_directory: metadata.is_dir(),
                size: metadata.len(),
            });
        }
        entries.sort_by(|a, b| {
            b.is_directory
                .cmp(&a.is_directory)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(entries)
    }
}

/// Returns the text unstyled, one span per line.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainHighlighter;

impl SyntaxHighlighter for PlainHighlighter {
    fn highlight(&self, text: &str, _extension: &str) -> Vec<StyledSpan> {
        text.split_inclusive('\n').map(StyledSpan::plain).collect()
    }
}

/// Case-insensitive in-order character match.
///
/// Candidates score higher for consecutive matched characters and for a
/// match starting earlier; ties keep input order. An empty query matches
/// everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct SubsequenceMatcher;

impl SubsequenceMatcher {
    fn score(query: &[char], candidate: &str) -> Option<i64> {
        if query.is_empty() {
            return Some(0);
        }
        let mut score = 0i64;
        let mut qi = 0;
        let mut prev: Option<usize> = None;
        let mut first = None;
        for (i, c) in candidate.chars().flat_map(char::to_lowercase).enumerate() {
            if qi == query.len() {
                break;
            }
            if c == query[qi] {
                first.get_or_insert(i);
                score += if prev.is_some_and(|p| p + 1 == i) { 5 } else { 1 };
                prev = Some(i);
                qi += 1;
            }
        }
        (qi == query.len()).then(|| score - first.unwrap_or(0) as i64)
    }
}

impl FuzzyMatcher for SubsequenceMatcher {
    fn rank(&self, query: &str, candidates: &[String]) -> Vec<String> {
        let query: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();
        let mut scored: Vec<(i64, &String)> = candidates
            .iter()
            .filter_map(|c| Self::score(&query, c).map(|s| (s, c)))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, c)| c.clone()).collect()
    }
}

/// Reads load, memory and uptime from a procfs mount.
#[derive(Clone, Debug)]
pub struct ProcStatusSource {
    root: PathBuf,
    max_processes: usize,
}

impl Default for ProcStatusSource {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl ProcStatusSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_processes: 10,
        }
    }

    #[must_use]
    pub fn with_max_processes(mut self, max: usize) -> Self {
        self.max_processes = max;
        self
    }

    fn first_number(&self, file: &str) -> Result<f64> {
        let text = fs::read_to_string(self.root.join(file))?;
        text.split_whitespace()
            .next()
            .and_then(|field| field.parse().ok())
            .ok_or_else(|| malformed(file))
    }

    fn memory_usage(&self) -> Result<f64> {
        let text = fs::read_to_string(self.root.join("meminfo"))?;
        let field = |key: &str| {
            text.lines()
                .find_map(|line| line.strip_prefix(key))
                .and_then(|rest| rest.split_whitespace().next())
                .and_then(|kb| kb.parse::<f64>().ok())
        };
        match (field("MemTotal:"), field("MemAvailable:")) {
            (Some(total), Some(available)) if total > 0.0 => {
                Ok(((total - available) / total * 100.0).clamp(0.0, 100.0))
            }
            _ => Err(malformed("meminfo")),
        }
    }

    /// Command names of numeric entries, lowest pid first.
    fn processes(&self) -> Vec<String> {
        let Ok(dir) = fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut pids: Vec<u32> = dir
            .filter_map(|e| e.ok()?.file_name().to_str()?.parse().ok())
            .collect();
        pids.sort_unstable();
        pids.into_iter()
            .filter_map(|pid| {
                let comm = fs::read_to_string(self.root.join(pid.to_string()).join("comm")).ok()?;
                Some(format!("{pid} {}", comm.trim()))
            })
            .take(self.max_processes)
            .collect()
    }
}

impl StatusSource for ProcStatusSource {
    fn read_status(&self) -> Result<SystemStatus> {
        let load = self.first_number("loadavg")?;
        let cpus = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        let cpu_usage = (load / cpus as f64 * 100.0).clamp(0.0, 100.0);
        let memory_usage = self.memory_usage()?;
        let uptime_seconds = self.first_number("uptime")? as u64;
        Ok(SystemStatus {
            cpu_usage,
            memory_usage,
            uptime_seconds,
            process_list: self.processes(),
            status_message: "OK".to_string(),
        })
    }
}

fn malformed(file: &str) -> crate::error::Error {
    crate::error::Error::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("unexpected contents in {file}"),
    ))
}
