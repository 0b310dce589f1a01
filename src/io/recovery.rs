use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

/// Size above which old entries are trimmed on the next append (1 MB).
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Size an oversized log is trimmed down to before appending.
const TRIM_TARGET: usize = (MAX_LOG_SIZE / 2) as usize;

/// Default number of days before entries are prunable.
pub const PRUNE_AGE_DAYS: i64 = 30;

/// Header written at the top of a new recovery log.
const FILE_HEADER: &str = "\
<!-- taskboard recovery log: append-only
     Task data that could not be loaded, saved, or was removed ends up here.
     View with: tb recovery
     Prune old entries: tb recovery --prune
     Safe to delete if empty or stale. -->

---
";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Category of a recovery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    /// Slot contents that could not be read or parsed
    Parser,
    /// A slot write that failed
    Write,
    /// Tasks removed by delete or clear
    Delete,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Parser => write!(f, "parser"),
            RecoveryCategory::Write => write!(f, "write"),
            RecoveryCategory::Delete => write!(f, "delete"),
        }
    }
}

impl RecoveryCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "parser" => Some(RecoveryCategory::Parser),
            "write" => Some(RecoveryCategory::Write),
            "delete" => Some(RecoveryCategory::Delete),
            _ => None,
        }
    }
}

/// A single entry in the recovery log.
#[derive(Debug, Clone)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

impl RecoveryEntry {
    pub fn new(category: RecoveryCategory, description: impl Into<String>) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            category,
            description: description.into(),
            fields: Vec::new(),
            body: String::new(),
        }
    }

    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.push((key.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// Path to the recovery log inside the data directory.
pub fn recovery_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(".recovery.log")
}

// ---------------------------------------------------------------------------
// Atomic file write
// ---------------------------------------------------------------------------

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry formatting
// ---------------------------------------------------------------------------

impl RecoveryEntry {
    /// Format this entry as a markdown block for the recovery log.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "## {} — {}: {}\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.category,
            self.description,
        ));
        out.push('\n');

        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }

        if !self.body.is_empty() {
            out.push('\n');
            out.push_str("```text\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }

        out.push('\n');
        out.push_str("---\n");
        out
    }

    /// Serialize to JSON value for `tb recovery --json`.
    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();

        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "category": self.category.to_string(),
            "description": self.description,
            "fields": fields,
            "body": self.body,
        })
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Append a recovery entry to the log. Errors are swallowed and printed to stderr.
pub fn log_recovery(data_dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = log_recovery_inner(data_dir, entry) {
        eprintln!("warning: could not write to recovery log: {}", e);
    }
}

fn log_recovery_inner(data_dir: &Path, entry: RecoveryEntry) -> io::Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let path = recovery_log_path(data_dir);

    if let Ok(meta) = std::fs::metadata(&path)
        && meta.len() > MAX_LOG_SIZE
    {
        trim_log(&path);
    }

    let needs_header = std::fs::metadata(&path).map_or(true, |m| m.len() == 0);

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())?;
    Ok(())
}

/// Drop aged entries, then the oldest ones until the log is under
/// [`TRIM_TARGET`]. A failed trim leaves the log as it was; the append that
/// triggered it still goes ahead.
fn trim_log(path: &Path) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };
    let cutoff = Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS);
    let pruned = prune_entries_before(&content, &cutoff);
    let trimmed = trim_to_size(&pruned, TRIM_TARGET);
    if let Err(e) = atomic_write(path, trimmed.as_bytes()) {
        eprintln!("warning: could not trim recovery log: {}", e);
    }
}

// ---------------------------------------------------------------------------
// Reading entries
// ---------------------------------------------------------------------------

/// Read recovery entries, most recent first.
pub fn read_recovery_entries(data_dir: &Path, limit: Option<usize>) -> Vec<RecoveryEntry> {
    let content = match std::fs::read_to_string(recovery_log_path(data_dir)) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let mut entries = parse_entries(&content);

    // Entries are parsed oldest-first
    if let Some(n) = limit {
        let skip = entries.len().saturating_sub(n);
        entries = entries.into_iter().skip(skip).collect();
    }

    entries.reverse();
    entries
}

fn parse_entries(content: &str) -> Vec<RecoveryEntry> {
    let mut entries = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let Some(header) = line.strip_prefix("## ") else {
            continue;
        };
        let Some((timestamp, category, description)) = parse_entry_header(header) else {
            continue;
        };

        let mut fields = Vec::new();
        let mut body = String::new();
        let mut in_code_block = false;

        for line in lines.by_ref() {
            if !in_code_block && (line == "---" || line.starts_with("## ")) {
                break;
            }

            if in_code_block {
                if line == "```" {
                    in_code_block = false;
                } else {
                    if !body.is_empty() {
                        body.push('\n');
                    }
                    body.push_str(line);
                }
                continue;
            }

            if line.starts_with("```") {
                in_code_block = true;
                continue;
            }

            if let Some((key, value)) = line.trim().split_once(": ") {
                fields.push((key.to_string(), value.to_string()));
            }
        }

        entries.push(RecoveryEntry {
            timestamp,
            category,
            description,
            fields,
            body,
        });
    }

    entries
}

/// Parse an entry header: `<timestamp> — <category>: <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, RecoveryCategory, String)> {
    let (timestamp_str, rest) = header.split_once(" — ")?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
        .ok()?
        .with_timezone(&Utc);
    let (category_str, description) = rest.split_once(": ")?;
    let category = RecoveryCategory::parse_category(category_str)?;
    Some((timestamp, category, description.to_string()))
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

/// Prune entries older than [`PRUNE_AGE_DAYS`], or all of them.
/// Returns the number of entries removed.
pub fn prune_recovery(data_dir: &Path, all: bool) -> io::Result<usize> {
    let path = recovery_log_path(data_dir);
    if !path.exists() {
        return Ok(0);
    }

    let content = std::fs::read_to_string(&path)?;
    let original_count = parse_entries(&content).len();

    if all {
        atomic_write(&path, FILE_HEADER.as_bytes())?;
        return Ok(original_count);
    }

    let cutoff = Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS);
    let trimmed = prune_entries_before(&content, &cutoff);
    let new_count = parse_entries(&trimmed).len();
    atomic_write(&path, trimmed.as_bytes())?;
    Ok(original_count - new_count)
}

/// Split a log into its file header and one chunk of text per entry,
/// oldest first. Chunks whose header does not parse carry no timestamp.
fn split_entries(content: &str) -> (String, Vec<(Option<DateTime<Utc>>, String)>) {
    let mut header = String::new();
    let mut entries = Vec::new();
    let mut current: Option<(Option<DateTime<Utc>>, String)> = None;
    let mut in_header = true;

    for line in content.lines() {
        if in_header {
            header.push_str(line);
            header.push('\n');
            if line == "---" {
                in_header = false;
            }
            continue;
        }

        if let Some(stripped) = line.strip_prefix("## ") {
            entries.extend(current.take());
            let timestamp = parse_entry_header(stripped).map(|(ts, _, _)| ts);
            current = Some((timestamp, String::new()));
        }
        // Stray lines before the first entry are dropped
        if let Some((_, text)) = current.as_mut() {
            text.push_str(line);
            text.push('\n');
        }
    }
    entries.extend(current);

    (header, entries)
}

/// Drop entries stamped before `cutoff`, keeping the file header.
fn prune_entries_before(content: &str, cutoff: &DateTime<Utc>) -> String {
    let (mut result, entries) = split_entries(content);
    for (timestamp, text) in entries {
        if timestamp.is_some_and(|ts| ts >= *cutoff) {
            result.push_str(&text);
        }
    }
    result
}

/// Keep the header and the newest entries that fit in `limit` bytes.
fn trim_to_size(content: &str, limit: usize) -> String {
    let (mut result, entries) = split_entries(content);
    let mut size = result.len();
    let keep_from = entries
        .iter()
        .rposition(|(_, text)| {
            size += text.len();
            size > limit
        })
        .map_or(0, |i| i + 1);
    for (_, text) in &entries[keep_from..] {
        result.push_str(text);
    }
    result
}
