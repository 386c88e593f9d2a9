use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::recommend::Recommendation;

/// A postgresql.conf held as its original lines, so untouched lines keep
/// their comments and ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfFile {
    lines: Vec<String>,
}

/// One line rewritten (or appended) by [`ConfFile::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub key: String,
    pub old: Option<String>,
    pub new: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KeyLine<'a> {
    commented: bool,
    value: &'a str,
    comment: Option<&'a str>,
}

impl ConfFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read conf file: {}", path.as_ref().display()))?;
        Ok(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        Self {
            lines: contents.lines().map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Current active value of `key`, if the file sets it.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.lines
            .iter()
            .filter_map(|line| match_key(line, key))
            .filter(|m| !m.commented)
            .last()
            .map(|m| m.value)
    }

    /// Sets every recommended key, preferring the last active line for the
    /// key, then the last commented-out default, then appending.
    pub fn apply(&mut self, recommendations: &[Recommendation]) -> Vec<Change> {
        let mut changes = Vec::new();

        for rec in recommendations {
            let mut active = None;
            let mut commented = None;
            for (idx, line) in self.lines.iter().enumerate() {
                if let Some(m) = match_key(line, &rec.key) {
                    if m.commented {
                        commented = Some(idx);
                    } else {
                        active = Some(idx);
                    }
                }
            }

            let Some(idx) = active.or(commented) else {
                let new = render(&rec.key, &rec.value, None);
                changes.push(Change {
                    key: rec.key.clone(),
                    old: None,
                    new: new.clone(),
                });
                self.lines.push(new);
                continue;
            };

            let old = &self.lines[idx];
            let Some(m) = match_key(old, &rec.key) else {
                continue;
            };
            if !m.commented && m.value == rec.value {
                continue;
            }

            let new = render(&rec.key, &rec.value, m.comment);
            changes.push(Change {
                key: rec.key.clone(),
                old: Some(old.clone()),
                new: new.clone(),
            });
            self.lines[idx] = new;
        }

        changes
    }

    /// Writes the conf next to `path` and renames it into place, so a failed
    /// write never leaves a truncated file behind.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        let tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in: {}", dir.display()))?;
        if let Ok(meta) = fs::metadata(path) {
            tmp.as_file().set_permissions(meta.permissions())?;
        }

        let mut writer = BufWriter::new(tmp);
        for line in &self.lines {
            writeln!(writer, "{}", line)?;
        }
        let tmp = writer
            .into_inner()
            .map_err(|e| e.into_error())
            .with_context(|| format!("Failed to write conf file: {}", path.display()))?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)
            .with_context(|| format!("Failed to replace conf file: {}", path.display()))?;

        info!("wrote {} lines to {}", self.lines.len(), path.display());
        Ok(())
    }
}

fn render(key: &str, value: &str, comment: Option<&str>) -> String {
    match comment {
        Some(comment) => format!("{} = {}\t{}", key, value, comment),
        None => format!("{} = {}", key, value),
    }
}

/// Matches `key`, `key = value` or `key value` (keys are case-insensitive).
/// Commented-out lines only match with an `=`, so prose in comments is skipped.
fn match_key<'a>(line: &'a str, key: &str) -> Option<KeyLine<'a>> {
    let mut rest = line.trim_start();
    let commented = rest.starts_with('#');
    if commented {
        rest = rest[1..].trim_start();
    }

    let name_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
        .unwrap_or(rest.len());
    if !rest[..name_len].eq_ignore_ascii_case(key) {
        return None;
    }

    let rest = rest[name_len..].trim_start();
    let rest = match rest.strip_prefix('=') {
        Some(rest) => rest,
        None if commented => return None,
        None => rest,
    };

    // '#' starts a comment unless it sits inside a quoted value
    let mut in_quotes = false;
    let mut split = rest.len();
    for (idx, c) in rest.char_indices() {
        match c {
            '\'' => in_quotes = !in_quotes,
            '#' if !in_quotes => {
                split = idx;
                break;
            }
            _ => {}
        }
    }

    let comment = rest[split..].trim_end();
    Some(KeyLine {
        commented,
        value: rest[..split].trim().trim_matches('\''),
        comment: (!comment.is_empty()).then_some(comment),
    })
}
