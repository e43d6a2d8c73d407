use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

const SKILLS_COLUMNS: [&str; 2] = ["skills", "techstack"];
const LINK_COLUMNS: [&str; 2] = ["links", "link"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("portfolio source not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read portfolio source: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse portfolio source: {0}")]
    Csv(#[from] csv::Error),

    #[error("portfolio source is missing the required `{0}` column")]
    MissingColumn(&'static str),
}

/// A single sample project, reachable under one or more skills.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioEntry {
    skills: Vec<String>,
    tokens: HashSet<String>,
    link: String,
}

impl PortfolioEntry {
    /// Builds an entry, returning `None` when no skill survives trimming or
    /// the link is blank.
    pub fn new<I, S>(skills: I, link: &str) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let link = link.trim();
        if link.is_empty() {
            return None;
        }

        let mut kept = Vec::new();
        let mut tokens = HashSet::new();
        for skill in skills {
            let skill = skill.as_ref().trim();
            if skill.is_empty() {
                continue;
            }
            if tokens.insert(normalize_skill(skill)) {
                kept.push(skill.to_string());
            }
        }

        if kept.is_empty() {
            return None;
        }

        Some(Self {
            skills: kept,
            tokens,
            link: link.to_string(),
        })
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    /// Exact token match against an already normalized skill.
    pub fn has_skill(&self, normalized: &str) -> bool {
        self.tokens.contains(normalized)
    }

    fn identity(&self) -> (Vec<String>, String) {
        let mut tokens: Vec<String> = self.tokens.iter().cloned().collect();
        tokens.sort();
        (tokens, self.link.clone())
    }
}

/// Immutable catalogue of portfolio entries, in source order.
#[derive(Debug, Clone, Default)]
pub struct PortfolioStore {
    entries: Vec<PortfolioEntry>,
}

impl PortfolioStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        info!("loading portfolio from: {}", path.display());

        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
            _ => LoadError::Io(e),
        })?;

        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let skills_idx = find_column(&headers, &SKILLS_COLUMNS).ok_or(LoadError::MissingColumn("Skills"))?;
        let link_idx = find_column(&headers, &LINK_COLUMNS).ok_or(LoadError::MissingColumn("Links"))?;

        let mut entries = Vec::new();
        let mut seen = HashSet::new();

        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let skills = record.get(skills_idx).unwrap_or("");
            let link = record.get(link_idx).unwrap_or("");

            let Some(entry) = PortfolioEntry::new(parse_skills(skills), link) else {
                debug!("skipping portfolio row {}: empty skills or link", row + 1);
                continue;
            };

            if !seen.insert(entry.identity()) {
                debug!("skipping portfolio row {}: duplicate of an earlier entry", row + 1);
                continue;
            }

            entries.push(entry);
        }

        info!("loaded {} portfolio entries", entries.len());
        Ok(Self { entries })
    }

    #[cfg(test)]
    pub fn from_entries(entries: Vec<PortfolioEntry>) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.identity()))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[PortfolioEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn normalize_skill(skill: &str) -> String {
    skill.trim().to_lowercase()
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|header| names.iter().any(|name| header.trim().eq_ignore_ascii_case(name)))
}

/// Accepts `React, Node.js` as well as list-typed cells like `["react", 'node.js']`.
fn parse_skills(cell: &str) -> Vec<String> {
    let cell = cell.trim();
    let cell = cell
        .strip_prefix('[')
        .and_then(|c| c.strip_suffix(']'))
        .unwrap_or(cell);

    cell.split(',')
        .map(|token| token.trim().trim_matches(|c| c == '"' || c == '\'').trim())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
