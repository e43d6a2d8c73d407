use std::collections::HashSet;
use std::num::NonZeroUsize;

use log::debug;

use super::store::{PortfolioStore, normalize_skill};

pub const DEFAULT_MAX_RESULTS: NonZeroUsize = NonZeroUsize::new(2).unwrap();

/// Skills pulled from a job posting, most relevant first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSkillQuery {
    pub requested_skills: Vec<String>,
}

impl JobSkillQuery {
    pub fn new<I, S>(skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            requested_skills: skills.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub links: Vec<String>,
}

impl MatchResult {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Walks the requested skills in order and collects the links of every
/// catalogue entry carrying that skill, skipping links already taken, until
/// `max_results` links are found.
pub fn match_links(query: &JobSkillQuery, store: &PortfolioStore, max_results: NonZeroUsize) -> MatchResult {
    let max_results = max_results.get();
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    'skills: for skill in &query.requested_skills {
        let skill = normalize_skill(skill);
        if skill.is_empty() {
            continue;
        }

        for entry in store.entries().iter().filter(|entry| entry.has_skill(&skill)) {
            if seen.insert(entry.link()) {
                links.push(entry.link().to_string());
            }
            if links.len() == max_results {
                break 'skills;
            }
        }
    }

    debug!(
        "matched {} portfolio links for {} requested skills",
        links.len(),
        query.requested_skills.len()
    );

    MatchResult { links }
}
