use std::num::NonZeroUsize;
use std::sync::Arc;

use eyre::{Result, eyre};
use log::{error, info, warn};

use crate::chat::agent::{Job, OutreachAgent};
use crate::portfolio::{JobSkillQuery, MatchResult, SharedPortfolio, match_links};
use crate::scraper::job::{JobSource, clean_text};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailDraft {
    Generated(String),
    Failed(String),
}

impl EmailDraft {
    pub fn text(&self) -> &str {
        match self {
            EmailDraft::Generated(text) | EmailDraft::Failed(text) => text,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, EmailDraft::Generated(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDrafts {
    pub job: Job,
    pub links: MatchResult,
    pub drafts: Vec<EmailDraft>,
}

/// Runs a posting through scrape, extraction, portfolio lookup and drafting.
pub struct DraftGenerator {
    agent: OutreachAgent,
    portfolio: Arc<SharedPortfolio>,
    variations: NonZeroUsize,
    max_links: NonZeroUsize,
}

impl DraftGenerator {
    pub fn new(
        agent: OutreachAgent,
        portfolio: Arc<SharedPortfolio>,
        variations: NonZeroUsize,
        max_links: NonZeroUsize,
    ) -> Self {
        Self {
            agent,
            portfolio,
            variations,
            max_links,
        }
    }

    pub fn portfolio(&self) -> &SharedPortfolio {
        &self.portfolio
    }

    pub async fn generate(&self, source: &JobSource) -> Result<GeneratedDrafts> {
        info!("analyzing job posting: {}", source);

        let page = source
            .fetch()
            .await
            .map_err(|e| eyre!("error loading data from {}: {}", source, e))?;

        let cleaned = clean_text(&page);
        if cleaned.is_empty() {
            warn!("content loaded, but resulted in empty text after cleaning");
        }

        let jobs = self.agent.extract_jobs(&cleaned).await?;
        let Some(job) = jobs.into_iter().next() else {
            return Err(eyre!(
                "could not extract structured job details from the content"
            ));
        };
        info!("drafting emails for role: {}", job.role);

        let store = self.portfolio.snapshot();
        let links = match_links(&JobSkillQuery::new(job.skills.iter().cloned()), &store, self.max_links);
        info!("matched {} portfolio links", links.links.len());

        let variations = self.variations.get();
        let mut drafts = Vec::with_capacity(variations);

        for variation in 1..=variations {
            let draft = match self.agent.write_mail(&job, &links.links, variation, variations).await {
                Ok(mail) if !mail.trim().is_empty() => EmailDraft::Generated(mail.trim().to_string()),
                Ok(_) => {
                    warn!("generated empty content for variation {}", variation);
                    EmailDraft::Failed(format!("Failed to generate Variation {}.", variation))
                }
                Err(e) => {
                    error!("error generating variation {}: {}", variation, e);
                    EmailDraft::Failed(format!("Error during generation: {}", e))
                }
            };
            drafts.push(draft);
        }

        if !drafts.iter().any(EmailDraft::is_generated) {
            return Err(eyre!("could not generate any usable email variations"));
        }

        info!("email variations generated successfully");
        Ok(GeneratedDrafts { job, links, drafts })
    }
}
