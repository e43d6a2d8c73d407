use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use eyre::{Result, eyre};
use log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

use crate::utils::config::{LLMConfig, OutreachConfig};

const SYSTEM_PROMPT: &str = include_str!("system_prompt.txt");
const EXTRACT_PROMPT: &str = include_str!("extract_prompt.txt");
const EMAIL_PROMPT: &str = include_str!("email_prompt.txt");

const UNPARSABLE_JOBS: &str = "context too big, unable to parse jobs";

/// A job posting as extracted by the model. Fields are read leniently since
/// the model is free to answer with strings, numbers or lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    #[serde(default, deserialize_with = "lenient_text")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub experience: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderProfile {
    pub name: String,
    pub profile: Option<String>,
    pub portfolio_url: Option<String>,
    pub email: Option<String>,
}

impl From<&OutreachConfig> for SenderProfile {
    fn from(cfg: &OutreachConfig) -> Self {
        Self {
            name: cfg.sender_name.clone(),
            profile: cfg.sender_profile.clone(),
            portfolio_url: cfg.portfolio_url.clone(),
            email: cfg.sender_email.clone(),
        }
    }
}

impl SenderProfile {
    fn signature(&self) -> String {
        match (&self.portfolio_url, &self.email) {
            (Some(url), Some(email)) => format!(", portfolio link ({}) and email ({})", url, email),
            (Some(url), None) => format!(" and portfolio link ({})", url),
            (None, Some(email)) => format!(" and email ({})", email),
            (None, None) => String::new(),
        }
    }
}

pub struct OutreachAgent {
    api_key: String,
    model: String,
    endpoint: String,
    temperature: f32,
    max_retries: u32,
    sender: SenderProfile,
    client: reqwest::Client,
}

impl OutreachAgent {
    pub fn new(api_key: String, llm: &LLMConfig, sender: SenderProfile) -> Self {
        Self {
            api_key,
            model: llm.model.clone(),
            endpoint: llm.endpoint.clone(),
            temperature: llm.temperature,
            max_retries: llm.max_retries,
            sender,
            client: reqwest::Client::new(),
        }
    }

    pub async fn extract_jobs(&self, cleaned_text: &str) -> Result<Vec<Job>> {
        info!("extracting job postings using LLM (model: {})", self.model);
        debug!("cleaned page length: {}", cleaned_text.len());

        let prompt = EXTRACT_PROMPT.replace("{page_data}", cleaned_text);
        let content = self.complete(&prompt).await?;

        let jobs = parse_jobs(&content)?;
        info!("extracted {} job postings", jobs.len());
        Ok(jobs)
    }

    pub async fn write_mail(
        &self,
        job: &Job,
        links: &[String],
        variation: usize,
        variations: usize,
    ) -> Result<String> {
        info!("writing email variation {}/{}", variation, variations);

        let prompt = self.build_email_prompt(job, links, variation, variations)?;
        self.complete(&prompt).await
    }

    fn build_email_prompt(
        &self,
        job: &Job,
        links: &[String],
        variation: usize,
        variations: usize,
    ) -> Result<String> {
        let job_description = serde_json::to_string_pretty(job)?;
        let link_list = if links.is_empty() {
            "(no matching portfolio samples)".to_string()
        } else {
            format!("[{}]", links.join(", "))
        };

        Ok(EMAIL_PROMPT
            .replace("{job_description}", &job_description)
            .replace("{sender_name}", &self.sender.name)
            .replace("{sender_profile}", self.sender.profile.as_deref().unwrap_or(""))
            .replace("{link_list}", &link_list)
            .replace("{signature}", &self.sender.signature())
            .replace("{variations}", &variations.to_string())
            .replace("{variation}", &variation.to_string()))
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!("prompt length: {} characters", prompt.len());

        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));

        let response = (|| async {
            let request_body = json!({
                "model": self.model,
                "temperature": self.temperature,
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    { "role": "user", "content": prompt }
                ]
            });

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let error_body = response.text().await?;
                return Err(eyre!("chat completion failed ({}): {}", status, error_body));
            }

            Ok(response)
        })
        .retry(ExponentialBuilder::default().with_max_times(self.max_retries as usize))
        .notify(|err: &eyre::Report, dur: Duration| {
            warn!("LLM call failed, retrying in {:?}: {}", dur, err);
        })
        .await?;

        let body: Value = response.json().await?;

        let content = body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|t| t.as_str())
            .ok_or_else(|| eyre!("invalid chat completion response structure"))?;

        Ok(content.to_string())
    }
}

/// Pulls the JSON array or object out of a reply that may carry code fences
/// or a preamble. Each `[` or `{` is tried in turn against the last matching
/// closer, and the first span that parses wins.
fn extract_json(content: &str) -> Option<Value> {
    let trimmed = content.trim();
    trimmed.match_indices(['[', '{']).find_map(|(start, open)| {
        let close = if open == "[" { ']' } else { '}' };
        let end = trimmed.rfind(close)?;
        if end <= start {
            return None;
        }
        serde_json::from_str::<Value>(&trimmed[start..=end])
            .map_err(|e| debug!("JSON parsing failed at offset {}: {}", start, e))
            .ok()
    })
}

fn parse_jobs(content: &str) -> Result<Vec<Job>> {
    let value = extract_json(content).ok_or_else(|| eyre!(UNPARSABLE_JOBS))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) if map.len() == 1 && map.values().all(is_list_of_objects) => {
            match map.into_iter().next() {
                Some((_, Value::Array(items))) => items,
                _ => Vec::new(),
            }
        }
        object @ Value::Object(_) => vec![object],
        _ => return Err(eyre!(UNPARSABLE_JOBS)),
    };

    items
        .into_iter()
        .filter(Value::is_object)
        .map(|item| serde_json::from_value(item).map_err(|e| eyre!("{}: {}", UNPARSABLE_JOBS, e)))
        .collect()
}

fn is_list_of_objects(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|items| !items.is_empty() && items.iter().all(Value::is_object))
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.into_iter().filter_map(value_to_text).collect();
            Some(parts.join(", "))
        }
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_text).unwrap_or_default())
}

fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let skills = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.into_iter().filter_map(value_to_text).collect(),
        Some(Value::String(s)) => s.split(',').map(|s| s.trim().to_string()).collect(),
        Some(other) => value_to_text(other).into_iter().collect(),
    };

    Ok(skills.into_iter().filter(|s| !s.is_empty()).collect())
}
