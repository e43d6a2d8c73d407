use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use eyre::{Result, eyre};
use log::{debug, info};
use regex::Regex;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

static SCRIPT_OR_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(script|style|noscript)\b[^>]*>.*?</(script|style|noscript)\s*>").unwrap());
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());
static NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9 ]").unwrap());
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Where a job posting comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSource {
    Url(String),
    File(PathBuf),
}

impl JobSource {
    pub async fn fetch(&self) -> Result<String> {
        match self {
            JobSource::Url(url) => JobScraper::from_url(url).await,
            JobSource::File(path) => JobScraper::from_file(path).await,
        }
    }
}

impl fmt::Display for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobSource::Url(url) => write!(f, "{}", url),
            JobSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

pub struct JobScraper;

impl JobScraper {
    pub async fn from_url(url: &str) -> Result<String> {
        info!("fetching job description from: {}", url);

        let client = reqwest::Client::new();
        let response = client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(eyre!("failed to load job page ({}): {}", status, url));
        }

        let html = response.text().await?;
        if html.trim().is_empty() {
            return Err(eyre!("could not load content from the URL: {}", url));
        }

        info!("successfully extracted job description html");
        debug!("job page length: {}", html.len());

        Ok(html)
    }

    pub async fn from_file(path: &Path) -> Result<String> {
        info!("reading job description from file: {}", path.display());

        tokio::fs::read_to_string(path).await.map_err(Into::into)
    }
}

/// Reduces a scraped page to a single line of plain words.
pub fn clean_text(raw: &str) -> String {
    let text = SCRIPT_OR_STYLE.replace_all(raw, " ");
    let text = TAG.replace_all(&text, " ");
    let text = decode_entities(&text);
    let text = URL.replace_all(&text, " ");
    let text = NON_ALNUM.replace_all(&text, " ");
    SPACES.replace_all(&text, " ").trim().to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    #[test]
    fn strips_markup_scripts_and_urls() {
        let html = r#"
            <html><head><style>body { color: red; }</style>
            <script type="text/javascript">var x = "<b>hidden</b>";</script></head>
            <body><h1>Senior   Rust Engineer</h1>
            <p>Apply at https://jobs.example.com/apply?id=7 today&nbsp;&amp; join us!</p>
            </body></html>
        "#;

        assert_eq!(clean_text(html), "Senior Rust Engineer Apply at today join us");
    }

    #[test]
    fn empty_page_cleans_to_empty() {
        assert_eq!(clean_text("<div>\n\t</div>"), "");
    }

    #[tokio::test]
    async fn fetches_page_body() {
        let server = MockServer::start_async().await;
        let page = server
            .mock_async(|when, then| {
                when.method(GET).path("/jobs/42");
                then.status(200).body("<h1>Backend Developer</h1>");
            })
            .await;

        let source = JobSource::Url(server.url("/jobs/42"));
        let html = source.fetch().await.unwrap();

        page.assert_async().await;
        assert_eq!(html, "<h1>Backend Developer</h1>");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/gone");
                then.status(404);
            })
            .await;

        let err = JobScraper::from_url(&server.url("/gone")).await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn reads_saved_posting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.html");
        std::fs::write(&path, "<p>Data Engineer</p>").unwrap();

        let text = JobSource::File(path).fetch().await.unwrap();
        assert_eq!(clean_text(&text), "Data Engineer");
    }
}
