use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use colored::Colorize;
use eyre::Result;
use log::{error, info, warn};

use crate::chat::outreach::{DraftGenerator, EmailDraft};
use crate::portfolio::MatchResult;
use crate::scraper::job::JobSource;
use crate::session::{Session, SessionError, SessionEvent, SessionState};
use crate::utils::misc::{looks_like_url, strip_url};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Url(String),
    Generate(Option<String>),
    Show,
    Edit(usize),
    Save(PathBuf),
    Links,
    Reload,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        if looks_like_url(line) {
            return Command::Url(line.to_string());
        }

        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match (word.to_lowercase().as_str(), rest) {
            ("generate" | "go", "") => Command::Generate(None),
            ("generate" | "go", url) if looks_like_url(url) => Command::Generate(Some(url.to_string())),
            ("show", "") => Command::Show,
            ("edit", n) => n
                .parse()
                .map(Command::Edit)
                .unwrap_or_else(|_| Command::Unknown(line.to_string())),
            ("save", path) if !path.is_empty() => Command::Save(PathBuf::from(path)),
            ("links", "") => Command::Links,
            ("reload", "") => Command::Reload,
            ("help" | "?", "") => Command::Help,
            ("quit" | "exit" | "q", "") => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

pub fn render_drafts(drafts: &[EmailDraft]) -> String {
    drafts
        .iter()
        .enumerate()
        .map(|(i, draft)| format!("--- Variation {} ---\n{}\n", i + 1, draft.text()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn print_drafts(drafts: &[EmailDraft]) {
    println!("\n{}", "=== Generated Email Variations ===".cyan().bold());
    for (i, draft) in drafts.iter().enumerate() {
        println!("\n{}", format!("--- Variation {} ---", i + 1).bold());
        match draft {
            EmailDraft::Generated(text) => println!("{}", text),
            EmailDraft::Failed(text) => println!("{}", text.red()),
        }
    }
    println!();
}

fn print_help() {
    println!("{}", "Commands:".cyan().bold());
    println!("  <url>        generate email variations for a job posting");
    println!("  generate     generate again for the current URL (or 'generate <url>')");
    println!("  show         show the current drafts");
    println!("  edit <n>     rewrite variation n (finish with a line containing only '.')");
    println!("  save <file>  write the current drafts to a file");
    println!("  links        show the portfolio links used for the drafts");
    println!("  reload       reload the portfolio catalogue");
    println!("  quit         leave");
}

/// Feeds the optional new input and a submit of the current input to the
/// session, returning the URL that is now being generated.
fn begin_submit(session: &mut Session, url: Option<String>) -> Result<String, SessionError> {
    if let Some(url) = url {
        session.handle(SessionEvent::InputChanged(url))?;
    }
    let input = session.input().to_string();
    match session.handle(SessionEvent::Submit(input))? {
        SessionState::Generating { url } => Ok(url.clone()),
        _ => Err(SessionError::EmptyUrl),
    }
}

fn read_line(input: &mut impl BufRead) -> Option<String> {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line),
        Err(e) => {
            error!("error reading input: {}", e);
            None
        }
    }
}

fn read_block(input: &mut impl BufRead) -> Option<String> {
    let mut lines = Vec::new();
    loop {
        let line = read_line(input)?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line == "." {
            break;
        }
        lines.push(line.to_string());
    }
    Some(lines.join("\n"))
}

async fn submit(
    generator: &DraftGenerator,
    session: &mut Session,
    url: Option<String>,
    last_links: &mut Option<MatchResult>,
) -> Result<()> {
    let url = match begin_submit(session, url) {
        Ok(url) => url,
        Err(e) => {
            println!("{}", e.to_string().yellow());
            return Ok(());
        }
    };
    *last_links = None;

    println!("{}", "Analyzing job description and crafting email variations...".cyan());
    match generator.generate(&JobSource::Url(url)).await {
        Ok(generated) => {
            *last_links = Some(generated.links);
            session.handle(SessionEvent::GenerationComplete(generated.drafts))?;
            println!("{}", "Email variations generated. Use 'edit <n>' to revise them.".green());
            if let Some(drafts) = session.drafts() {
                print_drafts(drafts);
            }
        }
        Err(e) => {
            session.handle(SessionEvent::GenerationFailed(e.to_string()))?;
            let reason = session.last_error().unwrap_or("unknown error");
            println!("{}", format!("An error occurred during generation: {}", reason).red());
        }
    }

    Ok(())
}

pub async fn run_interactive(generator: &DraftGenerator) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut session = Session::new();
    let mut last_links: Option<MatchResult> = None;

    println!("\n{}", "=== Cold E-Mail Generator ===".cyan().bold());
    println!("{}\n", "Paste a job posting URL to draft outreach emails, or 'help'.".cyan());

    loop {
        print!("{} ", ">".cyan().bold());
        io::stdout().flush()?;

        let Some(line) = read_line(&mut input) else {
            break;
        };

        match Command::parse(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => print_help(),
            Command::Url(url) => submit(generator, &mut session, Some(url), &mut last_links).await?,
            Command::Generate(url) => submit(generator, &mut session, url, &mut last_links).await?,
            Command::Show => match session.drafts() {
                Some(drafts) => print_drafts(drafts),
                None if session.input().is_empty() => {
                    println!("{}", "Enter a URL to generate emails.".yellow())
                }
                None => println!(
                    "{}",
                    format!("No drafts for {}. Submit it again to generate.", session.input()).yellow()
                ),
            },
            Command::Edit(n) => {
                if session.drafts().is_none() {
                    println!("{}", "No drafts to edit yet.".yellow());
                    continue;
                }
                println!("{}", format!("Enter the new text for variation {}, then '.' on its own line:", n).cyan());
                let Some(text) = read_block(&mut input) else {
                    break;
                };
                match session.edit(n, text) {
                    Ok(()) => println!("{}", format!("✓ Variation {} updated", n).green()),
                    Err(e) => println!("{}", e.to_string().red()),
                }
            }
            Command::Save(path) => match session.drafts() {
                Some(drafts) => match tokio::fs::write(&path, render_drafts(drafts)).await {
                    Ok(()) => {
                        info!("saved drafts to {}", path.display());
                        println!("{}", format!("✓ Saved to {}", path.display()).green());
                    }
                    Err(e) => println!("{}", format!("✗ Could not save: {}", e).red()),
                },
                None => println!("{}", "No drafts to save.".yellow()),
            },
            Command::Links => match (&last_links, session.state()) {
                (Some(links), SessionState::Displaying { .. }) if !links.is_empty() => {
                    for link in &links.links {
                        println!("  {} {}", "•".cyan(), strip_url(link));
                    }
                }
                (Some(_), SessionState::Displaying { .. }) => {
                    println!("{}", "No portfolio entries matched this job.".yellow())
                }
                _ => println!("{}", "No drafts yet.".yellow()),
            },
            Command::Reload => match generator.portfolio().reload() {
                Ok(store) => println!("{}", format!("✓ Portfolio reloaded ({} entries)", store.len()).green()),
                Err(e) => {
                    warn!("keeping previous portfolio: {}", e);
                    println!("{}", format!("✗ Reload failed: {}", e).red());
                }
            },
            Command::Unknown(text) => {
                println!("{}", format!("Unknown command: '{}'. Type 'help' for commands.", text).red());
            }
        }
    }

    info!("session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(
            Command::parse("https://jobs.example.com/7\n"),
            Command::Url("https://jobs.example.com/7".to_string())
        );
        assert_eq!(Command::parse("  "), Command::Empty);
        assert_eq!(Command::parse("SHOW"), Command::Show);
        assert_eq!(Command::parse("edit 2"), Command::Edit(2));
        assert_eq!(Command::parse("save drafts.txt"), Command::Save(PathBuf::from("drafts.txt")));
        assert_eq!(Command::parse("q"), Command::Quit);
        assert_eq!(Command::parse("edit two"), Command::Unknown("edit two".to_string()));
        assert_eq!(Command::parse("save"), Command::Unknown("save".to_string()));
        assert_eq!(Command::parse("generate"), Command::Generate(None));
        assert_eq!(
            Command::parse("go https://jobs.example.com/7"),
            Command::Generate(Some("https://jobs.example.com/7".to_string()))
        );
        assert_eq!(Command::parse("generate later"), Command::Unknown("generate later".to_string()));
    }

    #[test]
    fn blank_submit_reports_missing_url() {
        let mut session = Session::new();

        assert_eq!(begin_submit(&mut session, None), Err(SessionError::EmptyUrl));
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(
            SessionError::EmptyUrl.to_string(),
            "please enter a job description URL"
        );
    }

    #[test]
    fn submit_starts_generating_for_the_url() {
        let mut session = Session::new();
        let url = "https://jobs.example.com/7".to_string();

        assert_eq!(begin_submit(&mut session, Some(url.clone())), Ok(url.clone()));
        assert_eq!(session.state(), &SessionState::Generating { url: url.clone() });
        assert_eq!(begin_submit(&mut session, None), Err(SessionError::Busy(url)));
    }

    #[test]
    fn generate_again_reuses_the_displayed_url() {
        let mut session = Session::new();
        let url = "https://jobs.example.com/7".to_string();
        begin_submit(&mut session, Some(url.clone())).unwrap();
        session
            .handle(SessionEvent::GenerationComplete(vec![EmailDraft::Generated("Hi".to_string())]))
            .unwrap();

        assert_eq!(begin_submit(&mut session, None), Ok(url.clone()));
        assert_eq!(session.state(), &SessionState::Generating { url });
        assert!(session.drafts().is_none());
    }

    #[test]
    fn renders_numbered_drafts() {
        let drafts = vec![
            EmailDraft::Generated("Hello".to_string()),
            EmailDraft::Failed("Failed to generate Variation 2.".to_string()),
        ];

        assert_eq!(
            render_drafts(&drafts),
            "--- Variation 1 ---\nHello\n\n--- Variation 2 ---\nFailed to generate Variation 2.\n"
        );
    }

    #[test]
    fn reads_block_until_dot() {
        let mut input = Cursor::new("Dear team,\r\n\nThanks.\n.\nleftover\n");
        assert_eq!(read_block(&mut input).as_deref(), Some("Dear team,\n\nThanks."));
        assert_eq!(read_line(&mut input).as_deref(), Some("leftover\n"));
    }

    #[test]
    fn unterminated_block_is_none() {
        let mut input = Cursor::new("no terminator\n");
        assert_eq!(read_block(&mut input), None);
    }
}
