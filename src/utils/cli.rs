use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "cold-mailer")]
#[command(about = "Draft cold outreach emails for job postings, backed by your portfolio", long_about = None)]
pub struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// URL to the job posting; starts an interactive session when omitted
    #[arg(short, long, value_name = "URL", conflicts_with = "job_file")]
    pub job_url: Option<String>,

    /// Path to file containing a saved job posting
    #[arg(long, value_name = "FILE")]
    pub job_file: Option<PathBuf>,

    /// Portfolio CSV, overriding the one in the configuration file
    #[arg(short, long, value_name = "FILE")]
    pub portfolio: Option<PathBuf>,

    /// Number of email variations to draft
    #[arg(short = 'n', long, value_name = "COUNT", value_parser = clap::value_parser!(u16).range(1..))]
    pub variations: Option<u16>,

    /// Write the drafts to this file in one-shot mode
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Sets the logger's verbosity level
    #[arg(short, long, value_name = "VERBOSITY", default_value_t = LevelFilter::Info)]
    pub verbosity: LevelFilter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_interactive_mode() {
        let args = Args::try_parse_from(["cold-mailer"]).unwrap();
        assert!(args.job_url.is_none());
        assert!(args.job_file.is_none());
        assert_eq!(args.config, PathBuf::from("config.toml"));
        assert_eq!(args.verbosity, LevelFilter::Info);
    }

    #[test]
    fn rejects_url_and_file_together() {
        let result = Args::try_parse_from(["cold-mailer", "-j", "https://x", "--job-file", "job.html"]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_zero_variations() {
        assert!(Args::try_parse_from(["cold-mailer", "-n", "0"]).is_err());
        let args = Args::try_parse_from(["cold-mailer", "-n", "5"]).unwrap();
        assert_eq!(args.variations, Some(5));
    }
}
