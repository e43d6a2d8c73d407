pub mod matcher;
pub mod shared;
pub mod store;

pub use matcher::{DEFAULT_MAX_RESULTS, JobSkillQuery, MatchResult, match_links};
pub use shared::SharedPortfolio;
