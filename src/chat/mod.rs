pub mod agent;
pub mod outreach;
