use env_logger::{Builder, Env};
use log::LevelFilter;

pub struct Logger;

impl Logger {
    pub fn init(level: LevelFilter) {
        Self::builder(level).init();
    }

    fn builder(level: LevelFilter) -> Builder {
        let mut builder = colog::default_builder();
        builder
            .filter_level(level)
            .filter_module("reqwest", LevelFilter::Warn)
            .filter_module("hyper_util", LevelFilter::Warn)
            .parse_env(Env::default());
        builder
    }
}
