use once_cell::sync::Lazy;
use std::env;

pub static CONFIG: Lazy<Config> = Lazy::new(Config::new);

pub struct Config {
    pub slack_client_id: String,
    pub slack_client_secret: String,
}

impl Config {
    fn new() -> Self {
        Self {
            slack_client_id: env::var("SLACK_CLIENT_ID").expect("SLACK_CLIENT_ID must be set"),
            slack_client_secret: env::var("SLACK_CLIENT_SECRET")
                .expect("SLACK_CLIENT_SECRET must be set"),
        }
    }
}
