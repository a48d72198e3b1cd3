pub mod config;
pub mod gate;
pub mod rtm;
pub mod test_setup;
