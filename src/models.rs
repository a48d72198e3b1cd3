pub mod credential;
pub mod interaction;
pub mod participant;
pub mod role;
pub mod session;
