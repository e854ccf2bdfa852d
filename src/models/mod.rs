pub mod account;
pub mod mailbox;
pub mod oauth2;
pub mod token;
