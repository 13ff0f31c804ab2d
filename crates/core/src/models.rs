pub mod activity;
pub mod entry;
pub mod program;
pub mod user;
