pub mod activity;
pub mod program;
pub mod program_entry;
pub mod user;
