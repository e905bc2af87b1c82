//! CLI subcommand implementations for the `ulasan` binary.

pub mod doctor;
pub mod info_cmd;
pub mod output;
pub mod scrape_cmd;
