use colored::Colorize;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    generate_crawl_report, load_seeds_from_file, load_seeds_from_source, parse_seed_line,
};

pub fn print_banner() {
    let banner = r#"
   __ _ _  _ ___  _ _ _ _ __ _
  / _` | || / _ \| '_| '_/ _` |
  \__, |\_,_\___/|_| |_| \__,_|
     |_|
"#;
    println!("{}", banner.bright_cyan());
    println!(
        "{}",
        format!(
            "  v{} - depth-bounded concurrent graph crawler",
            env!("CARGO_PKG_VERSION")
        )
        .bright_blue()
    );
    println!();
}
