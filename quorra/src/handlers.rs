use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use quorra_crawler::{CrawlOutcome, Crawler, HttpExpander, NodeId};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

// Helper functions for the crawl handler

/// Load seed URLs from either a file or a single URL argument
pub fn load_seeds_from_source(
    url: Option<&Url>,
    seeds_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    if let Some(seeds_path) = seeds_file {
        load_seeds_from_file(seeds_path)
    } else if let Some(url) = url {
        Ok(vec![url.as_str().to_string()])
    } else {
        Err("Either --url or --seeds-file must be provided".to_string())
    }
}

/// Load and parse seed URLs from a file
pub fn load_seeds_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read seeds file {}: {}", path.display(), e))?;

    let seeds: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_seed_line(line.trim()))
        .collect();

    if seeds.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(seeds)
}

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_seed_line(line: &str) -> Option<String> {
    // Try to parse as-is
    if Url::parse(line).is_ok() {
        return Some(line.to_string());
    }

    // Try adding http://
    let with_scheme = format!("http://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    eprintln!("Skipping invalid URL '{}'", line);
    None
}

/// Render a finished crawl as a human-readable report
pub fn generate_crawl_report(outcome: &CrawlOutcome) -> String {
    let mut report = String::new();

    report.push_str(&format!("{}\n", "═".repeat(60)));
    report.push_str("Summary:\n");
    report.push_str(&format!("  Nodes visited: {}\n", outcome.pages.len()));

    let total_bytes: usize = outcome.pages.iter().map(|page| page.content.len()).sum();
    report.push_str(&format!("  Content fetched: {} bytes\n", total_bytes));
    report.push_str(&format!("  Failures: {}\n", outcome.failures.len()));

    if !outcome.pages.is_empty() {
        report.push_str("\nVisited:\n");
        for page in &outcome.pages {
            report.push_str(&format!(
                "  {} {} ({} bytes)\n",
                "✓".green(),
                page.id,
                page.content.len()
            ));
        }
    }

    if !outcome.failures.is_empty() {
        report.push_str("\nFailed:\n");
        for failure in &outcome.failures {
            report.push_str(&format!(
                "  {} {}: {}\n",
                "✗".red(),
                failure.id,
                failure.reason
            ));
        }
    }

    report
}

pub async fn handle_crawl(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let url = sub_matches.get_one::<Url>("url");
    let seeds_file = sub_matches.get_one::<PathBuf>("seeds-file");
    let depth = *sub_matches.get_one::<usize>("depth").unwrap_or(&3);
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap_or(&10);
    let follow_external = sub_matches.get_flag("follow-external");
    let output = sub_matches.get_one::<PathBuf>("output");
    let format = sub_matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");

    // Load seeds from source
    let seeds = match load_seeds_from_source(url, seeds_file) {
        Ok(seeds) => seeds,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    // Print crawl configuration
    println!("\nCrawling {} seed(s)", seeds.len());
    println!("Max depth: {}", depth);
    let scope = if follow_external {
        "follow external links"
    } else {
        "same domain only"
    };
    println!("Scope: {}\n", scope);

    let expander =
        Arc::new(HttpExpander::with_timeout(timeout).with_follow_external(follow_external));

    // Spinner fed by the crawler's per-node progress callback
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Starting crawl...");

    let visited_count = Arc::new(AtomicUsize::new(0));
    let progress_callback = {
        let spinner = spinner.clone();
        let visited_count = visited_count.clone();
        Arc::new(move |id: NodeId| {
            let count = visited_count.fetch_add(1, Ordering::Relaxed) + 1;
            spinner.set_message(format!("Crawling... {} nodes visited (last: {})", count, id));
        })
    };

    let crawler = Crawler::new(expander)
        .with_max_depth(depth)
        .with_progress_callback(progress_callback);

    // Each seed gets its own crawl; pages reached from more than one seed
    // are reported once.
    let mut combined = CrawlOutcome::default();
    let mut reported: HashSet<NodeId> = HashSet::new();
    for seed in seeds {
        let outcome = crawler.crawl(seed).await;
        for page in outcome.pages {
            if reported.insert(page.id.clone()) {
                combined.pages.push(page);
            }
        }
        combined.failures.extend(outcome.failures);
    }

    spinner.finish_and_clear();
    println!("\n✓ Crawl complete!\n");

    let report = match format {
        "json" => match serde_json::to_string_pretty(&combined) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("✗ Failed to serialize report: {}", e);
                std::process::exit(1);
            }
        },
        _ => generate_crawl_report(&combined),
    };

    match output {
        Some(path) => {
            if let Err(e) = fs::write(path, &report) {
                eprintln!("✗ Failed to write report to {}: {}", path.display(), e);
                std::process::exit(1);
            }
            println!("Report saved to {}", path.display());
        }
        None => print!("{}", report),
    }
}
