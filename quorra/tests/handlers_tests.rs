use quorra::handlers::*;
use quorra_crawler::{CrawlFailure, CrawlOutcome, CrawlRecord};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use url::Url;

#[test]
fn test_parse_seed_line_with_scheme() {
    let result = parse_seed_line("https://example.com");
    assert_eq!(result, Some("https://example.com".to_string()));
}

#[test]
fn test_parse_seed_line_without_scheme() {
    let result = parse_seed_line("example.com");
    assert_eq!(result, Some("http://example.com".to_string()));
}

#[test]
fn test_parse_seed_line_invalid() {
    let result = parse_seed_line("not a valid url!!!");
    assert_eq!(result, None);
}

#[test]
fn test_load_seeds_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "https://example.com")?;
    writeln!(temp_file, "httpbin.org")?;
    writeln!(temp_file)?; // Empty line
    writeln!(temp_file, "https://api.example.com")?;

    let path = PathBuf::from(temp_file.path());
    let seeds = load_seeds_from_file(&path)?;

    assert_eq!(seeds.len(), 3);
    assert_eq!(seeds[0], "https://example.com");
    assert_eq!(seeds[1], "http://httpbin.org");
    assert_eq!(seeds[2], "https://api.example.com");

    Ok(())
}

#[test]
fn test_load_seeds_from_file_empty() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file).unwrap();
    writeln!(temp_file, "   ").unwrap();

    let path = PathBuf::from(temp_file.path());
    let result = load_seeds_from_file(&path);

    assert!(result.is_err());
    assert!(result.unwrap_err().contains("No valid URLs"));
}

#[test]
fn test_load_seeds_from_source_single_url() {
    let url = Url::parse("https://example.com").unwrap();
    let result = load_seeds_from_source(Some(&url), None).unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0], "https://example.com/");
}

#[test]
fn test_load_seeds_from_source_no_input() {
    let result = load_seeds_from_source(None, None);
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .contains("Either --url or --seeds-file must be provided")
    );
}

#[test]
fn test_generate_crawl_report() {
    let outcome = CrawlOutcome {
        pages: vec![
            CrawlRecord {
                id: "https://example.com/".to_string(),
                content: "front page".to_string(),
            },
            CrawlRecord {
                id: "https://example.com/about".to_string(),
                content: "about us".to_string(),
            },
        ],
        failures: vec![CrawlFailure::new(
            "https://example.com/gone".to_string(),
            "HTTP status 404 for https://example.com/gone".to_string(),
        )],
    };

    let report = generate_crawl_report(&outcome);

    assert!(report.contains("Nodes visited: 2"));
    assert!(report.contains("Content fetched: 18 bytes"));
    assert!(report.contains("Failures: 1"));
    assert!(report.contains("https://example.com/about"));
    assert!(report.contains("https://example.com/gone"));
    assert!(report.contains("404"));
}

#[test]
fn test_generate_crawl_report_empty() {
    let report = generate_crawl_report(&CrawlOutcome::default());

    assert!(report.contains("Nodes visited: 0"));
    assert!(report.contains("Failures: 0"));
    assert!(!report.contains("Visited:"));
    assert!(!report.contains("Failed:"));
}
