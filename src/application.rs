//! This module contains the main structure and logic for the whole
//! application.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use log::{debug, error, info, trace, warn};

use crate::extractors::AdvisoryExtractor;
use crate::models::CveRecord;
use crate::progress::year_bar;
use crate::readers::github::GithubReader;
use crate::readers::ContentsSource;
use crate::writers::json::JsonFileWriter;
use crate::writers::Writer;

/// Represents the application
pub struct Application {
    /// The arguments given on the command line.
    argv: Option<Args>,
}

impl Application {
    /// Creates a new application
    pub fn new() -> Self {
        trace!("In Application::new()");
        Application { argv: None }
    }

    /// Read argv to get the arguments before running the application
    pub fn read_argv(&mut self) {
        trace!("In Application::read_argv()");
        let args = Args::parse();
        debug!(
            "Repository = {}/{}, years = {:?}, output = {}",
            args.owner,
            args.repo,
            args.years,
            args.output.to_string_lossy()
        );
        self.argv = Some(args);
    }

    /// Runs the global application
    /// read_argv() MUST have been called before
    pub fn run(&self) {
        trace!("Running Application::run()");
        let args = self
            .argv
            .as_ref()
            .expect("CLI arguments haven't been read.");

        println!("Starting CVE processing...");
        let start = Instant::now();

        let reader = GithubReader::new(&args.owner, &args.repo, args.max_retries);
        let records = collect_records(&reader, &args.years);

        info!("Collection finished, writing output");
        println!("\nSaving CVE list to JSON file...");
        let writer = JsonFileWriter::new(args.output.clone());
        if let Err(e) = writer.write(&records) {
            error!("{}", e);
            println!("Failed to save the CVE list: {}", e);
            return;
        }

        println!("\nProcessing complete!");
        println!(
            "Processed {} CVEs from years {}.",
            records.len(),
            args.years.join(", ")
        );
        println!(
            "Total processing time: {:.2} seconds",
            start.elapsed().as_secs_f64()
        );
    }
}

/// Collects one record per advisory file, year by year, in listing order.
///
/// A year whose listing comes back empty is skipped. A file that fails to
/// fetch, or whose markdown is missing one of the expected sections, is
/// logged and skipped; it never aborts the run. The returned vector is the
/// only accumulator, owned here and handed to the writer.
pub fn collect_records(source: &dyn ContentsSource, years: &[String]) -> Vec<CveRecord> {
    trace!("Running collect_records()");
    let extractor = AdvisoryExtractor::new();
    let mut records: Vec<CveRecord> = Vec::new();

    for year in years {
        let filenames = source.list_markdown_files(year);
        if filenames.is_empty() {
            println!("No CVE files found for year {}. Skipping.", year);
            continue;
        }
        println!("Found {} CVE files for {}", filenames.len(), year);

        let bar = year_bar(filenames.len() as u64, year);
        for filename in &filenames {
            let path = format!("{}/{}", year, filename);
            let content = match source.file_content(&path) {
                Some(c) => c,
                None => {
                    // Already logged by the source
                    bar.inc(1);
                    continue;
                }
            };

            let sections = match extractor.sections(&content) {
                Ok(s) => s,
                Err(reason) => {
                    warn!("Skipping malformed advisory {}: {}", path, reason);
                    bar.inc(1);
                    continue;
                }
            };

            let shields = extractor.shield_data(&content);
            let name = filename.split('.').next().unwrap_or(filename);
            records.push(CveRecord {
                year: year.clone(),
                name: name.to_string(),
                description: extractor.clean_text(&sections.description),
                github: extractor.clean_text(&sections.github),
                references: extractor.clean_text(&sections.references),
                product: shields.get("Product").cloned().unwrap_or_default(),
                version: shields.get("Version").cloned().unwrap_or_default(),
                vulnerability: shields.get("Vulnerability").cloned().unwrap_or_default(),
            });
            bar.inc(1);
        }
        bar.finish();
    }

    records
}

/// Represents the CLI arguments accepted by cvecollect
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The owner of the GitHub repository holding the advisories
    #[arg(long, value_name = "OWNER", default_value = "trickest")]
    pub owner: String,
    /// The name of the GitHub repository holding the advisories
    #[arg(long, value_name = "REPO", default_value = "cve")]
    pub repo: String,
    /// The year directories to process, in order
    #[arg(short, long, value_name = "YEAR", num_args = 1.., default_values = ["2024", "2023"])]
    pub years: Vec<String>,
    /// The file the JSON list is written to
    #[arg(short, long, value_name = "FILE", default_value = "CVE_list.json")]
    pub output: PathBuf,
    /// How many times a rate-limited fetch is retried before the file
    /// is skipped
    #[arg(long, value_name = "COUNT", default_value_t = 5)]
    pub max_retries: u32,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// An in-memory source standing in for the GitHub API.
    struct StubSource {
        listings: HashMap<String, Vec<String>>,
        files: HashMap<String, String>,
    }

    impl StubSource {
        fn new() -> Self {
            Self {
                listings: HashMap::new(),
                files: HashMap::new(),
            }
        }

        fn with_file(mut self, year: &str, filename: &str, content: &str) -> Self {
            self.listings
                .entry(year.to_string())
                .or_default()
                .push(filename.to_string());
            self.files
                .insert(format!("{}/{}", year, filename), content.to_string());
            self
        }

        /// Lists a file without providing its content, so the fetch fails.
        fn with_unfetchable(mut self, year: &str, filename: &str) -> Self {
            self.listings
                .entry(year.to_string())
                .or_default()
                .push(filename.to_string());
            self
        }
    }

    impl ContentsSource for StubSource {
        fn list_markdown_files(&self, path: &str) -> Vec<String> {
            self.listings.get(path).cloned().unwrap_or_default()
        }

        fn file_content(&self, path: &str) -> Option<String> {
            self.files.get(path).cloned()
        }
    }

    const ADVISORY: &str = "## CVE-2024-0001\n\
        ![](https://img.shields.io/static/v1?label=Product&message=Acme%20Tool&color=blue)\n\
        ### Description\nSample bug\n\
        ### Reference\nhttp://example.com\n\
        ### Github\n- repo1\n";

    fn years(list: &[&str]) -> Vec<String> {
        list.iter().map(|y| y.to_string()).collect()
    }

    #[test]
    fn builds_one_record_per_advisory() {
        let source = StubSource::new().with_file("2024", "CVE-2024-0001.md", ADVISORY);
        let records = collect_records(&source, &years(&["2024"]));

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.year, "2024");
        assert_eq!(record.name, "CVE-2024-0001");
        assert_eq!(record.description, "Sample bug");
        assert_eq!(record.github, "repo1");
        assert_eq!(
            record.references,
            r#"<a target="_blank" href="http://example.com">http://example.com</a>"#
        );
        assert_eq!(record.product, "Acme Tool");
        assert_eq!(record.version, "");
        assert_eq!(record.vulnerability, "");
    }

    #[test]
    fn empty_year_is_skipped_without_aborting() {
        let source = StubSource::new().with_file("2023", "CVE-2023-9999.md", ADVISORY);
        let records = collect_records(&source, &years(&["2024", "2023"]));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year, "2023");
        assert_eq!(records[0].name, "CVE-2023-9999");
    }

    #[test]
    fn unfetchable_file_is_skipped() {
        let source = StubSource::new()
            .with_unfetchable("2024", "CVE-2024-0001.md")
            .with_file("2024", "CVE-2024-0002.md", ADVISORY);
        let records = collect_records(&source, &years(&["2024"]));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "CVE-2024-0002");
    }

    #[test]
    fn malformed_advisory_is_skipped() {
        let source = StubSource::new()
            .with_file("2024", "CVE-2024-0001.md", "### Description\nonly\n")
            .with_file("2024", "CVE-2024-0002.md", ADVISORY);
        let records = collect_records(&source, &years(&["2024"]));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "CVE-2024-0002");
    }

    #[test]
    fn records_keep_listing_and_year_order() {
        let source = StubSource::new()
            .with_file("2024", "CVE-2024-0002.md", ADVISORY)
            .with_file("2024", "CVE-2024-0001.md", ADVISORY)
            .with_file("2023", "CVE-2023-0001.md", ADVISORY);
        let records = collect_records(&source, &years(&["2024", "2023"]));

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["CVE-2024-0002", "CVE-2024-0001", "CVE-2023-0001"]);
    }
}
