//! Extracting structured fields from advisory markdown
//!
//! An advisory file carries three named sections (Description, Reference,
//! Github) delimited by markdown headings, plus shield badges whose image
//! URLs encode Product/Version/Vulnerability metadata as query parameters.
//! The extractor pulls these out of the raw text; the normalization step
//! then rewrites the freeform sections into HTML-ready strings.

use std::collections::HashMap;

use regex::Regex;

/// The heading that opens the description section.
const DESCRIPTION_MARKER: &str = "### Description";
/// The heading that opens the references section.
const REFERENCE_MARKER: &str = "### Reference";
/// The heading that opens the GitHub links section.
const GITHUB_MARKER: &str = "### Github";

/// The three named sections of an advisory, still unnormalized.
#[derive(Debug, PartialEq)]
pub struct AdvisorySections {
    /// The text between `### Description` and the next heading.
    pub description: String,
    /// The text between `### Reference` and the next heading.
    pub references: String,
    /// The text between `### Github` and the next heading.
    pub github: String,
}

/// The extractor
pub struct AdvisoryExtractor<'a> {
    /// The regexes used to find badges and bare URLs
    regexes: HashMap<&'a str, Regex>,
}

impl<'a> AdvisoryExtractor<'a> {
    /// Creates the extractor.
    /// By doing so, the regexes are compiled once and the extractor can
    /// be reused for every file.
    pub fn new() -> Self {
        let mut regexes = HashMap::new();
        // Example: ![](https://img.shields.io/static/v1?label=Product&message=Acme%20Tool&color=blue)
        let shield_regex = Regex::new(r"!\[[^\]]*\]\((?P<url>[^)]*)\)").unwrap();
        // A bare URL runs to the next whitespace
        let url_regex = Regex::new(r"(https?://[^\s]+)").unwrap();
        regexes.insert("shield-image", shield_regex);
        regexes.insert("bare-url", url_regex);
        Self { regexes }
    }

    /// Splits the advisory into its three named sections.
    /// Each section runs from its marker to the next `###` heading, or to
    /// the end of the text, and is trimmed of surrounding whitespace.
    /// A missing marker is reported as an error naming it; the caller
    /// decides whether to skip the file.
    pub fn sections(&self, content: &str) -> Result<AdvisorySections, String> {
        Ok(AdvisorySections {
            description: section_body(content, DESCRIPTION_MARKER)?,
            references: section_body(content, REFERENCE_MARKER)?,
            github: section_body(content, GITHUB_MARKER)?,
        })
    }

    /// Collects the label/message metadata of all shield badges in the
    /// advisory. A badge contributes an entry only when its URL carries
    /// both a `label=` and a `message=` parameter; `%20` in the message
    /// is decoded to a space. A label repeated by a later badge
    /// overwrites the earlier value.
    pub fn shield_data(&self, content: &str) -> HashMap<String, String> {
        let mut data = HashMap::new();
        let caps = self
            .regexes
            .get("shield-image")
            .expect("Regex \"shield-image\" not found.")
            .captures_iter(content);
        for rmatch in caps {
            let url = rmatch.name("url").unwrap().as_str();
            let label = query_value(url, "label=");
            let message = query_value(url, "message=");
            if let (Some(label), Some(message)) = (label, message) {
                data.insert(label.to_string(), message.replace("%20", " "));
            }
        }
        data
    }

    /// Normalizes a section body for HTML embedding.
    /// Each line loses its leading list markers ('-' and spaces), bare
    /// URLs are wrapped in anchor tags opening in a new tab, and the
    /// lines are rejoined with a literal `<br/>`.
    pub fn clean_text(&self, text: &str) -> String {
        let url_regex = self
            .regexes
            .get("bare-url")
            .expect("Regex \"bare-url\" not found.");
        let lines: Vec<String> = text
            .split('\n')
            .map(|line| {
                let stripped = line.trim_start_matches(['-', ' ']);
                url_regex
                    .replace_all(stripped, r#"<a target="_blank" href="$1">$1</a>"#)
                    .into_owned()
            })
            .collect();
        lines.join("<br/>")
    }
}

/// Returns the trimmed text between a heading marker and the next `###`
/// heading (or the end of the text).
fn section_body(content: &str, marker: &str) -> Result<String, String> {
    let (_, after) = content
        .split_once(marker)
        .ok_or_else(|| format!("Section marker {:?} not found", marker))?;
    let body = after.split("###").next().unwrap_or(after);
    Ok(body.trim().to_string())
}

/// Returns the value of a query parameter in a badge URL, cut at the
/// next '&' separator.
fn query_value<'u>(url: &'u str, key: &str) -> Option<&'u str> {
    let (_, after) = url.split_once(key)?;
    after.split('&').next()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "## CVE-2024-0001\n\
        ![](https://img.shields.io/static/v1?label=Product&message=Acme%20Tool&color=blue)\n\
        ![](https://img.shields.io/static/v1?label=Version&message=1.2.3&color=blue)\n\
        ### Description\n\nSample bug\n\n\
        ### POC\n\npoc steps\n\n\
        ### Reference\nhttp://example.com\n\
        ### Github\n- repo1\n";

    #[test]
    fn sections_are_cut_between_markers() {
        let extractor = AdvisoryExtractor::new();
        let sections = extractor.sections(SAMPLE).unwrap();
        assert_eq!(sections.description, "Sample bug");
        assert_eq!(sections.references, "http://example.com");
        assert_eq!(sections.github, "- repo1");
    }

    #[test]
    fn last_section_runs_to_end_of_text() {
        let extractor = AdvisoryExtractor::new();
        let content = "### Description\nd\n### Reference\nr\n### Github\n- a\n- b\n";
        let sections = extractor.sections(content).unwrap();
        assert_eq!(sections.github, "- a\n- b");
    }

    #[test]
    fn missing_marker_names_the_section() {
        let extractor = AdvisoryExtractor::new();
        let content = "### Description\nd\n### Github\ng\n";
        let err = extractor.sections(content).unwrap_err();
        assert!(err.contains("### Reference"), "got: {}", err);
    }

    #[test]
    fn shield_data_pairs_label_and_message() {
        let extractor = AdvisoryExtractor::new();
        let data = extractor.shield_data(SAMPLE);
        assert_eq!(data.get("Product").map(String::as_str), Some("Acme Tool"));
        assert_eq!(data.get("Version").map(String::as_str), Some("1.2.3"));
        assert_eq!(data.get("Vulnerability"), None);
    }

    #[test]
    fn shield_without_both_keys_is_ignored() {
        let extractor = AdvisoryExtractor::new();
        let content = "![](https://img.shields.io/static/v1?label=Product&color=blue)";
        assert!(extractor.shield_data(content).is_empty());
    }

    #[test]
    fn duplicate_labels_are_last_write_wins() {
        let extractor = AdvisoryExtractor::new();
        let content = "\
            ![](https://x.test/v1?label=Product&message=First)\n\
            ![](https://x.test/v1?label=Product&message=Second)\n";
        let data = extractor.shield_data(content);
        assert_eq!(data.get("Product").map(String::as_str), Some("Second"));
    }

    #[test]
    fn distinct_labels_are_order_independent() {
        let extractor = AdvisoryExtractor::new();
        let forward = "\
            ![](https://x.test/v1?label=Product&message=Acme)\n\
            ![](https://x.test/v1?label=Version&message=2.0)\n";
        let backward = "\
            ![](https://x.test/v1?label=Version&message=2.0)\n\
            ![](https://x.test/v1?label=Product&message=Acme)\n";
        assert_eq!(
            extractor.shield_data(forward),
            extractor.shield_data(backward)
        );
    }

    #[test]
    fn clean_text_strips_leading_list_markers() {
        let extractor = AdvisoryExtractor::new();
        assert_eq!(extractor.clean_text("- item"), "item");
        assert_eq!(extractor.clean_text("-- - item"), "item");
        assert_eq!(extractor.clean_text("  - a\n- b"), "a<br/>b");
        // Interior dashes stay
        assert_eq!(extractor.clean_text("- a - b"), "a - b");
    }

    #[test]
    fn clean_text_wraps_bare_urls_in_anchors() {
        let extractor = AdvisoryExtractor::new();
        assert_eq!(
            extractor.clean_text("see http://example.com/page here"),
            r#"see <a target="_blank" href="http://example.com/page">http://example.com/page</a> here"#
        );
        assert_eq!(
            extractor.clean_text("https://a.test\nhttps://b.test"),
            r#"<a target="_blank" href="https://a.test">https://a.test</a><br/><a target="_blank" href="https://b.test">https://b.test</a>"#
        );
    }

    #[test]
    fn clean_text_joins_lines_with_break_tags() {
        let extractor = AdvisoryExtractor::new();
        assert_eq!(extractor.clean_text("a\nb\nc"), "a<br/>b<br/>c");
    }
}
