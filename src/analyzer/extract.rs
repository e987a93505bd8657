//! HTML feature extraction
//!
//! This module turns a fetched page into an [`AnalysisReport`]:
//! - Doctype / HTML version marker
//! - Page title
//! - Heading counts per level
//! - Accessible and inaccessible link counts
//! - Login form detection
//!
//! All rules are evaluated during one walk over the parsed document tree.

use crate::analyzer::fetcher::{FetchResult, PageFetcher};
use crate::{AnalysisResult, ClassifiedError};
use scraper::node::{Doctype, Node};
use scraper::{ElementRef, Html};
use serde::Serialize;
use std::collections::BTreeMap;

/// Heading tags counted by the extractor, in report order
pub const HEADING_LEVELS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Substrings of a form's action/id/class that mark it as a login form
pub const LOGIN_KEYWORDS: &[&str] = &["login", "signin", "auth", "authenticate"];

/// href prefixes that do not navigate to a page
pub const NON_NAVIGABLE_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:"];

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Structural facts extracted from one page
///
/// Serialized field names are part of the HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// The normalized URL that was analyzed
    pub url: String,

    /// Doctype marker as declared, or empty
    pub html_version: String,

    /// Text of the first `<title>`, or empty
    pub title: String,

    /// Count per heading level; all six levels are always present
    pub heading_counts: BTreeMap<String, usize>,

    /// Anchors whose href navigates somewhere
    pub accessible_link_count: usize,

    /// Anchors whose href is a script, mail or telephone trigger
    pub inaccessible_link_count: usize,

    /// True if any form looks like a login form
    pub has_login_form: bool,
}

impl AnalysisReport {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            html_version: String::new(),
            title: String::new(),
            heading_counts: HEADING_LEVELS
                .iter()
                .map(|level| (level.to_string(), 0))
                .collect(),
            accessible_link_count: 0,
            inaccessible_link_count: 0,
            has_login_form: false,
        }
    }

    /// Occurrences of `level` ("h1".."h6"); 0 for anything else
    pub fn heading_count(&self, level: &str) -> usize {
        self.heading_counts.get(level).copied().unwrap_or(0)
    }
}

/// How an anchor's href is counted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkClass {
    /// Navigates to a page
    Accessible,
    /// Triggers a script, mail client or dialer
    Inaccessible,
    /// Empty or the bare `#` placeholder; counted nowhere
    Ignored,
}

/// Classifies an anchor href
pub fn classify_href(href: &str) -> LinkClass {
    let href = href.trim();

    if href.is_empty() || href == "#" {
        return LinkClass::Ignored;
    }

    let non_navigable = NON_NAVIGABLE_SCHEMES.iter().any(|scheme| {
        href.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    });

    if non_navigable {
        LinkClass::Inaccessible
    } else {
        LinkClass::Accessible
    }
}

/// Returns true if `text` contains a login keyword, ignoring case
pub fn contains_login_indicator(text: &str) -> bool {
    let text = text.to_lowercase();
    LOGIN_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

/// Parses HTML content and extracts the report fields
///
/// # Arguments
///
/// * `url` - The URL recorded in the report
/// * `html` - The HTML content to parse
///
/// # Example
///
/// ```
/// use page_analyzer::analyzer::parse_html;
///
/// let html = r#"<html><head><title>Test</title></head><body><h1>A</h1></body></html>"#;
/// let report = parse_html("https://example.com/", html);
/// assert_eq!(report.title, "Test");
/// assert_eq!(report.heading_count("h1"), 1);
/// ```
pub fn parse_html(url: &str, html: &str) -> AnalysisReport {
    let document = Html::parse_document(html);
    let mut report = AnalysisReport::new(url);
    let mut title_seen = false;
    let mut version_attr: Option<String> = None;

    for node in document.tree.root().descendants() {
        match node.value() {
            Node::Doctype(doctype) => {
                if report.html_version.is_empty() {
                    report.html_version = describe_doctype(doctype);
                }
            }
            Node::Element(_) => {
                let Some(element) = ElementRef::wrap(node) else {
                    continue;
                };

                match element.value().name() {
                    "html" => {
                        if let Some(version) = element.value().attr("version") {
                            version_attr.get_or_insert_with(|| version.trim().to_string());
                        }
                    }
                    "title" if !title_seen && is_html_element(&element) => {
                        title_seen = true;
                        report.title = element.text().collect::<String>().trim().to_string();
                    }
                    "a" => {
                        if let Some(href) = element.value().attr("href") {
                            match classify_href(href) {
                                LinkClass::Accessible => report.accessible_link_count += 1,
                                LinkClass::Inaccessible => report.inaccessible_link_count += 1,
                                LinkClass::Ignored => {}
                            }
                        }
                    }
                    "form" if !report.has_login_form => {
                        report.has_login_form = ["action", "id", "class"].iter().any(|attr| {
                            element
                                .value()
                                .attr(attr)
                                .is_some_and(contains_login_indicator)
                        });
                    }
                    name => {
                        if let Some(count) = report.heading_counts.get_mut(name) {
                            *count += 1;
                        }
                    }
                }
            }
            _ => {}
        }
    }

    if report.html_version.is_empty() {
        report.html_version = version_attr.unwrap_or_default();
    }

    report
}

/// True for elements in the HTML namespace; excludes `<title>` inside inline SVG
fn is_html_element(element: &ElementRef) -> bool {
    &*element.value().name.ns == HTML_NAMESPACE
}

/// Renders a doctype the way it was declared, minus the `<!DOCTYPE` wrapper
///
/// `<!DOCTYPE html>` becomes `html`; legacy doctypes keep their public and
/// system identifiers.
fn describe_doctype(doctype: &Doctype) -> String {
    let mut marker = doctype.name().to_string();

    if !doctype.public_id().is_empty() {
        marker.push_str(&format!(" PUBLIC \"{}\"", doctype.public_id()));
    }

    if !doctype.system_id().is_empty() {
        if doctype.public_id().is_empty() {
            marker.push_str(" SYSTEM");
        }
        marker.push_str(&format!(" \"{}\"", doctype.system_id()));
    }

    marker
}

/// Fetches `url` once and extracts its report
///
/// This runs after reachability was confirmed, so any failure here is a
/// content-level failure and surfaces as `FetchFailed`.
pub async fn extract(fetcher: &dyn PageFetcher, url: &str) -> AnalysisResult<AnalysisReport> {
    match fetcher.fetch(url).await {
        FetchResult::Success {
            final_url,
            status_code,
            body,
        } => {
            if final_url != url {
                tracing::debug!("{} redirected to {} ({})", url, final_url, status_code);
            }
            let report = parse_html(url, &body);
            tracing::debug!(
                "Extracted {}: title={:?}, accessible={}, inaccessible={}, login_form={}",
                url,
                report.title,
                report.accessible_link_count,
                report.inaccessible_link_count,
                report.has_login_form
            );
            Ok(report)
        }
        FetchResult::HttpError {
            status_code,
            message,
        } => Err(ClassifiedError::fetch_failed(
            url,
            &format!("HTTP {} {}", status_code, message),
        )),
        FetchResult::NetworkError { error } => Err(ClassifiedError::fetch_failed(url, &error)),
    }
}
