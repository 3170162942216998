//! Change note parsing
//!
//! Change notes are markdown sections inside pull request bodies. A
//! parser owns one section title, collects matching content from every
//! note it is fed, and renders the aggregate back out as markdown.
//!
//! Section headings match `# Title` or `## Title`, case-insensitively.
//! Line endings are normalized so notes written on Windows parse the
//! same as everything else.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::github::PullRequest;

/// Collects one section of a change note across many pull requests
pub trait ChangeNoteParser: fmt::Debug {
    /// The section heading this parser owns
    fn title(&self) -> &str;
    /// Consume one pull request's change note
    fn parse(&mut self, pull_request: &PullRequest);
    /// Render the collected section, or `None` when nothing matched
    fn render(&self) -> Option<String>;
}

/// Collects the raw lines under a section heading
#[derive(Debug, Clone)]
pub struct SectionParser {
    title: String,
    link_pr: bool,
    lines: Vec<String>,
}

impl SectionParser {
    /// Build a parser for one section. With `link_pr`, every collected
    /// line is annotated with a link back to its pull request.
    #[must_use]
    pub fn new(title: &str, link_pr: bool) -> Self {
        Self { title: title.to_string(), link_pr, lines: Vec::new() }
    }
}

impl ChangeNoteParser for SectionParser {
    fn title(&self) -> &str {
        &self.title
    }

    fn parse(&mut self, pull_request: &PullRequest) {
        let Some(body) = &pull_request.body else {
            return;
        };
        let mut in_section = false;
        for raw in body.replace("\r\n", "\n").lines() {
            if let Some(heading) = parse_heading(raw) {
                in_section = heading.eq_ignore_ascii_case(&self.title);
                continue;
            }
            if !in_section {
                continue;
            }
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if self.link_pr {
                self.lines.push(format!(
                    "{line} [[PR{}]({})]",
                    pull_request.number, pull_request.html_url
                ));
            } else {
                self.lines.push(line.to_string());
            }
        }
    }

    fn render(&self) -> Option<String> {
        if self.lines.is_empty() {
            return None;
        }
        Some(format!("# {}\n\n{}", self.title, self.lines.join("\n")))
    }
}

/// Collects issue references under a section heading
#[derive(Debug, Clone)]
pub struct IssuesParser {
    title: String,
    issues_url: String,
    numbers: BTreeSet<u64>,
}

impl IssuesParser {
    /// Build a parser that links issues under `issues_url` (the
    /// repository's `https://github.com/<owner>/<name>/issues` base).
    #[must_use]
    pub fn new(title: &str, issues_url: &str) -> Self {
        Self {
            title: title.to_string(),
            issues_url: issues_url.trim_end_matches('/').to_string(),
            numbers: BTreeSet::new(),
        }
    }
}

impl ChangeNoteParser for IssuesParser {
    fn title(&self) -> &str {
        &self.title
    }

    fn parse(&mut self, pull_request: &PullRequest) {
        let Some(body) = &pull_request.body else {
            return;
        };
        let mut in_section = false;
        for raw in body.replace("\r\n", "\n").lines() {
            if let Some(heading) = parse_heading(raw) {
                in_section = heading.eq_ignore_ascii_case(&self.title);
                continue;
            }
            if !in_section {
                continue;
            }
            for caps in issue_re().captures_iter(raw) {
                if let Some(number) = caps.get(1).and_then(|m| m.as_str().parse().ok()) {
                    self.numbers.insert(number);
                }
            }
        }
    }

    fn render(&self) -> Option<String> {
        if self.numbers.is_empty() {
            return None;
        }
        let lines: Vec<String> = self
            .numbers
            .iter()
            .map(|n| format!("- [#{n}]({}/{n})", self.issues_url))
            .collect();
        Some(format!("# {}\n\n{}", self.title, lines.join("\n")))
    }
}

/// Section title of a `# ` or `## ` markdown heading.
#[must_use]
pub fn parse_heading(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed
        .strip_prefix("## ")
        .or_else(|| trimmed.strip_prefix("# "))
        .map(str::trim)
        .filter(|h| !h.is_empty())
}

fn issue_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:close[sd]?|fix(?:es|ed)?|resolve[sd]?)\s+#(\d+)")
            .expect("static pattern")
    })
}

/// The standard parser stack: critical changes, changes, issues closed.
#[must_use]
pub fn default_parsers(link_pr: bool, issues_url: &str) -> Vec<Box<dyn ChangeNoteParser>> {
    vec![
        Box::new(SectionParser::new("Critical Changes", link_pr)),
        Box::new(SectionParser::new("Changes", link_pr)),
        Box::new(IssuesParser::new("Issues Closed", issues_url)),
    ]
}
