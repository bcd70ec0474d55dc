//! Import report logging.

use std::fmt;

use tracing::info;

use contentseed_core::{ContentPath, ImportFailure, ImportResult};

const SEPARATOR: &str = "-------------------";

/// Group of lines in an import report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Nodes,
    Binaries,
    Errors,
}

impl Section {
    /// Sections in report order.
    pub const ALL: [Section; 3] = [Section::Nodes, Section::Binaries, Section::Errors];

    /// Heading logged above the section.
    pub fn heading(&self) -> &'static str {
        match self {
            Section::Nodes => "Imported nodes:",
            Section::Binaries => "Binaries:",
            Section::Errors => "Errors:",
        }
    }
}

/// One entry of an import report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLine<'a> {
    Node(&'a ContentPath),
    Binary(&'a str),
    Error(&'a ImportFailure),
}

impl ReportLine<'_> {
    /// Section the line belongs to.
    pub fn section(&self) -> Section {
        match self {
            ReportLine::Node(_) => Section::Nodes,
            ReportLine::Binary(_) => Section::Binaries,
            ReportLine::Error(_) => Section::Errors,
        }
    }
}

impl fmt::Display for ReportLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportLine::Node(path) => write!(f, "{path}"),
            ReportLine::Binary(binary) => f.write_str(binary),
            ReportLine::Error(failure) => write!(f, "{failure}"),
        }
    }
}

/// One line per added node, copied binary and error, in that order.
pub fn report_lines(result: &ImportResult) -> impl Iterator<Item = ReportLine<'_>> {
    result
        .added_nodes
        .iter()
        .map(ReportLine::Node)
        .chain(result.binaries.iter().map(|b| ReportLine::Binary(b.as_str())))
        .chain(result.errors.iter().map(ReportLine::Error))
}

/// Log an import result at info level, one line per entry, grouped under a
/// heading per section.
pub fn log_import(result: &ImportResult) {
    let mut lines = report_lines(result).peekable();
    for section in Section::ALL {
        info!("{SEPARATOR}");
        info!("{}", section.heading());
        while let Some(line) = lines.next_if(|line| line.section() == section) {
            match line {
                ReportLine::Error(failure) => {
                    info!(cause = failure.cause.as_deref(), "{}", failure.message)
                }
                other => info!("{other}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ImportResult {
        ImportResult {
            added_nodes: vec![
                ContentPath::parse("/my-corporation").unwrap(),
                ContentPath::parse("/my-corporation/about").unwrap(),
            ],
            binaries: vec!["/my-corporation/logo.png".to_string()],
            errors: vec![ImportFailure::new("Invalid metadata", Some("bad".to_string()))],
            dry_run: false,
        }
    }

    #[test]
    fn test_one_line_per_entry_in_order() {
        let result = sample();
        let sections: Vec<_> = report_lines(&result).map(|l| l.section()).collect();
        assert_eq!(
            sections,
            vec![
                Section::Nodes,
                Section::Nodes,
                Section::Binaries,
                Section::Errors
            ]
        );
    }

    #[test]
    fn test_line_display() {
        let result = sample();
        let lines: Vec<_> = report_lines(&result).map(|l| l.to_string()).collect();
        assert_eq!(lines[0], "/my-corporation");
        assert_eq!(lines[2], "/my-corporation/logo.png");
        assert_eq!(lines[3], "Invalid metadata: bad");
    }

    #[test]
    fn test_empty_result() {
        assert_eq!(report_lines(&ImportResult::default()).count(), 0);
        log_import(&ImportResult::default());
    }
}
