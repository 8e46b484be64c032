//! Report building: console lines and CSV rows.
//!
//! Everything here is plain text with no color and no timestamps, so two
//! runs over the same input produce identical output.

use serde::Serialize;

use crate::audit::AuditFinding;
use crate::matcher::MatchConfidence;
use crate::media::{ExpectationSource, MediaCategory};
use crate::plan::{CopyAction, CopyDecision};
use crate::util::join_or_none;

pub const TAG_MISSING_META: &str = "[MISSING META]";
pub const TAG_MISSING_MEDIA: &str = "[MISSING MEDIA]";
pub const TAG_REPORT: &str = "[REPORT]";

/// Column order of the audit CSV export.
pub const CSV_HEADER: [&str; 5] = [
    "system",
    "rom_filename",
    "in_master_gamelist",
    "missing_categories",
    "note",
];

/// Separator inside the `missing_categories` column.
pub const CATEGORY_DELIMITER: &str = ",";

/// Console lines for one finding; empty when the finding has no problem.
///
/// Missing metadata takes precedence: a ROM that is not in the catalog has
/// no expected categories to be missing.
pub fn finding_lines(finding: &AuditFinding) -> Vec<String> {
    let file_name = finding.rom.file_name();
    if !finding.in_master_catalog {
        return vec![format!("{} {}", TAG_MISSING_META, file_name)];
    }
    if finding.missing_categories.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![format!(
        "{} {} -> {}",
        TAG_MISSING_MEDIA,
        file_name,
        join_or_none(&finding.missing_categories)
    )];
    for suggestion in &finding.suggestions {
        lines.push(format!(
            "  closest in {}: '{}'",
            suggestion.category, suggestion.stem
        ));
    }
    lines
}

/// One row of the audit CSV. Field names double as the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvRow {
    pub system: String,
    pub rom_filename: String,
    pub in_master_gamelist: &'static str,
    pub missing_categories: String,
    pub note: String,
}

impl CsvRow {
    pub fn from_finding(finding: &AuditFinding) -> Self {
        let missing: Vec<&str> = finding
            .missing_categories
            .iter()
            .map(MediaCategory::name)
            .collect();
        Self {
            system: finding.system.clone(),
            rom_filename: finding.rom.file_name(),
            in_master_gamelist: if finding.in_master_catalog { "yes" } else { "no" },
            missing_categories: missing.join(CATEGORY_DELIMITER),
            note: finding.note.clone(),
        }
    }
}

/// Rows for every problem finding, in finding order.
pub fn csv_rows(findings: &[AuditFinding]) -> Vec<CsvRow> {
    findings
        .iter()
        .filter(|f| f.is_problem())
        .map(CsvRow::from_finding)
        .collect()
}

/// Per-system counts for the audit console summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditTally {
    pub roms: usize,
    pub in_master: usize,
    pub missing_in_master: usize,
    pub missing_media: usize,
}

impl AuditTally {
    pub fn from_findings<'f>(findings: impl IntoIterator<Item = &'f AuditFinding>) -> Self {
        let mut tally = Self::default();
        for finding in findings {
            tally.roms += 1;
            if finding.in_master_catalog {
                tally.in_master += 1;
                if !finding.missing_categories.is_empty() {
                    tally.missing_media += 1;
                }
            } else {
                tally.missing_in_master += 1;
            }
        }
        tally
    }

    pub fn problems(&self) -> usize {
        self.missing_in_master + self.missing_media
    }
}

/// Verbose per-title lines for a sync: which categories resolved and which
/// did not.
pub fn title_report_lines(
    system: &str,
    rom_file_name: &str,
    expectation: ExpectationSource,
    decisions: &[CopyDecision],
) -> Vec<String> {
    let (missed, matched): (Vec<&CopyDecision>, Vec<&CopyDecision>) = decisions
        .iter()
        .partition(|d| d.action == CopyAction::SkipMissingSource);
    let names = |ds: &[&CopyDecision]| -> Vec<String> {
        ds.iter()
            .map(|d| {
                if d.confidence.is_match() && d.confidence != MatchConfidence::Exact {
                    format!("{} ({})", d.category, d.confidence.label())
                } else {
                    d.category.to_string()
                }
            })
            .collect()
    };

    vec![
        format!(
            "{} {} | {} | expected={}",
            TAG_REPORT,
            system,
            rom_file_name,
            expectation.label()
        ),
        format!("  matched: {}", join_or_none(&names(&matched))),
        format!("  missed : {}", join_or_none(&names(&missed))),
    ]
}
