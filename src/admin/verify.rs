use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::db::Database;
use crate::index::OrderMap;
use crate::storage::layout::Layout;
use crate::storage::options::DatabaseOptions;

use crate::admin::util::open_existing;
use crate::admin::Result;

const MAX_FINDINGS: usize = 32;

/// Specifies the depth of verification checks to perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyLevel {
    /// Header, permutation and file length only.
    Fast,
    /// Also reads every record and checks key order.
    Full,
}

/// Indicates the severity level of a verification finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifySeverity {
    /// Non-critical issue, e.g. trailing bytes after the last record.
    Warning,
    /// The file violates a structural invariant.
    Error,
}

/// Represents a single issue discovered during verification.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyFinding {
    /// The severity level of this finding.
    pub severity: VerifySeverity,
    /// Human-readable description of the issue.
    pub message: String,
}

/// Statistics collected during the verification process.
#[derive(Clone, Debug, Default, Serialize)]
pub struct VerifyCounts {
    /// Record count stored in the header.
    pub declared_records: u64,
    /// Records successfully read (full level only).
    pub records_read: u64,
    /// Adjacent positions whose keys are out of order.
    pub order_violations: u64,
    /// Actual file length.
    pub file_bytes: u64,
    /// File length implied by the header.
    pub expected_file_bytes: u64,
}

/// Complete report of a verification operation.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyReport {
    /// The verification level that was performed.
    pub level: VerifyLevel,
    /// True when no error-level finding was recorded.
    pub success: bool,
    /// Issues discovered, capped at a fixed number.
    pub findings: Vec<VerifyFinding>,
    /// Statistics about the structures examined.
    pub counts: VerifyCounts,
}

/// Opens the database at `path` and verifies it.
pub fn verify(
    path: impl AsRef<Path>,
    opts: &DatabaseOptions,
    level: VerifyLevel,
) -> Result<VerifyReport> {
    let db = open_existing(path.as_ref(), opts)?;
    verify_database(&db, level)
}

/// Checks the structural invariants of an open database.
///
/// Detects headers that are missing or cut short, order maps that are not a
/// permutation of the stored slots, files whose length disagrees with the
/// header (an insert interrupted between the header rewrite and the record
/// append leaves exactly one record missing) and, at [`VerifyLevel::Full`],
/// keys that are out of order.
pub fn verify_database(db: &Database, level: VerifyLevel) -> Result<VerifyReport> {
    let layout = db.layout();
    let mut findings = Vec::new();
    let mut counts = VerifyCounts {
        file_bytes: layout.file_len()?,
        ..VerifyCounts::default()
    };

    match layout.load_header() {
        Ok(map) => {
            counts.declared_records = map.len() as u64;
            counts.expected_file_bytes = Layout::expected_len(map.len());
            check_permutation(&map, &mut findings);
            check_length(&counts, &mut findings);
            if level == VerifyLevel::Full {
                check_order(layout, &map, &mut findings, &mut counts);
            }
        }
        Err(err) => push(
            &mut findings,
            VerifySeverity::Error,
            format!("header unreadable: {err}"),
        ),
    }

    let success = !findings
        .iter()
        .any(|finding| finding.severity == VerifySeverity::Error);
    info!(
        success,
        findings = findings.len(),
        declared = counts.declared_records,
        "admin.verify.completed"
    );
    Ok(VerifyReport {
        level,
        success,
        findings,
        counts,
    })
}

fn check_permutation(map: &OrderMap, findings: &mut Vec<VerifyFinding>) {
    let mut seen = vec![false; map.len()];
    for (position, slot) in map.slots().iter().enumerate() {
        match seen.get_mut(slot.index()) {
            Some(flag) if *flag => push(
                findings,
                VerifySeverity::Error,
                format!("slot {slot} referenced twice (again at position {position})"),
            ),
            Some(flag) => *flag = true,
            None => push(
                findings,
                VerifySeverity::Error,
                format!(
                    "position {position} references slot {slot} beyond record count {}",
                    map.len()
                ),
            ),
        }
    }
}

fn check_length(counts: &VerifyCounts, findings: &mut Vec<VerifyFinding>) {
    if counts.file_bytes < counts.expected_file_bytes {
        push(
            findings,
            VerifySeverity::Error,
            format!(
                "record area is {} bytes short of the {} records in the header",
                counts.expected_file_bytes - counts.file_bytes,
                counts.declared_records
            ),
        );
    } else if counts.file_bytes > counts.expected_file_bytes {
        push(
            findings,
            VerifySeverity::Warning,
            format!(
                "{} trailing bytes after the last record",
                counts.file_bytes - counts.expected_file_bytes
            ),
        );
    }
}

fn check_order(
    layout: &Layout,
    map: &OrderMap,
    findings: &mut Vec<VerifyFinding>,
    counts: &mut VerifyCounts,
) {
    let mut previous: Option<String> = None;
    for (position, &slot) in map.slots().iter().enumerate() {
        let record = match layout.read_record_at_slot(slot) {
            Ok(record) => record,
            Err(err) => {
                push(
                    findings,
                    VerifySeverity::Error,
                    format!("position {position} (slot {slot}) unreadable: {err}"),
                );
                continue;
            }
        };
        counts.records_read += 1;
        if let Some(prev) = previous.as_deref() {
            if prev.as_bytes() > record.key() {
                counts.order_violations += 1;
                push(
                    findings,
                    VerifySeverity::Error,
                    format!(
                        "position {position} key {:?} sorts before previous key {prev:?}",
                        record.phone
                    ),
                );
            }
        }
        previous = Some(record.phone);
    }
}

fn push(findings: &mut Vec<VerifyFinding>, severity: VerifySeverity, message: impl Into<String>) {
    if findings.len() < MAX_FINDINGS {
        findings.push(VerifyFinding {
            severity,
            message: message.into(),
        });
    }
}
