use std::fs::File;
use std::io::{BufRead, BufReader};

use anyhow::{Context, Result};

/// The fixed-column feature key of a coding sequence in the GenBank feature
/// table: the keyword `CDS` indented by exactly 5 spaces. Qualifier lines are
/// indented further, so matching on this prefix only fires on feature lines.
const CDS_MARKER: &str = "     CDS";

/// One coding sequence, in file order.
///
/// `gene` falls back to the coordinate text when the feature carries no
/// `/gene` qualifier; `translation` stays empty without a `/translation`
/// qualifier.
#[derive(Debug, Clone, PartialEq)]
pub struct CdsEntry {
    pub location: String,
    pub gene: String,
    pub translation: String,
}

impl CdsEntry {
    fn from_feature_line(line: &str) -> Self {
        let location = line
            .trim()
            .strip_prefix("CDS")
            .unwrap_or_default()
            .trim()
            .to_string();

        CdsEntry {
            gene: location.clone(),
            location,
            translation: String::new(),
        }
    }
}

/// Extracts every CDS entry from a GenBank flat file, in file order.
///
/// A single forward pass: lines before the first `CDS` feature line are
/// skipped, and from then on only `/gene=` and `/translation=` qualifier
/// lines are consulted — qualifiers always apply to the most recent `CDS`.
/// Quoted qualifier values may wrap across lines; continuation lines are
/// consumed until one ends with the closing quote. A file without any CDS
/// feature yields an empty list.
pub fn parse_cds(path: &str) -> Result<Vec<CdsEntry>> {
    let file = File::open(path).with_context(|| format!("Unable to open file {path}"))?;
    let mut lines = BufReader::new(file).lines();

    let mut entries: Vec<CdsEntry> = Vec::new();

    while let Some(line) = lines.next() {
        let line = line?;

        if line.starts_with(CDS_MARKER) {
            entries.push(CdsEntry::from_feature_line(&line));
            continue;
        }

        // before the first CDS feature line, everything else is preamble
        let Some(current) = entries.last_mut() else {
            continue;
        };

        let trimmed = line.trim();
        if trimmed.starts_with("/gene") {
            current.gene = trimmed
                .trim_start_matches("/gene")
                .trim_start_matches('=')
                .trim_matches('"')
                .to_string();
        } else if trimmed.starts_with("/translation") {
            let mut value = trimmed
                .trim_start_matches("/translation")
                .trim_start_matches('=')
                .trim_matches('"')
                .to_string();

            // the value wraps onto further lines until one closes the quote
            let mut closed = trimmed.ends_with('"');
            while !closed {
                let Some(next) = lines.next() else {
                    // unterminated value at EOF: keep what was assembled
                    break;
                };
                let next = next?;
                let fragment = next.trim();
                closed = fragment.ends_with('"');
                value.push_str(fragment.trim_matches('"'));
            }

            current.translation = value;
        }
    }

    Ok(entries)
}
