use std::fs::File;
use std::io::{BufRead, BufReader};

use anyhow::{bail, Context, Result};
use itertools::Itertools;

/// Extracts the best (first-listed) hit description for every query in a
/// BLAST text report, returned sorted alphabetically.
///
/// The report layout is positional: everything before the first `Query #`
/// line is preamble, and within each query block the line directly below the
/// `Description` column header is the top hit.
pub fn best_hits(input: &str) -> Result<Vec<String>> {
    let file = File::open(input).with_context(|| format!("Unable to open file {input}"))?;
    let mut lines = BufReader::new(file).lines();

    loop {
        let Some(line) = lines.next() else {
            bail!("{input} does not look like a BLAST report: no `Query #` line found");
        };
        if line?.starts_with("Query #") {
            break;
        }
    }

    let mut hits = Vec::new();
    while let Some(line) = lines.next() {
        if line?.starts_with("Description") {
            let Some(hit) = lines.next() else { break };
            let hit = hit?;

            // the description is the first 4-space-aligned column
            let description = hit.split("    ").next().unwrap_or("").trim_matches('.');
            hits.push(description.to_string());
        }
    }

    Ok(hits.into_iter().sorted().collect())
}
