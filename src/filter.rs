use anyhow::{Context, Result};

use crate::cli::Bounds;
use crate::fastq::{read_fastq, write_fastq, FastqMap, FastqRecord, SequenceErr};
use crate::report::FilterReport;

pub struct FilterOpts {
    pub gc: Bounds,
    pub len: Bounds,
    pub quality_threshold: f64,
}

impl Default for FilterOpts {
    fn default() -> Self {
        FilterOpts {
            gc: Bounds::from((20.0, 80.0)),
            len: Bounds::from((0.0, u32::MAX as f64)),
            quality_threshold: 0.0,
        }
    }
}

/// GC and length are two-sided inclusive range checks; quality is one-sided,
/// a read passing with a mean Phred score at or above the threshold. All
/// three predicates are evaluated even when an earlier one already fails, so
/// a malformed quality string surfaces as an error for every record.
pub fn keep(record: &FastqRecord, opts: &FilterOpts) -> Result<bool, SequenceErr> {
    let gc = record.gc_percent()?;
    let quality = record.mean_quality()?;

    Ok(opts.gc.contains(gc)
        && opts.len.contains(record.len() as f64)
        && quality >= opts.quality_threshold)
}

/// Filters a record map, preserving input order among the records kept.
///
/// The first predicate error aborts the whole pass: there is no partial
/// result and no skip-and-continue recovery.
pub fn apply(records: &FastqMap, opts: &FilterOpts) -> Result<FastqMap> {
    let mut kept = FastqMap::new();

    for (name, record) in records {
        if keep(record, opts).with_context(|| format!("record `{name}`"))? {
            kept.insert(name.clone(), record.clone());
        }
    }

    Ok(kept)
}

/// Reads a FASTQ file, filters it, and writes the surviving records to
/// `output` in their original order.
///
/// The output file is written atomically; a pass aborted by a malformed
/// record leaves no partial output behind.
///
/// # Returns
///
/// A `FilterReport` summarising the run, suitable for serialising as JSON.
pub fn filter_fastq(input: &str, output: &str, opts: &FilterOpts) -> Result<FilterReport> {
    let now = std::time::Instant::now();

    let records = read_fastq(input)?;
    info!("Read {} records from {input}", records.len());

    let kept = apply(&records, opts)?;
    write_fastq(&kept, output)?;

    let report = FilterReport {
        seqgate_version: crate::cli::VERSION.to_string(),
        file_path: std::fs::canonicalize(input)?.display().to_string(),
        filter_date: format!("{:?}", chrono::offset::Local::now()),
        elapsed: now.elapsed().as_secs_f64(),
        read_count: records.len(),
        kept_count: kept.len(),
        dropped_count: records.len() - kept.len(),
    };

    info!(
        "Stats: {} reads, {} kept, {} filtered out, {:.1}s runtime",
        report.read_count, report.kept_count, report.dropped_count, report.elapsed,
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(seq: &str, qual: &str) -> FastqRecord {
        FastqRecord {
            seq: seq.to_string(),
            comment: "+".to_string(),
            qual: qual.to_string(),
        }
    }

    fn map(entries: &[(&str, FastqRecord)]) -> FastqMap {
        entries
            .iter()
            .map(|(name, rec)| (name.to_string(), rec.clone()))
            .collect()
    }

    #[test]
    fn default_bounds_keep_an_ordinary_read() {
        assert!(keep(&record("ATGC", "IIII"), &FilterOpts::default()).unwrap());
    }

    #[test]
    fn length_bounds_are_inclusive() {
        let opts = FilterOpts {
            len: Bounds::from((4.0, 8.0)),
            ..Default::default()
        };

        assert!(keep(&record("ATGC", "IIII"), &opts).unwrap());
        assert!(keep(&record("ATGCATGC", "IIIIIIII"), &opts).unwrap());
        assert!(!keep(&record("ATG", "III"), &opts).unwrap());
        assert!(!keep(&record("ATGCATGCA", "IIIIIIIII"), &opts).unwrap());
    }

    #[test]
    fn quality_is_a_one_sided_threshold() {
        let opts = FilterOpts {
            quality_threshold: 42.0,
            ..Default::default()
        };

        // 'I' encodes Phred 40, the highest score in the table: 40 < 42
        assert!(!keep(&record("ATGC", "IIII"), &opts).unwrap());

        let opts = FilterOpts {
            quality_threshold: 40.0,
            ..Default::default()
        };
        assert!(keep(&record("ATGC", "IIII"), &opts).unwrap());
    }

    #[test]
    fn gc_bounds_reject_outside_interval() {
        let opts = FilterOpts {
            gc: Bounds::from((40.0, 60.0)),
            ..Default::default()
        };

        assert!(keep(&record("ATGC", "IIII"), &opts).unwrap()); // 50%
        assert!(!keep(&record("GGGG", "IIII"), &opts).unwrap()); // 100%
        assert!(!keep(&record("ATAT", "IIII"), &opts).unwrap()); // 0%
    }

    #[test]
    fn quality_errors_surface_even_when_other_predicates_fail() {
        // the read fails the GC bounds, but its quality string is malformed
        let opts = FilterOpts {
            gc: Bounds::from((90.0, 100.0)),
            ..Default::default()
        };
        assert!(keep(&record("ATAT", "II~I"), &opts).is_err());
    }

    #[test]
    fn apply_preserves_input_order() {
        let records = map(&[
            ("@a", record("ATGC", "IIII")),
            ("@b", record("GGGGGGGGGG", "IIIIIIIIII")), // 100% GC, dropped
            ("@c", record("ATGCAT", "IIIIII")),
        ]);

        let kept = apply(&records, &FilterOpts::default()).unwrap();
        let names: Vec<&String> = kept.keys().collect();
        assert_eq!(names, vec!["@a", "@c"]);
    }

    #[test]
    fn one_bad_record_aborts_the_whole_pass() {
        let records = map(&[
            ("@good", record("ATGC", "IIII")),
            ("@bad", record("ATGC", "II I")),
        ]);

        assert!(apply(&records, &FilterOpts::default()).is_err());
    }
}
