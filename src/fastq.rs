use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use itertools::Itertools;
use tempfile::tempfile_in;
use thiserror::Error;

/// The symbols of the quality encoding, in score order: `!` encodes Phred 0,
/// `I` encodes Phred 40. A symbol's score is its offset from `!`.
const PHRED_SYMBOLS: &str = "!\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHI";
const PHRED_OFFSET: u32 = 33;

/// Records in first-seen order, keyed by the verbatim name line. Inserting a
/// duplicate name replaces the earlier record but keeps its position.
pub type FastqMap = IndexMap<String, FastqRecord>;

#[derive(Debug, Clone, PartialEq)]
pub struct FastqRecord {
    pub seq: String,
    pub comment: String,
    pub qual: String,
}

#[derive(Error, Debug)]
pub enum FastqFormatErr {
    #[error(
        "truncated record at end of file: {leftover} trailing line(s), \
         but every record must span exactly 4"
    )]
    TruncatedRecord { leftover: usize },
}

#[derive(Error, Debug)]
pub enum SequenceErr {
    #[error("cannot compute a ratio over an empty sequence")]
    EmptySequence,

    #[error(
        "unknown quality symbol `{symbol}`: \
         expected a character between `!` (Phred 0) and `I` (Phred 40)"
    )]
    UnknownQualitySymbol { symbol: char },
}

/// Returns the Phred score (0 to 40) encoded by a quality symbol.
pub fn phred_score(symbol: char) -> Result<u32, SequenceErr> {
    if !PHRED_SYMBOLS.contains(symbol) {
        return Err(SequenceErr::UnknownQualitySymbol { symbol });
    }
    Ok(symbol as u32 - PHRED_OFFSET)
}

impl FastqRecord {
    pub fn len(&self) -> usize {
        self.seq.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// The GC content of the sequence as a percentage, counting the four
    /// characters `g`, `G`, `c` and `C` against the sequence as stored.
    pub fn gc_percent(&self) -> Result<f64, SequenceErr> {
        if self.seq.is_empty() {
            return Err(SequenceErr::EmptySequence);
        }

        let gc = self
            .seq
            .chars()
            .filter(|c| matches!(c, 'g' | 'G' | 'c' | 'C'))
            .count();

        Ok(100.0 * gc as f64 / self.len() as f64)
    }

    /// The mean Phred score over the quality string.
    pub fn mean_quality(&self) -> Result<f64, SequenceErr> {
        if self.qual.is_empty() {
            return Err(SequenceErr::EmptySequence);
        }

        let mut total = 0u32;
        for symbol in self.qual.chars() {
            total += phred_score(symbol)?;
        }

        Ok(total as f64 / self.qual.chars().count() as f64)
    }
}

/// Reads a FASTQ file into a map from name line to record.
///
/// Each record spans exactly 4 lines: name, sequence, comment line and
/// quality string, with line terminators stripped. First-seen order is kept;
/// a repeated name silently replaces the earlier record.
///
/// # Errors
///
/// This function will return an error if:
/// * The file cannot be opened or read.
/// * The number of lines in the file is not a multiple of 4.
pub fn read_fastq(path: &str) -> Result<FastqMap> {
    let file = File::open(path).with_context(|| format!("Unable to open file {path}"))?;

    let lines: Vec<String> = BufReader::new(file)
        .lines()
        .collect::<std::io::Result<_>>()
        .with_context(|| format!("Unable to read {path}"))?;

    if lines.len() % 4 != 0 {
        bail!(FastqFormatErr::TruncatedRecord {
            leftover: lines.len() % 4
        });
    }

    let mut records = FastqMap::with_capacity(lines.len() / 4);

    for (name, seq, comment, qual) in lines.into_iter().tuples() {
        records.insert(name, FastqRecord { seq, comment, qual });
    }

    Ok(records)
}

/// Writes a FASTQ map back out, 4 lines per record in map iteration order,
/// with no sequence wrapping.
///
/// The records are first written to a temporary file in the output directory
/// and only copied over to `path` once every record has been written, so a
/// failed pass never leaves a partial output file behind.
pub fn write_fastq(records: &FastqMap, path: &str) -> Result<()> {
    let mut out_dir = std::path::absolute(path)?;
    out_dir.pop();

    let mut temp = tempfile_in(out_dir)
        .with_context(|| format!("Unable to create a temporary file next to {path}"))?;

    {
        let mut wtr = BufWriter::new(&mut temp);
        for (name, rec) in records {
            writeln!(wtr, "{}\n{}\n{}\n{}", name, rec.seq, rec.comment, rec.qual)?;
        }
        wtr.flush()?;
    }

    temp.seek(SeekFrom::Start(0))?;
    let mut out = File::create(path).with_context(|| format!("Unable to create {path}"))?;
    std::io::copy(&mut temp, &mut out)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::io::Write;

    fn record(seq: &str, qual: &str) -> FastqRecord {
        FastqRecord {
            seq: seq.to_string(),
            comment: "+".to_string(),
            qual: qual.to_string(),
        }
    }

    #[test]
    fn phred_table_endpoints() {
        assert_eq!(phred_score('!').unwrap(), 0);
        assert_eq!(phred_score('I').unwrap(), 40);
        assert_eq!(phred_score('+').unwrap(), 10);
    }

    #[test]
    fn phred_rejects_symbols_outside_table() {
        // 'J' would be Phred 41, one past the table
        assert!(matches!(
            phred_score('J'),
            Err(SequenceErr::UnknownQualitySymbol { symbol: 'J' })
        ));
        assert!(phred_score(' ').is_err());
    }

    #[test]
    fn gc_percent_of_atgc_is_half() {
        assert_eq!(record("ATGC", "IIII").gc_percent().unwrap(), 50.0);
    }

    #[test]
    fn gc_percent_counts_both_cases() {
        assert_eq!(record("atgc", "IIII").gc_percent().unwrap(), 50.0);
        assert_eq!(record("GGcc", "IIII").gc_percent().unwrap(), 100.0);
        assert_eq!(record("ATat", "IIII").gc_percent().unwrap(), 0.0);
    }

    #[test]
    fn gc_percent_of_empty_sequence_is_an_error() {
        assert!(matches!(
            record("", "").gc_percent(),
            Err(SequenceErr::EmptySequence)
        ));
    }

    #[test]
    fn mean_quality_of_uniform_string() {
        assert_eq!(record("ATGCATGC", "IIIIIIII").mean_quality().unwrap(), 40.0);
        assert_eq!(record("AT", "!!").mean_quality().unwrap(), 0.0);
    }

    #[test]
    fn mean_quality_propagates_unknown_symbols() {
        assert!(record("ATGC", "II~I").mean_quality().is_err());
    }

    #[test]
    fn read_rejects_trailing_partial_record() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "@r1\nATGC\n+\nIIII\n@r2\nATGC\n").unwrap();

        let err = read_fastq(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("truncated record"));
    }

    #[test]
    fn duplicate_names_overwrite_but_keep_position() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let content = indoc! {"
            @dup
            AAAA
            +
            IIII
            @other
            CCCC
            +
            IIII
            @dup
            GGGG
            +
            !!!!
        "};
        write!(file, "{content}").unwrap();

        let records = read_fastq(file.path().to_str().unwrap()).unwrap();
        assert_eq!(records.len(), 2);

        // the later record replaced the earlier one, in its original slot
        let (first_name, first) = records.get_index(0).unwrap();
        assert_eq!(first_name, "@dup");
        assert_eq!(first.seq, "GGGG");
        assert_eq!(records.get_index(1).unwrap().0, "@other");
    }

    #[test]
    fn write_then_read_is_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.fastq");
        let path = path.to_str().unwrap();

        let mut records = FastqMap::new();
        records.insert("@r1 first".to_string(), record("ATGC", "IIII"));
        records.insert("@r2".to_string(), record("GGGGCC", "!!IIII"));

        write_fastq(&records, path).unwrap();
        assert_eq!(read_fastq(path).unwrap(), records);
    }
}
