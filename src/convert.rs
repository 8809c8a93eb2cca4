use std::fs::File;
use std::io::{BufRead, BufReader, Write};

use anyhow::{bail, Context, Result};

use crate::fasta::FastaRecord;

/// Re-emits records with each sequence on a single line, undoing any
/// line-wrapping in the source file.
pub fn write_oneline(writer: &mut impl Write, records: &[FastaRecord]) -> Result<()> {
    for record in records {
        writeln!(writer, "{}\n{}", record.header(), record.seq)?;
    }
    Ok(())
}

/// Reads a single-record FASTA (header plus the whole sequence on one line)
/// and rotates the sequence as circular so that it restarts from the 1-based
/// position `shift`.
///
/// Positions 0 and 1 leave the sequence unchanged; a negative `shift` counts
/// from the end of the sequence. The returned header carries a
/// `_shifted_to_<shift>` suffix.
pub fn shift_start(input: &str, shift: i64) -> Result<(String, String)> {
    let file = File::open(input).with_context(|| format!("Unable to open file {input}"))?;
    let mut lines = BufReader::new(file).lines();

    let header = match lines.next() {
        Some(line) => line?.trim().to_string(),
        None => bail!("{input} is empty; expected a header and a sequence line"),
    };
    let seq = match lines.next() {
        Some(line) => line?.trim().to_string(),
        None => bail!("{input} has no sequence line"),
    };

    let len = seq.len() as i64;
    let start = if shift < 0 {
        shift + len
    } else if shift > 1 {
        shift - 1
    } else {
        0
    };

    if start < 0 || start > len {
        bail!("cannot shift a {len} nt sequence to position {shift}");
    }

    let start = start as usize;
    let shifted = format!("{}{}", &seq[start..], &seq[..start]);

    Ok((format!("{header}_shifted_to_{shift}"), shifted))
}
