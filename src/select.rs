use std::io::Write;

use anyhow::Result;
use thiserror::Error;

use crate::gbk::CdsEntry;

#[derive(Error, Debug)]
pub enum SelectErr {
    #[error(
        "the window around `{gene}` (entry {position}) reaches index {index}, \
         outside the {len} entries in the file
suggestion: reduce --before/--after, or pick a target further from the file edge"
    )]
    WindowOutOfRange {
        gene: String,
        position: usize,
        index: i64,
        len: usize,
    },
}

/// Collects the indices of the entries neighbouring each target gene.
///
/// For every target, in the order given, and every entry whose gene name
/// equals it, the `n_before` entries upstream and the `n_after` entries
/// downstream are selected (the match itself is not). The indices come out
/// in match-then-window order, overlaps and repeats included — they are
/// never deduplicated or re-sorted.
///
/// # Errors
///
/// No boundary clamping is performed: a window that extends past either end
/// of the entry list is an error, not a truncated selection.
pub fn select_neighborhoods(
    entries: &[CdsEntry],
    genes: &[String],
    n_before: usize,
    n_after: usize,
) -> Result<Vec<usize>, SelectErr> {
    let mut selected = Vec::new();

    for gene in genes {
        for (position, entry) in entries.iter().enumerate() {
            if entry.gene != *gene {
                continue;
            }

            let pos = position as i64;
            let upstream = (pos - n_before as i64)..pos;
            let downstream = (pos + 1)..=(pos + n_after as i64);

            for index in upstream.chain(downstream) {
                if index < 0 || index >= entries.len() as i64 {
                    return Err(SelectErr::WindowOutOfRange {
                        gene: gene.clone(),
                        position,
                        index,
                        len: entries.len(),
                    });
                }
                selected.push(index as usize);
            }
        }
    }

    Ok(selected)
}

/// Writes the selected entries as FASTA: a gene-name header and the
/// translation (possibly empty) per entry, in selection order.
pub fn write_selected(
    writer: &mut impl Write,
    entries: &[CdsEntry],
    selected: &[usize],
) -> Result<()> {
    for &index in selected {
        let entry = &entries[index];
        writeln!(writer, ">{}\n{}", entry.gene, entry.translation)?;
    }
    Ok(())
}
