use std::fs::File;
use std::io::{BufRead, BufReader, Lines};

use anyhow::{bail, Context, Result};
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FastaRecord {
    pub id: String,
    pub description: String,
    pub seq: String,
}

impl FastaRecord {
    /// True for the sentinel record returned by `read_record` once the
    /// reader is exhausted.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.description.is_empty() && self.seq.is_empty()
    }

    /// The record's header line, `>` included.
    pub fn header(&self) -> String {
        if self.description.is_empty() {
            format!(">{}", self.id)
        } else {
            format!(">{} {}", self.id, self.description)
        }
    }
}

#[derive(Error, Debug)]
pub enum FastaFormatErr {
    #[error("invalid FASTA format: the first line must start with `>`")]
    MissingHeader,
}

/// A pull-based reader over the records of a FASTA file.
///
/// The reader makes a single forward pass and is not restartable: it owns the
/// file handle for its whole lifetime and releases it when dropped. The first
/// header line is read on construction, which fails fast on a file that does
/// not begin with `>` (an empty file included).
///
/// Records are pulled either through the `Iterator` impl, which yields
/// `Result<FastaRecord>` until the file is exhausted, or through
/// `read_record`, which reports exhaustion as an empty sentinel record
/// instead of an end-of-iteration signal.
pub struct FastaReader {
    lines: Lines<BufReader<File>>,
    // lookahead: the header line of the record the next pull will assemble
    header: Option<String>,
}

impl FastaReader {
    pub fn from_path(path: &str) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Unable to open file {path}"))?;
        let mut lines = BufReader::new(file).lines();

        let header = match lines.next() {
            Some(line) => line?,
            None => bail!(FastaFormatErr::MissingHeader),
        };
        if !header.starts_with('>') {
            bail!(FastaFormatErr::MissingHeader);
        }

        Ok(Self {
            lines,
            header: Some(header),
        })
    }

    /// Assembles the record under the current header, storing the next
    /// header line as lookahead. `None` once the reader is exhausted.
    fn pull(&mut self) -> Result<Option<FastaRecord>> {
        let Some(header) = self.header.take() else {
            return Ok(None);
        };

        let body = header.trim()[1..].to_string();
        let (id, description) = match body.split_once(' ') {
            Some((id, description)) => (id.to_string(), description.to_string()),
            None => (body, String::new()),
        };

        let mut seq = String::new();
        for line in self.lines.by_ref() {
            let line = line?;
            if line.starts_with('>') {
                self.header = Some(line);
                break;
            }
            seq.push_str(line.trim());
        }

        Ok(Some(FastaRecord { id, description, seq }))
    }

    /// Reads one record, returning the empty sentinel record if the reader
    /// is already exhausted.
    pub fn read_record(&mut self) -> Result<FastaRecord> {
        Ok(self.pull()?.unwrap_or_default())
    }

    /// Drains every remaining record into a `Vec`.
    pub fn read_records(&mut self) -> Result<Vec<FastaRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.pull()? {
            records.push(record);
        }
        Ok(records)
    }
}

impl Iterator for FastaReader {
    type Item = Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.pull().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fasta_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    fn reader(file: &tempfile::NamedTempFile) -> FastaReader {
        FastaReader::from_path(file.path().to_str().unwrap()).unwrap()
    }

    #[test]
    fn assembles_wrapped_sequences() {
        let file = fasta_file(">a desc\nAAA\nCCC\n>b\nGGG\n");
        let records = reader(&file).read_records().unwrap();

        assert_eq!(
            records,
            vec![
                FastaRecord {
                    id: "a".to_string(),
                    description: "desc".to_string(),
                    seq: "AAACCC".to_string(),
                },
                FastaRecord {
                    id: "b".to_string(),
                    description: String::new(),
                    seq: "GGG".to_string(),
                },
            ]
        );
    }

    #[test]
    fn iteration_stops_at_end_of_file() {
        let file = fasta_file(">a\nATGC\n");
        let mut rdr = reader(&file);

        assert!(rdr.next().is_some());
        assert!(rdr.next().is_none());
        assert!(rdr.next().is_none());
    }

    #[test]
    fn read_record_returns_sentinel_when_exhausted() {
        let file = fasta_file(">a\nATGC\n");
        let mut rdr = reader(&file);

        assert_eq!(rdr.read_record().unwrap().id, "a");

        let sentinel = rdr.read_record().unwrap();
        assert!(sentinel.is_empty());
    }

    #[test]
    fn rejects_file_not_starting_with_header() {
        let file = fasta_file("ATGC\n>a\nATGC\n");
        assert!(FastaReader::from_path(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn rejects_empty_file() {
        let file = fasta_file("");
        assert!(FastaReader::from_path(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn header_reconstruction() {
        let with_desc = FastaRecord {
            id: "a".to_string(),
            description: "some description".to_string(),
            seq: String::new(),
        };
        assert_eq!(with_desc.header(), ">a some description");

        let bare = FastaRecord {
            id: "a".to_string(),
            ..Default::default()
        };
        assert_eq!(bare.header(), ">a");
    }
}
