use serde::{Deserialize, Serialize};

/// Summary of a filter run, written as JSON when `--report` is passed.
#[derive(Serialize, Deserialize, Default)]
pub struct FilterReport {
    pub seqgate_version: String,
    pub file_path: String,
    pub filter_date: String,
    pub elapsed: f64,
    pub read_count: usize,
    pub kept_count: usize,
    pub dropped_count: usize,
}
