use clap::builder::styling::AnsiColor;
use clap::builder::Styles;
use clap::{Parser, Subcommand};

const fn extra_build_info() -> &'static str {
    match option_env!("SEQGATE_BUILD_DESC") {
        Some(e) => e,
        None => env!("CARGO_PKG_VERSION"),
    }
}
pub const VERSION: &str = extra_build_info();
const INFO_STRING: &str = "
🧬 seqgate version ";
const AFTER_STRING: &str = "
   ──────────────────────────────────
   tools for filtering short reads and wrangling flat-file sequence formats";

// colouring of the help
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().bold())
    .usage(AnsiColor::BrightMagenta.on_default().bold())
    .literal(AnsiColor::BrightMagenta.on_default())
    .placeholder(AnsiColor::White.on_default());

#[derive(Parser)]
#[command(
    version = VERSION,
    about = format!("{}{}{}", INFO_STRING, VERSION, AFTER_STRING),
    arg_required_else_help = true,
    flatten_help = true,
    styles = STYLES
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Filter a .fastq file by GC content, read length and mean Phred quality
    #[command(arg_required_else_help = true)]
    Filter {
        /// the input .fastq file
        input: String,

        /// the output .fastq file
        #[arg(short, default_value = "filtered.fastq")]
        output: String,

        /// keep reads whose GC percentage lies within the given bounds.
        /// accepts either `a,b` (an inclusive interval) or a single value `b`,
        /// which is read as the upper bound with the lower bound fixed at 0:
        ///     --gc 20,80
        ///     --gc 60
        #[arg(
            long,
            value_parser = |x: &str| Bounds::try_from(x),
            default_value = "20,80",
            verbatim_doc_comment
        )]
        gc: Bounds,

        /// keep reads whose length lies within the given bounds.
        /// see the docs for `--gc` for the accepted bound formats.
        #[arg(
            long,
            value_parser = |x: &str| Bounds::try_from(x),
            default_value = "0,4294967295",
            verbatim_doc_comment
        )]
        len: Bounds,

        /// keep reads whose mean Phred quality is at least this value
        #[arg(long, default_value_t = 0.0)]
        qual: f64,

        /// write a JSON run report to this path
        #[arg(long)]
        report: Option<String>,
    },

    /// Select the neighbours of named genes from a GenBank flat file and
    /// write their translations as FASTA
    #[command(arg_required_else_help = true)]
    SelectGenes {
        /// the input GenBank (.gbk) flat file
        input: String,

        /// a target gene name; may be given multiple times
        #[arg(short, long = "gene", required = true)]
        genes: Vec<String>,

        /// how many entries upstream of each match to select
        #[arg(long, default_value_t = 1)]
        before: usize,

        /// how many entries downstream of each match to select
        #[arg(long, default_value_t = 1)]
        after: usize,

        /// the output .fasta file; defaults to standard output
        #[arg(short)]
        output: Option<String>,
    },

    /// Rewrite a FASTA file with every sequence on a single line
    #[command(arg_required_else_help = true)]
    Flatten {
        /// the input .fasta file
        input: String,

        /// the output .fasta file; defaults to standard output
        #[arg(short)]
        output: Option<String>,
    },

    /// Rotate the sequence of a single-record FASTA file as circular,
    /// restarting it from the given 1-based position
    #[command(arg_required_else_help = true)]
    Shift {
        /// the input .fasta file (one record, sequence on one line)
        input: String,

        /// the 1-based position the rewritten sequence should start from.
        /// 0 and 1 leave the sequence unchanged; negative values count
        /// from the end
        #[arg(long, allow_hyphen_values = true, verbatim_doc_comment)]
        by: i64,

        /// the output .fasta file; defaults to standard output
        #[arg(short)]
        output: Option<String>,
    },

    /// Extract the best hit per query from a BLAST text report,
    /// sorted alphabetically
    #[command(arg_required_else_help = true)]
    BlastBest {
        /// the BLAST text output file
        input: String,

        /// the output file; defaults to standard output
        #[arg(short)]
        output: Option<String>,
    },
}

/// An inclusive `[lower, upper]` bound pair for the filter predicates.
///
/// A pair is used as-is; a single scalar is read as the upper bound with the
/// lower bound fixed at 0. Ordering is not validated: a pair with
/// `lower > upper` simply rejects every value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn contains(&self, v: f64) -> bool {
        (self.lower <= v) && (v <= self.upper)
    }
}

impl From<f64> for Bounds {
    fn from(upper: f64) -> Self {
        Bounds { lower: 0.0, upper }
    }
}

impl From<(f64, f64)> for Bounds {
    fn from((lower, upper): (f64, f64)) -> Self {
        Bounds { lower, upper }
    }
}

/// Error type for parsing a bound specification string.
#[derive(Debug)]
pub struct ParseBoundsErr(String);

impl std::fmt::Display for ParseBoundsErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid bound specification: {}", self.0)
    }
}

impl std::error::Error for ParseBoundsErr {}

impl<'a> TryFrom<&'a str> for Bounds {
    type Error = ParseBoundsErr;

    fn try_from(arg: &'a str) -> Result<Bounds, Self::Error> {
        let parts: Vec<&str> = arg.split(',').collect();

        let parse = |s: &str| {
            s.trim()
                .parse::<f64>()
                .map_err(|_| ParseBoundsErr(format!("'{}' is not a number", s.trim())))
        };

        match parts.as_slice() {
            [upper] => Ok(Bounds::from(parse(upper)?)),
            [lower, upper] => Ok(Bounds::from((parse(lower)?, parse(upper)?))),
            _ => Err(ParseBoundsErr(indoc::formatdoc! {"
                Expected '<upper>' or '<lower>,<upper>', got '{arg}', as in:
                  --gc 60
                  --gc 20,80
                  --len 0,15000
                "})),
        }
    }
}
