extern crate env_logger;
#[macro_use]
extern crate log;
use std::{
    fs::File,
    io::{prelude::*, stdout, BufWriter},
    path::Path,
};

use anyhow::Result;
use clap::Parser;

mod blast;
mod cli;
mod convert;
mod fasta;
mod fastq;
mod filter;
mod gbk;
mod report;
mod select;

use cli::{Cli, Commands};
use filter::FilterOpts;

/// Creates a `BufWriter` for the given output option. This allows for an output file to be passed
/// or otherwise will default to using standard output.
///
/// If `output` is `Some`, it creates a file at the specified path and returns a `BufWriter` for it.
/// If `output` is `None`, it returns a `BufWriter` for the standard output.
///
/// # Arguments
///
/// * `output` - An `Option` containing the path to the output file as a `String`.
///
/// # Returns
///
/// A `Result` containing a `BufWriter` that implements `Write`.
fn get_writer(output: &Option<String>) -> Result<impl Write> {
    // get output as a BufWriter - equal to stdout if None
    let writer = BufWriter::new(match output {
        Some(ref x) => {
            let file = File::create(Path::new(x))?;
            Box::new(file) as Box<dyn Write + Send>
        }
        None => Box::new(stdout()) as Box<dyn Write + Send>,
    });
    Ok(writer)
}

fn try_main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse();

    info!("seqgate v{}", cli::VERSION);

    match &cli.command {
        Commands::Filter {
            input,
            output,
            gc,
            len,
            qual,
            report,
        } => {
            let opts = FilterOpts {
                gc: *gc,
                len: *len,
                quality_threshold: *qual,
            };

            let summary = filter::filter_fastq(input, output, &opts)?;

            if let Some(path) = report {
                std::fs::write(path, serde_json::to_string_pretty(&summary)?)?;
                info!("Wrote run report to {path}");
            }
            info!("Completed filtering to {output}");
        }
        Commands::SelectGenes {
            input,
            genes,
            before,
            after,
            output,
        } => {
            let entries = gbk::parse_cds(input)?;
            info!("Parsed {} CDS entries from {input}", entries.len());

            let selected = select::select_neighborhoods(&entries, genes, *before, *after)?;
            info!("Selected {} neighbouring entries", selected.len());

            let mut writer = get_writer(output)?;
            select::write_selected(&mut writer, &entries, &selected)?;
        }
        Commands::Flatten { input, output } => {
            let records = fasta::FastaReader::from_path(input)?.read_records()?;
            info!("Read {} records from {input}", records.len());

            let mut writer = get_writer(output)?;
            convert::write_oneline(&mut writer, &records)?;
        }
        Commands::Shift { input, by, output } => {
            let (header, seq) = convert::shift_start(input, *by)?;

            let mut writer = get_writer(output)?;
            writeln!(writer, "{header}\n{seq}")?;
        }
        Commands::BlastBest { input, output } => {
            let hits = blast::best_hits(input)?;
            info!("Found {} best hits in {input}", hits.len());

            let mut writer = get_writer(output)?;
            for hit in &hits {
                writeln!(writer, "{hit}")?;
            }
        }
    };
    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        error!("{}", err);

        // report any errors that are produced
        err.chain()
            .skip(1)
            .for_each(|cause| error!("  because: {}", cause));

        std::process::exit(1);
    }
}
