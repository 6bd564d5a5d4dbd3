use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};

use htkprep_core::features::ByteOrder;
use htkprep_tools::report::write_json_report;
use htkprep_tools::{
    CatOptions, ConvertOptions, SubsetOptions, cat_features, convert_scp, subset_scp,
};

mod logging;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(logging::level(cli.verbose, cli.quiet));
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(1)
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "htkprep", version, about = "Data preparation utilities for HTK-style recognisers")]
struct Cli {
    /// Log progress and header details.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,
    /// Also write the run summary to this file as JSON.
    #[arg(long, global = true, value_name = "PATH")]
    report: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn execute(self) -> Result<()> {
        let report = self.report.as_deref();
        match self.command {
            Command::CatFeatures(args) => {
                let options = CatOptions {
                    byte_order: args.byte_order.order(),
                    parm_kind: args.parm_kind,
                };
                let summary =
                    cat_features::concatenate_files(&args.left, &args.right, &args.output, &options)?;
                finish(report, &summary)
            }
            Command::ShowHeader(args) => {
                let summary = cat_features::describe(&args.file, args.byte_order.order())?;
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                } else {
                    println!("nSamples: {}", summary.sample_count);
                    println!("sampPeriod: {}", summary.sample_period_hns);
                    println!("sampleDim: {}", summary.sample_dim);
                    println!("parmKind: {}", summary.parm_kind);
                }
                finish(report, &summary)
            }
            Command::ConvertScp(args) => {
                let options = ConvertOptions {
                    side: args.side,
                    side_mask: args.side_mask,
                    reorder: args.reorder,
                    hcopy: args.hcopy,
                    dir_mask: args.dir_mask,
                    update: args.update,
                    out_base: args.out_base,
                    no_ext: args.no_ext,
                    data_ext: args.data_ext,
                };
                let summary = convert_scp::convert_file(&args.input, &args.output, &options)?;
                finish(report, &summary)
            }
            Command::SubsetScp(args) => {
                let options = SubsetOptions {
                    speaker: args.speaker,
                    speaker_mask: args.speaker_mask,
                    random: args.random,
                    percent: args.percent,
                    order: args.order,
                    seed: args.seed,
                };
                let summary = subset_scp::subset_file(&args.input, &args.output, &options)?;
                finish(report, &summary)
            }
            Command::GenInitDnn(args) => {
                let summary = htkprep_train::generate_init_dnn(
                    &args.config,
                    args.structure.as_deref(),
                    &args.output,
                )?;
                finish(report, &summary)
            }
        }
    }
}

fn finish<T: Serialize>(report: Option<&std::path::Path>, summary: &T) -> Result<()> {
    if let Some(path) = report {
        write_json_report(path, summary)?;
        info!("Report: {}", path.display());
    }
    Ok(())
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Join two feature files frame by frame into one.
    CatFeatures(CatArgs),
    /// Print the header of a feature file.
    ShowHeader(ShowArgs),
    /// Rewrite an extended SCP list.
    ConvertScp(ConvertArgs),
    /// Keep a fraction of an SCP list by speaker or utterance.
    SubsetScp(SubsetArgs),
    /// Write a zero-initialised DNN model from an HTE config.
    GenInitDnn(GenInitDnnArgs),
}

#[derive(Args, Debug, Clone, Copy)]
struct ByteOrderArgs {
    /// Read and write little-endian files instead of big-endian.
    #[arg(long)]
    little: bool,
}

impl ByteOrderArgs {
    fn order(self) -> ByteOrder {
        if self.little {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }
}

#[derive(Args, Debug, Clone)]
struct CatArgs {
    left: PathBuf,
    right: PathBuf,
    output: PathBuf,
    #[command(flatten)]
    byte_order: ByteOrderArgs,
    /// Parm kind written to the output header.
    #[arg(short = 'k', long = "kind", default_value = "USER")]
    parm_kind: String,
}

#[derive(Args, Debug, Clone)]
struct ShowArgs {
    file: PathBuf,
    #[command(flatten)]
    byte_order: ByteOrderArgs,
    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct ConvertArgs {
    input: PathBuf,
    output: PathBuf,
    /// Key entries by conversation side.
    #[arg(long)]
    side: bool,
    /// Mask mapping an utterance id to its side.
    #[arg(long, default_value = convert_scp::DEFAULT_SIDE_MASK)]
    side_mask: String,
    /// Sort the output lines.
    #[arg(long)]
    reorder: bool,
    /// Write `source target` pairs for HCopy.
    #[arg(long)]
    hcopy: bool,
    /// Mask deriving the output sub-directory from the source directory.
    #[arg(long, default_value = "")]
    dir_mask: String,
    /// Name targets after their key and rebase frame ranges.
    #[arg(long)]
    update: bool,
    /// Root directory for targets.
    #[arg(long, default_value = "")]
    out_base: String,
    /// Write bare paths instead of `name=path`.
    #[arg(long)]
    no_ext: bool,
    /// Replace the data file extension.
    #[arg(long, default_value = "")]
    data_ext: String,
}

#[derive(Args, Debug, Clone)]
struct SubsetArgs {
    input: PathBuf,
    output: PathBuf,
    /// Select whole speakers.
    #[arg(long)]
    speaker: bool,
    /// Mask mapping an utterance name to its speaker.
    #[arg(long, default_value = subset_scp::DEFAULT_SPEAKER_MASK)]
    speaker_mask: String,
    /// Pick at random instead of the leading entries.
    #[arg(long)]
    random: bool,
    /// Fraction to keep, in (0, 1].
    #[arg(long, default_value_t = 0.1)]
    percent: f64,
    /// Sort the output lines.
    #[arg(long)]
    order: bool,
    /// Seed for random selection.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug, Clone)]
struct GenInitDnnArgs {
    /// HTE config file.
    config: PathBuf,
    output: PathBuf,
    /// Layer sizes such as `720X1000X3000`, overriding the config.
    #[arg(long)]
    structure: Option<String>,
}
