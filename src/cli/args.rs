use clap::Parser;
use std::path::PathBuf;

/*-------------------------------------------------------------------------------------------------
  Command Line Interface (CLI) Arguments
-------------------------------------------------------------------------------------------------*/

#[derive(Parser, Debug)]
#[command(author, version, about="Reconcile AWS VPC networks into InfoBlox IPAM.", long_about = None)]
pub struct Args {
    /// CSV file containing exported AWS VPC records
    #[arg(short = 'f', long = "csv-file", default_value = "vpc_data.csv")]
    pub csv_file: PathBuf,

    /// InfoBlox network view to create objects in
    #[arg(short = 'n', long = "network-view", default_value = "default")]
    pub network_view: String,

    /// Analyze and plan without calling InfoBlox
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Skip CIDRs that already exist in InfoBlox as networks or containers
    #[arg(long)]
    pub skip_existing: bool,

    /// Create missing extensible attribute definitions before importing
    #[arg(long)]
    pub ensure_ea_defs: bool,

    /// Save the creation results to a CSV file
    #[arg(long = "csv")]
    pub csv_report: Option<PathBuf>,

    /// Logging verbosity
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,
}
