/// Command line interface for `makehits` executable
#[derive(clap::Parser, Debug, Clone)]
#[clap(
    name = "makehits",
    about = "Aggregate recorded MC steps into per-event detector hits",
)]
pub (super) struct Cli {
    /// TOML file describing the detector and readout
    pub config: PathBuf,

    /// HDF5 input files with MC/steps and MC/tracks tables
    #[clap(required = true)]
    pub infiles: Vec<PathBuf>,

    /// HDF5 output file for hits
    #[clap(short, long)]
    pub out: PathBuf,

    /// Maximum number of rayon threads used to process events
    #[clap(short = 'j', long, default_value = "4")]
    pub threads: usize,

    /// Only process events with ids in this range, e.g. `100..200`
    #[clap(short, long, value_parser = parse_bounds::<EventId>, default_value = "..")]
    pub events: Bounds<EventId>,

    /// Override the verbosity given in the config file
    #[clap(short, long)]
    pub verbosity: Option<u32>,
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::path::PathBuf;
use pinpoint::{
    EventId,
    config::Bounds,
    utils::parse_bounds,
};
