/// Print the detector derived from a configuration file
#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "showgeometry")]
struct Cli {
    /// TOML file describing the detector
    config: PathBuf,

    /// Also list the z position of the volumes of every layer
    #[clap(short, long)]
    layers: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    let layout = read_config_file(&args.config)?.layout()?;
    let l = &layout;

    println!("Detector dimensions: {} cm x {} cm", cm_(l.detector_width), cm_(l.detector_height));
    println!("Number of layers: {}", l.n_layers);
    println!("Tungsten thickness per layer: {} mm", mm_(l.tungsten_thickness));
    println!("Silicon thickness per layer: {} um", um_(l.silicon_thickness));
    println!("Air gap per layer: {} mm", mm_(l.box_thickness()));
    println!("Layer thickness: {} mm    total: {} mm", mm_(l.layer_thickness()), mm_(l.detector_thickness()));
    println!("Pixels per silicon layer: {} x {} = {}", g(l.n_cols()), g(l.n_rows()), g(l.n_cols() as u64 * l.n_rows() as u64));
    println!("Pixel size: {} x {} um", um_(l.pixel_width), um_(l.pixel_height));
    match (l.scint, l.n_scint_bars()) {
        (ScintOption::None, _) => println!("No scintillator"),
        (s, None)       => println!("Scintillator: {} block layer(s), {} mm thick", s.n_layers(), mm_(l.scint_thickness)),
        (s, Some(bars)) => println!("Scintillator: {} layer(s) of {bars} bars ({} x {} mm), {} mm thick",
                                    s.n_layers(), mm_(l.scint_bar_width), mm_(l.scint_bar_height), mm_(l.scint_thickness)),
    }

    if args.layers {
        println!("\n{:>6} {:>14} {:>14}", "layer", "tungsten z/mm", "silicon z/mm");
        for LayerPlacement { layer, tungsten_z, silicon_z } in l.layer_placements() {
            println!("{layer:>6} {:>14.3} {:>14.3}", mm_(tungsten_z), mm_(silicon_z));
        }
    }
    Ok(())
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::error::Error;
use std::path::PathBuf;
use clap::Parser;
use units::{cm_, mm_, um_};
use geometry::{layout::LayerPlacement, ScintOption};
use pinpoint::{config::read_config_file, utils::group_digits as g};
