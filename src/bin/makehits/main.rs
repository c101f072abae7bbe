mod cli;
mod progress;

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    let mut config = read_config_file(&args.config)?;
    if let Some(verbosity) = args.verbosity { config.readout.verbosity = verbosity }
    let layout = config.layout()?;

    // Before starting the potentially long computation, make sure that we can
    // write the result to the requested destination.
    if let Some(dir) = args.out.parent() { std::fs::create_dir_all(dir)? }
    println!("Writing hits to {}", args.out.display());
    let mut sink = Hdf5Sink::create(&args.out, &layout, &config.output)?;

    // --- Process input files -------------------------------------------------------
    let pool = rayon::ThreadPoolBuilder::new().num_threads(args.threads).build()?;
    let mut progress = Progress::new(&args.infiles);
    let mut profiler = Profiler::new();

    for file in &args.infiles {
        progress.read_file_start(file);
        let events = match profiler.time("read MC events", || read_mc_events(file, args.events)) {
            Ok(events) => events,
            Err(e)     => { progress.read_file_failed(file, e); continue }
        };
        let results = profiler.time("process events", || {
            pool.install(|| process_events(&events, &layout, &config.readout))
        });
        profiler.start("write hits");
        for result in results {
            // A broken event lifecycle means the step stream cannot be trusted: abort the run
            let hits = result?;
            sink.write_event(&hits)?;
            progress.event_done(&hits);
        }
        profiler.stop("write hits");
        progress.file_done();
    }
    profiler.time("write hits", || sink.finish())?;

    // --- Report any files that failed to be read -----------------------------------
    progress.final_report();
    println!("\n{}", profiler.report());
    Ok(())
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::error::Error;
use clap::Parser;
use pinpoint::{
    config::read_config_file,
    event::process_events,
    io::{HitSink, hdf5::{read_mc_events, Hdf5Sink}},
    utils::Profiler,
};
use cli::Cli;
use progress::Progress;
