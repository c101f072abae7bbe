/// Progress bar and statistics for `makehits` executable
pub (super) struct Progress {
    n_files_given: usize,
    n_events     : u64,
    n_pixel_hits : u64,
    n_scint_hits : u64,
    steps        : StepStats,
    files_bar    : ProgressBar,
    failed_files : Vec<(PathBuf, String)>,
}

impl Progress {

    pub (super) fn new(infiles: &[PathBuf]) -> Self {
        let bar = ProgressBar::new(infiles.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("Processing file: {msg}\n[{elapsed_precise}] {wide_bar} {pos}/{len} ({eta_precise})")
        {
            bar.set_style(style);
        }
        bar.tick();
        Self {
            n_files_given: infiles.len(),
            n_events     : 0,
            n_pixel_hits : 0,
            n_scint_hits : 0,
            steps        : StepStats::default(),
            files_bar    : bar,
            failed_files : vec![],
        }
    }

    pub (super) fn read_file_start(&self, file: &Path) {
        self.files_bar.set_message(file.display().to_string());
    }

    pub (super) fn read_file_failed(&mut self, file: &Path, error: impl std::fmt::Display) {
        self.failed_files.push((file.to_path_buf(), error.to_string()));
        self.files_bar.inc(1);
    }

    pub (super) fn event_done(&mut self, hits: &EventHits) {
        self.n_events     += 1;
        self.n_pixel_hits += hits.pixel.len() as u64;
        self.n_scint_hits += hits.scint.as_ref().map_or(0, |s| s.len() as u64);
        self.steps        += hits.steps;
    }

    pub (super) fn file_done(&self) { self.files_bar.inc(1) }

    pub (super) fn final_report(&self) {
        self.files_bar.finish_with_message("<finished processing files>");
        let n_failed = self.failed_files.len();
        println!("Files read: {}/{} (failed: {n_failed})", self.n_files_given - n_failed, self.n_files_given);
        println!("Events processed: {}", g(self.n_events));
        println!("Steps accumulated: {} / {} (neutral {}, no deposit {}, outside detector {}, not sensitive {})",
                 g(self.steps.accumulated), g(self.steps.total()),
                 g(self.steps.neutral), g(self.steps.no_deposit),
                 g(self.steps.outside_partition), g(self.steps.not_sensitive));
        println!("Hits: {} pixel, {} scintillator", g(self.n_pixel_hits), g(self.n_scint_hits));
        for (file, error) in &self.failed_files {
            println!("Warning: failed to read {}: {error}", file.display());
        }
    }
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressStyle};
use pinpoint::{
    EventHits, StepStats,
    utils::group_digits as g,
};
