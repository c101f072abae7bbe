//! HDF5 tables: recorded MC steps and tracks in, hits and geometry out.
//!
//! All tables are 1-dimensional datasets of compound rows. Lengths are stored
//! in mm and energies in MeV, as `f32`.

use std::collections::HashMap;
use std::path::Path;

use itertools::Itertools;
use ndarray::{s, Array1};

use units::{mev, mev_, mm_, Length};
use geometry::{DetectorLayout, Point, ScintId, Touchable};

use crate::{
    ancestry::LineageFlags,
    config::{self, Bounds},
    error::Error,
    event::{EventHits, McEvent, TrackRecord},
    hit::{PixelHit, ScintHit},
    io::HitSink,
    step::{EventId, FourMomentum, SensitiveVolume, Step, TrackCreation, NO_PARENT},
};

pub fn read_table<T: hdf5::H5Type>(filename: impl AsRef<Path>, dataset: &str, rows: Bounds<usize>) -> hdf5::Result<Array1<T>> {
    let file = ::hdf5::File::open(filename)?;
    let dataset = file.dataset(dataset)?;
    let Bounds { min, max } = rows;
    let data = match (min, max) {
        (None    , None    ) => dataset.read_slice_1d::<T,_>(s![  ..  ])?,
        (Some(lo), None    ) => dataset.read_slice_1d::<T,_>(s![lo..  ])?,
        (None    , Some(hi)) => dataset.read_slice_1d::<T,_>(s![  ..hi])?,
        (Some(lo), Some(hi)) => dataset.read_slice_1d::<T,_>(s![lo..hi])?,
     };
    Ok(data)
}

// ----- MC input -------------------------------------------------------------------------------------------

pub const STEPS : &str = "MC/steps";
pub const TRACKS: &str = "MC/tracks";

/// Deepest touch history that fits in a `StepRow`
pub const MAX_DEPTH: usize = 4;

#[derive(hdf5::H5Type, Clone, Copy, PartialEq, Debug)]
#[repr(C)]
pub struct StepRow {
    pub event_id : u32,
    pub track_id : u32,
    pub parent_id: u32,
    pub pdg      : i32,
    pub charge   : f32,
    pub edep     : f32,
    pub x : f32, pub y : f32, pub z : f32,
    pub px: f32, pub py: f32, pub pz: f32, pub e: f32,
    /// 0: pixel, 1: scintillator
    pub volume   : u8,
    pub depth    : u8,
    pub copy_numbers: [i32; MAX_DEPTH],
}

#[derive(hdf5::H5Type, Clone, Copy, PartialEq, Eq, Debug)]
#[repr(C)]
pub struct TrackRow {
    pub event_id : u32,
    pub track_id : u32,
    pub parent_id: u32,
    pub pdg      : i32,
}

fn volume_code(volume: SensitiveVolume) -> u8 {
    match volume {
        SensitiveVolume::Pixel        => 0,
        SensitiveVolume::Scintillator => 1,
    }
}

impl StepRow {
    pub fn new(event_id: EventId, step: &Step) -> Self {
        let (x, y, z) = step.pre_position.to_mm();
        let (px, py, pz, e) = step.p4.to_mev();
        let mut copy_numbers = [0; MAX_DEPTH];
        let depth = step.touchable.depth().min(MAX_DEPTH);
        copy_numbers[..depth].copy_from_slice(&step.touchable.copy_numbers()[..depth]);
        Self {
            event_id,
            track_id : step.track_id,
            parent_id: step.parent_id,
            pdg      : step.pdg,
            charge   : step.charge as f32,
            edep     : mev_(step.edep) as f32,
            x: x as f32, y: y as f32, z: z as f32,
            px: px as f32, py: py as f32, pz: pz as f32, e: e as f32,
            volume: volume_code(step.volume),
            depth : depth as u8,
            copy_numbers,
        }
    }

    /// `None` if the volume code is not known
    pub fn step(&self) -> Option<Step> {
        let volume = match self.volume {
            0 => SensitiveVolume::Pixel,
            1 => SensitiveVolume::Scintillator,
            _ => return None,
        };
        let depth = (self.depth as usize).min(MAX_DEPTH);
        let f = |x: f32| x as f64;
        Some(Step {
            track_id    : self.track_id,
            parent_id   : self.parent_id,
            pdg         : self.pdg,
            charge      : f(self.charge),
            edep        : mev(f(self.edep)),
            pre_position: Point::from_mm(f(self.x), f(self.y), f(self.z)),
            p4          : FourMomentum::from_mev(f(self.px), f(self.py), f(self.pz), f(self.e)),
            volume,
            touchable   : Touchable::new(&self.copy_numbers[..depth]),
        })
    }
}

impl TrackRow {
    pub fn new(event_id: EventId, track: &TrackCreation) -> Self {
        let &TrackCreation { track_id, parent_id, pdg } = track;
        Self { event_id, track_id, parent_id, pdg }
    }
}

impl From<TrackRow> for TrackCreation {
    fn from(row: TrackRow) -> Self { TrackCreation::new(row.track_id, row.parent_id, row.pdg) }
}

/// Read recorded tracks and steps, grouped into events in order of first
/// appearance. Only events whose id lies in `events` are kept.
pub fn read_mc_events(path: impl AsRef<Path>, events: Bounds<EventId>) -> hdf5::Result<Vec<McEvent>> {
    let path = path.as_ref();
    let tracks = read_table::<TrackRow>(path, TRACKS, Bounds::none())?;
    let steps  = read_table::<StepRow >(path, STEPS , Bounds::none())?;

    let mut order: Vec<EventId> = vec![];
    let mut by_id: HashMap<EventId, McEvent> = HashMap::new();
    fn event<'m>(by_id: &'m mut HashMap<EventId, McEvent>, order: &mut Vec<EventId>, event_id: EventId) -> &'m mut McEvent {
        by_id.entry(event_id).or_insert_with(|| {
            order.push(event_id);
            McEvent { event_id, ..McEvent::default() }
        })
    }

    for (event_id, group) in &tracks.iter().filter(|r| events.contains(&r.event_id)).group_by(|r| r.event_id) {
        event(&mut by_id, &mut order, event_id).tracks.extend(group.map(|&row| TrackCreation::from(row)));
    }
    let mut unknown_volume = 0;
    for (event_id, group) in &steps.iter().filter(|r| events.contains(&r.event_id)).group_by(|r| r.event_id) {
        let target = event(&mut by_id, &mut order, event_id);
        for row in group {
            match row.step() {
                Some(step) => target.steps.push(step),
                None       => unknown_volume += 1,
            }
        }
    }
    if unknown_volume > 0 {
        println!("Warning: {}: ignored {unknown_volume} steps in unknown volumes", path.display());
    }
    Ok(order.into_iter().filter_map(|id| by_id.remove(&id)).collect())
}

/// Store `events` in the format read by `read_mc_events`
pub fn write_mc_events(path: impl AsRef<Path>, events: &[McEvent]) -> hdf5::Result<()> {
    let tracks: Vec<TrackRow> = events.iter()
        .flat_map(|e| e.tracks.iter().map(|t| TrackRow::new(e.event_id, t)))
        .collect();
    let steps: Vec<StepRow> = events.iter()
        .flat_map(|e| e.steps.iter().map(|s| StepRow::new(e.event_id, s)))
        .collect();
    let group = hdf5::File::create(path)?.create_group("MC")?;
    group.new_dataset_builder().with_data(&tracks).create("tracks")?;
    group.new_dataset_builder().with_data(&steps ).create("steps" )?;
    Ok(())
}

// ----- Hits output ----------------------------------------------------------------------------------------

pub const PIXEL_HITS: &str = "hits/pixel";
pub const SCINT_HITS: &str = "hits/scint";
pub const EVENTS    : &str = "hits/events";
pub const TRACKS_OUT: &str = "hits/tracks";

#[derive(hdf5::H5Type, Clone, PartialEq, Debug)]
#[repr(C)]
pub struct PixelHitRow {
    pub event_id : u32,
    pub layer    : u32,
    pub row      : u32,
    pub col      : u32,
    pub track_id : u32,
    pub parent_id: u32,
    pub pdg      : i32,
    pub charge   : f32,
    pub px: f32, pub py: f32, pub pz: f32, pub e: f32,
    pub x : f32, pub y : f32, pub z : f32,
    pub edep     : f32,
    pub n_steps  : u32,
    pub from_primary_lepton: bool,
    pub from_muon          : bool,
    pub from_primary_pizero: bool,
    pub from_fsl_pizero    : bool,
}

#[derive(hdf5::H5Type, Clone, PartialEq, Debug)]
#[repr(C)]
pub struct ScintHitRow {
    pub event_id : u32,
    pub layer    : u32,
    /// -1 in block geometry
    pub bar      : i32,
    pub track_id : u32,
    pub parent_id: u32,
    pub pdg      : i32,
    pub x : f32, pub y : f32, pub z : f32,
    pub edep     : f32,
    pub n_steps  : u32,
    pub from_primary_lepton: bool,
    pub from_muon          : bool,
    pub from_primary_pizero: bool,
    pub from_fsl_pizero    : bool,
}

#[derive(hdf5::H5Type, Clone, PartialEq, Debug)]
#[repr(C)]
pub struct EventRow {
    pub event_id         : u32,
    pub n_pixel_hits     : u32,
    pub n_scint_hits     : u32,
    pub pixel_edep       : f32,
    pub scint_edep       : f32,
    pub steps_accumulated: u32,
    pub steps_dropped    : u32,
}

/// Written only with `save_tracks`. Primaries are the rows with `parent_id` 0.
#[derive(hdf5::H5Type, Clone, PartialEq, Debug)]
#[repr(C)]
pub struct TrackRecordRow {
    pub event_id        : u32,
    pub track_id        : u32,
    pub parent_id       : u32,
    pub pdg             : i32,
    /// 0 when unknown
    pub primary_ancestor: u32,
    pub from_primary_lepton: bool,
    pub from_muon          : bool,
    pub from_primary_pizero: bool,
    pub from_fsl_pizero    : bool,
}

impl TrackRecordRow {
    pub fn new(event_id: EventId, track: &TrackRecord) -> Self {
        let &TrackRecord { track_id, parent_id, pdg, primary_ancestor, lineage } = track;
        let LineageFlags { from_primary_lepton, from_muon, from_primary_pizero, from_fsl_pizero } = lineage;
        Self {
            event_id, track_id, parent_id, pdg,
            primary_ancestor: primary_ancestor.unwrap_or(NO_PARENT),
            from_primary_lepton, from_muon, from_primary_pizero, from_fsl_pizero,
        }
    }
}

/// One-row summary of the detector the hits were produced with
#[derive(hdf5::H5Type, Clone, PartialEq, Debug)]
#[repr(C)]
pub struct DetectorRow {
    pub tungsten_thickness: f32,
    pub silicon_thickness : f32,
    pub layer_thickness   : f32,
    pub n_layers          : u32,
    pub pixel_width       : f32,
    pub pixel_height      : f32,
    pub n_cols            : u32,
    pub n_rows            : u32,
    pub width             : f32,
    pub height            : f32,
    pub sim_flag          : i32,
    pub scint_bars        : bool,
    pub n_scint_bars      : u32,
    pub scint_bar_width   : f32,
    pub scint_bar_height  : f32,
    pub scint_thickness   : f32,
}

fn f(l: Length) -> f32 { mm_(l) as f32 }

impl From<&DetectorLayout> for DetectorRow {
    fn from(l: &DetectorLayout) -> Self {
        Self {
            tungsten_thickness: f(l.tungsten_thickness),
            silicon_thickness : f(l.silicon_thickness),
            layer_thickness   : f(l.layer_thickness()),
            n_layers          : l.n_layers,
            pixel_width       : f(l.pixel_width),
            pixel_height      : f(l.pixel_height),
            n_cols            : l.n_cols(),
            n_rows            : l.n_rows(),
            width             : f(l.detector_width),
            height            : f(l.detector_height),
            sim_flag          : l.scint.sim_flag(),
            scint_bars        : l.scint_bars,
            n_scint_bars      : l.n_scint_bars().unwrap_or(0),
            scint_bar_width   : f(l.scint_bar_width),
            scint_bar_height  : f(l.scint_bar_height),
            scint_thickness   : f(l.scint_thickness),
        }
    }
}

impl PixelHitRow {
    pub fn new(event_id: EventId, hit: &PixelHit) -> Self {
        let (px, py, pz, e) = hit.p4.to_mev();
        let (x, y, z) = hit.truth_position.to_mm();
        let LineageFlags { from_primary_lepton, from_muon, from_primary_pizero, from_fsl_pizero } = hit.lineage;
        Self {
            event_id,
            layer    : hit.id.layer,
            row      : hit.id.row,
            col      : hit.id.col,
            track_id : hit.track_id,
            parent_id: hit.parent_id,
            pdg      : hit.pdg,
            charge   : hit.charge as f32,
            px: px as f32, py: py as f32, pz: pz as f32, e: e as f32,
            x : x  as f32, y : y  as f32, z : z  as f32,
            edep     : mev_(hit.edep) as f32,
            n_steps  : hit.n_steps,
            from_primary_lepton, from_muon, from_primary_pizero, from_fsl_pizero,
        }
    }
}

impl ScintHitRow {
    pub fn new(event_id: EventId, hit: &ScintHit) -> Self {
        let (x, y, z) = hit.truth_position.to_mm();
        let ScintId { layer, bar } = hit.id;
        let LineageFlags { from_primary_lepton, from_muon, from_primary_pizero, from_fsl_pizero } = hit.lineage;
        Self {
            event_id,
            layer,
            bar      : bar.map_or(-1, |b| b as i32),
            track_id : hit.track_id,
            parent_id: hit.parent_id,
            pdg      : hit.pdg,
            x: x as f32, y: y as f32, z: z as f32,
            edep     : mev_(hit.edep) as f32,
            n_steps  : hit.n_steps,
            from_primary_lepton, from_muon, from_primary_pizero, from_fsl_pizero,
        }
    }
}

impl From<&EventHits> for EventRow {
    fn from(event: &EventHits) -> Self {
        let scint = event.scint.as_ref();
        Self {
            event_id         : event.event_id,
            n_pixel_hits     : event.pixel.len() as u32,
            n_scint_hits     : scint.map_or(0, |s| s.len() as u32),
            pixel_edep       : mev_(event.pixel.total_energy()) as f32,
            scint_edep       : scint.map_or(0.0, |s| mev_(s.total_energy()) as f32),
            steps_accumulated: event.steps.accumulated as u32,
            steps_dropped    : event.steps.dropped() as u32,
        }
    }
}

/// Growable dataset, written one chunk at a time
struct Appender<T> {
    dataset   : hdf5::Dataset,
    buffer    : Vec<T>,
    chunk_size: usize,
}

impl<T: hdf5::H5Type> Appender<T> {
    fn create(group: &hdf5::Group, name: &str, chunk_size: usize) -> hdf5::Result<Self> {
        let dataset = group
            .new_dataset::<T>()
            .chunk(chunk_size)
            .shape(0..)
            .create(name)?;
        Ok(Self { dataset, buffer: Vec::with_capacity(chunk_size), chunk_size })
    }

    fn extend(&mut self, rows: impl IntoIterator<Item = T>) -> hdf5::Result<()> {
        self.buffer.extend(rows);
        if self.buffer.len() >= self.chunk_size { self.flush()? }
        Ok(())
    }

    fn flush(&mut self) -> hdf5::Result<()> {
        if self.buffer.is_empty() { return Ok(()) }
        let old_size = self.dataset.shape()[0];
        self.dataset.resize(old_size + self.buffer.len())?;
        self.dataset.write_slice(&self.buffer, old_size..)?;
        self.buffer.clear();
        Ok(())
    }
}

/// Writes hits, per-event summaries and (optionally) the detector geometry to
/// an HDF5 file. Rows are buffered: call `finish` before dropping.
pub struct Hdf5Sink {
    pixel : Appender<PixelHitRow>,
    scint : Appender<ScintHitRow>,
    events: Appender<EventRow>,
    tracks: Option<Appender<TrackRecordRow>>,
    _file : hdf5::File,
}

impl Hdf5Sink {
    pub fn create(path: impl AsRef<Path>, layout: &DetectorLayout, output: &config::Output) -> hdf5::Result<Self> {
        let file = hdf5::File::create(path)?;
        if output.save_geometry { write_geometry(&file, layout)? }
        let chunk_size = output.chunk_size.max(1);
        let hits = file.create_group("hits")?;
        Ok(Self {
            pixel : Appender::create(&hits, "pixel" , chunk_size)?,
            scint : Appender::create(&hits, "scint" , chunk_size)?,
            events: Appender::create(&hits, "events", chunk_size)?,
            tracks: if output.save_tracks { Some(Appender::create(&hits, "tracks", chunk_size)?) } else { None },
            _file : file,
        })
    }
}

impl HitSink for Hdf5Sink {
    fn write_event(&mut self, event: &EventHits) -> Result<(), Error> {
        let id = event.event_id;
        self.pixel.extend(event.pixel.iter().map(|h| PixelHitRow::new(id, h)))?;
        if let Some(scint) = &event.scint {
            self.scint.extend(scint.iter().map(|h| ScintHitRow::new(id, h)))?;
        }
        self.events.extend([EventRow::from(event)])?;
        if let Some(tracks) = &mut self.tracks {
            tracks.extend(event.tracks.iter().map(|t| TrackRecordRow::new(id, t)))?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        self.pixel .flush()?;
        self.scint .flush()?;
        self.events.flush()?;
        if let Some(tracks) = &mut self.tracks { tracks.flush()? }
        Ok(())
    }
}

fn write_geometry(file: &hdf5::File, layout: &DetectorLayout) -> hdf5::Result<()> {
    let group = file.create_group("geometry")?;
    let mm = |ls: Vec<Length>| ls.into_iter().map(f).collect::<Vec<f32>>();
    group.new_dataset_builder().with_data(&[DetectorRow::from(layout)]).create("detector")?;
    group.new_dataset_builder().with_data(&mm(layout.pixel_x_positions())).create("pixel_x")?;
    group.new_dataset_builder().with_data(&mm(layout.pixel_y_positions())).create("pixel_y")?;
    group.new_dataset_builder().with_data(&mm(layout.pixel_z_positions())).create("pixel_z")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use geometry::{PixelId, PixelPartition, ScintOption, ScintPartition};
    use crate::event::EventProcessor;
    use crate::step::pdg;

    fn step(track_id: u32, volume: SensitiveVolume, touchable: Touchable, e: f64) -> Step {
        Step {
            track_id, parent_id: 1, pdg: pdg::ELECTRON, charge: -1.0, edep: mev(e),
            pre_position: Point::from_mm(1.5, -2.5, 30.0),
            p4: FourMomentum::from_mev(0.5, 0.25, 10.0, 10.5),
            volume, touchable,
        }
    }

    fn events() -> Vec<McEvent> {
        let pixel = |layer, row, col| PixelPartition::touchable(PixelId { layer, row, col });
        let bar   = |bar| ScintPartition::touchable(ScintId { layer: 0, bar: Some(bar) });
        vec![
            McEvent {
                event_id: 7,
                tracks: vec![TrackCreation::new(1, 0, pdg::MUON), TrackCreation::new(2, 1, pdg::ELECTRON)],
                steps : vec![
                    step(2, SensitiveVolume::Pixel       , pixel(0, 1, 2), 0.5),
                    step(2, SensitiveVolume::Pixel       , pixel(0, 1, 2), 0.25),
                    step(1, SensitiveVolume::Scintillator, bar(3)        , 2.0),
                ],
            },
            McEvent {
                event_id: 3,
                tracks: vec![TrackCreation::new(1, 0, 2212)],
                steps : vec![step(1, SensitiveVolume::Pixel, pixel(4, 5, 6), 1.0)],
            },
        ]
    }

    #[test]
    fn mc_events_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("mc.h5");
        let original = events();
        write_mc_events(&path, &original)?;

        let all = read_mc_events(&path, Bounds::none())?;
        // Values representable in f32 survive unchanged
        assert_eq!(all, original);

        let some = read_mc_events(&path, Bounds::new(0, 5))?;
        assert_eq!(some.len(), 1);
        assert_eq!(some[0].event_id, 3);
        Ok(())
    }

    #[test]
    fn step_rows_reject_unknown_volumes() {
        let s = step(1, SensitiveVolume::Scintillator, Touchable::new([1, 2]), 1.0);
        let mut row = StepRow::new(0, &s);
        assert_eq!(row.step(), Some(s));
        row.volume = 9;
        assert_eq!(row.step(), None);
    }

    #[test]
    fn hits_written_in_chunks() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("hits.h5");
        let layout = DetectorLayout { n_layers: 5, scint: ScintOption::Single, ..DetectorLayout::default() };
        let output = config::Output { save_geometry: true, save_tracks: true, chunk_size: 1 };

        let mut processor = EventProcessor::with_layout(&layout, &config::Readout::default());
        {
            let mut sink = Hdf5Sink::create(&path, &layout, &output)?;
            for event in events() { sink.write_event(&processor.process_event(&event)?)?; }
            sink.finish()?;
        }

        let pixel = read_table::<PixelHitRow>(&path, PIXEL_HITS, Bounds::none())?.to_vec();
        let scint = read_table::<ScintHitRow>(&path, SCINT_HITS, Bounds::none())?.to_vec();
        let evts  = read_table::<EventRow   >(&path, EVENTS    , Bounds::none())?.to_vec();

        assert_eq!(pixel.len(), 2);
        assert_eq!((pixel[0].event_id, pixel[0].layer, pixel[0].row, pixel[0].col), (7, 0, 1, 2));
        assert_eq!(pixel[0].edep, 0.75);
        assert_eq!(pixel[0].n_steps, 2);
        assert!(pixel[0].from_primary_lepton && pixel[0].from_muon);
        assert_eq!((pixel[1].event_id, pixel[1].layer), (3, 4));
        assert!(!pixel[1].from_muon);

        assert_eq!(scint.len(), 1);
        assert_eq!((scint[0].event_id, scint[0].bar, scint[0].edep), (7, 3, 2.0));

        let ids: Vec<_> = evts.iter().map(|e| (e.event_id, e.n_pixel_hits, e.n_scint_hits)).collect();
        assert_eq!(ids, vec![(7, 1, 1), (3, 1, 0)]);

        let tracks = read_table::<TrackRecordRow>(&path, TRACKS_OUT, Bounds::none())?.to_vec();
        let rows: Vec<_> = tracks.iter().map(|t| (t.event_id, t.track_id, t.parent_id, t.pdg, t.primary_ancestor)).collect();
        assert_eq!(rows, vec![(7, 1, 0, pdg::MUON, 1), (7, 2, 1, pdg::ELECTRON, 1), (3, 1, 0, 2212, 1)]);
        assert!(tracks[1].from_muon && !tracks[2].from_muon);
        let primaries = tracks.iter().filter(|t| t.parent_id == 0).count();
        assert_eq!(primaries, 2);

        let detector = read_table::<DetectorRow>(&path, "geometry/detector", Bounds::none())?;
        assert_eq!(detector[0].n_layers, 5);
        assert_eq!(detector[0].n_scint_bars, 20);
        let z = read_table::<f32>(&path, "geometry/pixel_z", Bounds::none())?;
        assert_eq!(z.len(), 5);
        let x = read_table::<f32>(&path, "geometry/pixel_x", Bounds::new(0, 3))?;
        assert_eq!(x.len(), 3);
        Ok(())
    }

    #[test]
    fn geometry_is_optional() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("hits.h5");
        let output = config::Output { save_geometry: false, save_tracks: false, chunk_size: 100 };
        Hdf5Sink::create(&path, &DetectorLayout::default(), &output)?.finish()?;
        assert!(read_table::<DetectorRow>(&path, "geometry/detector", Bounds::none()).is_err());
        assert_eq!(read_table::<EventRow>(&path, EVENTS, Bounds::none())?.len(), 0);
        assert!(read_table::<TrackRecordRow>(&path, TRACKS_OUT, Bounds::none()).is_err());
        Ok(())
    }
}
