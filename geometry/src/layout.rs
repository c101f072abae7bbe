//! Placement arithmetic of the layered tungsten/silicon detector.
//!
//! The detector is a stack of `n_layers` identical layers along `z`. Each
//! layer holds a tungsten radiator, a silicon plane finely segmented into
//! pixels (rows along `y`, columns along `x`) and an air gap. Optionally one
//! or two scintillator layers, either solid blocks or segmented into bars,
//! sit behind the stack.
//!
//! Nothing here builds volumes: this only answers questions about sizes,
//! element counts and element centres, which are needed to validate detector
//! element identifiers and to describe the geometry in output files.

use units::{mm, whole_pitches, cm, um, Length};

/// Presence and multiplicity of scintillator layers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScintOption {
    None,
    #[default]
    Single,
    Double,
}

impl ScintOption {

    /// Interpret the integer simulation flag used in macros and output files:
    /// -1: no scintillator, 0: one layer, 1: two layers
    pub fn from_sim_flag(flag: i32) -> Option<Self> {
        match flag {
            -1 => Some(Self::None),
             0 => Some(Self::Single),
             1 => Some(Self::Double),
             _ => None,
        }
    }

    pub fn sim_flag(self) -> i32 {
        match self {
            Self::None   => -1,
            Self::Single =>  0,
            Self::Double =>  1,
        }
    }

    pub fn n_layers(self) -> u32 {
        match self {
            Self::None   => 0,
            Self::Single => 1,
            Self::Double => 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DetectorLayout {
    pub tungsten_thickness: Length,
    pub silicon_thickness : Length,
    pub n_layers          : u32,
    pub pixel_width       : Length,
    pub pixel_height      : Length,
    pub detector_width    : Length,
    pub detector_height   : Length,
    pub scint             : ScintOption,
    /// Segment scintillator layers into bars, rather than solid blocks
    pub scint_bars        : bool,
    pub scint_bar_width   : Length,
    pub scint_bar_height  : Length,
    pub scint_thickness   : Length,
}

impl Default for DetectorLayout {
    fn default() -> Self {
        Self {
            tungsten_thickness: mm(5.0),
            silicon_thickness : um(50.0),
            n_layers          : 100,
            pixel_width       : um(20.8),
            pixel_height      : um(22.8),
            detector_width    : cm(26.6),
            detector_height   : cm(19.6),
            scint             : ScintOption::Single,
            scint_bars        : true,
            scint_bar_width   : mm(9.85),
            scint_bar_height  : mm(9.80),
            scint_thickness   : mm(5.0),
        }
    }
}

/// Centres, along `z`, of the volumes of one detector layer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerPlacement {
    pub layer     : u32,
    pub tungsten_z: Length,
    pub silicon_z : Length,
}

impl DetectorLayout {

    /// Number of pixel columns (replicas along `x`) per silicon plane
    pub fn n_cols(&self) -> u32 { whole_pitches(self.detector_width , self.pixel_width ) }

    /// Number of pixel rows (replicas along `y`) per silicon plane
    pub fn n_rows(&self) -> u32 { whole_pitches(self.detector_height, self.pixel_height) }

    pub fn n_scint_layers(&self) -> u32 { self.scint.n_layers() }

    /// Bars per scintillator layer; `None` for solid block geometry
    pub fn n_scint_bars(&self) -> Option<u32> {
        if self.scint_bars { Some(whole_pitches(self.detector_height, self.scint_bar_height)) }
        else               { None }
    }

    /// Air gap following the silicon plane
    pub fn box_thickness(&self) -> Length { self.tungsten_thickness - self.silicon_thickness }

    pub fn layer_thickness(&self) -> Length {
        self.tungsten_thickness + self.box_thickness() + self.silicon_thickness
    }

    pub fn detector_thickness(&self) -> Length { self.layer_thickness() * self.n_layers as f64 }

    /// Centres of the pixel columns, relative to the detector axis
    pub fn pixel_x_positions(&self) -> Vec<Length> {
        centres(self.detector_width, self.pixel_width, self.n_cols())
    }

    /// Centres of the pixel rows, relative to the detector axis
    pub fn pixel_y_positions(&self) -> Vec<Length> {
        centres(self.detector_height, self.pixel_height, self.n_rows())
    }

    /// Nominal `z` of each silicon plane: planes are spaced by one radiator
    /// plus one plane, and centred on `z = 0`.
    pub fn pixel_z_positions(&self) -> Vec<Length> {
        let spacing = self.tungsten_thickness + self.silicon_thickness;
        let start = -(spacing * (self.n_layers as f64 - 1.0)) / 2.0;
        (0..self.n_layers)
            .map(|i| start + spacing * i as f64)
            .collect()
    }

    /// Placement of the tungsten and silicon of every layer, in the world
    /// frame where the front face of the first layer is at `z = 0`.
    pub fn layer_placements(&self) -> impl Iterator<Item = LayerPlacement> + '_ {
        let lt = self.layer_thickness();
        (0..self.n_layers).map(move |layer| {
            let front = lt * layer as f64;
            LayerPlacement {
                layer,
                tungsten_z: front + self.tungsten_thickness / 2.0,
                silicon_z : front + self.tungsten_thickness + self.silicon_thickness / 2.0,
            }
        })
    }

    /// Human-readable descriptions of everything that makes this layout unusable
    pub fn problems(&self) -> Vec<String> {
        let mut problems = vec![];
        let zero = mm(0.0);
        let mut positive = |name: &str, value: Length| {
            if !(value > zero) { problems.push(format!("{name} must be positive")) }
        };
        positive("tungsten thickness", self.tungsten_thickness);
        positive("silicon thickness" , self.silicon_thickness);
        positive("pixel width"       , self.pixel_width);
        positive("pixel height"      , self.pixel_height);
        positive("detector width"    , self.detector_width);
        positive("detector height"   , self.detector_height);
        if self.scint != ScintOption::None {
            positive("scintillator thickness", self.scint_thickness);
            if self.scint_bars {
                positive("scintillator bar width" , self.scint_bar_width);
                positive("scintillator bar height", self.scint_bar_height);
            }
        }
        if !problems.is_empty() { return problems }

        if self.n_layers == 0 { problems.push("number of layers must be positive".into()) }
        if self.silicon_thickness > self.tungsten_thickness {
            problems.push("silicon must not be thicker than tungsten".into())
        }
        if self.n_cols() == 0 { problems.push("pixel wider than detector".into()) }
        if self.n_rows() == 0 { problems.push("pixel taller than detector".into()) }
        if self.n_scint_layers() > 0 && self.n_scint_bars() == Some(0) {
            problems.push("scintillator bar taller than detector".into())
        }
        problems
    }
}

fn centres(extent: Length, pitch: Length, n: u32) -> Vec<Length> {
    let start = -extent / 2.0 + pitch / 2.0;
    (0..n).map(|i| start + pitch * i as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use units::{mm_, um_, float_eq::assert_float_eq};

    #[test]
    fn default_pixel_counts() {
        let l = DetectorLayout::default();
        assert_eq!(l.n_cols(), 12788);
        assert_eq!(l.n_rows(),  8596);
        assert_eq!(l.n_scint_bars(), Some(20));
        assert_eq!(l.n_scint_layers(), 1);
    }

    #[test]
    fn layer_thickness_includes_air_gap() {
        let l = DetectorLayout::default();
        assert_float_eq!(mm_(l.box_thickness())     ,    4.95, r2nd <= 1e-12);
        assert_float_eq!(mm_(l.layer_thickness())   ,   10.0 , r2nd <= 1e-12);
        assert_float_eq!(mm_(l.detector_thickness()), 1000.0 , r2nd <= 1e-12);
    }

    #[test]
    fn pixel_centres_are_symmetric() {
        let l = DetectorLayout {
            detector_width: mm(1.0), pixel_width: um(250.0),
            ..DetectorLayout::default()
        };
        let xs: Vec<f64> = l.pixel_x_positions().into_iter().map(um_).collect();
        assert_eq!(xs.len(), 4);
        for (x, expected) in xs.iter().zip([-375.0, -125.0, 125.0, 375.0]) {
            assert_float_eq!(*x, expected, abs <= 1e-9);
        }
    }

    #[test]
    fn pixel_planes_centred_on_origin() {
        let l = DetectorLayout { n_layers: 3, ..DetectorLayout::default() };
        let zs: Vec<f64> = l.pixel_z_positions().into_iter().map(mm_).collect();
        for (z, expected) in zs.iter().zip([-5.05, 0.0, 5.05]) {
            assert_float_eq!(*z, expected, abs <= 1e-9);
        }
    }

    #[test]
    fn layer_placements_start_at_front_face() {
        let l = DetectorLayout { n_layers: 2, ..DetectorLayout::default() };
        let p: Vec<_> = l.layer_placements().collect();
        assert_eq!(p.len(), 2);
        assert_float_eq!(mm_(p[0].tungsten_z),  2.5  , abs <= 1e-9);
        assert_float_eq!(mm_(p[0].silicon_z ),  5.025, abs <= 1e-9);
        assert_float_eq!(mm_(p[1].tungsten_z), 12.5  , abs <= 1e-9);
    }

    #[rstest]
    #[case(-1, Some(ScintOption::None  ))]
    #[case( 0, Some(ScintOption::Single))]
    #[case( 1, Some(ScintOption::Double))]
    #[case( 2, None)]
    fn sim_flag_roundtrip(#[case] flag: i32, #[case] expected: Option<ScintOption>) {
        let option = ScintOption::from_sim_flag(flag);
        assert_eq!(option, expected);
        if let Some(option) = option { assert_eq!(option.sim_flag(), flag) }
    }

    #[test]
    fn default_layout_has_no_problems() {
        assert_eq!(DetectorLayout::default().problems(), Vec::<String>::new());
    }

    #[test]
    fn problems_are_reported() {
        let l = DetectorLayout {
            n_layers: 0,
            pixel_width: cm(30.0),
            ..DetectorLayout::default()
        };
        assert_eq!(l.problems(), vec![
            "number of layers must be positive".to_string(),
            "pixel wider than detector".to_string(),
        ]);
        let l = DetectorLayout { tungsten_thickness: mm(-1.0), ..DetectorLayout::default() };
        assert_eq!(l.problems(), vec!["tungsten thickness must be positive".to_string()]);
    }

    #[test]
    fn block_scintillator_has_no_bars() {
        let l = DetectorLayout { scint_bars: false, ..DetectorLayout::default() };
        assert_eq!(l.n_scint_bars(), None);
    }
}
