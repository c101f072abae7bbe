use units::{mm, mm_, Length};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: Length,
    pub y: Length,
    pub z: Length,
}

impl Point {
    pub fn new(x: Length, y: Length, z: Length) -> Self { Self { x, y, z } }

    /// Construct from `f64`s which are interpreted as lengths in `mm`
    pub fn from_mm(x: f64, y: f64, z: f64) -> Self { Self::new(mm(x), mm(y), mm(z)) }

    /// Components in `mm`, for writing to tables which cannot hold `uom` types
    pub fn to_mm(self) -> (f64, f64, f64) { (mm_(self.x), mm_(self.y), mm_(self.z)) }
}
