//! Physical quantities used throughout the hit bookkeeping.
//!
//! Everything is a `uom` `f64` quantity in the SI system. The pithily-named
//! constructors (`mm`, `mev`, ...) and extractors (`mm_`, `mev_`, ...) keep
//! call sites readable, which `Quantity::new::<uom::si::length::millimeter>`
//! does not.

pub use uom;
pub use float_eq;

pub use uom::si::Quantity;
pub use uom::ConstZero;
pub use uom::si::f64::{Length, Energy, Ratio};

pub mod unit {
  pub use uom::si::{length::{micrometer, millimeter, centimeter, meter},
                    energy::{kiloelectronvolt, megaelectronvolt, gigaelectronvolt},
                    ratio ::ratio,
  };
}

/// Generate a function called NAME which returns QUANTITY by interpreting its
/// argument as UNIT
///
/// wrap!(NAME QUANTITY UNIT);
macro_rules! wrap {
  ($name:ident $quantity:ident $unit:ident ) => {
    pub fn $name(x: f64) -> $quantity { $quantity::new::<unit::$unit>(x) }
  };
}

wrap!(um     Length        micrometer);
wrap!(mm     Length        millimeter);
wrap!(cm     Length        centimeter);
wrap!(m      Length             meter);
wrap!(kev    Energy  kiloelectronvolt);
wrap!(mev    Energy  megaelectronvolt);
wrap!(gev    Energy  gigaelectronvolt);
wrap!(ratio  Ratio              ratio);

// Reverse direction of the above.
pub fn um_ (x: Length) -> f64 { x.get::<unit::micrometer>() }
pub fn mm_ (x: Length) -> f64 { x.get::<unit::millimeter>() }
pub fn cm_ (x: Length) -> f64 { x.get::<unit::centimeter>() }
pub fn kev_(x: Energy) -> f64 { x.get::<unit::kiloelectronvolt>() }
pub fn mev_(x: Energy) -> f64 { x.get::<unit::megaelectronvolt>() }
pub fn gev_(x: Energy) -> f64 { x.get::<unit::gigaelectronvolt>() }

pub fn ratio_(x: Ratio) -> f64 { x.get::<unit::ratio>() }

/// How many whole `pitch`es fit into `extent`.
///
/// Replicated volumes (pixels along a row, bars in a layer) only exist where
/// a complete element fits, so partial elements are discarded.
pub fn whole_pitches(extent: Length, pitch: Length) -> u32 {
  let n = ratio_(extent / pitch);
  // Guard against 26.6 cm / 20.8 um landing a hair below an exact integer
  let n = if (n - n.round()).abs() < 1e-9 { n.round() } else { n.floor() };
  if n.is_finite() && n > 0.0 { n as u32 } else { 0 }
}

#[macro_export]
macro_rules! assert_uom_eq {
  ($unit:ident, $lhs:expr, $rhs:expr, $algo:ident <= $tol:expr) => {
    $crate::float_eq::assert_float_eq!($lhs.get::<$crate::unit::$unit>(), $rhs.get::<$crate::unit::$unit>(), $algo <= $tol)
  };
}
