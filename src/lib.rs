mod exports;
pub use exports::*;

pub mod step;
pub mod ancestry;
pub mod accumulator;
pub mod hit;
pub mod sensitive;
pub mod event;
pub mod error;
pub mod config;
pub mod io;
pub mod utils;
