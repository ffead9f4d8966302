//! Deposition profiles: raw pass traces, their conditioning pipeline and the
//! series-level average fed to the swath simulator.
//!
//! Overview
//! - [`types`]: samples, units, conditioning parameters and
//!   [`DepositionProfile`], which keeps its raw samples untouched.
//! - [`conditioner`]: trim / rebase / vertical floor / centering / smoothing,
//!   always applied in that order.
//! - [`savgol`]: Savitzky–Golay smoothing used by the conditioner.
//! - [`aggregate`]: integral equalization and the column-wise average.
//! - [`interp`]: interpolation and integration helpers shared with the
//!   swath simulator.
//! - [`series`]: passes plus swath settings; CV table and point queries.
pub mod aggregate;
pub mod conditioner;
pub mod interp;
pub mod savgol;
pub mod series;
pub mod types;

pub use aggregate::{average_profiles, equalize_integrals, ProfileAggregator};
pub use conditioner::condition;
pub use series::{Series, SeriesOptions};
pub use types::{CenterMethod, DepositionProfile, LengthUnit, ProfileParams, Sample, ShiftMode};
