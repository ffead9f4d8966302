//! Swath simulation: overlapping-pass deposition and its uniformity.
//!
//! - [`simulate`](simulate::simulate) sums shifted (and, for back-and-forth
//!   flight, mirrored) copies of an averaged profile and reports the CV inside
//!   the central swath.
//! - [`cv_table`](sweep::cv_table) repeats that for a range of swath widths in
//!   both flight modes.
pub mod simulate;
pub mod sweep;

pub use simulate::{
    cv_within_swath, mirrored, pass_is_mirrored, simulate, simulated_cv, FlightMode,
    SwathSimulation,
};
pub use sweep::{
    cv_table, CvCell, CvRow, CvTable, SwathSettings, SweepOptions, DEFAULT_CV_LIMIT_PCT,
    DEFAULT_SWEEP_ROWS, DEFAULT_SWEEP_STEP,
};
