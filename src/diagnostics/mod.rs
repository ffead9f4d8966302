//! Reports and stage timings emitted by the command-line tools.
pub mod report;
pub mod timing;

pub use report::{CardReport, CardSetReport, HeadlineCv, ProfileReport, SeriesReport};
pub use timing::{StageTiming, TimingBreakdown};
