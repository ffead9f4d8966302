//! Serializable summaries written by the command-line tools.

use super::timing::TimingBreakdown;
use crate::card::{BatchSummary, CardMetric, DropletStatistics, SprayCard, SprayCardSet};
use crate::profile::{DepositionProfile, Sample, Series};
use crate::swath::{CvTable, FlightMode, DEFAULT_CV_LIMIT_PCT};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardReport {
    pub name: String,
    pub location: f64,
    pub unit: &'static str,
    pub include_in_composite: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size: Option<[usize; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_used: Option<u8>,
    /// `None` for cards that were not processed.
    pub statistics: Option<DropletStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_below_141um_pct: Option<f64>,
    pub stains_per_cm2: Option<f64>,
}

/// Volume fraction below this diameter is the usual drift-potential figure.
const DRIFTABLE_DIAMETER_UM: f64 = 141.0;

impl CardReport {
    pub fn from_card(card: &SprayCard) -> Self {
        let stats = card.statistics().ok().cloned();
        Self {
            name: card.name.clone(),
            location: card.location,
            unit: card.location_unit.label(),
            include_in_composite: card.include_in_composite,
            image_size: card.stains().map(|s| [s.width, s.height]),
            threshold_used: card.stains().and_then(|s| s.threshold_used),
            volume_below_141um_pct: stats
                .as_ref()
                .and_then(|s| s.volume_fraction_below(DRIFTABLE_DIAMETER_UM)),
            stains_per_cm2: stats.as_ref().map(DropletStatistics::stains_per_cm2),
            statistics: stats,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileReport {
    pub name: String,
    pub unit: &'static str,
    pub samples: Vec<Sample>,
}

impl ProfileReport {
    pub fn new(name: impl Into<String>, unit: &'static str, samples: Vec<Sample>) -> Self {
        Self {
            name: name.into(),
            unit,
            samples,
        }
    }

    /// Conditioned curve of `profile`, empty when conditioning fails.
    pub fn conditioned(profile: &DepositionProfile) -> Self {
        Self::new(
            profile.name.clone(),
            profile.unit.label(),
            profile.conditioned().unwrap_or_default(),
        )
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSetReport {
    pub name: String,
    pub cards: Vec<CardReport>,
    pub batch: BatchSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite: Option<ProfileReport>,
    pub timings: TimingBreakdown,
}

impl CardSetReport {
    pub fn new(
        set: &SprayCardSet,
        batch: BatchSummary,
        metric: Option<CardMetric>,
        timings: TimingBreakdown,
    ) -> Self {
        let composite = metric
            .and_then(|m| set.composite_profile(m).ok())
            .map(|p| ProfileReport::new(p.name.clone(), p.unit.label(), p.raw().to_vec()));
        Self {
            name: set.name.clone(),
            cards: set.cards.iter().map(CardReport::from_card).collect(),
            batch,
            composite,
            timings,
        }
    }
}

/// CV at the adjusted swath and the widest swath within the CV limit, for
/// one flight mode.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlineCv {
    pub mode: FlightMode,
    pub swath_width: f64,
    pub cv: Option<f64>,
    pub effective_swath: Option<f64>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesReport {
    pub name: String,
    pub unit: &'static str,
    pub passes: Vec<ProfileReport>,
    pub average: Vec<Sample>,
    pub headline: Vec<HeadlineCv>,
    pub cv_table: CvTable,
    pub timings: TimingBreakdown,
}

impl SeriesReport {
    pub fn build(series: &Series) -> Self {
        let mut timings = TimingBreakdown::default();
        let passes: Vec<ProfileReport> = timings.time("condition", || {
            series.profiles.iter().map(ProfileReport::conditioned).collect()
        });
        let average = timings.time("average", || series.average_profile().unwrap_or_default());
        let cv_table = timings.time("sweep", || series.cv_table());
        let adjusted = series.options.swath.adjusted_swath;
        let headline = [FlightMode::Racetrack, FlightMode::BackAndForth]
            .into_iter()
            .map(|mode| HeadlineCv {
                mode,
                swath_width: adjusted,
                cv: series.cv_at(adjusted, mode),
                effective_swath: cv_table.widest_swath_within(mode, DEFAULT_CV_LIMIT_PCT),
            })
            .collect();
        Self {
            name: series.name.clone(),
            unit: series.options.swath.unit.label(),
            passes,
            average,
            headline,
            cv_table,
            timings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_report_has_no_data() {
        let report = SeriesReport::build(&Series::new("none"));
        assert!(report.average.is_empty());
        assert!(report.headline.iter().all(|h| h.cv.is_none()));
        assert!(report.headline.iter().all(|h| h.effective_swath.is_none()));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["unit"], "ft");
        assert_eq!(json["headline"][1]["mode"], "back-and-forth");
    }

    #[test]
    fn unprocessed_card_reports_no_statistics() {
        let report = CardReport::from_card(&SprayCard::new("c", 1.0));
        assert!(report.statistics.is_none());
        assert!(report.stains_per_cm2.is_none());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("imageSize").is_none());
        assert!(json["statistics"].is_null());
    }
}
