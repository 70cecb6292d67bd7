use serde::{Serialize, Serializer};

use crate::{
    month::Month,
    quantity::{cost::Cost, distance::Miles, energy::KilowattHours, rate::KilowattHourRate},
    report::Report,
    summary::MonthlyAggregate,
};

/// Published JSON document.
#[derive(Serialize)]
pub struct Document {
    pub last_updated: String,
    pub data: Vec<Row>,
}

impl From<&Report> for Document {
    fn from(report: &Report) -> Self {
        Self {
            last_updated: report.generated_at.format("%Y-%m-%d %H:%M:%S %Z").to_string(),
            data: report.rows.iter().map(Row::from).collect(),
        }
    }
}

/// One month, rounded for presentation.
#[derive(Serialize)]
pub struct Row {
    pub month: Month,
    pub kwh: KilowattHours,
    pub cost: Cost,
    pub cost_per_kwh: Option<KilowattHourRate>,
    pub home_sessions: usize,
    pub away_sessions: usize,

    #[serde(serialize_with = "serialize_miles")]
    pub odometer: Option<Miles>,

    #[serde(serialize_with = "serialize_miles")]
    pub odometer_delta: Option<Miles>,

    #[serde(serialize_with = "serialize_percent")]
    pub yoy_kwh_percent: Option<f64>,

    #[serde(serialize_with = "serialize_percent")]
    pub yoy_cost_percent: Option<f64>,
}

impl From<&MonthlyAggregate> for Row {
    fn from(aggregate: &MonthlyAggregate) -> Self {
        Self {
            month: aggregate.month,
            kwh: aggregate.total_kwh.round_to(2),
            cost: aggregate.total_cost.round_to_cents(),
            cost_per_kwh: aggregate.average_cost_per_kwh.map(|rate| rate.round_to(4)),
            home_sessions: aggregate.home_sessions,
            away_sessions: aggregate.away_sessions,
            odometer: aggregate.odometer,
            odometer_delta: aggregate.odometer_delta,
            yoy_kwh_percent: aggregate.yoy_kwh_percent,
            yoy_cost_percent: aggregate.yoy_cost_percent,
        }
    }
}

/// Serialize to a tenth of a mile.
#[expect(clippy::ref_option)]
fn serialize_miles<S: Serializer>(miles: &Option<Miles>, serializer: S) -> Result<S::Ok, S::Error> {
    miles.map(|miles| (miles.0 * 10.0).round() / 10.0).serialize(serializer)
}

/// Serialize to a whole percent.
#[expect(clippy::ref_option)]
fn serialize_percent<S: Serializer>(
    percent: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    percent.map(f64::round).serialize(serializer)
}
