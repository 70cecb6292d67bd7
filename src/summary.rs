use std::collections::BTreeMap;

use crate::{
    history::ChargingSession,
    month::{Month, MonthWindow},
    quantity::{cost::Cost, distance::Miles, energy::KilowattHours, rate::KilowattHourRate},
};

/// Charging totals of one calendar month.
#[must_use]
#[derive(Clone, Debug)]
pub struct MonthlyAggregate {
    pub month: Month,
    pub total_kwh: KilowattHours,
    pub total_cost: Cost,
    pub average_cost_per_kwh: Option<KilowattHourRate>,
    pub home_kwh: KilowattHours,
    pub home_cost: Cost,
    pub home_sessions: usize,
    pub away_sessions: usize,

    /// Highest odometer reading within the month.
    pub odometer: Option<Miles>,

    /// Distance driven since the last reading before the month.
    pub odometer_delta: Option<Miles>,

    /// Percentage change against the same month a year earlier.
    pub yoy_kwh_percent: Option<f64>,

    /// Percentage change against the same month a year earlier.
    pub yoy_cost_percent: Option<f64>,
}

impl MonthlyAggregate {
    pub const fn n_sessions(&self) -> usize {
        self.home_sessions + self.away_sessions
    }
}

#[derive(Copy, Clone, Default)]
struct Totals {
    energy: KilowattHours,
    cost: Cost,
    home_energy: KilowattHours,
    home_cost: Cost,
    home_sessions: usize,
    away_sessions: usize,
    odometer: Option<Miles>,
}

impl Totals {
    fn add(&mut self, session: &ChargingSession) {
        self.energy += session.energy;
        self.cost += session.cost;
        if session.is_home() {
            self.home_energy += session.energy;
            self.home_cost += session.cost;
            self.home_sessions += 1;
        } else {
            self.away_sessions += 1;
        }
        self.odometer = max_reading(self.odometer, session.odometer);
    }

    const fn n_sessions(&self) -> usize {
        self.home_sessions + self.away_sessions
    }
}

/// Roll the sessions up into one row per month of the window, oldest first.
///
/// Sessions are attributed to the month of their start, and months without sessions get
/// zero-valued rows. Sessions outside the window still feed the year-over-year deltas
/// and odometer deltas.
pub fn aggregate(sessions: &[ChargingSession], window: MonthWindow) -> Vec<MonthlyAggregate> {
    let mut totals = BTreeMap::<Month, Totals>::new();
    for session in sessions {
        totals.entry(Month::of(session.started_at.date())).or_default().add(session);
    }

    window
        .months()
        .map(|month| {
            let current = totals.get(&month).copied().unwrap_or_default();
            let prior_year =
                totals.get(&month.year_before()).filter(|prior| prior.n_sessions() != 0);
            let previous_reading = totals
                .range(..month)
                .filter_map(|(_, totals)| totals.odometer)
                .fold(None, |max, reading| max_reading(max, Some(reading)));
            MonthlyAggregate {
                month,
                total_kwh: current.energy,
                total_cost: current.cost,
                average_cost_per_kwh: (!current.energy.is_zero())
                    .then(|| current.cost / current.energy),
                home_kwh: current.home_energy,
                home_cost: current.home_cost,
                home_sessions: current.home_sessions,
                away_sessions: current.away_sessions,
                odometer: current.odometer,
                odometer_delta: current
                    .odometer
                    .zip(previous_reading)
                    .map(|(current, previous)| current - previous),
                yoy_kwh_percent: prior_year
                    .and_then(|prior| percent_change(current.energy / prior.energy)),
                yoy_cost_percent: prior_year
                    .and_then(|prior| percent_change(current.cost / prior.cost)),
            }
        })
        .collect()
}

/// Convert the ratio to the prior value into a percentage change.
fn percent_change(ratio: f64) -> Option<f64> {
    ratio.is_finite().then(|| (ratio - 1.0) * 100.0)
}

fn max_reading(lhs: Option<Miles>, rhs: Option<Miles>) -> Option<Miles> {
    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => Some(lhs.max(rhs)),
        (lhs, rhs) => lhs.or(rhs),
    }
}
