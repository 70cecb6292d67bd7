use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use serde_with::{DisplayFromStr, NoneAsEmptyString, PickFirst, Same, serde_as};

use crate::{
    api::{Endpoint, Fetch, Request, fetch_as},
    month::{DateRange, MonthWindow},
    prelude::*,
    quantity::{cost::Cost, distance::Miles, energy::KilowattHours, rate::KilowattHourRate},
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ChargeLocation {
    Home,
    Away,
}

/// One contiguous charging event.
///
/// Timestamps are the vehicle-local wall-clock time exactly as reported by the API,
/// so month attribution never shifts across time zones.
#[must_use]
#[derive(Clone, Debug, bon::Builder)]
pub struct ChargingSession {
    pub started_at: NaiveDateTime,
    pub ended_at: Option<NaiveDateTime>,

    #[builder(default)]
    pub energy: KilowattHours,

    /// Home tariff cost for home sessions, supercharger and travel cost otherwise.
    #[builder(default)]
    pub cost: Cost,

    #[builder(default)]
    pub supercharger_cost: Cost,

    #[builder(default)]
    pub travel_cost: Cost,

    pub location: ChargeLocation,
    pub odometer: Option<Miles>,
    pub location_name: Option<String>,
    pub start_percent: Option<f64>,
    pub end_percent: Option<f64>,
    pub average_power_kw: Option<f64>,
    pub duration_minutes: Option<f64>,
}

impl ChargingSession {
    pub fn is_home(&self) -> bool {
        self.location == ChargeLocation::Home
    }
}

/// Fetch the sessions within the range, inclusive.
#[instrument(skip_all, fields(from = %range.from, to = %range.to))]
pub fn fetch_sessions(fetcher: &dyn Fetch, range: DateRange) -> Result<Vec<ChargingSession>> {
    let request = Request::read(Endpoint::History)
        .with("command", "charges")
        .with("dateFrom", range.from)
        .with("dateTo", range.to);
    let response: ChargesResponse = fetch_as(fetcher, &request)?;
    let sessions = response.into_sessions();
    info!(n_sessions = sessions.len(), "fetched");
    Ok(sessions)
}

/// Fetch the window month by month, so that each month gets its own cache entry.
#[instrument(skip_all, fields(first = %window.first, last = %window.last))]
pub fn fetch_months(fetcher: &dyn Fetch, window: MonthWindow) -> Result<Vec<ChargingSession>> {
    let mut sessions = Vec::new();
    for month in window.months() {
        let month_sessions = fetch_sessions(fetcher, DateRange::month(month))
            .with_context(|| format!("failed to fetch the charging history for {month}"))?;
        sessions.extend(month_sessions);
    }
    Ok(sessions)
}

#[derive(Deserialize)]
pub struct ChargesResponse {
    #[serde(default)]
    results: Vec<Value>,
}

impl ChargesResponse {
    /// Parse the records, skipping the ones without a usable start time.
    pub fn into_sessions(self) -> Vec<ChargingSession> {
        self.results
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<ChargeRecord>(record) {
                Ok(record) => Some(ChargingSession::from(record)),
                Err(error) => {
                    warn!("skipping the charge record: {error:#}");
                    None
                }
            })
            .sorted_by_key(|session| session.started_at)
            .collect()
    }
}

/// Number given as a JSON number or a numeric string, where `null` and `""` mean no value.
type Lenient = PickFirst<(Option<PickFirst<(Same, DisplayFromStr)>>, NoneAsEmptyString)>;

#[serde_as]
#[derive(Deserialize)]
struct ChargeRecord {
    #[serde(rename = "date", deserialize_with = "deserialize_timestamp")]
    started_at: NaiveDateTime,

    #[serde_as(as = "Lenient")]
    #[serde(default, rename = "totalEnergyAdded")]
    energy_added: Option<f64>,

    #[serde_as(as = "Lenient")]
    #[serde(default, rename = "homeCost")]
    home_cost: Option<f64>,

    #[serde_as(as = "Lenient")]
    #[serde(default, rename = "superCost")]
    supercharger_cost: Option<f64>,

    #[serde_as(as = "Lenient")]
    #[serde(default, rename = "travelCost")]
    travel_cost: Option<f64>,

    #[serde_as(as = "Lenient")]
    #[serde(default, rename = "homeChargeFlag")]
    home_charge_flag: Option<i64>,

    #[serde_as(as = "Lenient")]
    #[serde(default)]
    odometer: Option<f64>,

    #[serde(default, rename = "locationName")]
    location_name: Option<String>,

    #[serde_as(as = "Lenient")]
    #[serde(default, rename = "startPercent")]
    start_percent: Option<f64>,

    #[serde_as(as = "Lenient")]
    #[serde(default, rename = "chargePercent")]
    end_percent: Option<f64>,

    #[serde_as(as = "Lenient")]
    #[serde(default, rename = "totalMinutes")]
    duration_minutes: Option<f64>,

    #[serde_as(as = "Lenient")]
    #[serde(default, rename = "avgChargerPower")]
    average_power_kw: Option<f64>,
}

impl From<ChargeRecord> for ChargingSession {
    fn from(record: ChargeRecord) -> Self {
        let location = if record.home_charge_flag == Some(1) {
            ChargeLocation::Home
        } else {
            ChargeLocation::Away
        };
        let supercharger_cost = Cost::from(record.supercharger_cost.unwrap_or_default());
        let travel_cost = Cost::from(record.travel_cost.unwrap_or_default());
        let cost = match location {
            ChargeLocation::Home => Cost::from(record.home_cost.unwrap_or_default()),
            ChargeLocation::Away => supercharger_cost + travel_cost,
        };
        let ended_at =
            record.duration_minutes.and_then(|minutes| end_time(record.started_at, minutes));
        Self {
            started_at: record.started_at,
            ended_at,
            energy: KilowattHours::from(record.energy_added.unwrap_or_default()),
            cost,
            supercharger_cost,
            travel_cost,
            location,
            odometer: record.odometer.map(Miles),
            location_name: record.location_name,
            start_percent: record.start_percent,
            end_percent: record.end_percent,
            average_power_kw: record.average_power_kw,
            duration_minutes: record.duration_minutes,
        }
    }
}

/// Start time plus the duration, or `None` when the duration is not representable.
fn end_time(started_at: NaiveDateTime, minutes: f64) -> Option<NaiveDateTime> {
    let seconds = (minutes * 60.0).round();
    if !seconds.is_finite() {
        return None;
    }
    // Saturates on overflow, and `try_seconds` rejects the saturated value.
    #[expect(clippy::cast_possible_truncation)]
    let delta = TimeDelta::try_seconds(seconds as i64)?;
    started_at.checked_add_signed(delta)
}

/// Parse the API timestamp into vehicle-local wall-clock time.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.naive_local());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
            Some(date.and_time(NaiveTime::MIN))
        })
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<NaiveDateTime, D::Error> {
    let value = String::deserialize(deserializer)?;
    parse_timestamp(&value).ok_or_else(|| {
        serde::de::Error::invalid_value(serde::de::Unexpected::Str(&value), &"a timestamp")
    })
}

/// Home charging totals over a set of sessions.
#[must_use]
#[derive(Serialize)]
pub struct HomeSummary {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub total_sessions: usize,
    pub total_kwh: KilowattHours,
    pub total_cost: Cost,
    pub average_cost_per_kwh: Option<KilowattHourRate>,
    pub final_odometer_mi: Option<Miles>,
    pub final_odometer_km: Option<f64>,
    pub last_charge_at: Option<NaiveDateTime>,
}

impl HomeSummary {
    pub fn new(range: DateRange, sessions: &[ChargingSession]) -> Self {
        let home = sessions.iter().filter(|session| session.is_home()).collect_vec();
        let total_kwh = home.iter().map(|session| session.energy).sum::<KilowattHours>();
        let total_cost = home.iter().map(|session| session.cost).sum::<Cost>();
        let last = home.iter().max_by_key(|session| session.started_at);
        let final_odometer = last.and_then(|session| session.odometer);
        Self {
            date_from: range.from,
            date_to: range.to,
            total_sessions: home.len(),
            total_kwh: total_kwh.round_to(2),
            total_cost: total_cost.round_to_cents(),
            average_cost_per_kwh: (!total_kwh.is_zero())
                .then(|| (total_cost / total_kwh).round_to(4)),
            final_odometer_mi: final_odometer.map(|miles| Miles((miles.0 * 10.0).round() / 10.0)),
            final_odometer_km: final_odometer
                .map(|miles| (miles.to_kilometers() * 10.0).round() / 10.0),
            last_charge_at: last.map(|session| session.started_at),
        }
    }
}

/// Home and away charging totals, with the away cost broken down.
#[must_use]
#[derive(Serialize)]
pub struct AllChargingSummary {
    pub total_sessions: usize,
    pub home_sessions: usize,
    pub away_sessions: usize,
    pub total_kwh_all: KilowattHours,
    pub total_kwh_home: KilowattHours,
    pub total_kwh_away: KilowattHours,
    pub total_cost_home: Cost,
    pub total_cost_supercharger: Cost,
    pub total_cost_travel: Cost,
    pub total_cost_all: Cost,
}

impl AllChargingSummary {
    pub fn new(sessions: &[ChargingSession]) -> Self {
        let (home, away): (Vec<_>, Vec<_>) = sessions.iter().partition(|session| session.is_home());
        let total_kwh_home = home.iter().map(|session| session.energy).sum::<KilowattHours>();
        let total_kwh_away = away.iter().map(|session| session.energy).sum::<KilowattHours>();
        let total_cost_home = home.iter().map(|session| session.cost).sum::<Cost>();
        let total_cost_supercharger =
            sessions.iter().map(|session| session.supercharger_cost).sum::<Cost>();
        let total_cost_travel = sessions.iter().map(|session| session.travel_cost).sum::<Cost>();
        Self {
            total_sessions: sessions.len(),
            home_sessions: home.len(),
            away_sessions: away.len(),
            total_kwh_all: (total_kwh_home + total_kwh_away).round_to(2),
            total_kwh_home: total_kwh_home.round_to(2),
            total_kwh_away: total_kwh_away.round_to(2),
            total_cost_home: total_cost_home.round_to_cents(),
            total_cost_supercharger: total_cost_supercharger.round_to_cents(),
            total_cost_travel: total_cost_travel.round_to_cents(),
            total_cost_all: (total_cost_home + total_cost_supercharger + total_cost_travel)
                .round_to_cents(),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use serde_json::json;

    use super::*;
    use crate::{api::testing::Recorder, month::Month};

    // language=JSON
    const RESPONSE: &str = r#"
        {
            "count": 4,
            "dateFrom": "2025-03-01",
            "dateTo": "2025-03-31",
            "results": [
                {
                    "date": "2025-03-12 21:04:11",
                    "locationName": "Home",
                    "homeChargeFlag": 1,
                    "totalEnergyAdded": "15.0",
                    "homeCost": "4.50",
                    "superCost": null,
                    "travelCost": 0,
                    "odometer": "12410.4",
                    "startPercent": 41,
                    "chargePercent": 80,
                    "totalMinutes": "95",
                    "avgChargerPower": 9.6
                },
                {
                    "date": "2025-03-02 19:30:00",
                    "locationName": "Home",
                    "homeChargeFlag": 1,
                    "totalEnergyAdded": 10.0,
                    "homeCost": 3.0,
                    "odometer": 12201.0
                },
                {
                    "date": "2025-03-20 13:15:00",
                    "locationName": "Supercharger",
                    "homeChargeFlag": 0,
                    "totalEnergyAdded": 30.5,
                    "homeCost": 0,
                    "superCost": 12.25,
                    "travelCost": "1.00",
                    "odometer": 12700
                },
                {
                    "date": "not a date",
                    "homeChargeFlag": 1,
                    "totalEnergyAdded": 99
                }
            ]
        }
    "#;

    #[test]
    fn test_deserialize_charges_ok() -> Result {
        let sessions = serde_json::from_str::<ChargesResponse>(RESPONSE)?.into_sessions();
        assert_eq!(sessions.len(), 3, "the malformed record must be skipped");
        assert!(sessions.iter().is_sorted_by_key(|session| session.started_at));

        let first = &sessions[0];
        assert!(first.is_home());
        assert_abs_diff_eq!(first.energy.0, 10.0);
        assert_eq!(first.ended_at, None);

        let second = &sessions[1];
        assert_abs_diff_eq!(second.cost.0, 4.5);
        assert_eq!(second.odometer, Some(Miles(12410.4)));
        assert_eq!(second.ended_at, parse_timestamp("2025-03-12 22:39:11"));

        let away = &sessions[2];
        assert_eq!(away.location, ChargeLocation::Away);
        assert_abs_diff_eq!(away.cost.0, 13.25);
        Ok(())
    }

    #[test]
    fn test_empty_strings_are_missing_values() -> Result {
        let response = json!({
            "results": [
                {
                    "date": "2025-03-02 19:30:00",
                    "homeChargeFlag": 1,
                    "totalEnergyAdded": 10,
                    "homeCost": "",
                },
                {
                    "date": "2025-03-05 20:00:00",
                    "homeChargeFlag": "1",
                    "totalEnergyAdded": "",
                    "homeCost": "2.5",
                },
                {
                    "date": "2025-03-09 18:00:00",
                    "homeChargeFlag": 0,
                    "totalEnergyAdded": "12.5",
                    "superCost": "",
                    "travelCost": null,
                    "odometer": "",
                },
            ]
        });
        let sessions = serde_json::from_value::<ChargesResponse>(response)?.into_sessions();
        assert_eq!(sessions.len(), 3);

        assert!(sessions[0].is_home());
        assert_abs_diff_eq!(sessions[0].energy.0, 10.0);
        assert_abs_diff_eq!(sessions[0].cost.0, 0.0);

        assert!(sessions[1].is_home());
        assert_abs_diff_eq!(sessions[1].energy.0, 0.0);
        assert_abs_diff_eq!(sessions[1].cost.0, 2.5);

        assert_eq!(sessions[2].location, ChargeLocation::Away);
        assert_abs_diff_eq!(sessions[2].energy.0, 12.5);
        assert_eq!(sessions[2].odometer, None);
        Ok(())
    }

    #[test]
    fn test_unrepresentable_duration_has_no_end() -> Result {
        let response = json!({
            "results": [
                {"date": "2025-03-02 19:30:00", "homeChargeFlag": 1, "totalMinutes": "1e20"},
                {"date": "2025-03-03 19:30:00", "homeChargeFlag": 1, "totalMinutes": "inf"},
                {"date": "2025-03-04 19:30:00", "homeChargeFlag": 1, "totalMinutes": "NaN"},
                {"date": "2025-03-05 19:30:00", "homeChargeFlag": 1, "totalMinutes": 30},
            ]
        });
        let sessions = serde_json::from_value::<ChargesResponse>(response)?.into_sessions();
        assert_eq!(sessions.len(), 4);
        assert!(sessions[..3].iter().all(|session| session.ended_at.is_none()));
        assert_eq!(sessions[3].ended_at, parse_timestamp("2025-03-05 20:00:00"));
        Ok(())
    }

    #[test]
    fn test_parse_timestamp() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap().and_hms_opt(23, 30, 0);
        assert_eq!(parse_timestamp("2025-03-31 23:30:00"), expected);
        assert_eq!(parse_timestamp("2025-03-31T23:30:00"), expected);
        assert_eq!(parse_timestamp("2025-03-31T23:30:00-07:00"), expected);
        assert_eq!(parse_timestamp("2025-03-31 23:30"), expected);
        assert_eq!(
            parse_timestamp("2025-03-31"),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_fetch_sessions_request() -> Result {
        let range = DateRange::month(Month::new(2025, 3).unwrap());
        let request = Request::read(Endpoint::History)
            .with("command", "charges")
            .with("dateFrom", "2025-03-01")
            .with("dateTo", "2025-03-31");
        let recorder =
            Recorder::default().with_response(&request, serde_json::from_str(RESPONSE)?);
        let sessions = fetch_sessions(&recorder, range)?;
        assert_eq!(sessions.len(), 3);
        assert_eq!(recorder.n_calls(), 1);
        Ok(())
    }

    #[test]
    fn test_fetch_months_requests_each_month() -> Result {
        let recorder = Recorder::default();
        let window = MonthWindow::last_complete(NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(), 3);
        fetch_months(&recorder, window)?;
        let keys = recorder.requests.borrow().iter().map(Request::key).collect_vec();
        assert_eq!(
            keys,
            [
                "history.php?command=charges&dateFrom=2025-01-01&dateTo=2025-01-31",
                "history.php?command=charges&dateFrom=2025-02-01&dateTo=2025-02-28",
                "history.php?command=charges&dateFrom=2025-03-01&dateTo=2025-03-31",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_empty_response() -> Result {
        let recorder = Recorder::default();
        let range = DateRange::month(Month::new(2025, 3).unwrap());
        assert!(fetch_sessions(&recorder, range)?.is_empty());
        let sessions = serde_json::from_value::<ChargesResponse>(json!({"results": []}))?;
        assert!(sessions.into_sessions().is_empty());
        Ok(())
    }

    #[test]
    fn test_home_summary() -> Result {
        let sessions = serde_json::from_str::<ChargesResponse>(RESPONSE)?.into_sessions();
        let range = DateRange::month(Month::new(2025, 3).unwrap());
        let summary = HomeSummary::new(range, &sessions);
        assert_eq!(summary.total_sessions, 2);
        assert_abs_diff_eq!(summary.total_kwh.0, 25.0);
        assert_abs_diff_eq!(summary.total_cost.0, 7.5);
        assert_abs_diff_eq!(summary.average_cost_per_kwh.unwrap().0, 0.3);
        assert_eq!(summary.final_odometer_mi, Some(Miles(12410.4)));
        Ok(())
    }

    #[test]
    fn test_home_summary_without_sessions() {
        let range = DateRange::month(Month::new(2025, 3).unwrap());
        let summary = HomeSummary::new(range, &[]);
        assert_eq!(summary.total_sessions, 0);
        assert!(summary.average_cost_per_kwh.is_none());
        assert!(summary.final_odometer_mi.is_none());
    }

    #[test]
    fn test_all_charging_summary() -> Result {
        let sessions = serde_json::from_str::<ChargesResponse>(RESPONSE)?.into_sessions();
        let summary = AllChargingSummary::new(&sessions);
        assert_eq!(summary.total_sessions, 3);
        assert_eq!(summary.home_sessions + summary.away_sessions, summary.total_sessions);
        assert_abs_diff_eq!(summary.total_kwh_all.0, 55.5);
        assert_abs_diff_eq!(summary.total_cost_supercharger.0, 12.25);
        assert_abs_diff_eq!(summary.total_cost_all.0, 20.75);
        Ok(())
    }
}
