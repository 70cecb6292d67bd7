//! Live vehicle state from the feed endpoint, reshaped into the views the CLI prints.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use crate::{
    api::{Endpoint, Fetch, Request, fetch_as},
    prelude::*,
    quantity::distance::Miles,
};

pub const FEED: Request = Request::read(Endpoint::Feed);

#[instrument(skip_all)]
pub fn fetch_vehicle_data(fetcher: &dyn Fetch) -> Result<VehicleData> {
    fetch_as(fetcher, &FEED).context("failed to fetch the vehicle data")
}

/// Feed payload. Every field is optional since a sleeping vehicle reports only a few of them.
#[serde_as]
#[derive(Default, Deserialize)]
pub struct VehicleData {
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub battery_level: Option<f64>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub usable_battery_level: Option<f64>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub battery_range: Option<f64>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub est_battery_range: Option<f64>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub charge_limit_soc: Option<f64>,

    #[serde(default)]
    pub charging_state: Option<String>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub charger_power: Option<f64>,

    #[serde(default)]
    pub charger_phases: Option<Value>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub charge_current_request: Option<f64>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub time_to_full_charge: Option<f64>,

    #[serde(default)]
    pub scheduled_charging_start_time: Option<Value>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub longitude: Option<f64>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub speed: Option<f64>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub inside_temp: Option<f64>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub outside_temp: Option<f64>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub driver_temp_setting: Option<f64>,

    #[serde(default)]
    pub seat_heater_left: Option<Value>,

    #[serde(default)]
    pub seat_heater_right: Option<Value>,

    #[serde(default)]
    pub seat_heater_rear_left: Option<Value>,

    #[serde(default)]
    pub seat_heater_rear_center: Option<Value>,

    #[serde(default)]
    pub seat_heater_rear_right: Option<Value>,

    #[serde(default)]
    pub steering_wheel_heater: Option<Value>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub vin: Option<String>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default, rename = "carState")]
    pub car_state: Option<String>,

    #[serde(default)]
    pub car_version: Option<String>,

    #[serde(default, rename = "newVersion")]
    pub new_version: Option<String>,

    #[serde(default, rename = "newVersionStatus")]
    pub new_version_status: Option<String>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub odometer: Option<f64>,

    #[serde(default, rename = "Date")]
    pub last_update: Option<String>,

    /// Only present in command responses.
    #[serde(default)]
    pub tesla_request_counter: Option<Value>,
}

#[derive(Serialize)]
pub struct BatteryStatus {
    pub battery_level: Option<f64>,
    pub usable_battery_level: Option<f64>,
    pub battery_range_mi: Option<f64>,
    pub battery_range_km: Option<f64>,
    pub est_battery_range_mi: Option<f64>,
    pub est_battery_range_km: Option<f64>,
    pub charge_limit_soc: Option<f64>,
}

#[derive(Serialize)]
pub struct ChargingStatus {
    pub charging_state: Option<String>,
    pub charger_power_kw: Option<f64>,
    pub charger_phases: Option<Value>,
    pub charge_current_request_a: Option<f64>,
    pub time_to_full_charge_h: Option<f64>,
    pub scheduled_charging_start_time: Option<Value>,
}

#[derive(Serialize)]
pub struct LocationStatus {
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub speed_kmh: Option<f64>,
}

#[derive(Serialize)]
pub struct ThermalStatus {
    pub inside_temp_c: Option<f64>,
    pub outside_temp_c: Option<f64>,
    pub driver_temp_setting_c: Option<f64>,
    pub seat_heater_left: Option<Value>,
    pub seat_heater_right: Option<Value>,
    pub seat_heater_rear_left: Option<Value>,
    pub seat_heater_rear_center: Option<Value>,
    pub seat_heater_rear_right: Option<Value>,
    pub steering_wheel_heater: Option<Value>,
}

#[derive(Serialize)]
pub struct VehicleInfo {
    pub display_name: Option<String>,
    pub vin: Option<String>,
    pub state: Option<String>,
    pub car_state: Option<String>,
    pub car_version: Option<String>,
    pub new_version: Option<String>,
    pub new_version_status: Option<String>,
    pub odometer_mi: Option<f64>,
    pub odometer_km: Option<f64>,
    pub last_update: Option<String>,
}

#[derive(Serialize)]
pub struct Summary {
    pub vehicle: VehicleInfo,
    pub battery: BatteryStatus,
    pub charging: ChargingStatus,
    pub location: LocationStatus,
    pub thermal: ThermalStatus,
    pub command_counters: Option<Value>,
}

impl VehicleData {
    pub fn battery(&self) -> BatteryStatus {
        BatteryStatus {
            battery_level: self.battery_level,
            usable_battery_level: self.usable_battery_level,
            battery_range_mi: self.battery_range,
            battery_range_km: self.battery_range.map(to_kilometers),
            est_battery_range_mi: self.est_battery_range,
            est_battery_range_km: self.est_battery_range.map(to_kilometers),
            charge_limit_soc: self.charge_limit_soc,
        }
    }

    pub fn charging(&self) -> ChargingStatus {
        ChargingStatus {
            charging_state: self.charging_state.clone(),
            charger_power_kw: self.charger_power,
            charger_phases: self.charger_phases.clone(),
            charge_current_request_a: self.charge_current_request,
            time_to_full_charge_h: self.time_to_full_charge,
            scheduled_charging_start_time: self.scheduled_charging_start_time.clone(),
        }
    }

    pub fn location(&self) -> LocationStatus {
        LocationStatus {
            location_name: self.location.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            speed_kmh: self.speed,
        }
    }

    pub fn thermal(&self) -> ThermalStatus {
        ThermalStatus {
            inside_temp_c: self.inside_temp,
            outside_temp_c: self.outside_temp,
            driver_temp_setting_c: self.driver_temp_setting,
            seat_heater_left: self.seat_heater_left.clone(),
            seat_heater_right: self.seat_heater_right.clone(),
            seat_heater_rear_left: self.seat_heater_rear_left.clone(),
            seat_heater_rear_center: self.seat_heater_rear_center.clone(),
            seat_heater_rear_right: self.seat_heater_rear_right.clone(),
            steering_wheel_heater: self.steering_wheel_heater.clone(),
        }
    }

    pub fn info(&self) -> VehicleInfo {
        VehicleInfo {
            display_name: self.display_name.clone(),
            vin: self.vin.clone(),
            state: self.state.clone(),
            car_state: self.car_state.clone(),
            car_version: self.car_version.clone(),
            new_version: self.new_version.clone(),
            new_version_status: self.new_version_status.clone(),
            odometer_mi: self.odometer,
            odometer_km: self.odometer.map(to_kilometers),
            last_update: self.last_update.clone(),
        }
    }

    pub fn summary(&self) -> Summary {
        Summary {
            vehicle: self.info(),
            battery: self.battery(),
            charging: self.charging(),
            location: self.location(),
            thermal: self.thermal(),
            command_counters: self.tesla_request_counter.clone(),
        }
    }
}

fn to_kilometers(miles: f64) -> f64 {
    (Miles(miles).to_kilometers() * 100.0).round() / 100.0
}
