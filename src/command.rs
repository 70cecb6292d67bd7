//! Vehicle control commands, validated locally and dry-run unless asked otherwise.

use std::fmt::{Display, Formatter};

use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;

use crate::{
    api::{Fetch, Request},
    error::ValidationError,
    prelude::*,
};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Command {
    StartCharging,
    StopCharging,
    SetChargeLimit { percent: u32 },
    SetChargeAmps { amps: u32 },
    StartHvac,
    StopHvac,
    SetTemperature { celsius: f64 },
    SetSeatHeater { seat: Seat, level: u32 },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Seat {
    Driver,
    Passenger,
    RearLeft,
    RearCenter,
    RearRight,
}

impl Seat {
    /// Heater identifier expected by the vehicle. Note the gap at 3.
    pub const fn heater_id(self) -> u32 {
        match self {
            Self::Driver => 0,
            Self::Passenger => 1,
            Self::RearLeft => 2,
            Self::RearCenter => 4,
            Self::RearRight => 5,
        }
    }
}

impl Command {
    pub const fn name(self) -> &'static str {
        match self {
            Self::StartCharging => "charge_start",
            Self::StopCharging => "charge_stop",
            Self::SetChargeLimit { .. } => "set_charge_limit",
            Self::SetChargeAmps { .. } => "set_charging_amps",
            Self::StartHvac => "auto_conditioning_start",
            Self::StopHvac => "auto_conditioning_stop",
            Self::SetTemperature { .. } => "set_temps",
            Self::SetSeatHeater { .. } => "seat_heater",
        }
    }

    pub fn validate(self) -> Result<(), ValidationError> {
        match self {
            Self::SetChargeLimit { percent } => {
                ValidationError::ensure_within("charge limit", f64::from(percent), 50.0, 100.0)
            }
            Self::SetChargeAmps { amps } => {
                ValidationError::ensure_within("charging current", f64::from(amps), 5.0, 32.0)
            }
            Self::SetTemperature { celsius } => {
                ValidationError::ensure_within("temperature", celsius, 15.0, 28.0)
            }
            Self::SetSeatHeater { level, .. } => {
                ValidationError::ensure_within("heater level", f64::from(level), 0.0, 3.0)
            }
            Self::StartCharging | Self::StopCharging | Self::StartHvac | Self::StopHvac => Ok(()),
        }
    }

    /// Validate the parameters and resolve the feed request.
    pub fn to_request(self) -> Result<Request, ValidationError> {
        self.validate()?;
        let request = Request::command(self.name());
        Ok(match self {
            Self::SetChargeLimit { percent } => request.with("charge_limit_soc", percent),
            Self::SetChargeAmps { amps } => request.with("charging_amps", amps),
            Self::SetTemperature { celsius } => request.with("temp", celsius),
            Self::SetSeatHeater { seat, level } => {
                request.with("heater", seat.heater_id()).with("level", level)
            }
            Self::StartCharging | Self::StopCharging | Self::StartHvac | Self::StopHvac => request,
        })
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a command is carried out.
///
/// Only [`Mode::Execute`] holds a fetcher, so a dry run cannot reach the network.
#[derive(Copy, Clone)]
pub enum Mode<'a> {
    DryRun,
    Execute(&'a dyn Fetch),
}

#[must_use]
#[derive(Debug, Serialize)]
pub struct Outcome {
    pub command: &'static str,
    pub request: String,
    pub dispatched: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

impl Outcome {
    pub fn status(&self) -> &'static str {
        if self.dispatched { "dispatched" } else { "simulated" }
    }
}

#[instrument(skip_all, fields(command = command.name()))]
pub fn dispatch(command: Command, mode: Mode<'_>) -> Result<Outcome> {
    let request = command.to_request()?;
    let outcome = match mode {
        Mode::DryRun => {
            info!(%request, "dry run, not sending");
            Outcome {
                command: command.name(),
                request: request.to_string(),
                dispatched: false,
                response: None,
            }
        }
        Mode::Execute(fetcher) => {
            info!(%request, "sending…");
            let response = fetcher
                .fetch(&request)
                .with_context(|| format!("failed to send `{command}`"))?;
            Outcome {
                command: command.name(),
                request: request.to_string(),
                dispatched: true,
                response: Some(response),
            }
        }
    };
    info!(status = outcome.status(), "done");
    Ok(outcome)
}
