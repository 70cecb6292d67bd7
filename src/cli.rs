mod command;
mod connection;
mod history;
mod report;
mod vehicle;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::{
    cli::{
        command::{
            ExecuteArgs,
            SetChargeAmpsArgs,
            SetChargeLimitArgs,
            SetSeatHeaterArgs,
            SetTemperatureArgs,
        },
        connection::ConnectionArgs,
        history::HistoryArgs,
        report::ReportArgs,
        vehicle::View,
    },
    command::Command as VehicleCommand,
    prelude::*,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[clap(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn run(self) -> Result {
        match self.command {
            Command::Data => vehicle::print_raw(&self.connection),
            Command::Battery => vehicle::print_view(&self.connection, View::Battery),
            Command::Charging => vehicle::print_view(&self.connection, View::Charging),
            Command::Location => vehicle::print_view(&self.connection, View::Location),
            Command::Thermal => vehicle::print_view(&self.connection, View::Thermal),
            Command::Info => vehicle::print_view(&self.connection, View::Info),
            Command::Summary => vehicle::print_view(&self.connection, View::Summary),
            Command::ChargeStart(args) => args.run(VehicleCommand::StartCharging, &self.connection),
            Command::ChargeStop(args) => args.run(VehicleCommand::StopCharging, &self.connection),
            Command::SetChargeLimit(args) => args.run(&self.connection),
            Command::SetChargeAmps(args) => args.run(&self.connection),
            Command::HvacStart(args) => args.run(VehicleCommand::StartHvac, &self.connection),
            Command::HvacStop(args) => args.run(VehicleCommand::StopHvac, &self.connection),
            Command::SetTemp(args) => args.run(&self.connection),
            Command::SetSeatHeater(args) => args.run(&self.connection),
            Command::History(args) => args.run(&self.connection),
            Command::Report(args) => args.run(&self.connection),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Print the raw vehicle data.
    Data,

    /// Print the battery status.
    Battery,

    /// Print the charging status.
    Charging,

    /// Print the vehicle location.
    Location,

    /// Print the climate and heater status.
    Thermal,

    /// Print the vehicle information.
    Info,

    /// Print a summary of all the above.
    Summary,

    /// Start charging.
    ChargeStart(ExecuteArgs),

    /// Stop charging.
    ChargeStop(ExecuteArgs),

    /// Set the charge limit.
    SetChargeLimit(SetChargeLimitArgs),

    /// Set the charging current.
    SetChargeAmps(SetChargeAmpsArgs),

    /// Start climate control.
    HvacStart(ExecuteArgs),

    /// Stop climate control.
    HvacStop(ExecuteArgs),

    /// Set the cabin temperature.
    SetTemp(SetTemperatureArgs),

    /// Set a seat heater level.
    SetSeatHeater(SetSeatHeaterArgs),

    /// Analyze the charging history over a date range.
    History(Box<HistoryArgs>),

    /// Publish the monthly charging report and append it to the history log.
    Report(Box<ReportArgs>),
}

/// Print pretty JSON to the standard output.
fn print_json(value: &impl Serialize) -> Result {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
