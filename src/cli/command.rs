use std::io::{self, BufRead, Write};

use clap::Parser;

use crate::{
    cli::{connection::ConnectionArgs, print_json},
    command::{Command, Mode, Seat, dispatch},
    prelude::*,
};

#[derive(Parser)]
pub struct ExecuteArgs {
    /// Actually send the command. Without it, the command is only validated and printed.
    #[clap(long)]
    pub execute: bool,

    /// Do not ask for confirmation before sending.
    #[clap(long, requires = "execute")]
    pub yes: bool,
}

impl ExecuteArgs {
    pub fn run(self, command: Command, connection: &ConnectionArgs) -> Result {
        // Validate before prompting or connecting.
        let request = command.to_request()?;

        let outcome = if !self.execute {
            dispatch(command, Mode::DryRun)?
        } else if self.yes || confirm(&format!("Send `{request}` to the vehicle?"))? {
            let fetcher = connection.connect()?;
            dispatch(command, Mode::Execute(&fetcher))?
        } else {
            eprintln!("Command cancelled.");
            dispatch(command, Mode::DryRun)?
        };
        print_json(&outcome)
    }
}

/// Ask on the terminal, only an explicit `yes` confirms.
fn confirm(question: &str) -> Result<bool> {
    let mut stderr = io::stderr().lock();
    write!(stderr, "{question} Type `yes` to confirm: ")?;
    stderr.flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer).context("failed to read the confirmation")?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}

#[derive(Parser)]
pub struct SetChargeLimitArgs {
    /// Charge limit percentage, 50 to 100.
    percent: u32,

    #[clap(flatten)]
    pub execute: ExecuteArgs,
}

impl SetChargeLimitArgs {
    pub fn run(self, connection: &ConnectionArgs) -> Result {
        self.execute.run(Command::SetChargeLimit { percent: self.percent }, connection)
    }
}

#[derive(Parser)]
pub struct SetChargeAmpsArgs {
    /// Charging current in amps, 5 to 32.
    amps: u32,

    #[clap(flatten)]
    execute: ExecuteArgs,
}

impl SetChargeAmpsArgs {
    pub fn run(self, connection: &ConnectionArgs) -> Result {
        self.execute.run(Command::SetChargeAmps { amps: self.amps }, connection)
    }
}

#[derive(Parser)]
pub struct SetTemperatureArgs {
    /// Cabin temperature in degrees Celsius, 15 to 28.
    celsius: f64,

    #[clap(flatten)]
    execute: ExecuteArgs,
}

impl SetTemperatureArgs {
    pub fn run(self, connection: &ConnectionArgs) -> Result {
        self.execute.run(Command::SetTemperature { celsius: self.celsius }, connection)
    }
}

#[derive(Parser)]
pub struct SetSeatHeaterArgs {
    seat: Seat,

    /// Heater level, 0 (off) to 3.
    level: u32,

    #[clap(flatten)]
    execute: ExecuteArgs,
}

impl SetSeatHeaterArgs {
    pub fn run(self, connection: &ConnectionArgs) -> Result {
        self.execute.run(Command::SetSeatHeater { seat: self.seat, level: self.level }, connection)
    }
}
