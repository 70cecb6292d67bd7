use crate::{
    api::Fetch,
    cli::{connection::ConnectionArgs, print_json},
    prelude::*,
    vehicle::{FEED, fetch_vehicle_data},
};

#[derive(Copy, Clone)]
pub enum View {
    Battery,
    Charging,
    Location,
    Thermal,
    Info,
    Summary,
}

pub fn print_raw(connection: &ConnectionArgs) -> Result {
    let fetcher = connection.connect()?;
    let payload = fetcher.fetch(&FEED).context("failed to fetch the vehicle data")?;
    print_json(&payload)
}

pub fn print_view(connection: &ConnectionArgs, view: View) -> Result {
    let data = fetch_vehicle_data(&connection.connect()?)?;
    match view {
        View::Battery => print_json(&data.battery()),
        View::Charging => print_json(&data.charging()),
        View::Location => print_json(&data.location()),
        View::Thermal => print_json(&data.thermal()),
        View::Info => print_json(&data.info()),
        View::Summary => print_json(&data.summary()),
    }
}
