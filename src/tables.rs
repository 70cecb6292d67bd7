use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    fmt::FormattedChange,
    history::{ChargeLocation, ChargingSession},
    summary::MonthlyAggregate,
};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(header);
    table
}

pub fn build_monthly_table(rows: &[MonthlyAggregate]) -> Table {
    let mut table = new_table(vec![
        "Month", "Energy", "Cost", "Rate", "Home", "Away", "Odometer", "Y/Y kWh", "Y/Y cost",
    ]);
    for row in rows {
        let month = Cell::new(row.month);
        table.add_row(vec![
            if row.n_sessions() == 0 { month.add_attribute(Attribute::Dim) } else { month },
            Cell::new(row.total_kwh).set_alignment(CellAlignment::Right),
            Cell::new(row.total_cost).set_alignment(CellAlignment::Right),
            row.average_cost_per_kwh
                .map_or_else(|| Cell::new(""), Cell::new)
                .set_alignment(CellAlignment::Right),
            Cell::new(row.home_sessions).set_alignment(CellAlignment::Right),
            Cell::new(row.away_sessions)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            row.odometer_delta
                .map_or_else(|| Cell::new(""), |delta| Cell::new(format!("+{delta}")))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            change_cell(row.yoy_kwh_percent),
            change_cell(row.yoy_cost_percent),
        ]);
    }
    table
}

fn change_cell(change: Option<f64>) -> Cell {
    let cell = Cell::new(FormattedChange(change)).set_alignment(CellAlignment::Right);
    match change {
        Some(change) if change.round() > 0.0 => cell.fg(Color::Red),
        Some(change) if change.round() < 0.0 => cell.fg(Color::Green),
        _ => cell,
    }
}

pub fn build_sessions_table(sessions: &[ChargingSession]) -> Table {
    let mut table =
        new_table(vec!["Date", "Start", "End", "Location", "Energy", "Cost", "SoC", "Power"]);
    for session in sessions {
        table.add_row(vec![
            Cell::new(session.started_at.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(session.started_at.format("%H:%M")),
            Cell::new(
                session
                    .ended_at
                    .map(|ended_at| ended_at.format("%H:%M").to_string())
                    .unwrap_or_default(),
            )
            .add_attribute(Attribute::Dim),
            Cell::new(session.location_name.as_deref().unwrap_or_default()).fg(
                match session.location {
                    ChargeLocation::Home => Color::Green,
                    ChargeLocation::Away => Color::DarkYellow,
                },
            ),
            Cell::new(session.energy).set_alignment(CellAlignment::Right),
            Cell::new(session.cost).set_alignment(CellAlignment::Right),
            Cell::new(match (session.start_percent, session.end_percent) {
                (Some(start), Some(end)) => format!("{start:.0}% → {end:.0}%"),
                _ => String::new(),
            }),
            Cell::new(
                session.average_power_kw.map(|kw| format!("{kw:.1} kW")).unwrap_or_default(),
            )
            .set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
