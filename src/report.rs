pub mod html;
pub mod json;
pub mod log;

use std::{fs, path::Path};

use chrono::{DateTime, Local};

use crate::{prelude::*, summary::MonthlyAggregate};

pub const JSON_FILE_NAME: &str = "charging_data.json";
pub const HTML_FILE_NAME: &str = "index.html";

/// Monthly charging report, as published and logged.
#[must_use]
pub struct Report {
    pub generated_at: DateTime<Local>,
    pub title: String,

    /// Oldest month first.
    pub rows: Vec<MonthlyAggregate>,
}

impl Report {
    /// Write the JSON document and the HTML page into the directory, creating it if needed.
    #[instrument(skip_all, fields(directory = %directory.display()))]
    pub fn publish(&self, directory: &Path) -> Result {
        fs::create_dir_all(directory)
            .with_context(|| format!("failed to create `{}`", directory.display()))?;

        let json_path = directory.join(JSON_FILE_NAME);
        fs::write(&json_path, serde_json::to_string_pretty(&json::Document::from(self))?)
            .with_context(|| format!("failed to write `{}`", json_path.display()))?;

        let html_path = directory.join(HTML_FILE_NAME);
        fs::write(&html_path, html::render(self).into_string())
            .with_context(|| format!("failed to write `{}`", html_path.display()))?;

        info!(n_rows = self.rows.len(), "published");
        Ok(())
    }

    /// The latest month that had any charging.
    pub fn last_active_month(&self) -> Option<&MonthlyAggregate> {
        self.rows.iter().rev().find(|row| row.n_sessions() != 0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{NaiveDate, TimeZone};
    use tempfile::TempDir;

    use super::*;
    use crate::{
        history::{ChargeLocation, ChargingSession},
        month::MonthWindow,
        quantity::{cost::Cost, distance::Miles, energy::KilowattHours},
        summary::aggregate,
    };

    fn session(year: i32, month: u32, kwh: f64, cost: f64, odometer: f64) -> ChargingSession {
        let started_at = NaiveDate::from_ymd_opt(year, month, 14).unwrap().and_hms_opt(21, 0, 0);
        ChargingSession::builder()
            .started_at(started_at.unwrap())
            .energy(KilowattHours::from(kwh))
            .cost(Cost::from(cost))
            .location(ChargeLocation::Home)
            .odometer(Miles(odometer))
            .build()
    }

    /// Three months ending with March 2026, with a year of history before them.
    pub fn sample_report() -> Report {
        let sessions = [
            session(2025, 1, 40.0, 12.0, 9000.0),
            session(2025, 3, 20.0, 5.0, 9800.0),
            session(2026, 1, 30.0, 9.0, 12000.0),
            session(2026, 3, 25.0, 7.5, 13034.6),
        ];
        let window = MonthWindow::last_complete(NaiveDate::from_ymd_opt(2026, 4, 3).unwrap(), 3);
        Report {
            generated_at: Local.with_ymd_and_hms(2026, 4, 3, 6, 0, 0).unwrap(),
            title: "Charging history".to_owned(),
            rows: aggregate(&sessions, window),
        }
    }

    #[test]
    fn test_publish() -> Result {
        let directory = TempDir::new()?;
        let publish_dir = directory.path().join("docs");
        let report = sample_report();
        report.publish(&publish_dir)?;

        let document: serde_json::Value =
            serde_json::from_slice(&fs::read(publish_dir.join(JSON_FILE_NAME))?)?;
        assert_eq!(document["data"].as_array().map(Vec::len), Some(3));
        let html = fs::read_to_string(publish_dir.join(HTML_FILE_NAME))?;
        assert!(html.starts_with("<!DOCTYPE html>"));

        // Publishing again overwrites.
        report.publish(&publish_dir)?;
        assert_eq!(fs::read_dir(&publish_dir)?.count(), 2);
        Ok(())
    }

    #[test]
    fn test_last_active_month() {
        let report = sample_report();
        let month = report.last_active_month().map(|row| row.month.to_string());
        assert_eq!(month.as_deref(), Some("2026-03"));
    }
}
