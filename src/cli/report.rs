use std::path::PathBuf;

use chrono::Local;
use clap::Parser;

use crate::{
    cli::connection::ConnectionArgs,
    history::fetch_months,
    month::MonthWindow,
    prelude::*,
    report::{Report, log},
    summary::aggregate,
    tables::build_monthly_table,
};

#[derive(Parser)]
pub struct ReportArgs {
    /// Number of complete months to report, ending with the last one.
    #[clap(long, env = "REPORT_MONTHS", default_value = "24")]
    months: u32,

    /// Directory for the published JSON and HTML.
    #[clap(long, env = "REPORT_PUBLISH_DIR", default_value = "docs")]
    publish_dir: PathBuf,

    /// Plain-text log that every report is appended to.
    #[clap(long, env = "REPORT_LOG_FILE", default_value = "charging_history.txt")]
    log_file: PathBuf,

    /// Only count home charging.
    #[clap(long, env = "REPORT_HOME_ONLY")]
    home_only: bool,

    /// Page and document title.
    #[clap(long, env = "REPORT_TITLE", default_value = "Home charging history")]
    title: String,
}

impl ReportArgs {
    #[instrument(skip_all, fields(months = self.months))]
    pub fn run(self, connection: &ConnectionArgs) -> Result {
        ensure!(self.months != 0, "the report needs at least one month");
        let generated_at = Local::now();
        let window = MonthWindow::last_complete(generated_at.date_naive(), self.months);
        info!(first = %window.first, last = %window.last, "fetching…");

        // One more year so that the oldest months have their year-over-year deltas.
        let mut sessions = fetch_months(&connection.connect()?, window.extended_back(12))?;
        if self.home_only {
            sessions.retain(|session| session.is_home());
        }
        let report = Report { generated_at, title: self.title, rows: aggregate(&sessions, window) };

        report.publish(&self.publish_dir)?;
        log::append(&report, &self.log_file)?;
        println!("{}", build_monthly_table(&report.rows));
        match report.last_active_month() {
            Some(row) => info!(through = %row.month, "updated"),
            None => warn!("no charging sessions in the window"),
        }
        Ok(())
    }
}
