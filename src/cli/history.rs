use chrono::{Local, NaiveDate};
use clap::Parser;
use itertools::Itertools;

use crate::{
    cli::{connection::ConnectionArgs, print_json},
    history::{AllChargingSummary, HomeSummary, fetch_sessions},
    month::{DateRange, Month},
    prelude::*,
    tables::build_sessions_table,
};

#[derive(Parser)]
pub struct HistoryArgs {
    /// First day of the range, `YYYY-MM-DD`.
    #[clap(long, requires = "to", conflicts_with_all = ["month", "last_month"])]
    from: Option<NaiveDate>,

    /// Last day of the range, inclusive.
    #[clap(long, requires = "from")]
    to: Option<NaiveDate>,

    /// Single calendar month, `YYYY-MM`.
    #[clap(long, conflicts_with = "last_month")]
    month: Option<Month>,

    /// The last complete month.
    #[clap(long)]
    last_month: bool,

    /// Also print every session.
    #[clap(long)]
    details: bool,

    /// Only list home sessions in the details.
    #[clap(long)]
    home_only: bool,

    /// Summarize home and away charging instead of home only.
    #[clap(long)]
    all_stats: bool,
}

impl HistoryArgs {
    fn range(&self, today: NaiveDate) -> Result<DateRange> {
        match (self.from, self.to, self.month) {
            (Some(from), Some(to), _) => Ok(DateRange::new(from, to)?),
            (_, _, Some(month)) => Ok(DateRange::month(month)),
            _ if self.last_month => Ok(DateRange::month(Month::of(today).pred())),
            _ => bail!("specify the range with `--from` and `--to`, `--month`, or `--last-month`"),
        }
    }

    pub fn run(self, connection: &ConnectionArgs) -> Result {
        let range = self.range(Local::now().date_naive())?;
        info!(%range, "analyzing…");
        let sessions = fetch_sessions(&connection.connect()?, range)?;

        if self.all_stats {
            print_json(&AllChargingSummary::new(&sessions))?;
        } else {
            print_json(&HomeSummary::new(range, &sessions))?;
        }

        if self.details {
            let details = sessions
                .into_iter()
                .filter(|session| !self.home_only || session.is_home())
                .collect_vec();
            println!("{}", build_sessions_table(&details));
        }
        Ok(())
    }
}
