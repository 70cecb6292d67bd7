use std::{fmt, fs::OpenOptions, io::Write as _, path::Path};

use crate::{fmt::FormattedChange, prelude::*, report::Report};

const RULE_WIDTH: usize = 60;

/// Append the report to the plain-text history log, creating the log if needed.
///
/// Existing contents are never rewritten.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn append(report: &Report, path: &Path) -> Result {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open `{}`", path.display()))?;
    file.write_all(render(report).as_bytes())
        .with_context(|| format!("failed to append to `{}`", path.display()))?;
    info!("appended");
    Ok(())
}

/// Render the log block: a timestamped header and one line per month that had charging.
pub fn render(report: &Report) -> String {
    let mut block = String::new();
    // Writing into a `String` does not fail.
    write_block(report, &mut block).unwrap_or_default();
    block
}

fn write_block(report: &Report, block: &mut impl fmt::Write) -> fmt::Result {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(block)?;
    writeln!(block, "{rule}")?;
    writeln!(block, "Report generated: {}", report.generated_at.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(block, "{rule}")?;
    let header = format!(
        "{:<8} {:<8} {:<10} {:<8} {:<8} {:<8}",
        "date", "kWh", "cost", "ODO", "$/kWh", "Y/Y"
    );
    writeln!(block, "{}", header.trim_end())?;
    writeln!(block, "{}", "-".repeat(RULE_WIDTH))?;
    for row in report.rows.iter().filter(|row| row.n_sessions() != 0) {
        let line = format!(
            "{:<8} {:<8.1} ${:<9.2} {:<8} ${:<7.2} {:<8}",
            row.month.first_day().format("%y-%m").to_string(),
            row.total_kwh.0,
            row.total_cost.0,
            row.odometer.map_or_else(String::new, |odometer| format!("{:.0}", odometer.0)),
            row.average_cost_per_kwh.map_or(0.0, |rate| rate.0),
            FormattedChange(row.yoy_kwh_percent).to_string(),
        );
        writeln!(block, "{}", line.trim_end())?;
    }
    writeln!(block)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::report::tests::sample_report;

    #[test]
    fn test_render() {
        let block = render(&sample_report());
        let lines = block.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "=".repeat(60));
        assert_eq!(lines[2], "Report generated: 2026-04-03 06:00:00");
        assert_eq!(lines[4], "date     kWh      cost       ODO      $/kWh    Y/Y");
        assert_eq!(lines[6], "26-01    30.0     $9.00      12000    $0.30    -25%");
        assert_eq!(lines[7], "26-03    25.0     $7.50      13035    $0.30    +25%");
        assert_eq!(lines.len(), 9, "the month without charging is skipped");
    }

    #[test]
    fn test_append_keeps_previous_runs() -> Result {
        let directory = TempDir::new()?;
        let path = directory.path().join("charging_history.txt");
        fs::write(&path, "previous run\n")?;

        let report = sample_report();
        append(&report, &path)?;
        append(&report, &path)?;

        let contents = fs::read_to_string(&path)?;
        assert!(contents.starts_with("previous run\n"));
        assert_eq!(contents.matches("Report generated:").count(), 2);
        assert_eq!(contents.len(), "previous run\n".len() + 2 * render(&report).len());
        Ok(())
    }
}
