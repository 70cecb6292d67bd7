use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::{
    fmt::FormattedChange,
    quantity::{distance::Miles, energy::KilowattHours},
    report::Report,
    summary::MonthlyAggregate,
};

const STYLE: &str = r"
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
    max-width: 1000px;
    margin: 40px auto;
    padding: 0 20px;
    background: #f5f5f5;
    color: #333;
}
.container { background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0, 0, 0, 0.1); }
.subtitle, .footer { color: #666; }
table { width: 100%; border-collapse: collapse; margin: 20px 0; }
th { background: #f8f9fa; padding: 12px; text-align: left; border-bottom: 2px solid #dee2e6; }
td { padding: 10px 12px; border-bottom: 1px solid #e9ecef; }
td.number { text-align: right; font-variant-numeric: tabular-nums; }
tr:hover { background: #f8f9fa; }
.positive { color: #28a745; }
.negative { color: #dc3545; }
.chart rect { fill: #4a90d9; }
.chart text { fill: #666; font-size: 10px; text-anchor: middle; }
.footer { margin-top: 30px; padding-top: 20px; border-top: 1px solid #e9ecef; font-size: 14px; }
@media (max-width: 768px) { table { font-size: 14px; } th, td { padding: 8px 6px; } }
";

const CHART_WIDTH: f64 = 960.0;
const CHART_HEIGHT: f64 = 200.0;
const CHART_LABEL_HEIGHT: f64 = 16.0;

pub fn render(report: &Report) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (report.title) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                div.container {
                    h1 { (report.title) }
                    p.subtitle { "Last " (report.rows.len()) " months of charging" }
                    (render_chart(&report.rows))
                    (render_table(&report.rows))
                    div.footer {
                        p {
                            strong { "Last updated: " }
                            (report.generated_at.format("%B %d, %Y at %H:%M %Z"))
                        }
                        p { strong { "Data source: " } "ElectraFi API" }
                        p {
                            strong { "Y/Y: " }
                            "change in kWh against the same month of the prior year"
                        }
                    }
                }
            }
        }
    }
}

fn render_table(rows: &[MonthlyAggregate]) -> Markup {
    html! {
        table {
            thead {
                tr {
                    th { "Month" }
                    th { "kWh" }
                    th { "Cost" }
                    th { "Odometer" }
                    th { "$/kWh" }
                    th { "Y/Y" }
                }
            }
            tbody {
                @for row in rows {
                    @let change = FormattedChange(row.yoy_kwh_percent);
                    tr {
                        td { (row.month) }
                        td.number { (format!("{:.1}", row.total_kwh.0)) }
                        td.number { (row.total_cost) }
                        td.number {
                            @if let Some(odometer) = row.odometer { (format_miles(odometer)) }
                        }
                        td.number {
                            @if let Some(rate) = row.average_cost_per_kwh {
                                (format!("${:.2}", rate.0))
                            }
                        }
                        td.number.(change.css_class()) { (change) }
                    }
                }
            }
        }
    }
}

struct Bar {
    x: f64,
    y: f64,
    height: f64,
    label_x: f64,
}

/// Inline bar chart of the monthly energy.
fn render_chart(rows: &[MonthlyAggregate]) -> Markup {
    let max_kwh = rows
        .iter()
        .map(|row| row.total_kwh)
        .fold(KilowattHours::ZERO, |lhs, rhs| if rhs > lhs { rhs } else { lhs });
    #[expect(clippy::cast_precision_loss)]
    let slot_width = CHART_WIDTH / rows.len().max(1) as f64;
    let bar_width = slot_width * 0.8;
    let plot_height = CHART_HEIGHT - CHART_LABEL_HEIGHT;
    let bars = rows.iter().enumerate().map(|(i, row)| {
        #[expect(clippy::cast_precision_loss)]
        let left = slot_width * i as f64;
        let height =
            if max_kwh.is_zero() { 0.0 } else { plot_height * (row.total_kwh / max_kwh) };
        let bar = Bar {
            x: left + (slot_width - bar_width) / 2.0,
            y: plot_height - height,
            height,
            label_x: left + slot_width / 2.0,
        };
        (row, bar)
    });

    html! {
        svg.chart
            xmlns="http://www.w3.org/2000/svg"
            viewBox=(format!("0 0 {CHART_WIDTH} {CHART_HEIGHT}"))
            role="img"
            aria-label="Energy charged per month"
        {
            @for (row, bar) in bars {
                rect
                    x=(format!("{:.1}", bar.x))
                    y=(format!("{:.1}", bar.y))
                    width=(format!("{bar_width:.1}"))
                    height=(format!("{:.1}", bar.height))
                {
                    title { (row.month) ": " (row.total_kwh) }
                }
                text x=(format!("{:.1}", bar.label_x)) y=(format!("{:.1}", CHART_HEIGHT - 4.0)) {
                    (row.month.first_day().format("%m"))
                }
            }
        }
    }
}

/// Whole miles with thousands separators.
fn format_miles(miles: Miles) -> String {
    let digits = format!("{:.0}", miles.0.abs());
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    for (i, digit) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(digit);
    }
    if miles.0 < -0.5 {
        formatted.insert(0, '-');
    }
    formatted.push_str(" mi");
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;

    #[test]
    fn test_render() {
        let html = render(&sample_report()).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Charging history</title>"));
        assert!(html.contains("<td>2026-03</td>"));
        assert!(html.contains(r#"<td class="number positive">+25%</td>"#));
        assert!(html.contains(r#"<td class="number negative">-25%</td>"#));
        assert!(html.contains("13,035 mi"));
        assert_eq!(html.matches("<rect").count(), 3);
    }

    #[test]
    fn test_title_is_escaped() {
        let mut report = sample_report();
        report.title = "<script>".to_owned();
        let html = render(&report).into_string();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_format_miles() {
        assert_eq!(format_miles(Miles(0.0)), "0 mi");
        assert_eq!(format_miles(Miles(999.4)), "999 mi");
        assert_eq!(format_miles(Miles(13034.6)), "13,035 mi");
        assert_eq!(format_miles(Miles(1_234_567.0)), "1,234,567 mi");
    }
}
