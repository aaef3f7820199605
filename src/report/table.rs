//! Terminal table rendering.
//!
//! Every renderer returns a `String` so callers decide where it goes and
//! tests can inspect it. Colors are applied only when stdout supports them.

use crate::models::{
    pe_at, CapeValuation, DailyReport, ExchangeResult, PeReport, ValuationBand, YieldSnapshot,
    PE_TIERS,
};
use owo_colors::{OwoColorize, Stream};
use tabled::builder::Builder;
use tabled::settings::Style;

fn paint(text: &str, style: owo_colors::Style) -> String {
    text.if_supports_color(Stream::Stdout, |t| t.style(style))
        .to_string()
}

fn cyan(text: &str) -> String {
    paint(text, owo_colors::Style::new().cyan().bold())
}

fn green(text: &str) -> String {
    paint(text, owo_colors::Style::new().green().bold())
}

fn premium_style(premium: f64) -> owo_colors::Style {
    let style = owo_colors::Style::new().bold();
    if premium > 50.0 {
        style.red()
    } else if premium > 20.0 {
        style.yellow()
    } else {
        style.green()
    }
}

fn render(builder: Builder) -> String {
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// PE ladder: one column per benchmark, one row per tier.
fn ladder(benchmarks: &[(&'static str, f64)], tiers: &[f64]) -> String {
    let mut builder = Builder::default();

    let mut header = vec!["Tier".to_string()];
    header.extend(benchmarks.iter().map(|(name, _)| name.to_string()));
    builder.push_record(header);

    let mut yields = vec!["Yield".to_string()];
    yields.extend(benchmarks.iter().map(|(_, y)| format!("{:.2}%", y)));
    builder.push_record(yields);

    for &tier in tiers {
        let mut row = vec![format!("{:.0}% PE", tier)];
        row.extend(benchmarks.iter().map(|&(_, y)| {
            let pe = format!("{:.2}", pe_at(tier, y));
            if tier == 100.0 {
                green(&pe)
            } else {
                pe
            }
        }));
        builder.push_record(row);
    }

    render(builder)
}

/// Render the `pe` command's ladder table.
pub fn pe_table(report: &PeReport) -> String {
    ladder(&report.benchmarks(), &PE_TIERS)
}

/// Render the CAPE comparison table.
pub fn cape_table(valuation: &CapeValuation) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Indicator".to_string(), "Market valuation".to_string()]);
    builder.push_record([
        "Shiller CAPE".to_string(),
        cyan(&format!("{:.2}", valuation.cape)),
    ]);
    builder.push_record([
        "Fair PE (treasury)".to_string(),
        green(&format!("{:.2}", valuation.fair_pe)),
    ]);
    builder.push_record([
        "10Y treasury yield".to_string(),
        format!("{:.2}%", valuation.treasury),
    ]);
    builder.push_record([
        "Premium / discount".to_string(),
        paint(
            &format!("{:+.1}%", valuation.premium),
            premium_style(valuation.premium),
        ),
    ]);

    render(builder)
}

/// The colored verdict line printed below the CAPE table.
pub fn band_line(valuation: &CapeValuation) -> String {
    let band = valuation.band;
    let text = format!("{}  {}", band.emoji(), band.verdict());

    let style = match band {
        ValuationBand::Overvalued => owo_colors::Style::new().red().bold(),
        ValuationBand::SlightlyAboveFair => owo_colors::Style::new().yellow().bold(),
        ValuationBand::FairRange | ValuationBand::Undervalued => {
            owo_colors::Style::new().green().bold()
        }
    };
    paint(&text, style)
}

/// Render a single currency conversion.
pub fn forex_table(result: &ExchangeResult) -> String {
    let mut builder = Builder::default();
    builder.push_record([String::new(), "Exchange rate".to_string()]);
    builder.push_record(["From".to_string(), cyan(&result.from)]);
    builder.push_record(["To".to_string(), cyan(&result.to)]);
    builder.push_record(["Rate".to_string(), green(&format!("{:.4}", result.rate))]);
    builder.push_record(["Amount".to_string(), conversion_line(result)]);
    builder.push_record(["Updated".to_string(), result.date.clone()]);

    render(builder)
}

/// `100.00 USD = 724.56 CNY`
pub(crate) fn conversion_line(result: &ExchangeResult) -> String {
    format!(
        "{:.2} {} = {:.2} {}",
        result.amount, result.from, result.converted, result.to
    )
}

fn yields_table(yields: &YieldSnapshot) -> String {
    ladder(&yields.benchmarks(), &[100.0])
}

fn daily_cape_table(valuation: &CapeValuation) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Indicator".to_string(), "Value".to_string()]);
    builder.push_record([
        "Shiller CAPE".to_string(),
        cyan(&format!("{:.2}", valuation.cape)),
    ]);
    builder.push_record([
        "Fair PE".to_string(),
        green(&format!("{:.2}", valuation.fair_pe)),
    ]);
    builder.push_record([
        "Premium / discount".to_string(),
        paint(
            &format!("{:+.1}%", valuation.premium),
            premium_style(valuation.premium),
        ),
    ]);
    builder.push_record(["Rating".to_string(), valuation.band.label().to_string()]);

    render(builder)
}

fn daily_forex_table(result: &ExchangeResult) -> String {
    let mut builder = Builder::default();
    builder.push_record([String::new(), "Exchange rate".to_string()]);
    builder.push_record([
        "Pair".to_string(),
        format!("{} → {}", result.from, result.to),
    ]);
    builder.push_record(["Rate".to_string(), green(&format!("{:.4}", result.rate))]);
    builder.push_record(["Conversion".to_string(), conversion_line(result)]);

    render(builder)
}

/// Render the daily report as three titled tables.
pub fn daily_tables(report: &DailyReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("📰 Daily market report {}\n\n", report.date));
    output.push_str("📊 PE valuation\n");
    output.push_str(&yields_table(&report.yields));
    output.push_str("\n\n📈 CAPE valuation\n");
    output.push_str(&daily_cape_table(&report.valuation));
    output.push_str("\n\n💱 Exchange rate\n");
    output.push_str(&daily_forex_table(&report.exchange));
    output.push('\n');

    output
}
