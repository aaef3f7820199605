//! Push message formatting.
//!
//! Messages use Telegram's legacy Markdown: `*bold*`, `_italic_` and
//! triple-backtick blocks for monospace tables.

use super::table::conversion_line;
use crate::models::{pe_at, CapeValuation, DailyReport, ExchangeResult, YieldSnapshot, PE_TIERS};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━";

/// Short rating used in push messages.
fn rating(valuation: &CapeValuation) -> String {
    format!("{} {}", valuation.band.emoji(), valuation.band.label())
}

/// PE message sent by `push`.
pub fn pe_message(yields: &YieldSnapshot) -> String {
    let mut message = String::new();

    message.push_str("📊 *Daily PE valuation*\n\n");

    message.push_str("*Yields*\n");
    for (name, value) in yields.benchmarks() {
        message.push_str(&format!("• {}: {:.2}%\n", name, value));
    }

    message.push_str("\n*100% PE*\n");
    for (name, value) in yields.benchmarks() {
        message.push_str(&format!("• {}: {:.2}\n", name, pe_at(100.0, value)));
    }

    message.push_str("\n*PE ladder*\n```\n");
    message.push_str(&format!(
        "{:<6} {:>9} {:>7} {:>7}\n",
        "Tier", "Treasury", "AAA", "BAA"
    ));
    for tier in PE_TIERS {
        message.push_str(&format!(
            "{:<6} {:>9.2} {:>7.2} {:>7.2}\n",
            format!("{:.0}%", tier),
            pe_at(tier, yields.treasury),
            pe_at(tier, yields.aaa),
            pe_at(tier, yields.baa),
        ));
    }
    message.push_str("```\n\n");

    message.push_str("_Source: FRED (Federal Reserve Economic Data)_");
    message
}

/// CAPE message sent by `cape --push`.
pub fn cape_message(valuation: &CapeValuation) -> String {
    format!(
        "📈 *S&P 500 CAPE valuation*\n\n\
         *Market valuation*\n\
         • Shiller CAPE: {:.2}\n\
         • Fair PE: {:.2}\n\
         • Premium / discount: {:+.1}%\n\n\
         *Benchmark*\n\
         • 10Y treasury: {:.2}%\n\n\
         *Rating: {}*\n\n\
         _Source: Multpl.com, FRED_",
        valuation.cape,
        valuation.fair_pe,
        valuation.premium,
        valuation.treasury,
        rating(valuation),
    )
}

/// Forex message sent by `forex --push`, laid out as a monospace table.
pub fn forex_message(result: &ExchangeResult) -> String {
    let rate = format!("{:.4}", result.rate);
    let amount = conversion_line(result);
    let rows = [
        ("From", result.from.as_str()),
        ("To", result.to.as_str()),
        ("Rate", rate.as_str()),
        ("Amount", amount.as_str()),
        ("Date", result.date.as_str()),
    ];

    let width = rows
        .iter()
        .map(|(_, value)| value.chars().count())
        .max()
        .unwrap_or_default();

    let border = format!("+{}+{}+", "-".repeat(8), "-".repeat(width + 2));
    let mut message = String::from("💱 *Exchange Rate*\n```\n");
    message.push_str(&border);
    message.push('\n');
    for (label, value) in rows {
        message.push_str(&format!("| {:<6} | {:<width$} |\n", label, value, width = width));
    }
    message.push_str(&border);
    message.push_str("\n```\n_Source: Frankfurter API_");
    message
}

/// Combined message sent by `daily --push`.
pub fn daily_message(report: &DailyReport) -> String {
    let mut message = String::new();

    message.push_str("📰 *Daily market report*\n");
    message.push_str(&format!("📅 {}\n\n{}\n\n", report.date.format("%Y-%m-%d"), RULE));

    message.push_str("📊 *PE valuation*\n");
    for (name, value) in report.yields.benchmarks() {
        message.push_str(&format!(
            "\n*{} ({:.2}%)*\n• 50% PE: {:.2} | 100% PE: {:.2} | 150% PE: {:.2}\n",
            name,
            value,
            pe_at(50.0, value),
            pe_at(100.0, value),
            pe_at(150.0, value),
        ));
    }
    message.push_str(&format!("\n{}\n\n", RULE));

    let valuation = &report.valuation;
    message.push_str("📈 *CAPE valuation*\n");
    message.push_str(&format!("• Shiller CAPE: {:.2}\n", valuation.cape));
    message.push_str(&format!("• Fair PE: {:.2}\n", valuation.fair_pe));
    message.push_str(&format!("• Premium / discount: {:+.1}%\n", valuation.premium));
    message.push_str(&format!("• Rating: {}\n", rating(valuation)));
    message.push_str(&format!("\n{}\n\n", RULE));

    let exchange = &report.exchange;
    message.push_str("💱 *Exchange rate*\n");
    message.push_str(&format!("• {} → {}\n", exchange.from, exchange.to));
    message.push_str(&format!("• Rate: {:.4}\n", exchange.rate));
    message.push_str(&format!("• {}\n", conversion_line(exchange)));
    message.push_str(&format!("\n{}\n\n", RULE));

    message.push_str("_Source: FRED, Multpl, Frankfurter_");
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn yields() -> YieldSnapshot {
        YieldSnapshot {
            treasury: 4.5,
            aaa: 5.0,
            baa: 5.5,
        }
    }

    fn exchange() -> ExchangeResult {
        ExchangeResult {
            from: "USD".to_string(),
            to: "CNY".to_string(),
            rate: 7.2456,
            amount: 100.0,
            converted: 724.56,
            date: "2024-01-15".to_string(),
        }
    }

    #[test]
    fn test_pe_message() {
        let message = pe_message(&yields());

        assert!(message.starts_with("📊 *Daily PE valuation*"));
        assert!(message.contains("• 10Y Treasury: 4.50%"));
        assert!(message.contains("• BAA: 5.50%"));
        assert!(message.contains("• 10Y Treasury: 22.22"));
        assert!(message.contains("• AAA: 20.00"));
        assert!(message.contains("150%"));
        assert!(message.contains("33.33"));
        assert!(message.ends_with("_Source: FRED (Federal Reserve Economic Data)_"));
    }

    #[test]
    fn test_cape_message() {
        let message = cape_message(&CapeValuation::new(30.0, 4.5));

        assert!(message.contains("• Shiller CAPE: 30.00"));
        assert!(message.contains("• Fair PE: 22.22"));
        assert!(message.contains("• Premium / discount: +35.0%"));
        assert!(message.contains("• 10Y treasury: 4.50%"));
        assert!(message.contains("*Rating: 📊 slightly above fair*"));
    }

    #[test]
    fn test_cape_message_discount_sign() {
        let message = cape_message(&CapeValuation::new(15.0, 4.0));
        assert!(message.contains("-40.0%"));
        assert!(message.contains("undervalued"));
    }

    #[test]
    fn test_forex_message_is_aligned() {
        let message = forex_message(&exchange());

        assert!(message.contains("| Rate   | 7.2456 "));
        assert!(message.contains("| Amount | 100.00 USD = 724.56 CNY |"));

        let widths: Vec<usize> = message
            .lines()
            .filter(|line| line.starts_with('|') || line.starts_with('+'))
            .map(|line| line.chars().count())
            .collect();
        assert_eq!(widths.len(), 7);
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_daily_message() {
        let report = DailyReport {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            yields: yields(),
            valuation: CapeValuation::new(30.0, 4.5),
            exchange: exchange(),
        };

        let message = daily_message(&report);
        assert!(message.contains("📅 2024-01-15"));
        assert!(message.contains("*10Y Treasury (4.50%)*"));
        assert!(message.contains("*BAA (5.50%)*"));
        assert!(message.contains("• Rating: 📊 slightly above fair"));
        assert!(message.contains("• USD → CNY"));
        assert!(message.contains("• Rate: 7.2456"));
        assert!(message.ends_with("_Source: FRED, Multpl, Frankfurter_"));
    }
}
