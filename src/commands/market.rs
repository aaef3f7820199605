//! Report commands: `pe`, `push`, `cape`, `forex` and `daily`.
//!
//! Each report is built by one aggregation over named fetch tasks. Task
//! order is the priority order used to pick the surfaced error.

use super::{as_notifier, finish, notifier_for, push, Output};
use crate::aggregate::{aggregate, FetchTask, Reading};
use crate::cli::Command;
use crate::config::Config;
use crate::errors::AggregateError;
use crate::models::{
    is_common_currency, CapeValuation, DailyReport, ExchangeQuery, PeReport, YieldSnapshot,
};
use crate::notify::Notifier;
use crate::report::{message, table};
use crate::sources::MarketData;
use anyhow::{bail, Result};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Treasury and AAA yields, plus BAA when asked for.
pub async fn collect_pe(
    market: &dyn MarketData,
    with_baa: bool,
) -> Result<PeReport, AggregateError> {
    let mut tasks = vec![
        FetchTask::new("treasury", market.treasury_yield()),
        FetchTask::new("aaa", market.aaa_yield()),
    ];
    if with_baa {
        tasks.push(FetchTask::new("baa", market.baa_yield()));
    }

    let mut collected = aggregate(tasks).await?;

    Ok(PeReport {
        treasury: collected.take("treasury")?,
        aaa: collected.take("aaa")?,
        baa: if with_baa {
            Some(collected.take("baa")?)
        } else {
            None
        },
    })
}

/// All three benchmark yields.
pub async fn collect_yields(market: &dyn MarketData) -> Result<YieldSnapshot, AggregateError> {
    let tasks = vec![
        FetchTask::new("treasury", market.treasury_yield()),
        FetchTask::new("aaa", market.aaa_yield()),
        FetchTask::new("baa", market.baa_yield()),
    ];

    let mut collected = aggregate(tasks).await?;

    Ok(YieldSnapshot {
        treasury: collected.take("treasury")?,
        aaa: collected.take("aaa")?,
        baa: collected.take("baa")?,
    })
}

/// Shiller CAPE against the treasury-implied fair PE.
pub async fn collect_cape(market: &dyn MarketData) -> Result<CapeValuation, AggregateError> {
    let tasks = vec![
        FetchTask::new("cape", market.shiller_cape()),
        FetchTask::new("treasury", market.treasury_yield()),
    ];

    let mut collected = aggregate(tasks).await?;
    let cape = collected.take("cape")?;
    let treasury = collected.take("treasury")?;

    Ok(CapeValuation::new(cape, treasury))
}

/// Every source at once: three yields, the CAPE and one exchange rate.
pub async fn collect_daily(
    market: &dyn MarketData,
    query: &ExchangeQuery,
    date: NaiveDate,
) -> Result<DailyReport, AggregateError> {
    let tasks = vec![
        FetchTask::new("treasury", async move {
            market.treasury_yield().await.map(Reading::Number)
        }),
        FetchTask::new("aaa", async move { market.aaa_yield().await.map(Reading::Number) }),
        FetchTask::new("baa", async move { market.baa_yield().await.map(Reading::Number) }),
        FetchTask::new("cape", async move { market.shiller_cape().await.map(Reading::Number) }),
        FetchTask::new("forex", async move {
            market.exchange_rate(query).await.map(Reading::Exchange)
        }),
    ];

    let mut collected = aggregate(tasks).await?;

    let yields = YieldSnapshot {
        treasury: collected.number("treasury")?,
        aaa: collected.number("aaa")?,
        baa: collected.number("baa")?,
    };
    let valuation = CapeValuation::new(collected.number("cape")?, yields.treasury);
    let exchange = collected.exchange("forex")?;

    Ok(DailyReport {
        date,
        yields,
        valuation,
        exchange,
    })
}

/// `lucky pe`
pub async fn pe(market: &dyn MarketData, output: &Output, with_baa: bool) -> Result<String> {
    let spinner = output.spinner("Fetching bond yields...");
    let report = collect_pe(market, with_baa).await;
    finish(spinner);

    let report = report?;
    info!(
        "Treasury {:.2}%, AAA {:.2}%{}",
        report.treasury,
        report.aaa,
        report
            .baa
            .map(|baa| format!(", BAA {:.2}%", baa))
            .unwrap_or_default()
    );

    output.render(&report, table::pe_table)
}

/// `lucky push`
pub async fn push_pe(
    market: &dyn MarketData,
    notifier: &dyn Notifier,
    output: &Output,
) -> Result<String> {
    let spinner = output.spinner("Fetching bond yields...");
    let yields = collect_yields(market).await;
    finish(spinner);

    let yields = yields?;
    push(notifier, &message::pe_message(&yields), "PE report").await?;

    let mut text = if output.is_json() {
        output.render(&yields, |_| String::new())?
    } else {
        String::new()
    };
    output.confirm(&mut text, "✅ Pushed PE report to Telegram");
    Ok(text)
}

/// `lucky cape`
pub async fn cape(
    market: &dyn MarketData,
    notifier: Option<&dyn Notifier>,
    output: &Output,
) -> Result<String> {
    let spinner = output.spinner("Fetching Shiller CAPE and treasury yield...");
    let valuation = collect_cape(market).await;
    finish(spinner);

    let valuation = valuation?;
    info!(
        "CAPE {:.2} vs fair PE {:.2} ({:+.1}%, {})",
        valuation.cape, valuation.fair_pe, valuation.premium, valuation.band
    );

    let mut text = output.render(&valuation, |v| {
        format!("{}\n\n{}\n", table::cape_table(v), table::band_line(v))
    })?;

    if let Some(notifier) = notifier {
        push(notifier, &message::cape_message(&valuation), "CAPE valuation").await?;
        output.confirm(&mut text, "\n✅ Pushed CAPE valuation to Telegram");
    }

    Ok(text)
}

/// `lucky forex`
pub async fn forex(
    market: &dyn MarketData,
    notifier: Option<&dyn Notifier>,
    output: &Output,
    query: &ExchangeQuery,
) -> Result<String> {
    warn_uncommon(query);

    let spinner = output.spinner(&format!("Fetching {} → {}...", query.from, query.to));
    let result = market.exchange_rate(query).await;
    finish(spinner);

    let result = result.map_err(|source| AggregateError::Source {
        name: "forex",
        source,
    })?;
    info!("1 {} = {:.4} {}", result.from, result.rate, result.to);

    let mut text = output.render(&result, table::forex_table)?;

    if let Some(notifier) = notifier {
        push(notifier, &message::forex_message(&result), "exchange rate").await?;
        output.confirm(&mut text, "\n✅ Pushed exchange rate to Telegram");
    }

    Ok(text)
}

/// `lucky daily`
pub async fn daily(
    market: &dyn MarketData,
    notifier: Option<&dyn Notifier>,
    output: &Output,
    query: &ExchangeQuery,
    date: NaiveDate,
) -> Result<String> {
    warn_uncommon(query);

    let spinner = output.spinner("Fetching yields, CAPE and exchange rate...");
    let report = collect_daily(market, query, date).await;
    finish(spinner);

    let report = report?;
    let mut text = output.render(&report, table::daily_tables)?;

    if let Some(notifier) = notifier {
        push(notifier, &message::daily_message(&report), "daily report").await?;
        output.confirm(&mut text, "\n✅ Pushed daily report to Telegram");
    }

    Ok(text)
}

/// Dispatch a report command.
///
/// Push credentials are resolved before anything is fetched, so a
/// misconfigured push fails without touching the data sources.
pub async fn run(
    market: &dyn MarketData,
    config: &Config,
    output: &Output,
    command: &Command,
    today: NaiveDate,
) -> Result<String> {
    match command {
        Command::Pe { baa } => pe(market, output, *baa).await,
        Command::Push => {
            let notifier = notifier_for(config, true)?;
            match as_notifier(&notifier) {
                Some(notifier) => push_pe(market, notifier, output).await,
                None => bail!("Telegram notifier unavailable"),
            }
        }
        Command::Cape { push } => {
            let notifier = notifier_for(config, *push)?;
            cape(market, as_notifier(&notifier), output).await
        }
        Command::Forex(args) => {
            let notifier = notifier_for(config, args.push)?;
            let query = ExchangeQuery::new(&args.from, &args.to, args.amount);
            forex(market, as_notifier(&notifier), output, &query).await
        }
        Command::Daily(args) => {
            let notifier = notifier_for(config, args.push)?;
            let query = ExchangeQuery::new(&args.forex_from, &args.forex_to, args.forex_amount);
            daily(market, as_notifier(&notifier), output, &query, today).await
        }
        other => bail!("{:?} is not a report command", other),
    }
}

fn warn_uncommon(query: &ExchangeQuery) {
    for code in [&query.from, &query.to] {
        if !is_common_currency(code) {
            warn!("{} is not a commonly used currency code", code);
        }
    }
}
