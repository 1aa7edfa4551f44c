//! Sentinel Intelligence Reports
//!
//! Terminal front end: generate TEAM 'B' reports, browse the archive, edit
//! monitoring keywords and watch the simulated live feed.

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{info, warn};

use sentinel_intel::analytics::{aggregate_sentiment, platform_mentions, total_engagement, volume_history};
use sentinel_intel::feed::{SimulatedFeed, DEFAULT_TICK};
use sentinel_intel::provider::client_from_settings;
use sentinel_intel::render::{archive_line, render_report, thousands};
use sentinel_intel::schema::report_json_schema;
use sentinel_intel::{
    GeneratorSettings, MonitoringConfiguration, ReportSession, SessionError, StructuredReportGenerator,
};

// ──────────────────────────────────────────────────────────────────────────────
// MAIN ENTRY POINT
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    sentinel_intel::telemetry::init_tracing()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let config = match std::env::args().nth(1) {
        Some(path) => MonitoringConfiguration::load(&path)
            .with_context(|| format!("loading monitoring configuration from {}", path))?,
        None => MonitoringConfiguration::default(),
    };

    let settings = GeneratorSettings::from_env().context("reading generator settings")?;
    let client = client_from_settings(&settings).context("creating model client")?;
    info!(provider = %settings.provider, model = %settings.model, "Model client ready");

    let generator = Arc::new(StructuredReportGenerator::new(client, settings));
    let session = Arc::new(ReportSession::new(generator, config));
    let mut feed = SimulatedFeed::new();

    println!("\n{}", "═".repeat(60));
    println!("🛡️  Sentinel Intelligence Reports v{}", env!("CARGO_PKG_VERSION"));
    println!("{}", "═".repeat(60));
    println!("Commands: generate | list | show [id] | keywords | add <kw> | remove <kw>");
    println!("          analytics | feed | watch <n> | schema | quit");
    println!("{}\n", "═".repeat(60));

    // Produce a first report on startup, as the dashboard does.
    run_generation(&session).await;

    loop {
        print!("🔎 sentinel> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let line = input.trim();
        let (command, arg) = match line.split_once(' ') {
            Some((c, a)) => (c, a.trim()),
            None => (line, ""),
        };

        match command {
            "" => continue,
            "quit" | "exit" => break,
            "generate" | "g" => run_generation(&session).await,
            "list" => {
                let reports = session.reports().await;
                if reports.is_empty() {
                    println!("No reports generated yet.");
                }
                for report in &reports {
                    println!("  {}", archive_line(report));
                }
            }
            "show" => {
                let report = if arg.is_empty() {
                    session.selected().await
                } else {
                    session.find(arg).await
                };
                match report {
                    Some(report) => {
                        session.select(&report.id).await;
                        println!("\n{}", render_report(&report));
                    }
                    None => println!("No matching report."),
                }
            }
            "keywords" => {
                let config = session.configuration().await;
                println!("Keywords:  {}", config.keywords().join(", "));
                println!("Scope:     {}", config.scope().join(", "));
                println!("Platforms: {}", config.platforms().join(", "));
            }
            "add" => {
                if session.add_keyword(arg).await {
                    println!("Tracking '{}'.", arg.trim());
                } else {
                    println!("'{}' is empty or already tracked.", arg);
                }
            }
            "remove" => {
                if session.remove_keyword(arg).await {
                    println!("Stopped tracking '{}'.", arg);
                } else {
                    println!("'{}' is not tracked.", arg);
                }
            }
            "analytics" => print_analytics(&session).await,
            "feed" => {
                feed.tick();
                for entry in feed.entries() {
                    println!(
                        "  [{}] {:<10} {}",
                        entry.timestamp.format("%H:%M:%S"),
                        entry.platform,
                        entry.event
                    );
                }
            }
            "watch" => {
                let count: usize = arg.parse().unwrap_or(3);
                let (mut rx, handle) = SimulatedFeed::new().spawn(DEFAULT_TICK);
                for _ in 0..count {
                    match rx.recv().await {
                        Some(entry) => println!(
                            "  [{}] {:<10} {}",
                            entry.timestamp.format("%H:%M:%S"),
                            entry.platform,
                            entry.event
                        ),
                        None => break,
                    }
                }
                drop(rx);
                let _ = handle.await;
            }
            "schema" => {
                println!("{}", serde_json::to_string_pretty(&report_json_schema())?);
            }
            other => println!("Unknown command '{}'.", other),
        }
    }

    println!("👋 Goodbye.");
    Ok(())
}

/// Generate in the background; Ctrl-C abandons the request.
async fn run_generation(session: &Arc<ReportSession>) {
    println!("⏳ Generating report... (Ctrl-C to cancel)");

    let mut worker = {
        let session = Arc::clone(session);
        tokio::spawn(async move { session.generate().await })
    };

    let outcome = tokio::select! {
        res = &mut worker => res,
        _ = tokio::signal::ctrl_c() => {
            session.cancel();
            worker.await
        }
    };

    match outcome {
        Ok(Ok(report)) => {
            println!("✅ {}", archive_line(&report));
        }
        Ok(Err(SessionError::Generation(e))) => {
            warn!(kind = e.kind(), "Report generation failed");
            println!("❌ {}", e);
            println!("   {}", e.remediation());
        }
        Ok(Err(e)) => println!("⚠️  {}", e),
        Err(e) => println!("❌ generation task failed: {}", e),
    }
}

async fn print_analytics(session: &ReportSession) {
    let reports = session.reports().await;
    if reports.is_empty() {
        println!("No reports to analyze yet.");
        return;
    }

    if let Some(mean) = aggregate_sentiment(&reports) {
        println!(
            "Aggregate sentiment: positive {:.1} | neutral {:.1} | negative {:.1}",
            mean.positive, mean.neutral, mean.negative
        );
    }
    println!("Total monitored engagement: {}", thousands(total_engagement(&reports)));

    println!("Engagement volume history:");
    for point in volume_history(&reports) {
        println!(
            "  {:<10} {} {:>10} | {} {:>10}",
            point.time,
            point.label1,
            thousands(point.trend1),
            point.label2,
            thousands(point.trend2)
        );
    }

    println!("Platform distribution:");
    for (platform, count) in platform_mentions(&reports) {
        println!("  {:<18} {}", platform, count);
    }
}
