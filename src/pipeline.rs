use anyhow::Result;
use tracing::{info, warn};

use crate::collector::MetricsCollector;
use crate::render::{render_grid, save_png};
use crate::report::UptimeReport;
use crate::runscope::MetricsSource;
use crate::slack::{upload_title, Publisher};
use crate::types::{Config, Window};

/// Collect, then render and publish each window in turn.
///
/// The first failure ends the run. Windows already published stay published.
pub async fn run<S, P>(cfg: &Config, source: &S, publisher: &P) -> Result<UptimeReport>
where
    S: MetricsSource,
    P: Publisher,
{
    let results = MetricsCollector::new(source, cfg).collect_all().await?;
    let report = UptimeReport::new(&cfg.project, results);
    if report.is_empty() {
        warn!("No tests to report for bucket {}, nothing published", cfg.runscope_bucket);
        return Ok(report);
    }

    for window in Window::ALL {
        publish_window(cfg, &report, window, publisher).await?;
    }
    Ok(report)
}

pub async fn publish_window<P: Publisher>(
    cfg: &Config,
    report: &UptimeReport,
    window: Window,
    publisher: &P,
) -> Result<()> {
    let summary = report.summary(window);
    if summary.has_issues() {
        warn!(
            "{} uptime: {} of {} tests below threshold ({} without data), {} healthy",
            summary.window,
            summary.below_threshold,
            summary.total,
            summary.no_data,
            summary.healthy()
        );
    } else {
        info!("{} uptime: all {} tests healthy", summary.window, summary.healthy());
    }

    let img = render_grid(&report.results, window);
    let path = save_png(&img, &cfg.output_dir, window)?;
    publisher
        .upload_file(&cfg.slack_channel, &path, &upload_title(&report.project, window))
        .await
}
