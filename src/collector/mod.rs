use anyhow::Result;
use tracing::{debug, info};

use crate::aggregation::{is_skipped, uptime_percentage};
use crate::runscope::MetricsSource;
use crate::types::*;

/// Collector structure that turns a bucket's tests into per-window uptimes
pub struct MetricsCollector<'a, S: MetricsSource> {
    source: &'a S,
    config: &'a Config,
}

impl<'a, S: MetricsSource> MetricsCollector<'a, S> {
    pub fn new(source: &'a S, config: &'a Config) -> Self {
        Self { source, config }
    }

    /// Collect one result per non-skipped test in the configured bucket.
    /// Any failed request aborts the whole collection.
    pub async fn collect_all(&self) -> Result<Vec<AggregatedResult>> {
        let bucket = &self.config.runscope_bucket;
        let tests = self.source.list_tests(bucket).await?;
        info!("Found {} tests in bucket {}", tests.len(), bucket);

        let mut results = Vec::with_capacity(tests.len());
        for test in &tests {
            if is_skipped(&test.name) {
                info!("Skipping test: {}", test.name);
                continue;
            }
            results.push(self.collect_test(test).await?);
        }
        Ok(results)
    }

    /// Fetch the three windows of a single test, always in day/week/month order
    pub async fn collect_test(&self, test: &Test) -> Result<AggregatedResult> {
        debug!("getting uptimes for {} {}", test.name, test.id);
        let bucket = &self.config.runscope_bucket;

        let mut uptimes = [0.0_f64; 3];
        for (slot, window) in uptimes.iter_mut().zip(Window::ALL) {
            let samples = self.source.get_metrics(bucket, &test.id, window).await?;
            *slot = uptime_percentage(&samples);
        }

        Ok(AggregatedResult {
            label: test.name.clone(),
            day: uptimes[0],
            week: uptimes[1],
            month: uptimes[2],
        })
    }
}
