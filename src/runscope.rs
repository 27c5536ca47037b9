use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::types::{MetricSample, Test, TestList, TestMetrics, Window};

/// Page size for the bucket test listing; the API caps it at 50.
pub const TEST_PAGE_SIZE: u32 = 50;

/// Read-only view of the upstream uptime API.
#[async_trait]
pub trait MetricsSource {
    async fn list_tests(&self, bucket: &str) -> Result<Vec<Test>>;
    async fn get_metrics(&self, bucket: &str, test_id: &str, window: Window) -> Result<Vec<MetricSample>>;
}

pub struct RunscopeClient {
    http: reqwest::Client,
    base_url: String,
    apikey: String,
}

impl RunscopeClient {
    pub fn new(base_url: &str, apikey: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            apikey: apikey.to_string(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.apikey)
    }
}

#[async_trait]
impl MetricsSource for RunscopeClient {
    async fn list_tests(&self, bucket: &str) -> Result<Vec<Test>> {
        let url = format!("{}/buckets/{}/tests", self.base_url, bucket);
        let res = self
            .http
            .get(&url)
            .query(&[("count", TEST_PAGE_SIZE)])
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await
            .context("Failed to send Runscope test listing request")?
            .error_for_status()
            .context("Runscope test listing failed")?;
        let list: TestList = res
            .json()
            .await
            .context("Invalid Runscope test listing response")?;
        debug!("listed tests: {:?}", list.data);
        Ok(list.data)
    }

    async fn get_metrics(&self, bucket: &str, test_id: &str, window: Window) -> Result<Vec<MetricSample>> {
        let url = format!("{}/buckets/{}/tests/{}/metrics", self.base_url, bucket, test_id);
        let res = self
            .http
            .get(&url)
            .query(&[("timeframe", window.as_str())])
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await
            .with_context(|| format!("Failed to send Runscope metrics request for test {}", test_id))?
            .error_for_status()
            .with_context(|| format!("Runscope metrics request failed for test {} ({})", test_id, window))?;
        let metrics: TestMetrics = res
            .json()
            .await
            .with_context(|| format!("Invalid Runscope metrics response for test {}", test_id))?;
        Ok(metrics.response_times)
    }
}
