use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub runscope_apikey: String,
    pub runscope_bucket: String,
    pub slack_token: String,
    pub slack_channel: String,
    pub project: String,
    pub runscope_api_url: String,
    pub slack_api_url: String,
    pub output_dir: PathBuf,
}

/// Trailing aggregation period understood by the Runscope metrics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    Day,
    Week,
    Month,
}

impl Window {
    /// Fixed processing order for collection, rendering and publishing.
    pub const ALL: [Window; 3] = [Window::Day, Window::Week, Window::Month];

    pub fn as_str(&self) -> &'static str {
        match self {
            Window::Day => "day",
            Window::Week => "week",
            Window::Month => "month",
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Test {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct MetricSample {
    #[serde(default)]
    pub success_ratio: Option<f64>,
}

/// Per-test uptime percentages. `0.0` means no samples were reported for that window.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedResult {
    pub label: String,
    pub day: f64,
    pub week: f64,
    pub month: f64,
}

impl AggregatedResult {
    pub fn value(&self, window: Window) -> f64 {
        match window {
            Window::Day => self.day,
            Window::Week => self.week,
            Window::Month => self.month,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TestList {
    pub data: Vec<Test>,
}

#[derive(Debug, Deserialize)]
pub struct TestMetrics {
    #[serde(default)]
    pub response_times: Vec<MetricSample>,
}

#[derive(Debug, Deserialize)]
pub struct SlackUploadResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}
