// Public modules
pub mod types;
pub mod config;
pub mod aggregation;
pub mod runscope;
pub mod collector;
pub mod render;
pub mod report;
pub mod slack;
pub mod pipeline;

// Re-export commonly used items
pub use types::*;
pub use config::{
    load_config, load_config_with, EnvironmentProvider, SystemEnvironment, MockEnvironment,
    ParameterStore, ParameterStoreError, SsmParameterStore, MockParameterStore, SettingsResolver,
};
pub use aggregation::{is_skipped, mean_success_ratio, ratio_to_percentage, uptime_percentage, format_percentage, SKIPPED_TESTS};
pub use runscope::{MetricsSource, RunscopeClient};
pub use collector::MetricsCollector;
pub use render::{render_grid, save_png, CellColor, GridLayout};
pub use report::{UptimeReport, ReportSummary};
pub use slack::{upload_title, Publisher, PublishError, SlackClient};
