use anyhow::Result;
use tracing::{error, info};

use runscope2slack::config::load_config;
use runscope2slack::pipeline;
use runscope2slack::runscope::RunscopeClient;
use runscope2slack::slack::SlackClient;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let cfg = match load_config().await {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    };
    info!("project = {}, bucket = {}", cfg.project, cfg.runscope_bucket);

    let source = RunscopeClient::new(&cfg.runscope_api_url, &cfg.runscope_apikey);
    let publisher = SlackClient::new(&cfg.slack_api_url, &cfg.slack_token);

    let report = pipeline::run(&cfg, &source, &publisher).await?;
    info!("Published uptime for {} tests", report.results.len());

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}
