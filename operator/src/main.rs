use clap::Parser;
use ragme_operator::{
    application::{OperatorApp, logging::init_logging},
    args::Args,
    domain::common::OperatorConfig,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    init_logging(args.env.into(), &args.log_level);

    let config = OperatorConfig::from(args);
    info!(env = ?config.env, "starting ragme operator");

    OperatorApp::run(config).await?;

    Ok(())
}
