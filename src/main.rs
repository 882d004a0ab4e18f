use clap::Parser;
use course_reg::app::App;
use course_reg::cli::Args;
use course_reg::config::Config;
use course_reg::logging::setup_logging;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let early_config = {
        use figment::providers::Env;
        figment::Figment::new()
            .merge(Env::raw())
            .extract::<Config>()
            .expect("failed to load config for logging setup")
    };
    setup_logging(&early_config, args.tracing);

    info!(version = env!("CARGO_PKG_VERSION"), "starting course-reg");

    let app = match App::new().await {
        Ok(app) => app,
        Err(e) => {
            error!(error = ?e, "failed to initialize application");
            return ExitCode::FAILURE;
        }
    };

    match app.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "application error");
            ExitCode::FAILURE
        }
    }
}
