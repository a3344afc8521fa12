use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod cricket;
mod dashboard;
mod form;
mod outcome;
mod predictor;

use config::{Command, Config, PredictArgs};
use dashboard::AppState;
use form::{Field, MatchForm};
use outcome::PredictionOutcome;
use predictor::{PredictionRequest, PredictorClient, WinPredictor};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let client = PredictorClient::new(&config.predict_api_url, config.request_timeout())?;
    info!("Prediction endpoint: {}", client.predict_url());

    match config.command.clone() {
        Some(Command::Predict(args)) => predict_once(&client, args).await,
        None | Some(Command::Serve) => serve(&config, client).await,
    }
}

async fn serve(config: &Config, client: PredictorClient) -> Result<()> {
    let state = AppState {
        predictor: Arc::new(client),
    };
    let app = dashboard::router(state);
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Match predictor listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}

async fn predict_once(client: &PredictorClient, args: PredictArgs) -> Result<()> {
    let situation = match MatchForm::from(args).validate() {
        Ok(s) => s,
        Err(errors) => {
            for field in Field::ALL {
                for e in errors.for_field(field) {
                    eprintln!("{}: {}", field.label(), e);
                }
            }
            anyhow::bail!("invalid match situation ({} error(s))", errors.len());
        }
    };

    let rates = situation.rates();
    info!(
        "CRR {} / RRR {}",
        rates.crr.map_or("–".to_string(), |v| format!("{:.2}", v)),
        rates.rrr.map_or("–".to_string(), |v| format!("{:.2}", v)),
    );

    let request = PredictionRequest::from_situation(&situation);
    let result = client.predict(&request).await.map_err(|e| {
        error!("Error predicting match result: {:#}", e);
        anyhow::anyhow!(dashboard::PREDICTION_FAILED)
    })?;

    let outcome = PredictionOutcome::new(result, situation.batting_team, situation.bowling_team);
    print!("{}", outcome.render_text());
    Ok(())
}
