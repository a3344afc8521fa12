use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::time::Duration;

use crate::form::MatchForm;

/// IPL match win-probability predictor
#[derive(Parser, Debug, Clone)]
#[command(name = "ipl-predictor", version, about)]
pub struct Config {
    /// Address the form page listens on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,

    /// Base URL of the prediction backend (`/predict` is appended)
    #[arg(
        long,
        env = "PREDICT_API_URL",
        default_value = "https://iplmatchbackend.onrender.com"
    )]
    pub predict_api_url: String,

    /// Upstream request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the prediction form (default)
    Serve,
    /// Predict a single match situation and print the result
    Predict(PredictArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct PredictArgs {
    /// Batting (chasing) team, e.g. "Mumbai Indians"
    #[arg(long)]
    pub batting_team: String,

    /// Bowling team
    #[arg(long)]
    pub bowling_team: String,

    /// Host city
    #[arg(long)]
    pub city: String,

    /// Total runs to be chased
    #[arg(long, allow_hyphen_values = true)]
    pub target_runs: String,

    /// Runs needed to win
    #[arg(long, allow_hyphen_values = true)]
    pub runs_left: String,

    /// Remaining balls to be bowled
    #[arg(long, allow_hyphen_values = true)]
    pub balls_left: String,

    /// Remaining wickets (0-10)
    #[arg(long, allow_hyphen_values = true)]
    pub wickets_left: String,
}

impl From<PredictArgs> for MatchForm {
    fn from(args: PredictArgs) -> Self {
        MatchForm {
            batting_team: args.batting_team,
            bowling_team: args.bowling_team,
            city: args.city,
            target_runs: Some(args.target_runs),
            runs_left: Some(args.runs_left),
            balls_left: Some(args.balls_left),
            wickets_left: Some(args.wickets_left),
        }
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }
        url::Url::parse(&self.predict_api_url).map_err(|e| {
            anyhow::anyhow!("predict_api_url is not a valid URL ({}): {}", self.predict_api_url, e)
        })?;
        if matches!(self.command, None | Some(Command::Serve)) {
            self.listen_addr.parse::<SocketAddr>().map_err(|e| {
                anyhow::anyhow!("listen_addr is not a socket address ({}): {}", self.listen_addr, e)
            })?;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
