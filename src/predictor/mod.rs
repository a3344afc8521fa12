pub mod client;

pub use client::PredictorClient;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cricket::{City, Team};
use crate::form::{run_rate, MatchSituation};

/// Anything that can turn a match situation into a batting-side win percentage.
#[async_trait]
pub trait WinPredictor: Send + Sync {
    /// Batting team's chance of winning, in percent (0–100).
    async fn predict(&self, request: &PredictionRequest) -> Result<f64>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Body of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub city: City,
    pub runs_left: u32,
    pub balls_left: u32,
    pub wickets_left: u32,
    pub target_runs: u32,
    pub crr: f64,
    pub rrr: f64,
}

impl PredictionRequest {
    /// Rates are sent unrounded; a guarded denominator is sent as `0.0` so the
    /// backend always receives a number.
    pub fn from_situation(situation: &MatchSituation) -> Self {
        let crr = run_rate::current_run_rate(
            situation.target_runs,
            situation.runs_left,
            situation.balls_left,
        )
        .unwrap_or(0.0);
        let rrr = run_rate::required_run_rate(situation.runs_left, situation.balls_left)
            .unwrap_or(0.0);

        PredictionRequest {
            batting_team: situation.batting_team,
            bowling_team: situation.bowling_team,
            city: situation.city,
            runs_left: situation.runs_left,
            balls_left: situation.balls_left,
            wickets_left: situation.wickets_left,
            target_runs: situation.target_runs,
            crr,
            rrr,
        }
    }
}

/// Body returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionResponse {
    pub result: f64,
}
