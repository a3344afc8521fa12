use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::{PredictionRequest, PredictionResponse, WinPredictor};

/// Client for the remote prediction backend (`POST /predict`).
#[derive(Clone)]
pub struct PredictorClient {
    http: Client,
    predict_url: Url,
}

impl PredictorClient {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(PredictorClient {
            http,
            predict_url: predict_url(api_url)?,
        })
    }

    pub fn predict_url(&self) -> &str {
        self.predict_url.as_str()
    }
}

/// Resolve `<api_url>/predict`, keeping any path prefix on the base URL.
fn predict_url(api_url: &str) -> Result<Url> {
    let mut base = Url::parse(api_url)
        .with_context(|| format!("Invalid prediction API URL: {}", api_url))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("predict")
        .context("Failed to build prediction endpoint URL")
}

#[async_trait]
impl WinPredictor for PredictorClient {
    fn name(&self) -> &str {
        "remote-predictor"
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<f64> {
        debug!("Requesting prediction from {}: {:?}", self.predict_url, request);

        let resp = self
            .http
            .post(self.predict_url.clone())
            .json(request)
            .send()
            .await
            .context("Prediction API request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Prediction API error {}: {}", status, body);
        }

        let body: PredictionResponse = resp
            .json()
            .await
            .context("Failed to parse prediction response")?;

        let result = body.result;
        if !result.is_finite() || !(0.0..=100.0).contains(&result) {
            anyhow::bail!("Prediction result out of range: {}", result);
        }

        info!(
            "Predicted {} vs {}: {:.2}% for the batting side",
            request.batting_team, request.bowling_team, result
        );
        Ok(result)
    }
}
