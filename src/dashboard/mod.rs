use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info};

use crate::cricket::{City, Team};
use crate::form::{Field, FieldError, FieldInfo, MatchForm, RunRates};
use crate::outcome::PredictionOutcome;
use crate::predictor::{PredictionRequest, WinPredictor};

/// Alert text shown for any upstream failure.
pub const PREDICTION_FAILED: &str = "Failed to predict match result. Please try again.";

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<dyn WinPredictor>,
}

/// Build the Axum router for the prediction page.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/options", get(options_handler))
        .route("/api/rates", post(rates_handler))
        .route("/api/predict", post(predict_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Serve the form page.
async fn index_handler() -> impl IntoResponse {
    Html(INDEX_HTML)
}

#[derive(Debug, Serialize)]
struct Options {
    teams: Vec<Team>,
    cities: Vec<City>,
    fields: Vec<FieldInfo>,
}

/// GET /api/options
async fn options_handler() -> impl IntoResponse {
    Json(Options {
        teams: Team::ALL.to_vec(),
        cities: City::all().collect(),
        fields: Field::ALL.into_iter().map(FieldInfo::from).collect(),
    })
}

/// POST /api/rates – recompute the read-only rate fields while typing.
async fn rates_handler(Json(form): Json<MatchForm>) -> Json<RunRates> {
    Json(form.rates())
}

#[derive(Debug, Serialize)]
struct ValidationBody {
    errors: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
struct FailureBody {
    error: &'static str,
}

/// POST /api/predict
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<MatchForm>,
) -> Response {
    let situation = match form.validate() {
        Ok(s) => s,
        Err(errors) => {
            debug!("Rejected form with {} error(s): {}", errors.len(), errors);
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationBody {
                    errors: errors.to_field_errors(),
                }),
            )
                .into_response();
        }
    };

    let request = PredictionRequest::from_situation(&situation);
    match state.predictor.predict(&request).await {
        Ok(result) => {
            let outcome =
                PredictionOutcome::new(result, situation.batting_team, situation.bowling_team);
            info!(
                "{} favoured ({:.2}% / {:.2}%)",
                outcome.favoured_team(),
                outcome.batting_win_pct,
                outcome.bowling_win_pct
            );
            Json(outcome).into_response()
        }
        Err(e) => {
            error!(
                "Error predicting match result via {}: {:#}",
                state.predictor.name(),
                e
            );
            (
                StatusCode::BAD_GATEWAY,
                Json(FailureBody {
                    error: PREDICTION_FAILED,
                }),
            )
                .into_response()
        }
    }
}

/// Embedded single-file page (HTML + CSS + JS)
const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>IPL Match Predictor</title>
<style>
  :root {
    --blue: #2563eb;
    --purple: #7c3aed;
    --indigo: #4f46e5;
    --orange: #f97316;
    --text: #1f2937;
    --muted: #6b7280;
    --border: #dbeafe;
    --red: #dc2626;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { min-height: 100vh; color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif;
         background: linear-gradient(135deg, #eff6ff, #f5f3ff, #fdf2f8); padding: 2rem 1rem; }
  .wrap { max-width: 56rem; margin: 0 auto; }
  header { text-align: center; margin-bottom: 2rem; }
  header h1 { font-size: 2.6rem; font-weight: 800; background: linear-gradient(90deg, var(--blue), var(--purple));
              -webkit-background-clip: text; background-clip: text; color: transparent; margin-bottom: .6rem; }
  header p { color: var(--muted); font-size: 1.1rem; }
  .card { background: rgba(255,255,255,.92); border-radius: 12px; box-shadow: 0 10px 30px rgba(0,0,0,.08); overflow: hidden; }
  .card-header { background: linear-gradient(90deg, #3b82f6, #8b5cf6); color: #fff; padding: 1rem 1.5rem; font-size: 1.2rem; font-weight: 700; }
  form { padding: 1.5rem; display: grid; gap: 1.5rem; }
  .grid { display: grid; grid-template-columns: 1fr 1fr; gap: 1.5rem; }
  @media (max-width: 768px) { .grid { grid-template-columns: 1fr; } }
  .col { display: grid; gap: 1rem; align-content: start; }
  h3 { font-size: 1.05rem; font-weight: 600; }
  h3.teams { color: #1d4ed8; }
  h3.situation { color: #6d28d9; }
  .field label { display: block; font-weight: 600; font-size: .9rem; margin-bottom: .3rem; }
  .field select, .field input { width: 100%; height: 2.75rem; border: 2px solid var(--border); border-radius: 6px; padding: 0 .7rem; font-size: .95rem; }
  .field input:disabled { background: #f9fafb; border-color: #e5e7eb; }
  .field .desc { color: var(--muted); font-size: .8rem; margin-top: .25rem; }
  .field .err { color: var(--red); font-size: .8rem; margin-top: .25rem; min-height: 0; }
  hr { border: none; border-top: 1px solid #e5e7eb; }
  button.submit { height: 3rem; font-size: 1.1rem; color: #fff; border: none; border-radius: 8px; cursor: pointer;
                  background: linear-gradient(90deg, var(--blue), var(--purple)); box-shadow: 0 6px 14px rgba(79,70,229,.3); }
  button.submit:disabled { opacity: .6; cursor: progress; }
  .overlay { position: fixed; inset: 0; background: rgba(0,0,0,.45); display: none; align-items: center; justify-content: center; }
  .overlay.open { display: flex; }
  .dialog { background: linear-gradient(#fff, #eff6ff); border-radius: 12px; padding: 1.5rem; width: min(28rem, 92vw); text-align: center; }
  .dialog h2 { color: #1e40af; font-size: 1.5rem; }
  .dialog .sub { color: var(--muted); margin-bottom: .5rem; }
  .legend { display: flex; justify-content: center; gap: 1rem; font-size: .85rem; margin: .5rem 0; }
  .legend span::before { content: ''; display: inline-block; width: .7rem; height: .7rem; margin-right: .3rem; background: var(--c); border-radius: 2px; }
  .badge { display: inline-block; color: #fff; padding: .25rem .8rem; border-radius: 6px; font-size: 1.05rem; margin-bottom: .5rem; }
  .headline { font-size: 1.2rem; font-weight: 700; }
  .warning { color: #ca8a04; font-size: .9rem; margin-top: .75rem; }
  .close { margin-top: 1rem; color: #fff; border: none; border-radius: 8px; padding: .5rem 1.5rem; cursor: pointer;
           background: linear-gradient(90deg, var(--blue), var(--purple)); }
</style>
</head>
<body>
<div class="wrap">
  <header>
    <h1>IPL Match Predictor</h1>
    <p>Predict the winning percentage of IPL teams based on match situations</p>
  </header>

  <div class="card">
    <div class="card-header">🏏 Match Situation Analysis</div>
    <form id="form" novalidate>
      <div class="grid">
        <div class="col" id="teams-col"><h3 class="teams">🏆 Teams Information</h3></div>
        <div class="col" id="situation-col"><h3 class="situation">🎯 Match Situation</h3></div>
      </div>
      <hr>
      <div class="grid" id="rates-row"></div>
      <button type="submit" class="submit" id="submit">Predict Match Result</button>
    </form>
  </div>
</div>

<div class="overlay" id="overlay">
  <div class="dialog" role="dialog" aria-modal="true">
    <h2>🏆 Match Prediction Result</h2>
    <p class="sub">Win probability based on the current match situation</p>
    <canvas id="pie" width="260" height="220"></canvas>
    <div class="legend" id="legend"></div>
    <div class="badge" id="badge"></div>
    <p class="headline" id="headline"></p>
    <p class="warning" id="warning"></p>
    <button class="close" id="close">Close</button>
  </div>
</div>

<script>
const SELECTS = ['batting_team', 'bowling_team', 'city'];
const NUMBERS = ['target_runs', 'runs_left', 'balls_left', 'wickets_left'];
const form = document.getElementById('form');
const submit = document.getElementById('submit');

function fieldHtml(f, control) {
  return `<div class="field">
    <label for="${f.name}">${f.label}</label>
    ${control}
    ${f.description ? `<p class="desc">${f.description}</p>` : ''}
    <p class="err" id="err-${f.name}"></p>
  </div>`;
}

async function buildForm() {
  const r = await fetch('/api/options');
  if (!r.ok) return;
  const o = await r.json();
  const byName = Object.fromEntries(o.fields.map(f => [f.name, f]));
  const opts = (list, ph) => `<option value="">${ph}</option>` + list.map(v => `<option value="${v}">${v}</option>`).join('');

  const teamsCol = document.getElementById('teams-col');
  for (const name of SELECTS) {
    const f = byName[name];
    const list = name === 'city' ? o.cities : o.teams;
    teamsCol.insertAdjacentHTML('beforeend', fieldHtml(f, `<select id="${name}" name="${name}">${opts(list, f.placeholder)}</select>`));
  }
  const situationCol = document.getElementById('situation-col');
  for (const name of NUMBERS) {
    const f = byName[name];
    situationCol.insertAdjacentHTML('beforeend', fieldHtml(f, `<input type="number" id="${name}" name="${name}" placeholder="${f.placeholder}">`));
  }
  const ratesRow = document.getElementById('rates-row');
  for (const name of ['crr', 'rrr']) {
    ratesRow.insertAdjacentHTML('beforeend', fieldHtml(byName[name], `<input type="number" id="${name}" disabled>`));
  }
  for (const name of ['target_runs', 'runs_left', 'balls_left']) {
    document.getElementById(name).addEventListener('input', refreshRates);
  }
}

function values() {
  const v = {};
  for (const name of SELECTS.concat(NUMBERS)) v[name] = document.getElementById(name).value;
  return v;
}

async function refreshRates() {
  const r = await fetch('/api/rates', { method: 'POST', headers: { 'Content-Type': 'application/json' }, body: JSON.stringify(values()) });
  if (!r.ok) return;
  const rates = await r.json();
  // An unset rate keeps whatever was last shown
  if (rates.crr != null) document.getElementById('crr').value = rates.crr;
  if (rates.rrr != null) document.getElementById('rrr').value = rates.rrr;
}

function showErrors(errors) {
  document.querySelectorAll('.err').forEach(e => e.textContent = '');
  for (const e of errors) {
    const el = document.getElementById('err-' + e.field);
    if (el && !el.textContent) el.textContent = e.message;
  }
}

form.addEventListener('submit', async ev => {
  ev.preventDefault();
  submit.disabled = true;
  submit.textContent = 'Analyzing Match Situation...';
  try {
    const r = await fetch('/api/predict', { method: 'POST', headers: { 'Content-Type': 'application/json' }, body: JSON.stringify(values()) });
    const body = await r.json().catch(() => null);
    if (r.status === 422 && body) {
      showErrors(body.errors);
      return;
    }
    showErrors([]);
    if (!r.ok || !body) throw new Error('HTTP ' + r.status);
    showResult(body);
  } catch (err) {
    console.error('Error predicting match result:', err);
    alert('Failed to predict match result. Please try again.');
  } finally {
    submit.disabled = false;
    submit.textContent = 'Predict Match Result';
  }
});

function drawPie(slices) {
  const canvas = document.getElementById('pie');
  const ctx = canvas.getContext('2d');
  const cx = canvas.width / 2, cy = canvas.height / 2, R = 80;
  ctx.clearRect(0, 0, canvas.width, canvas.height);
  const total = slices.reduce((s, x) => s + x.value, 0) || 1;
  let start = -Math.PI / 2;
  for (const s of slices) {
    const sweep = (s.value / total) * Math.PI * 2;
    ctx.beginPath(); ctx.moveTo(cx, cy);
    ctx.arc(cx, cy, R, start, start + sweep); ctx.closePath();
    ctx.fillStyle = s.color; ctx.fill();
    ctx.strokeStyle = '#fff'; ctx.lineWidth = 2; ctx.stroke();
    if (s.label) {
      const mid = start + sweep / 2;
      ctx.fillStyle = '#fff'; ctx.font = '600 13px system-ui'; ctx.textAlign = 'center'; ctx.textBaseline = 'middle';
      ctx.fillText(s.label, cx + Math.cos(mid) * R * 0.55, cy + Math.sin(mid) * R * 0.55);
    }
    start += sweep;
  }
}

function showResult(o) {
  drawPie(o.slices);
  document.getElementById('legend').innerHTML = o.slices.map(s => `<span style="--c:${s.color}">${s.name}</span>`).join('');
  const badge = document.getElementById('badge');
  badge.textContent = o.badge;
  badge.style.background = o.favoured === 'batting' ? '#2563eb' : '#f97316';
  document.getElementById('headline').textContent = o.headline;
  document.getElementById('headline').style.color = o.favoured === 'batting' ? '#1e40af' : '#c2410c';
  document.getElementById('warning').textContent = o.warning ? '⚠ ' + o.warning : '';
  document.getElementById('overlay').classList.add('open');
}

document.getElementById('close').addEventListener('click', () => {
  document.getElementById('overlay').classList.remove('open');
});

buildForm();
</script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct FixedPredictor {
        result: Option<f64>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WinPredictor for FixedPredictor {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn predict(&self, _request: &PredictionRequest) -> Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.result {
                Some(r) => Ok(r),
                None => anyhow::bail!("Prediction API error 503 Service Unavailable"),
            }
        }
    }

    fn app(result: Option<f64>) -> (Router, Arc<FixedPredictor>) {
        let predictor = Arc::new(FixedPredictor {
            result,
            calls: AtomicUsize::new(0),
        });
        let state = AppState {
            predictor: predictor.clone(),
        };
        (router(state), predictor)
    }

    fn valid_body() -> Value {
        json!({
            "batting_team": "Royal Challengers Bengaluru",
            "bowling_team": "Chennai Super Kings",
            "city": "Bengaluru",
            "target_runs": "180",
            "runs_left": "50",
            "balls_left": "30",
            "wickets_left": "7"
        })
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_predict_success() {
        let (app, predictor) = app(Some(72.345));
        let (status, body) = post_json(app, "/api/predict", valid_body()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["batting_win_pct"], 72.35);
        assert_eq!(body["bowling_win_pct"], 27.65);
        assert_eq!(body["favoured"], "batting");
        assert_eq!(body["one_sided"], false);
        assert_eq!(
            body["headline"],
            "Royal Challengers Bengaluru has a 72.35% chance of winning"
        );
        assert_eq!(body["slices"].as_array().unwrap().len(), 2);
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_predict_upstream_failure_is_502_alert() {
        let (app, predictor) = app(None);
        let (status, body) = post_json(app, "/api/predict", valid_body()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], PREDICTION_FAILED);
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_prediction_can_be_resubmitted() {
        let predictor = Arc::new(FixedPredictor {
            result: None,
            calls: AtomicUsize::new(0),
        });
        let app = router(AppState {
            predictor: predictor.clone(),
        });
        for _ in 0..2 {
            let (status, _) = post_json(app.clone(), "/api/predict", valid_body()).await;
            assert_eq!(status, StatusCode::BAD_GATEWAY);
        }
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_predictor() {
        let (app, predictor) = app(Some(50.0));
        let mut body = valid_body();
        body["bowling_team"] = json!("Royal Challengers Bengaluru");
        body["runs_left"] = json!("200");

        let (status, resp) = post_json(app, "/api/predict", body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let errors = resp["errors"].as_array().unwrap();
        assert!(errors.contains(&json!({
            "field": "bowling_team",
            "message": "Batting and bowling teams must be different"
        })));
        assert!(errors.contains(&json!({
            "field": "runs_left",
            "message": "Runs left cannot be greater than target runs"
        })));
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rates_endpoint() {
        let (app, _) = app(None);
        let (status, body) = post_json(app, "/api/rates", valid_body()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["crr"], 8.67);
        assert_eq!(body["rrr"], 10.0);
    }

    #[tokio::test]
    async fn test_rates_endpoint_zero_balls_left() {
        let (app, _) = app(None);
        let mut body = valid_body();
        body["balls_left"] = json!("0");
        let (_, rates) = post_json(app, "/api/rates", body).await;
        assert_eq!(rates["rrr"], Value::Null);
        assert!(rates["crr"].is_number());
    }

    #[tokio::test]
    async fn test_options() {
        let (app, _) = app(None);
        let resp = app
            .oneshot(Request::builder().uri("/api/options").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["teams"].as_array().unwrap().len(), 10);
        assert_eq!(body["cities"].as_array().unwrap().len(), 33);
        assert_eq!(body["fields"][3]["name"], "target_runs");
        assert_eq!(body["fields"][3]["description"], "Total runs to be chased");
        assert_eq!(body["fields"][7]["derived"], true);
    }

    #[tokio::test]
    async fn test_index_page() {
        let (app, _) = app(None);
        let resp = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("IPL Match Predictor"));
        assert!(html.contains("/api/predict"));
    }
}
