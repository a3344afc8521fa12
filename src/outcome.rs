//! Presentation of a prediction: the two-slice win distribution, which side is
//! favoured and whether the match looks one-sided.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;

use crate::cricket::Team;
use crate::form::run_rate::round2;

/// Below this share (percent) for either side the match is flagged one-sided.
const ONE_SIDED_THRESHOLD: f64 = 20.0;
/// Slices smaller than this fraction of the pie get no percentage label.
const MIN_LABELLED_FRACTION: f64 = 0.05;

const FAVOURED_COLOR: &str = "#4f46e5";
const UNDERDOG_COLOR: &str = "#f97316";

const ONE_SIDED_WARNING: &str = "This is a highly one-sided match situation!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Batting,
    Bowling,
}

/// One slice of the win-probability pie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub name: Team,
    pub value: f64,
    pub color: &'static str,
    /// In-slice label, omitted for slivers.
    pub label: Option<String>,
}

/// Everything the result dialog shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub batting_win_pct: f64,
    pub bowling_win_pct: f64,
    pub favoured: Side,
    pub one_sided: bool,
    pub badge: &'static str,
    pub headline: String,
    pub warning: Option<&'static str>,
    pub slices: Vec<ChartSlice>,
    pub predicted_at: DateTime<Utc>,
}

impl PredictionOutcome {
    /// Build the view from the backend's batting-side percentage.
    pub fn new(result: f64, batting_team: Team, bowling_team: Team) -> Self {
        let batting_win_pct = round2(result);
        let bowling_win_pct = round2(100.0 - batting_win_pct);

        // A dead heat goes to the bowling side.
        let favoured = if batting_win_pct > bowling_win_pct {
            Side::Batting
        } else {
            Side::Bowling
        };
        let one_sided =
            batting_win_pct < ONE_SIDED_THRESHOLD || bowling_win_pct < ONE_SIDED_THRESHOLD;

        let (badge, headline) = match favoured {
            Side::Batting => (
                "Batting Team Favored",
                format!(
                    "{} has a {}% chance of winning",
                    batting_team,
                    fmt_pct(batting_win_pct)
                ),
            ),
            Side::Bowling => (
                "Bowling Team Favored",
                format!(
                    "{} has a {}% chance of winning",
                    bowling_team,
                    fmt_pct(bowling_win_pct)
                ),
            ),
        };

        let (batting_color, bowling_color) = match favoured {
            Side::Batting => (FAVOURED_COLOR, UNDERDOG_COLOR),
            Side::Bowling => (UNDERDOG_COLOR, FAVOURED_COLOR),
        };
        let total = batting_win_pct + bowling_win_pct;
        let slices = vec![
            slice(batting_team, batting_win_pct, total, batting_color),
            slice(bowling_team, bowling_win_pct, total, bowling_color),
        ];

        PredictionOutcome {
            batting_team,
            bowling_team,
            batting_win_pct,
            bowling_win_pct,
            favoured,
            one_sided,
            badge,
            headline,
            warning: one_sided.then_some(ONE_SIDED_WARNING),
            slices,
            predicted_at: Utc::now(),
        }
    }

    pub fn favoured_team(&self) -> Team {
        match self.favoured {
            Side::Batting => self.batting_team,
            Side::Bowling => self.bowling_team,
        }
    }

    /// Terminal rendering of the result dialog.
    pub fn render_text(&self) -> String {
        const BAR_WIDTH: usize = 40;
        let name_width = self
            .batting_team
            .name()
            .len()
            .max(self.bowling_team.name().len());

        let mut out = String::new();
        let _ = writeln!(out, "Match Prediction Result");
        let _ = writeln!(out, "Win probability based on the current match situation");
        let _ = writeln!(out);
        for (team, pct) in [
            (self.batting_team, self.batting_win_pct),
            (self.bowling_team, self.bowling_win_pct),
        ] {
            let filled = ((pct / 100.0) * BAR_WIDTH as f64).round() as usize;
            let filled = filled.min(BAR_WIDTH);
            let _ = writeln!(
                out,
                "{:<width$}  {}{}  {:>6.2}%",
                team.name(),
                "█".repeat(filled),
                "░".repeat(BAR_WIDTH - filled),
                pct,
                width = name_width
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "[{}]", self.badge);
        let _ = writeln!(out, "{}", self.headline);
        if let Some(warning) = self.warning {
            let _ = writeln!(out, "⚠ {}", warning);
        }
        out
    }
}

fn slice(name: Team, value: f64, total: f64, color: &'static str) -> ChartSlice {
    let fraction = if total > 0.0 { value / total } else { 0.0 };
    ChartSlice {
        name,
        value,
        color,
        label: (fraction >= MIN_LABELLED_FRACTION).then(|| format!("{:.1}%", fraction * 100.0)),
    }
}

/// Two decimals without trailing zeros, matching how the page prints numbers.
fn fmt_pct(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rounding_and_complement() {
        let o = PredictionOutcome::new(72.345, Team::MumbaiIndians, Team::PunjabKings);
        assert_eq!(format!("{:.2}", o.batting_win_pct), "72.35");
        assert_eq!(format!("{:.2}", o.bowling_win_pct), "27.65");
        assert_relative_eq!(o.batting_win_pct + o.bowling_win_pct, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_batting_favoured() {
        let o = PredictionOutcome::new(72.345, Team::MumbaiIndians, Team::PunjabKings);
        assert_eq!(o.favoured, Side::Batting);
        assert_eq!(o.favoured_team(), Team::MumbaiIndians);
        assert_eq!(o.badge, "Batting Team Favored");
        assert_eq!(o.headline, "Mumbai Indians has a 72.35% chance of winning");
        assert_eq!(o.slices[0].color, "#4f46e5");
        assert_eq!(o.slices[1].color, "#f97316");
        assert!(!o.one_sided);
        assert_eq!(o.warning, None);
    }

    #[test]
    fn test_bowling_favoured() {
        let o = PredictionOutcome::new(35.0, Team::DelhiCapitals, Team::LucknowSuperGiants);
        assert_eq!(o.favoured, Side::Bowling);
        assert_eq!(o.headline, "Lucknow Super Giants has a 65% chance of winning");
        assert_eq!(o.slices[0].color, "#f97316");
        assert_eq!(o.slices[1].color, "#4f46e5");
    }

    #[test]
    fn test_dead_heat_goes_to_bowling() {
        let o = PredictionOutcome::new(50.0, Team::DelhiCapitals, Team::GujaratTitans);
        assert_eq!(o.favoured, Side::Bowling);
        assert_eq!(o.badge, "Bowling Team Favored");
    }

    #[test]
    fn test_one_sided_either_way() {
        let low = PredictionOutcome::new(12.5, Team::DelhiCapitals, Team::GujaratTitans);
        assert!(low.one_sided);
        assert_eq!(low.warning, Some(ONE_SIDED_WARNING));

        let high = PredictionOutcome::new(85.0, Team::DelhiCapitals, Team::GujaratTitans);
        assert!(high.one_sided);

        let edge = PredictionOutcome::new(80.0, Team::DelhiCapitals, Team::GujaratTitans);
        assert!(!edge.one_sided, "exactly 20% is not one-sided");
    }

    #[test]
    fn test_sliver_has_no_label() {
        let o = PredictionOutcome::new(97.0, Team::RajasthanRoyals, Team::PunjabKings);
        assert_eq!(o.slices[0].label.as_deref(), Some("97.0%"));
        assert_eq!(o.slices[1].label, None);
    }

    #[test]
    fn test_extremes() {
        let o = PredictionOutcome::new(100.0, Team::RajasthanRoyals, Team::PunjabKings);
        assert_relative_eq!(o.bowling_win_pct, 0.0, epsilon = 1e-9);
        assert_eq!(o.favoured, Side::Batting);

        let o = PredictionOutcome::new(0.0, Team::RajasthanRoyals, Team::PunjabKings);
        assert_relative_eq!(o.bowling_win_pct, 100.0, epsilon = 1e-9);
        assert_eq!(o.headline, "Punjab Kings has a 100% chance of winning");
    }

    #[test]
    fn test_render_text() {
        let o = PredictionOutcome::new(10.0, Team::ChennaiSuperKings, Team::MumbaiIndians);
        let text = o.render_text();
        assert!(text.contains("Chennai Super Kings"));
        assert!(text.contains(" 10.00%"));
        assert!(text.contains(" 90.00%"));
        assert!(text.contains("[Bowling Team Favored]"));
        assert!(text.contains("Mumbai Indians has a 90% chance of winning"));
        assert!(text.contains(ONE_SIDED_WARNING));
    }

    #[test]
    fn test_fmt_pct() {
        assert_eq!(fmt_pct(72.35), "72.35");
        assert_eq!(fmt_pct(65.0), "65");
        assert_eq!(fmt_pct(27.5), "27.5");
    }
}
