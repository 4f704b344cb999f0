use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

pub const RISK_FEATURES: usize = 8;
pub const TREND_INPUTS: usize = 3;
pub const TREND_HORIZON: usize = 5;

/// Per-feature standardization parameters, exported alongside the trained
/// model.
#[derive(Debug, Clone, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl Scaler {
    pub fn transform(&self, features: &[f64]) -> Vec<f64> {
        features
            .iter()
            .zip(self.mean.iter().zip(&self.std))
            .map(|(x, (m, s))| if *s == 0.0 { 0.0 } else { (x - m) / s })
            .collect()
    }

    pub fn transform_one(&self, value: f64) -> f64 {
        if self.std[0] == 0.0 {
            0.0
        } else {
            (value - self.mean[0]) / self.std[0]
        }
    }

    pub fn inverse_one(&self, value: f64) -> f64 {
        value * self.std[0] + self.mean[0]
    }
}

/// Tabular risk classifier: standardize the 8-feature vector, take the
/// linear decision score, threshold at zero.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskArtifact {
    pub scaler: Scaler,
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl RiskArtifact {
    fn validate(&self) -> Result<(), String> {
        if self.scaler.mean.len() != RISK_FEATURES
            || self.scaler.std.len() != RISK_FEATURES
            || self.weights.len() != RISK_FEATURES
        {
            return Err(format!(
                "risk artifact expects {RISK_FEATURES} features, got scaler {}x{} / weights {}",
                self.scaler.mean.len(),
                self.scaler.std.len(),
                self.weights.len()
            ));
        }
        Ok(())
    }

    pub fn predict(&self, features: &[f64; RISK_FEATURES]) -> i32 {
        let scaled = self.scaler.transform(features);
        let score: f64 = scaled
            .iter()
            .zip(&self.weights)
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.intercept;
        i32::from(score >= 0.0)
    }
}

/// Glucose-trend predictor: a 5x3 linear map over the standardized last
/// three readings, outputs inverse-transformed back to mg/dL.
#[derive(Debug, Clone, Deserialize)]
pub struct TrendArtifact {
    pub scaler: Scaler,
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

impl TrendArtifact {
    fn validate(&self) -> Result<(), String> {
        if self.scaler.mean.is_empty() || self.scaler.std.is_empty() {
            return Err("trend artifact scaler is empty".into());
        }
        if self.weights.len() != TREND_HORIZON
            || self.bias.len() != TREND_HORIZON
            || self.weights.iter().any(|row| row.len() != TREND_INPUTS)
        {
            return Err(format!(
                "trend artifact expects a {TREND_HORIZON}x{TREND_INPUTS} map"
            ));
        }
        Ok(())
    }

    pub fn predict(&self, readings: &[f64; TREND_INPUTS]) -> [f64; TREND_HORIZON] {
        let scaled: Vec<f64> = readings
            .iter()
            .map(|r| self.scaler.transform_one(*r))
            .collect();
        let mut out = [0.0; TREND_HORIZON];
        for (slot, (row, bias)) in out
            .iter_mut()
            .zip(self.weights.iter().zip(&self.bias))
        {
            let score: f64 =
                row.iter().zip(&scaled).map(|(w, x)| w * x).sum::<f64>() + bias;
            *slot = self.scaler.inverse_one(score);
        }
        out
    }
}

/// Artifacts load once here, at startup; requests only ever read them. A
/// missing or invalid artifact leaves its endpoint answering 503.
#[derive(Debug, Default)]
pub struct InferenceState {
    pub risk: Option<RiskArtifact>,
    pub trend: Option<TrendArtifact>,
}

impl InferenceState {
    pub fn load(model_dir: &str) -> Self {
        let dir = Path::new(model_dir);

        let risk = match read_artifact::<RiskArtifact>(&dir.join("risk_model.json"))
            .and_then(|a| a.validate().map(|()| a))
        {
            Ok(artifact) => {
                info!("risk model loaded");
                Some(artifact)
            }
            Err(e) => {
                warn!(error = %e, "risk model unavailable");
                None
            }
        };

        let trend = match read_artifact::<TrendArtifact>(&dir.join("glucose_trend.json"))
            .and_then(|a| a.validate().map(|()| a))
        {
            Ok(artifact) => {
                info!("glucose trend model loaded");
                Some(artifact)
            }
            Err(e) => {
                warn!(error = %e, "glucose trend model unavailable");
                None
            }
        };

        Self { risk, trend }
    }
}

fn read_artifact<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("{}: {e}", path.display()))?;
    serde_json::from_str(&raw).map_err(|e| format!("{}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_scaler(n: usize) -> Scaler {
        Scaler {
            mean: vec![0.0; n],
            std: vec![1.0; n],
        }
    }

    #[test]
    fn scaler_transform_then_inverse_is_identity() {
        let scaler = Scaler {
            mean: vec![120.0],
            std: vec![35.0],
        };
        let scaled = scaler.transform_one(150.0);
        assert!((scaler.inverse_one(scaled) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn zero_std_does_not_divide() {
        let scaler = Scaler {
            mean: vec![10.0],
            std: vec![0.0],
        };
        assert_eq!(scaler.transform_one(25.0), 0.0);
        assert_eq!(scaler.transform(&[25.0]), vec![0.0]);
    }

    #[test]
    fn risk_prediction_thresholds_the_decision_score() {
        let artifact = RiskArtifact {
            scaler: identity_scaler(RISK_FEATURES),
            weights: vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            intercept: -0.5,
        };
        let mut features = [0.0; RISK_FEATURES];
        features[0] = 1.0;
        assert_eq!(artifact.predict(&features), 1);
        features[0] = 0.4;
        assert_eq!(artifact.predict(&features), 0);
    }

    #[test]
    fn risk_artifact_rejects_wrong_dimensions() {
        let artifact = RiskArtifact {
            scaler: identity_scaler(3),
            weights: vec![1.0; 3],
            intercept: 0.0,
        };
        assert!(artifact.validate().is_err());
    }

    #[test]
    fn trend_prediction_applies_the_linear_map() {
        // Each output copies one input; the last two repeat the final
        // reading.
        let weights = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![0.0, 0.0, 1.0],
            vec![0.0, 0.0, 1.0],
        ];
        let artifact = TrendArtifact {
            scaler: identity_scaler(1),
            weights,
            bias: vec![0.0; TREND_HORIZON],
        };
        let out = artifact.predict(&[100.0, 110.0, 120.0]);
        assert_eq!(out, [100.0, 110.0, 120.0, 120.0, 120.0]);
    }

    #[test]
    fn trend_prediction_round_trips_through_the_scaler() {
        let weights = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![0.0, 0.0, 1.0],
            vec![0.0, 0.0, 1.0],
        ];
        let artifact = TrendArtifact {
            scaler: Scaler {
                mean: vec![120.0],
                std: vec![35.0],
            },
            weights,
            bias: vec![0.0; TREND_HORIZON],
        };
        let out = artifact.predict(&[100.0, 110.0, 120.0]);
        assert!((out[0] - 100.0).abs() < 1e-9);
        assert!((out[4] - 120.0).abs() < 1e-9);
    }

    #[test]
    fn trend_artifact_rejects_ragged_weights() {
        let artifact = TrendArtifact {
            scaler: identity_scaler(1),
            weights: vec![vec![1.0, 0.0]; TREND_HORIZON],
            bias: vec![0.0; TREND_HORIZON],
        };
        assert!(artifact.validate().is_err());
    }

    #[test]
    fn loading_from_a_missing_directory_degrades_to_none() {
        let state = InferenceState::load("/nonexistent/model/dir");
        assert!(state.risk.is_none());
        assert!(state.trend.is_none());
    }

    #[test]
    fn artifacts_deserialize_from_json() {
        let raw = r#"{
            "scaler": {"mean": [0,0,0,0,0,0,0,0], "std": [1,1,1,1,1,1,1,1]},
            "weights": [0.1, -0.2, 0.3, 0.0, 0.05, 0.4, 0.6, 0.7],
            "intercept": -1.2
        }"#;
        let artifact: RiskArtifact = serde_json::from_str(raw).expect("parse");
        assert!(artifact.validate().is_ok());
    }
}
