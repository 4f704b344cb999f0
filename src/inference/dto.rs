use serde::{Deserialize, Serialize};

/// Risk-classifier input. `berat`/`tinggi` (weight kg / height cm) keep the
/// wire names the published frontend sends; BMI is derived server-side.
#[derive(Debug, Deserialize)]
pub struct RiskPredictRequest {
    pub gender: Option<i64>,
    pub age: Option<i64>,
    pub hypertension: Option<i64>,
    pub heart_disease: Option<i64>,
    pub smoking_history: Option<i64>,
    pub berat: Option<f64>,
    pub tinggi: Option<f64>,
    pub hba1c_level: Option<f64>,
    pub blood_glucose: Option<f64>,
}

impl RiskPredictRequest {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.gender.is_none() {
            missing.push("gender");
        }
        if self.age.is_none() {
            missing.push("age");
        }
        if self.hypertension.is_none() {
            missing.push("hypertension");
        }
        if self.heart_disease.is_none() {
            missing.push("heart_disease");
        }
        if self.smoking_history.is_none() {
            missing.push("smoking_history");
        }
        if self.berat.is_none() {
            missing.push("berat");
        }
        if self.tinggi.is_none() {
            missing.push("tinggi");
        }
        if self.hba1c_level.is_none() {
            missing.push("hba1c_level");
        }
        if self.blood_glucose.is_none() {
            missing.push("blood_glucose");
        }
        missing
    }
}

#[derive(Debug, Serialize)]
pub struct RiskPredictResponse {
    pub prediction_code: i32,
    pub result: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct TrendPredictRequest {
    pub glucose_readings: Option<Vec<f64>>,
}

#[derive(Debug, Serialize)]
pub struct TrendPredictResponse {
    pub message: String,
    pub predictions: Vec<f64>,
    pub average_prediction: f64,
}

pub fn bmi(berat_kg: f64, tinggi_cm: f64) -> f64 {
    let tinggi_m = tinggi_cm / 100.0;
    berat_kg / (tinggi_m * tinggi_m)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
