use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument};

use crate::{
    error::ApiError,
    inference::{
        artifacts::{RISK_FEATURES, TREND_INPUTS},
        dto::{
            bmi, round2, RiskPredictRequest, RiskPredictResponse, TrendPredictRequest,
            TrendPredictResponse,
        },
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ml/predict", post(predict_risk))
        .route("/predict/glucose-trend", post(predict_glucose_trend))
}

#[instrument(skip(state, payload))]
async fn predict_risk(
    State(state): State<AppState>,
    Json(payload): Json<RiskPredictRequest>,
) -> Result<Json<RiskPredictResponse>, ApiError> {
    let Some(model) = state.inference.risk.as_ref() else {
        return Err(ApiError::Unavailable(
            "the risk prediction model is not available on this server".into(),
        ));
    };

    let missing = payload.missing_fields();
    if !missing.is_empty() {
        return Err(ApiError::Validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    let tinggi = payload.tinggi.unwrap_or_default();
    if tinggi <= 0.0 {
        return Err(ApiError::Validation("tinggi must be greater than zero".into()));
    }

    let features: [f64; RISK_FEATURES] = [
        payload.gender.unwrap_or_default() as f64,
        payload.age.unwrap_or_default() as f64,
        payload.hypertension.unwrap_or_default() as f64,
        payload.heart_disease.unwrap_or_default() as f64,
        payload.smoking_history.unwrap_or_default() as f64,
        bmi(payload.berat.unwrap_or_default(), tinggi),
        payload.hba1c_level.unwrap_or_default(),
        payload.blood_glucose.unwrap_or_default(),
    ];

    let prediction_code = model.predict(&features);
    info!(prediction_code, "risk prediction computed");

    Ok(Json(RiskPredictResponse {
        prediction_code,
        result: if prediction_code == 1 {
            "High Risk".into()
        } else {
            "Low Risk".into()
        },
        message: "prediction computed successfully".into(),
    }))
}

#[instrument(skip(state, payload))]
async fn predict_glucose_trend(
    State(state): State<AppState>,
    Json(payload): Json<TrendPredictRequest>,
) -> Result<Json<TrendPredictResponse>, ApiError> {
    let Some(model) = state.inference.trend.as_ref() else {
        return Err(ApiError::Unavailable(
            "the glucose trend model is not available on this server".into(),
        ));
    };

    let readings = payload.glucose_readings.unwrap_or_default();
    if readings.len() != TREND_INPUTS {
        return Err(ApiError::Validation(format!(
            "provide the last {TREND_INPUTS} glucose readings"
        )));
    }
    let inputs: [f64; TREND_INPUTS] = [readings[0], readings[1], readings[2]];

    let predictions: Vec<f64> = model.predict(&inputs).iter().map(|v| round2(*v)).collect();
    let average = round2(predictions.iter().sum::<f64>() / predictions.len() as f64);

    info!(?predictions, "glucose trend prediction computed");
    Ok(Json(TrendPredictResponse {
        message: "glucose trend predicted for the next 5 days".into(),
        predictions,
        average_prediction: average,
    }))
}
