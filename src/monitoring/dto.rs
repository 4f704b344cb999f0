use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SaveMonitoringRequest {
    pub glucose_level: Option<f64>,
    pub heart_rate: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SavedMonitoringResponse {
    pub message: String,
    pub id: i64,
}
