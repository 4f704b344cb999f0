use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct FaqPayload {
    pub judul: Option<String>,
    pub deskripsi: Option<String>,
}

impl FaqPayload {
    /// Both fields are required for create and update alike.
    pub fn complete(self) -> Option<(String, String)> {
        match (self.judul, self.deskripsi) {
            (Some(j), Some(d)) if !j.trim().is_empty() && !d.trim().is_empty() => Some((j, d)),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedFaqResponse {
    pub message: String,
    pub id: i64,
}
