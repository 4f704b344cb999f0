use serde::{Deserialize, Serialize};

use crate::sensors::repo::{SensorRow, GLUCOSE_SLOT, HEART_RATE_SLOT};

#[derive(Debug, Deserialize)]
pub struct BatchUpdateRequest {
    pub glucose: Option<f64>,
    pub heart_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SingleUpdateRequest {
    pub value: Option<f64>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LatestSensorValues {
    pub glucose: f64,
    pub heart_rate: f64,
}

/// A missing slot defaults to 0 here, at response assembly; the repository
/// itself never fails on an absent slot.
pub fn assemble_latest(rows: &[SensorRow]) -> LatestSensorValues {
    let slot = |id: i64| {
        rows.iter()
            .find(|r| r.sensor_id == id)
            .map(|r| r.sensor_value)
            .unwrap_or(0.0)
    };
    LatestSensorValues {
        glucose: slot(GLUCOSE_SLOT),
        heart_rate: slot(HEART_RATE_SLOT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_slots_present() {
        let rows = vec![
            SensorRow {
                sensor_id: 1,
                sensor_value: 121.5,
            },
            SensorRow {
                sensor_id: 2,
                sensor_value: 85.0,
            },
        ];
        assert_eq!(
            assemble_latest(&rows),
            LatestSensorValues {
                glucose: 121.5,
                heart_rate: 85.0
            }
        );
    }

    #[test]
    fn missing_slot_defaults_to_zero() {
        let rows = vec![SensorRow {
            sensor_id: 1,
            sensor_value: 98.0,
        }];
        assert_eq!(
            assemble_latest(&rows),
            LatestSensorValues {
                glucose: 98.0,
                heart_rate: 0.0
            }
        );
        assert_eq!(
            assemble_latest(&[]),
            LatestSensorValues {
                glucose: 0.0,
                heart_rate: 0.0
            }
        );
    }

    #[test]
    fn slot_order_in_rows_does_not_matter() {
        let rows = vec![
            SensorRow {
                sensor_id: 2,
                sensor_value: 70.0,
            },
            SensorRow {
                sensor_id: 1,
                sensor_value: 100.0,
            },
        ];
        assert_eq!(
            assemble_latest(&rows),
            LatestSensorValues {
                glucose: 100.0,
                heart_rate: 70.0
            }
        );
    }
}
