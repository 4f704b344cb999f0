use serde::Serialize;
use sqlx::{FromRow, PgConnection};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MonitoringRecord {
    pub id: i64,
    pub user_id: i64,
    pub glucose_level: f64,
    pub heart_rate: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Admin view: records joined with the owning patient's name. The
/// `namaPasien` wire name is what the dashboard frontend consumes.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MonitoringWithPatient {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "namaPasien")]
    pub patient_name: String,
    pub glucose_level: f64,
    pub heart_rate: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// The timestamp is assigned here, at write time; callers never supply it.
pub async fn insert(
    conn: &mut PgConnection,
    user_id: i64,
    glucose_level: f64,
    heart_rate: f64,
) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO monitoring (user_id, glucose_level, heart_rate, timestamp)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(glucose_level)
    .bind(heart_rate)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn list_all(conn: &mut PgConnection) -> Result<Vec<MonitoringWithPatient>, sqlx::Error> {
    sqlx::query_as::<_, MonitoringWithPatient>(
        r#"
        SELECT m.id, m.user_id, u.name AS patient_name,
               m.glucose_level, m.heart_rate, m.timestamp
        FROM monitoring m
        JOIN users u ON m.user_id = u.id
        ORDER BY m.timestamp DESC
        "#,
    )
    .fetch_all(&mut *conn)
    .await
}

pub async fn list_for_user(
    conn: &mut PgConnection,
    user_id: i64,
) -> Result<Vec<MonitoringRecord>, sqlx::Error> {
    sqlx::query_as::<_, MonitoringRecord>(
        r#"
        SELECT id, user_id, glucose_level, heart_rate, timestamp
        FROM monitoring
        WHERE user_id = $1
        ORDER BY timestamp DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn delete(conn: &mut PgConnection, record_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM monitoring WHERE id = $1")
        .bind(record_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn admin_view_uses_the_dashboard_field_name() {
        let row = MonitoringWithPatient {
            id: 1,
            user_id: 2,
            patient_name: "A".into(),
            glucose_level: 110.0,
            heart_rate: 72.0,
            timestamp: datetime!(2025-06-01 08:00 UTC),
        };
        let json = serde_json::to_value(&row).expect("serialize");
        assert_eq!(json["namaPasien"], "A");
        assert!(json.get("patient_name").is_none());
    }

    #[test]
    fn timestamps_serialize_as_rfc3339_strings() {
        let row = MonitoringRecord {
            id: 1,
            user_id: 2,
            glucose_level: 110.0,
            heart_rate: 72.0,
            timestamp: datetime!(2025-06-01 08:00 UTC),
        };
        let json = serde_json::to_value(&row).expect("serialize");
        assert_eq!(json["timestamp"], "2025-06-01T08:00:00Z");
    }
}
