use sqlx::{FromRow, PgConnection};

/// The two fixed slots. Seeded by the initial migration; never created or
/// deleted afterwards, only overwritten in place.
pub const GLUCOSE_SLOT: i64 = 1;
pub const HEART_RATE_SLOT: i64 = 2;

#[derive(Debug, Clone, FromRow)]
pub struct SensorRow {
    pub sensor_id: i64,
    pub sensor_value: f64,
}

pub async fn update_one(
    conn: &mut PgConnection,
    sensor_id: i64,
    value: f64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE sensors SET sensor_value = $1 WHERE sensor_id = $2")
        .bind(value)
        .bind(sensor_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// One conditional multi-row update: each slot's new value depends only on
/// its own id, so the two assignments stay independent even as a single
/// statement.
pub async fn update_batch(
    conn: &mut PgConnection,
    glucose: f64,
    heart_rate: f64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE sensors
        SET sensor_value = CASE sensor_id
            WHEN 1 THEN $1
            WHEN 2 THEN $2
        END
        WHERE sensor_id IN (1, 2)
        "#,
    )
    .bind(glucose)
    .bind(heart_rate)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn read_current(conn: &mut PgConnection) -> Result<Vec<SensorRow>, sqlx::Error> {
    sqlx::query_as::<_, SensorRow>(
        "SELECT sensor_id, sensor_value FROM sensors WHERE sensor_id IN (1, 2)",
    )
    .fetch_all(&mut *conn)
    .await
}
