use serde::Serialize;
use sqlx::{FromRow, PgConnection};

/// `judul` (title) and `deskripsi` (body) keep the column and wire names
/// the published frontend consumes.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FaqEntry {
    pub id: i64,
    pub judul: String,
    pub deskripsi: String,
}

pub async fn list(conn: &mut PgConnection) -> Result<Vec<FaqEntry>, sqlx::Error> {
    sqlx::query_as::<_, FaqEntry>("SELECT id, judul, deskripsi FROM faq ORDER BY id DESC")
        .fetch_all(&mut *conn)
        .await
}

pub async fn insert(
    conn: &mut PgConnection,
    judul: &str,
    deskripsi: &str,
) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO faq (judul, deskripsi) VALUES ($1, $2) RETURNING id")
            .bind(judul)
            .bind(deskripsi)
            .fetch_one(&mut *conn)
            .await?;
    Ok(id)
}

pub async fn update(
    conn: &mut PgConnection,
    faq_id: i64,
    judul: &str,
    deskripsi: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE faq SET judul = $1, deskripsi = $2 WHERE id = $3")
        .bind(judul)
        .bind(deskripsi)
        .bind(faq_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete(conn: &mut PgConnection, faq_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM faq WHERE id = $1")
        .bind(faq_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
