use serde::Serialize;
use sqlx::{FromRow, PgConnection, Postgres, QueryBuilder};
use time::OffsetDateTime;

/// Public projection of a user row; the password hash is never selected
/// into this struct.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub age: Option<i32>,
    pub email: String,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub role: String,
}

/// Row used only by the login flow: includes the stored hash.
#[derive(Debug, Clone, FromRow)]
pub struct UserForLogin {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub age: Option<i32>,
    pub email: String,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub password_hash: String,
    pub role: String,
}

/// Partial update: only `Some` fields reach the SET clause.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.email.is_none()
            && self.gender.is_none()
            && self.address.is_none()
            && self.role.is_none()
            && self.password_hash.is_none()
    }
}

pub async fn list(conn: &mut PgConnection) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, age, email, gender, address, role
        FROM users
        ORDER BY id
        "#,
    )
    .fetch_all(&mut *conn)
    .await
}

pub async fn find_by_id(
    conn: &mut PgConnection,
    user_id: i64,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, age, email, gender, address, role
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn find_by_email_for_login(
    conn: &mut PgConnection,
    email: &str,
) -> Result<Option<UserForLogin>, sqlx::Error> {
    sqlx::query_as::<_, UserForLogin>(
        r#"
        SELECT id, name, email, role, password_hash
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn insert(conn: &mut PgConnection, user: &NewUser) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO users (name, age, email, gender, address, password_hash, role)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(&user.name)
    .bind(user.age)
    .bind(&user.email)
    .bind(&user.gender)
    .bind(&user.address)
    .bind(&user.password_hash)
    .bind(&user.role)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn update(
    conn: &mut PgConnection,
    user_id: i64,
    changes: &UserChanges,
) -> Result<u64, sqlx::Error> {
    if changes.is_empty() {
        return Ok(0);
    }

    let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(name) = &changes.name {
            set.push("name = ").push_bind_unseparated(name);
        }
        if let Some(age) = changes.age {
            set.push("age = ").push_bind_unseparated(age);
        }
        if let Some(email) = &changes.email {
            set.push("email = ").push_bind_unseparated(email);
        }
        if let Some(gender) = &changes.gender {
            set.push("gender = ").push_bind_unseparated(gender);
        }
        if let Some(address) = &changes.address {
            set.push("address = ").push_bind_unseparated(address);
        }
        if let Some(role) = &changes.role {
            set.push("role = ").push_bind_unseparated(role);
        }
        if let Some(password_hash) = &changes.password_hash {
            set.push("password_hash = ").push_bind_unseparated(password_hash);
        }
    }
    qb.push(" WHERE id = ").push_bind(user_id);

    let result = qb.build().execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

pub async fn delete(conn: &mut PgConnection, user_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn patients(conn: &mut PgConnection) -> Result<Vec<Patient>, sqlx::Error> {
    sqlx::query_as::<_, Patient>(
        r#"
        SELECT id, name, email, age, created_at
        FROM users
        WHERE role = 'patient'
        ORDER BY id
        "#,
    )
    .fetch_all(&mut *conn)
    .await
}
