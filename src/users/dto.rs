use serde::{Deserialize, Serialize};

pub const ROLES: [&str; 3] = ["patient", "admin", "other"];

pub fn is_valid_role(role: &str) -> bool {
    ROLES.contains(&role)
}

/// Registration payload. Optional fields surface as a listed 400 instead of
/// a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl CreateUserRequest {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.as_deref().map_or(true, str::is_empty) {
            missing.push("name");
        }
        if self.email.as_deref().map_or(true, str::is_empty) {
            missing.push("email");
        }
        if self.password.as_deref().map_or(true, str::is_empty) {
            missing.push("password");
        }
        if self.role.as_deref().map_or(true, str::is_empty) {
            missing.push("role");
        }
        missing
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.email.is_none()
            && self.gender.is_none()
            && self.address.is_none()
            && self.role.is_none()
            && self.password.is_none()
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    pub message: String,
    pub id: i64,
}
