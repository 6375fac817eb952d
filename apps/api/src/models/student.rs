use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One student row. The USN (university seat number) is the primary key;
/// every other field is display data carried verbatim into the resume prompt.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentRecord {
    pub usn: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: String,
    pub gender: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

/// Creation payload. `created_at` is assigned by the store at insert time.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    pub usn: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: String,
    pub gender: String,
    pub address: String,
}

impl NewStudent {
    /// All fields are mandatory. Returns the name of the first missing field.
    pub fn missing_field(&self) -> Option<&'static str> {
        let fields = [
            ("usn", &self.usn),
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("age", &self.age),
            ("gender", &self.gender),
            ("address", &self.address),
        ];
        fields
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
    }
}
