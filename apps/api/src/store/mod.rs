//! Record store access — the only module that touches the `students` table.
//!
//! The store is the sole consistency authority: a delete followed by a list
//! from another session may or may not observe the deletion. Callers re-list
//! after mutations; nothing is pushed.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::models::student::{NewStudent, StudentRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("student store unavailable: {0}")]
    Unavailable(String),

    #[error("no student with USN {0}")]
    NotFound(String),

    #[error("USN {0} already exists")]
    DuplicateUsn(String),
}

/// Typed façade over the persistence service.
///
/// Search is deliberately absent: listings are small and the search view is a
/// client-side filter over a fresh listing (`filter_students`).
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// All students, newest `created_at` first.
    async fn list_students(&self) -> Result<Vec<StudentRecord>, StoreError>;

    /// Inserts a new record, assigning `created_at`. Rejects a reused USN.
    async fn insert_student(&self, student: NewStudent) -> Result<StudentRecord, StoreError>;

    /// Deletes by USN. `NotFound` if no record has that USN.
    async fn delete_student(&self, usn: &str) -> Result<(), StoreError>;
}

/// Lazily filtered view over a listing: case-insensitive substring match on
/// `name` or `usn`. An empty query matches everything. Listing order is
/// preserved.
pub fn filter_students<'a>(
    students: &'a [StudentRecord],
    query: &str,
) -> impl Iterator<Item = &'a StudentRecord> {
    let needle = query.to_lowercase();
    students.iter().filter(move |student| {
        needle.is_empty()
            || student.name.to_lowercase().contains(&needle)
            || student.usn.to_lowercase().contains(&needle)
    })
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStudentStore {
    pool: PgPool,
}

impl PgStudentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn list_students(&self) -> Result<Vec<StudentRecord>, StoreError> {
        sqlx::query_as::<_, StudentRecord>(
            "SELECT usn, name, email, phone, age, gender, address, created_at
             FROM students
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)
    }

    async fn insert_student(&self, student: NewStudent) -> Result<StudentRecord, StoreError> {
        let record = StudentRecord {
            usn: student.usn,
            name: student.name,
            email: student.email,
            phone: student.phone,
            age: student.age,
            gender: student.gender,
            address: student.address,
            created_at: Utc::now(),
        };

        let result = sqlx::query(
            "INSERT INTO students (usn, name, email, phone, age, gender, address, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&record.usn)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.age)
        .bind(&record.gender)
        .bind(&record.address)
        .bind(record.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!("Created student {}", record.usn);
                Ok(record)
            }
            Err(e) if is_unique_violation(&e) => Err(StoreError::DuplicateUsn(record.usn)),
            Err(e) => Err(unavailable(e)),
        }
    }

    async fn delete_student(&self, usn: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM students WHERE usn = $1")
            .bind(usn)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(usn.to_string()));
        }

        info!("Deleted student {usn}");
        Ok(())
    }
}

fn unavailable(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use tokio::sync::Mutex;

    use super::*;

    /// In-memory stand-in used to exercise the store contract without Postgres.
    struct MemoryStudentStore {
        rows: Mutex<Vec<StudentRecord>>,
    }

    impl MemoryStudentStore {
        fn new(rows: Vec<StudentRecord>) -> Self {
            Self {
                rows: Mutex::new(rows),
            }
        }

        async fn count(&self) -> usize {
            self.rows.lock().await.len()
        }
    }

    #[async_trait]
    impl StudentStore for MemoryStudentStore {
        async fn list_students(&self) -> Result<Vec<StudentRecord>, StoreError> {
            let mut rows = self.rows.lock().await.clone();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(rows)
        }

        async fn insert_student(&self, student: NewStudent) -> Result<StudentRecord, StoreError> {
            let mut rows = self.rows.lock().await;
            if rows.iter().any(|r| r.usn == student.usn) {
                return Err(StoreError::DuplicateUsn(student.usn));
            }
            let record = StudentRecord {
                usn: student.usn,
                name: student.name,
                email: student.email,
                phone: student.phone,
                age: student.age,
                gender: student.gender,
                address: student.address,
                created_at: Utc::now(),
            };
            rows.push(record.clone());
            Ok(record)
        }

        async fn delete_student(&self, usn: &str) -> Result<(), StoreError> {
            let mut rows = self.rows.lock().await;
            let before = rows.len();
            rows.retain(|r| r.usn != usn);
            if rows.len() == before {
                return Err(StoreError::NotFound(usn.to_string()));
            }
            Ok(())
        }
    }

    fn student(usn: &str, name: &str, minutes_ago: i64) -> StudentRecord {
        StudentRecord {
            usn: usn.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", usn.to_lowercase()),
            phone: "9876543210".to_string(),
            age: "21".to_string(),
            gender: "Female".to_string(),
            address: "12 College Road".to_string(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_empty_query_lists_all_newest_first() {
        let store = MemoryStudentStore::new(vec![
            student("A1", "Amy", 50),
            student("B2", "Ben", 10),
            student("C3", "Cam", 30),
            student("D4", "Dee", 20),
            student("E5", "Eve", 40),
        ]);

        let listing = store.list_students().await.unwrap();
        let matched: Vec<&str> = filter_students(&listing, "")
            .map(|s| s.usn.as_str())
            .collect();

        assert_eq!(matched, vec!["B2", "D4", "C3", "E5", "A1"]);
    }

    #[test]
    fn test_search_matches_name_substring_case_insensitive() {
        let listing = vec![
            student("U1", "John", 1),
            student("U2", "Joan", 2),
            student("U3", "Amy", 3),
        ];

        let matched: Vec<&str> = filter_students(&listing, "jo")
            .map(|s| s.name.as_str())
            .collect();

        assert_eq!(matched, vec!["John", "Joan"]);
    }

    #[test]
    fn test_search_matches_usn() {
        let listing = vec![student("1XX22CS001", "John", 1), student("2YY22ME002", "Joan", 2)];

        let matched: Vec<&str> = filter_students(&listing, "cs0")
            .map(|s| s.usn.as_str())
            .collect();

        assert_eq!(matched, vec!["1XX22CS001"]);
    }

    #[tokio::test]
    async fn test_delete_missing_usn_fails_and_leaves_count_unchanged() {
        let store = MemoryStudentStore::new(vec![student("A1", "Amy", 1), student("B2", "Ben", 2)]);

        let result = store.delete_student("X999").await;

        assert!(matches!(result, Err(StoreError::NotFound(usn)) if usn == "X999"));
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_usn_is_rejected() {
        let store = MemoryStudentStore::new(vec![student("A1", "Amy", 1)]);

        let duplicate = NewStudent {
            usn: "A1".to_string(),
            name: "Another Amy".to_string(),
            email: "amy2@example.com".to_string(),
            phone: "1234567890".to_string(),
            age: "22".to_string(),
            gender: "Female".to_string(),
            address: "34 Hostel Block".to_string(),
        };

        let result = store.insert_student(duplicate).await;

        assert!(matches!(result, Err(StoreError::DuplicateUsn(usn)) if usn == "A1"));
        assert_eq!(store.count().await, 1);
    }
}
