use thiserror::Error;

use sqlx::{query, query_as, sqlite::SqliteRow, FromRow, Row, SqlitePool};

use crate::domain::{ContactMessage, NewContact};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("contact {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct ContactRepository {
    pool: SqlitePool,
}

impl ContactRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn create(&self, contact: NewContact) -> Result<i64, PersistenceError> {
        let id = query(r#"INSERT INTO contacts (name, email, message) VALUES (?1, ?2, ?3)"#)
            .bind(contact.name)
            .bind(contact.email)
            .bind(contact.message)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        tracing::info!(target: "db", id, "contact message stored");
        Ok(id)
    }

    pub async fn list(&self) -> Result<Vec<ContactMessage>, PersistenceError> {
        let rows = query_as::<_, ContactRow>(
            r#"SELECT id, name, email, message FROM contacts ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|row| row.0).collect())
    }

    pub async fn delete(&self, id: i64) -> Result<(), PersistenceError> {
        let affected = query(r#"DELETE FROM contacts WHERE id = ?1"#)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(PersistenceError::NotFound(id));
        }
        tracing::info!(target: "db", id, "contact message deleted");
        Ok(())
    }
}

struct ContactRow(ContactMessage);

impl<'r> FromRow<'r, SqliteRow> for ContactRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(ContactMessage {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            message: row.try_get("message")?,
        }))
    }
}
