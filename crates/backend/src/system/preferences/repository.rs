use chrono::Utc;
use contracts::system::preferences::UserPreference;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, Statement};

/// Пользовательские настройки UI (значение хранится как есть, обычно JSON)
#[derive(Clone)]
pub struct PreferenceRepository {
    db: DatabaseConnection,
}

impl PreferenceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get(&self, user_id: &str, preference: &str) -> Result<Option<UserPreference>, DbErr> {
        let query = r#"
            SELECT preference, value
            FROM user_preferences
            WHERE user_id = ? AND preference = ?
        "#;

        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                query,
                vec![user_id.into(), preference.into()],
            ))
            .await?;

        match row {
            Some(row) => Ok(Some(UserPreference {
                preference: row.try_get("", "preference")?,
                value: row.try_get("", "value")?,
            })),
            None => Ok(None),
        }
    }

    pub async fn set(&self, user_id: &str, preference: &str, value: &str) -> Result<(), DbErr> {
        let query = r#"
            INSERT INTO user_preferences (user_id, preference, value, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id, preference) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
        "#;

        self.db
            .execute(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                query,
                vec![
                    user_id.into(),
                    preference.into(),
                    value.into(),
                    Utc::now().to_rfc3339().into(),
                ],
            ))
            .await?;
        Ok(())
    }
}
