use quiz_core::model::{OptionDraft, OptionId};

use super::SqliteRepository;
use super::mapping::{id_to_i64, option_id_from_i64, write_err};
use crate::repository::{OptionRepository, StorageError};

#[async_trait::async_trait]
impl OptionRepository for SqliteRepository {
    async fn insert_option(&self, draft: OptionDraft) -> Result<OptionId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO options (question_id, text, is_correct)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(id_to_i64("question_id", draft.question_id.value())?)
        .bind(draft.text)
        .bind(i64::from(draft.is_correct))
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        option_id_from_i64(res.last_insert_rowid())
    }

    async fn delete_option(&self, id: OptionId) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM options WHERE id = ?1")
            .bind(id_to_i64("option_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(write_err)?;
        Ok(res.rows_affected() > 0)
    }
}
