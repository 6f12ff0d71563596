use quiz_core::model::{CategoryId, Subcategory, SubcategoryDraft, SubcategoryId};

use super::SqliteRepository;
use super::mapping::{id_to_i64, map_subcategory_row, read_err, subcategory_id_from_i64, write_err};
use crate::repository::{StorageError, SubcategoryRepository};

#[async_trait::async_trait]
impl SubcategoryRepository for SqliteRepository {
    async fn insert_subcategory(
        &self,
        draft: SubcategoryDraft,
    ) -> Result<SubcategoryId, StorageError> {
        let res = sqlx::query("INSERT INTO subcategories (category_id, name) VALUES (?1, ?2)")
            .bind(id_to_i64("category_id", draft.category_id.value())?)
            .bind(draft.name)
            .execute(&self.pool)
            .await
            .map_err(write_err)?;

        subcategory_id_from_i64(res.last_insert_rowid())
    }

    async fn rename_subcategory(
        &self,
        id: SubcategoryId,
        name: &str,
    ) -> Result<bool, StorageError> {
        let res = sqlx::query("UPDATE subcategories SET name = ?1 WHERE id = ?2")
            .bind(name)
            .bind(id_to_i64("subcategory_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(write_err)?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_subcategory(&self, id: SubcategoryId) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM subcategories WHERE id = ?1")
            .bind(id_to_i64("subcategory_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(write_err)?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_subcategories(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Subcategory>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, category_id, name
            FROM subcategories
            WHERE category_id = ?1
            ORDER BY name ASC, id ASC
            ",
        )
        .bind(id_to_i64("category_id", category_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(read_err)?;

        rows.iter().map(map_subcategory_row).collect()
    }
}
