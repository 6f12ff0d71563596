use std::collections::HashMap;

use quiz_core::model::{
    CatalogCategory, CatalogSubcategory, Category, CategoryDraft, CategoryId, Subcategory,
};

use super::SqliteRepository;
use super::mapping::{
    category_id_from_i64, id_to_i64, map_category_row, map_subcategory_row, read_err, write_err,
};
use super::question_repo::questions_by_subcategory;
use crate::repository::{CategoryRepository, StorageError};

#[async_trait::async_trait]
impl CategoryRepository for SqliteRepository {
    async fn insert_category(&self, draft: CategoryDraft) -> Result<CategoryId, StorageError> {
        let res = sqlx::query("INSERT INTO categories (name) VALUES (?1)")
            .bind(draft.name)
            .execute(&self.pool)
            .await
            .map_err(write_err)?;

        category_id_from_i64(res.last_insert_rowid())
    }

    async fn rename_category(&self, id: CategoryId, name: &str) -> Result<bool, StorageError> {
        let res = sqlx::query("UPDATE categories SET name = ?1 WHERE id = ?2")
            .bind(name)
            .bind(id_to_i64("category_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(write_err)?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id_to_i64("category_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(write_err)?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StorageError> {
        let rows = sqlx::query("SELECT id, name FROM categories ORDER BY name ASC, id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(read_err)?;

        rows.iter().map(map_category_row).collect()
    }

    async fn catalog(&self) -> Result<Vec<CatalogCategory>, StorageError> {
        let categories = self.list_categories().await?;

        let sub_rows = sqlx::query(
            r"
            SELECT id, category_id, name
            FROM subcategories
            ORDER BY name ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(read_err)?;

        let mut subcategories: HashMap<CategoryId, Vec<Subcategory>> = HashMap::new();
        for row in &sub_rows {
            let subcategory = map_subcategory_row(row)?;
            subcategories
                .entry(subcategory.category_id())
                .or_default()
                .push(subcategory);
        }

        let mut questions = questions_by_subcategory(&self.pool).await?;

        Ok(categories
            .into_iter()
            .map(|category| {
                let subcategories = subcategories
                    .remove(&category.id())
                    .unwrap_or_default()
                    .into_iter()
                    .map(|subcategory| CatalogSubcategory {
                        questions: questions.remove(&subcategory.id()).unwrap_or_default(),
                        subcategory,
                    })
                    .collect();
                CatalogCategory {
                    category,
                    subcategories,
                }
            })
            .collect())
    }
}
