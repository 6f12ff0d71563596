use std::sync::Arc;

use tracing::{info, warn};

use quiz_core::model::{
    CatalogCategory, CategoryDraft, CategoryId, CategoryOverview, OptionDraft, OptionId, Question,
    QuestionDraft, QuestionId, Subcategory, SubcategoryDraft, SubcategoryId,
};
use storage::repository::{
    CategoryRepository, OptionRepository, QuestionRepository, Storage, StorageError,
    SubcategoryRepository,
};

use crate::error::CatalogError;

/// Administrative access to categories, subcategories, questions and options.
///
/// Unknown ids are reported as `false`/`None`. Integrity conflicts (duplicate
/// category name, missing parent) are logged and reported as `None`.
#[derive(Clone)]
pub struct CatalogService {
    categories: Arc<dyn CategoryRepository>,
    subcategories: Arc<dyn SubcategoryRepository>,
    questions: Arc<dyn QuestionRepository>,
    options: Arc<dyn OptionRepository>,
}

/// Turns an integrity conflict into `Ok(None)`; other errors pass through.
fn swallow_conflict<T>(
    result: Result<T, StorageError>,
    what: &'static str,
) -> Result<Option<T>, CatalogError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(StorageError::Conflict(reason)) => {
            warn!(what, %reason, "write rejected by store");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

impl CatalogService {
    #[must_use]
    pub fn new(storage: &Storage) -> Self {
        Self {
            categories: Arc::clone(&storage.categories),
            subcategories: Arc::clone(&storage.subcategories),
            questions: Arc::clone(&storage.questions),
            options: Arc::clone(&storage.options),
        }
    }

    /// Full tree ordered for display.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn catalog(&self) -> Result<Vec<CatalogCategory>, CatalogError> {
        Ok(self.categories.catalog().await?)
    }

    /// Category and subcategory names with question counts, for the learner
    /// index. Questions and answers stay out of it.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn overview(&self) -> Result<Vec<CategoryOverview>, CatalogError> {
        let catalog = self.categories.catalog().await?;
        Ok(catalog.iter().map(CategoryOverview::from).collect())
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn list_subcategories(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Subcategory>, CatalogError> {
        Ok(self.subcategories.list_subcategories(category_id).await?)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, CatalogError> {
        Ok(self.questions.get_question(id).await?)
    }

    /// Create a category. Returns `None` if the name is already taken.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Category` if the name is empty or too long.
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn create_category(
        &self,
        name: impl Into<String>,
    ) -> Result<Option<CategoryId>, CatalogError> {
        let draft = CategoryDraft::new(name).validate()?;
        let created = swallow_conflict(
            self.categories.insert_category(draft).await,
            "category",
        )?;
        if let Some(id) = created {
            info!(category_id = %id, "category created");
        }
        Ok(created)
    }

    /// Rename a category. Returns `false` if it does not exist or the new
    /// name belongs to another category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Category` if the name is empty or too long.
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn update_category(
        &self,
        id: CategoryId,
        name: impl Into<String>,
    ) -> Result<bool, CatalogError> {
        let draft = CategoryDraft::new(name).validate()?;
        let renamed = swallow_conflict(
            self.categories.rename_category(id, &draft.name).await,
            "category",
        )?;
        Ok(renamed.unwrap_or(false))
    }

    /// Delete a category with everything under it.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn delete_category(&self, id: CategoryId) -> Result<bool, CatalogError> {
        let deleted = self.categories.delete_category(id).await?;
        if deleted {
            info!(category_id = %id, "category deleted");
        }
        Ok(deleted)
    }

    /// Create a subcategory. Returns `None` if the category does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Category` if the name is empty or too long.
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn create_subcategory(
        &self,
        category_id: CategoryId,
        name: impl Into<String>,
    ) -> Result<Option<SubcategoryId>, CatalogError> {
        let draft = SubcategoryDraft::new(category_id, name).validate()?;
        swallow_conflict(
            self.subcategories.insert_subcategory(draft).await,
            "subcategory",
        )
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Category` if the name is empty or too long.
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn update_subcategory(
        &self,
        id: SubcategoryId,
        name: impl Into<String>,
    ) -> Result<bool, CatalogError> {
        let draft = CategoryDraft::new(name).validate()?;
        Ok(self
            .subcategories
            .rename_subcategory(id, &draft.name)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn delete_subcategory(&self, id: SubcategoryId) -> Result<bool, CatalogError> {
        Ok(self.subcategories.delete_subcategory(id).await?)
    }

    /// Create a question. Returns `None` if the subcategory does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Question` if statement or answer is empty.
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn create_question(
        &self,
        subcategory_id: SubcategoryId,
        statement: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<Option<QuestionId>, CatalogError> {
        let draft = QuestionDraft {
            subcategory_id,
            statement: statement.into(),
            answer: answer.into(),
        }
        .validate()?;
        swallow_conflict(self.questions.insert_question(draft).await, "question")
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Question` if statement or answer is empty.
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn update_question(
        &self,
        id: QuestionId,
        statement: &str,
        answer: &str,
    ) -> Result<bool, CatalogError> {
        Question::validate_text(statement, answer)?;
        Ok(self.questions.update_question(id, statement, answer).await?)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn delete_question(&self, id: QuestionId) -> Result<bool, CatalogError> {
        Ok(self.questions.delete_question(id).await?)
    }

    /// Attach a multiple-choice option. Returns `None` if the question does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Question` if the text is empty.
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn create_option(
        &self,
        question_id: QuestionId,
        text: impl Into<String>,
        is_correct: bool,
    ) -> Result<Option<OptionId>, CatalogError> {
        let draft = OptionDraft {
            question_id,
            text: text.into(),
            is_correct,
        }
        .validate()?;
        swallow_conflict(self.options.insert_option(draft).await, "option")
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn delete_option(&self, id: OptionId) -> Result<bool, CatalogError> {
        Ok(self.options.delete_option(id).await?)
    }
}
