use async_trait::async_trait;
use quiz_core::model::{
    CatalogCategory, CatalogSubcategory, Category, CategoryDraft, CategoryId, OptionDraft,
    OptionId, Question, QuestionDraft, QuestionId, QuestionOption, Subcategory, SubcategoryDraft,
    SubcategoryId,
};
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
///
/// Unknown ids are not errors: lookups return `Option` and mutations return
/// `false`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// Integrity violation (duplicate unique value or missing parent row).
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Insert a category; the store assigns the id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the name is already taken.
    async fn insert_category(&self, draft: CategoryDraft) -> Result<CategoryId, StorageError>;

    /// Returns `false` if the category does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if another category already uses `name`.
    async fn rename_category(&self, id: CategoryId, name: &str) -> Result<bool, StorageError>;

    /// Delete a category together with its subcategories, questions and options.
    ///
    /// Returns `false` if the category does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_category(&self, id: CategoryId) -> Result<bool, StorageError>;

    /// All categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_categories(&self) -> Result<Vec<Category>, StorageError>;

    /// Categories ordered by name with nested subcategories (by name) and
    /// questions (by id, options attached).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn catalog(&self) -> Result<Vec<CatalogCategory>, StorageError>;
}

#[async_trait]
pub trait SubcategoryRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the parent category does not exist.
    async fn insert_subcategory(
        &self,
        draft: SubcategoryDraft,
    ) -> Result<SubcategoryId, StorageError>;

    /// Returns `false` if the subcategory does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn rename_subcategory(&self, id: SubcategoryId, name: &str)
    -> Result<bool, StorageError>;

    /// Delete a subcategory together with its questions and options.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_subcategory(&self, id: SubcategoryId) -> Result<bool, StorageError>;

    /// Subcategories of a category ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_subcategories(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Subcategory>, StorageError>;
}

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the subcategory does not exist.
    async fn insert_question(&self, draft: QuestionDraft) -> Result<QuestionId, StorageError>;

    /// Replace statement and answer. Returns `false` if the question does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn update_question(
        &self,
        id: QuestionId,
        statement: &str,
        answer: &str,
    ) -> Result<bool, StorageError>;

    /// Delete a question and its options.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_question(&self, id: QuestionId) -> Result<bool, StorageError>;

    /// Fetch a question with its options.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError>;

    /// Questions of a subcategory in random order, without repetition.
    ///
    /// `limit = None` returns every question of the subcategory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn sample_questions(
        &self,
        subcategory_id: SubcategoryId,
        limit: Option<u32>,
    ) -> Result<Vec<Question>, StorageError>;
}

#[async_trait]
pub trait OptionRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the question does not exist.
    async fn insert_option(&self, draft: OptionDraft) -> Result<OptionId, StorageError>;

    /// Returns `false` if the option does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_option(&self, id: OptionId) -> Result<bool, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct MemoryState {
    categories: BTreeMap<CategoryId, Category>,
    subcategories: BTreeMap<SubcategoryId, Subcategory>,
    questions: BTreeMap<QuestionId, Question>,
    options: BTreeMap<OptionId, QuestionOption>,
    last_category: u64,
    last_subcategory: u64,
    last_question: u64,
    last_option: u64,
}

impl MemoryState {
    fn name_taken(&self, name: &str, except: Option<CategoryId>) -> bool {
        self.categories
            .values()
            .any(|c| c.name() == name && Some(c.id()) != except)
    }

    fn hydrate(&self, question: &Question) -> Question {
        let options = self
            .options
            .values()
            .filter(|o| o.question_id() == question.id())
            .cloned()
            .collect();
        question.clone().with_options(options)
    }

    fn remove_question(&mut self, id: QuestionId) -> bool {
        self.options.retain(|_, o| o.question_id() != id);
        self.questions.remove(&id).is_some()
    }

    fn remove_subcategory(&mut self, id: SubcategoryId) -> bool {
        let questions: Vec<QuestionId> = self
            .questions
            .values()
            .filter(|q| q.subcategory_id() == id)
            .map(Question::id)
            .collect();
        for question in questions {
            self.remove_question(question);
        }
        self.subcategories.remove(&id).is_some()
    }
}

fn sorted_by_name<T>(mut items: Vec<T>, key: impl Fn(&T) -> (&str, u64)) -> Vec<T> {
    items.sort_by(|a, b| key(a).cmp(&key(b)));
    items
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Mirrors the `SQLite` behavior: unique category names, parent checks on
/// insert, cascading deletes.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

fn invalid<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[async_trait]
impl CategoryRepository for InMemoryRepository {
    async fn insert_category(&self, draft: CategoryDraft) -> Result<CategoryId, StorageError> {
        let mut guard = self.lock()?;
        if guard.name_taken(&draft.name, None) {
            return Err(StorageError::Conflict(format!(
                "category name already exists: {}",
                draft.name
            )));
        }
        let id = CategoryId::new(guard.last_category + 1);
        let category = Category::new(id, &draft.name).map_err(invalid)?;
        guard.last_category += 1;
        guard.categories.insert(id, category);
        Ok(id)
    }

    async fn rename_category(&self, id: CategoryId, name: &str) -> Result<bool, StorageError> {
        let mut guard = self.lock()?;
        if !guard.categories.contains_key(&id) {
            return Ok(false);
        }
        if guard.name_taken(name, Some(id)) {
            return Err(StorageError::Conflict(format!(
                "category name already exists: {name}"
            )));
        }
        let renamed = Category::new(id, name).map_err(invalid)?;
        guard.categories.insert(id, renamed);
        Ok(true)
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool, StorageError> {
        let mut guard = self.lock()?;
        let children: Vec<SubcategoryId> = guard
            .subcategories
            .values()
            .filter(|s| s.category_id() == id)
            .map(Subcategory::id)
            .collect();
        for child in children {
            guard.remove_subcategory(child);
        }
        Ok(guard.categories.remove(&id).is_some())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StorageError> {
        let guard = self.lock()?;
        let categories = guard.categories.values().cloned().collect();
        Ok(sorted_by_name(categories, |c| (c.name(), c.id().value())))
    }

    async fn catalog(&self) -> Result<Vec<CatalogCategory>, StorageError> {
        let guard = self.lock()?;
        let categories: Vec<Category> = guard.categories.values().cloned().collect();
        let categories = sorted_by_name(categories, |c| (c.name(), c.id().value()));

        let catalog = categories
            .into_iter()
            .map(|category| {
                let subcategories: Vec<Subcategory> = guard
                    .subcategories
                    .values()
                    .filter(|s| s.category_id() == category.id())
                    .cloned()
                    .collect();
                let subcategories = sorted_by_name(subcategories, |s| (s.name(), s.id().value()))
                    .into_iter()
                    .map(|subcategory| CatalogSubcategory {
                        questions: guard
                            .questions
                            .values()
                            .filter(|q| q.subcategory_id() == subcategory.id())
                            .map(|q| guard.hydrate(q))
                            .collect(),
                        subcategory,
                    })
                    .collect();
                CatalogCategory {
                    category,
                    subcategories,
                }
            })
            .collect();
        Ok(catalog)
    }
}

#[async_trait]
impl SubcategoryRepository for InMemoryRepository {
    async fn insert_subcategory(
        &self,
        draft: SubcategoryDraft,
    ) -> Result<SubcategoryId, StorageError> {
        let mut guard = self.lock()?;
        if !guard.categories.contains_key(&draft.category_id) {
            return Err(StorageError::Conflict(format!(
                "unknown category {}",
                draft.category_id
            )));
        }
        let id = SubcategoryId::new(guard.last_subcategory + 1);
        let subcategory = Subcategory::new(id, draft.category_id, &draft.name).map_err(invalid)?;
        guard.last_subcategory += 1;
        guard.subcategories.insert(id, subcategory);
        Ok(id)
    }

    async fn rename_subcategory(
        &self,
        id: SubcategoryId,
        name: &str,
    ) -> Result<bool, StorageError> {
        let mut guard = self.lock()?;
        let Some(existing) = guard.subcategories.get(&id) else {
            return Ok(false);
        };
        let renamed = Subcategory::new(id, existing.category_id(), name).map_err(invalid)?;
        guard.subcategories.insert(id, renamed);
        Ok(true)
    }

    async fn delete_subcategory(&self, id: SubcategoryId) -> Result<bool, StorageError> {
        let mut guard = self.lock()?;
        Ok(guard.remove_subcategory(id))
    }

    async fn list_subcategories(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Subcategory>, StorageError> {
        let guard = self.lock()?;
        let subcategories = guard
            .subcategories
            .values()
            .filter(|s| s.category_id() == category_id)
            .cloned()
            .collect();
        Ok(sorted_by_name(subcategories, |s| (s.name(), s.id().value())))
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn insert_question(&self, draft: QuestionDraft) -> Result<QuestionId, StorageError> {
        let mut guard = self.lock()?;
        if !guard.subcategories.contains_key(&draft.subcategory_id) {
            return Err(StorageError::Conflict(format!(
                "unknown subcategory {}",
                draft.subcategory_id
            )));
        }
        let id = QuestionId::new(guard.last_question + 1);
        let question = Question::new(id, draft.subcategory_id, draft.statement, draft.answer)
            .map_err(invalid)?;
        guard.last_question += 1;
        guard.questions.insert(id, question);
        Ok(id)
    }

    async fn update_question(
        &self,
        id: QuestionId,
        statement: &str,
        answer: &str,
    ) -> Result<bool, StorageError> {
        let mut guard = self.lock()?;
        let Some(existing) = guard.questions.get(&id) else {
            return Ok(false);
        };
        let updated =
            Question::new(id, existing.subcategory_id(), statement, answer).map_err(invalid)?;
        guard.questions.insert(id, updated);
        Ok(true)
    }

    async fn delete_question(&self, id: QuestionId) -> Result<bool, StorageError> {
        let mut guard = self.lock()?;
        Ok(guard.remove_question(id))
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.questions.get(&id).map(|q| guard.hydrate(q)))
    }

    async fn sample_questions(
        &self,
        subcategory_id: SubcategoryId,
        limit: Option<u32>,
    ) -> Result<Vec<Question>, StorageError> {
        let guard = self.lock()?;
        let mut pool: Vec<Question> = guard
            .questions
            .values()
            .filter(|q| q.subcategory_id() == subcategory_id)
            .map(|q| guard.hydrate(q))
            .collect();
        pool.shuffle(&mut rand::rng());
        if let Some(limit) = limit {
            pool.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(pool)
    }
}

#[async_trait]
impl OptionRepository for InMemoryRepository {
    async fn insert_option(&self, draft: OptionDraft) -> Result<OptionId, StorageError> {
        let mut guard = self.lock()?;
        if !guard.questions.contains_key(&draft.question_id) {
            return Err(StorageError::Conflict(format!(
                "unknown question {}",
                draft.question_id
            )));
        }
        let id = OptionId::new(guard.last_option + 1);
        let option = QuestionOption::new(id, draft.question_id, draft.text, draft.is_correct)
            .map_err(invalid)?;
        guard.last_option += 1;
        guard.options.insert(id, option);
        Ok(id)
    }

    async fn delete_option(&self, id: OptionId) -> Result<bool, StorageError> {
        let mut guard = self.lock()?;
        Ok(guard.options.remove(&id).is_some())
    }
}

/// Aggregates the record repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub categories: Arc<dyn CategoryRepository>,
    pub subcategories: Arc<dyn SubcategoryRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub options: Arc<dyn OptionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            categories: Arc::new(repo.clone()),
            subcategories: Arc::new(repo.clone()),
            questions: Arc::new(repo.clone()),
            options: Arc::new(repo),
        }
    }
}
