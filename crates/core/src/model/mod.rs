mod catalog;
mod category;
mod ids;
mod question;

pub use catalog::{CatalogCategory, CatalogSubcategory, CategoryOverview, SubcategoryOverview};
pub use category::{Category, CategoryDraft, CategoryError, Subcategory, SubcategoryDraft, MAX_NAME_LEN};
pub use ids::{CategoryId, OptionId, ParseIdError, QuestionId, SubcategoryId};
pub use question::{OptionDraft, Question, QuestionDraft, QuestionError, QuestionOption};
