use serde::Serialize;

use crate::model::{Category, CategoryId, Question, Subcategory, SubcategoryId};

/// A category with everything below it, as edited on the admin page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogCategory {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<CatalogSubcategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSubcategory {
    #[serde(flatten)]
    pub subcategory: Subcategory,
    pub questions: Vec<Question>,
}

impl CatalogCategory {
    /// Number of questions across all subcategories.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.subcategories.iter().map(|s| s.questions.len()).sum()
    }
}

/// Learner-facing index entry: names and question counts only.
///
/// Carries no question text, expected answers or option flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOverview {
    pub id: CategoryId,
    pub name: String,
    pub subcategories: Vec<SubcategoryOverview>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubcategoryOverview {
    pub id: SubcategoryId,
    pub name: String,
    pub question_count: usize,
}

impl From<&CatalogCategory> for CategoryOverview {
    fn from(entry: &CatalogCategory) -> Self {
        Self {
            id: entry.category.id(),
            name: entry.category.name().to_owned(),
            subcategories: entry
                .subcategories
                .iter()
                .map(|sub| SubcategoryOverview {
                    id: sub.subcategory.id(),
                    name: sub.subcategory.name().to_owned(),
                    question_count: sub.questions.len(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;

    #[test]
    fn overview_keeps_counts_and_drops_answers() {
        let category = Category::new(CategoryId::new(1), "Math").unwrap();
        let subcategory = Subcategory::new(SubcategoryId::new(2), category.id(), "Sums").unwrap();
        let question =
            Question::new(QuestionId::new(3), subcategory.id(), "1 + 1", "secret-two").unwrap();
        let entry = CatalogCategory {
            category,
            subcategories: vec![CatalogSubcategory {
                subcategory,
                questions: vec![question],
            }],
        };

        let overview = CategoryOverview::from(&entry);
        assert_eq!(overview.subcategories[0].question_count, 1);

        let json = serde_json::to_string(&overview).unwrap();
        assert!(json.contains("\"name\":\"Sums\""));
        assert!(!json.contains("secret-two"));
        assert!(!json.contains("statement"));
    }
}
