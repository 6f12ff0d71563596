use std::collections::HashSet;

use quiz_core::model::{
    CategoryDraft, OptionDraft, QuestionDraft, QuestionId, SubcategoryDraft, SubcategoryId,
};
use storage::repository::{
    CategoryRepository, OptionRepository, QuestionRepository, StorageError, SubcategoryRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

async fn seed_pool(repo: &SqliteRepository, questions: u32) -> SubcategoryId {
    let category = repo
        .insert_category(CategoryDraft::new("Math"))
        .await
        .unwrap();
    let subcategory = repo
        .insert_subcategory(SubcategoryDraft::new(category, "Arithmetic"))
        .await
        .unwrap();
    for n in 1..=questions {
        repo.insert_question(QuestionDraft {
            subcategory_id: subcategory,
            statement: format!("{n} + {n} = ?"),
            answer: format!("{}", n * 2),
        })
        .await
        .unwrap();
    }
    subcategory
}

#[tokio::test]
async fn sqlite_sampling_respects_limit_without_duplicates() {
    let repo = connect("memdb_sampling").await;
    let subcategory = seed_pool(&repo, 5).await;

    let sample = repo.sample_questions(subcategory, Some(5)).await.unwrap();
    let ids: HashSet<QuestionId> = sample.iter().map(|q| q.id()).collect();
    assert_eq!(sample.len(), 5);
    assert_eq!(ids.len(), 5);

    let two = repo.sample_questions(subcategory, Some(2)).await.unwrap();
    assert_eq!(two.len(), 2);

    let all = repo.sample_questions(subcategory, None).await.unwrap();
    assert_eq!(all.len(), 5);

    let none = repo.sample_questions(subcategory, Some(0)).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn sqlite_question_roundtrip_includes_options() {
    let repo = connect("memdb_options").await;
    let subcategory = seed_pool(&repo, 1).await;
    let question = repo.sample_questions(subcategory, None).await.unwrap()[0].id();

    repo.insert_option(OptionDraft {
        question_id: question,
        text: "2".into(),
        is_correct: true,
    })
    .await
    .unwrap();
    repo.insert_option(OptionDraft {
        question_id: question,
        text: "3".into(),
        is_correct: false,
    })
    .await
    .unwrap();

    let fetched = repo.get_question(question).await.unwrap().expect("question");
    assert_eq!(fetched.answer(), "2");
    assert_eq!(fetched.options().len(), 2);
    assert!(fetched.options()[0].is_correct());
    assert!(!fetched.options()[1].is_correct());

    assert!(repo.update_question(question, "1 + 1 = ?", "two").await.unwrap());
    let updated = repo.get_question(question).await.unwrap().expect("question");
    assert_eq!(updated.answer(), "two");

    assert!(repo.get_question(QuestionId::new(999)).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_integrity_violations_are_conflicts() {
    let repo = connect("memdb_conflicts").await;
    repo.insert_category(CategoryDraft::new("Physics"))
        .await
        .unwrap();

    let duplicate = repo
        .insert_category(CategoryDraft::new("Physics"))
        .await
        .unwrap_err();
    assert!(matches!(duplicate, StorageError::Conflict(_)));

    let orphan = repo
        .insert_question(QuestionDraft {
            subcategory_id: SubcategoryId::new(404),
            statement: "Q".into(),
            answer: "A".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(orphan, StorageError::Conflict(_)));
}

#[tokio::test]
async fn sqlite_delete_cascades_to_children() {
    let repo = connect("memdb_cascade").await;
    let subcategory = seed_pool(&repo, 3).await;
    let category = repo.list_categories().await.unwrap()[0].id();

    assert!(repo.delete_category(category).await.unwrap());
    assert!(!repo.delete_category(category).await.unwrap());

    assert!(repo.list_subcategories(category).await.unwrap().is_empty());
    assert!(
        repo.sample_questions(subcategory, None)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(repo.catalog().await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_catalog_nests_and_orders() {
    let repo = connect("memdb_catalog").await;
    let zoology = repo
        .insert_category(CategoryDraft::new("Zoology"))
        .await
        .unwrap();
    let botany = repo
        .insert_category(CategoryDraft::new("Botany"))
        .await
        .unwrap();
    let trees = repo
        .insert_subcategory(SubcategoryDraft::new(botany, "Trees"))
        .await
        .unwrap();
    repo.insert_subcategory(SubcategoryDraft::new(botany, "Ferns"))
        .await
        .unwrap();
    repo.insert_subcategory(SubcategoryDraft::new(zoology, "Birds"))
        .await
        .unwrap();
    repo.insert_question(QuestionDraft {
        subcategory_id: trees,
        statement: "Tallest tree species?".into(),
        answer: "Coast redwood".into(),
    })
    .await
    .unwrap();

    let catalog = repo.catalog().await.unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog[0].category.name(), "Botany");
    let botany_subs: Vec<_> = catalog[0]
        .subcategories
        .iter()
        .map(|s| s.subcategory.name())
        .collect();
    assert_eq!(botany_subs, ["Ferns", "Trees"]);
    assert_eq!(catalog[0].subcategories[1].questions.len(), 1);
    assert_eq!(catalog[0].question_count(), 1);
    assert_eq!(catalog[1].category.name(), "Zoology");
    assert_eq!(catalog[1].question_count(), 0);
}
