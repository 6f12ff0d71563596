use tracing::info;

use crate::catalog_service::CatalogService;
use crate::error::CatalogError;

struct DemoQuestion {
    statement: &'static str,
    answer: &'static str,
    options: &'static [(&'static str, bool)],
}

struct DemoSubcategory {
    name: &'static str,
    questions: &'static [DemoQuestion],
}

struct DemoCategory {
    name: &'static str,
    subcategories: &'static [DemoSubcategory],
}

const DEMO_CATALOG: &[DemoCategory] = &[
    DemoCategory {
        name: "Mathematics",
        subcategories: &[
            DemoSubcategory {
                name: "Arithmetic",
                questions: &[
                    DemoQuestion {
                        statement: "7 + 5 = ?",
                        answer: "12",
                        options: &[],
                    },
                    DemoQuestion {
                        statement: "6 \\times 7 = ?",
                        answer: "42",
                        options: &[("42", true), ("36", false), ("48", false)],
                    },
                    DemoQuestion {
                        statement: "81 / 9 = ?",
                        answer: "9",
                        options: &[],
                    },
                ],
            },
            DemoSubcategory {
                name: "Algebra",
                questions: &[
                    DemoQuestion {
                        statement: "Expand $(a+b)^2$",
                        answer: "a^2 + 2ab + b^2",
                        options: &[],
                    },
                    DemoQuestion {
                        statement: "Solve $2x = 10$ for $x$",
                        answer: "5",
                        options: &[],
                    },
                ],
            },
        ],
    },
    DemoCategory {
        name: "Geography",
        subcategories: &[DemoSubcategory {
            name: "Capitals",
            questions: &[
                DemoQuestion {
                    statement: "Capital of France?",
                    answer: "Paris",
                    options: &[("Paris", true), ("Lyon", false), ("Marseille", false)],
                },
                DemoQuestion {
                    statement: "Capital of Japan?",
                    answer: "Tokyo",
                    options: &[],
                },
            ],
        }],
    },
];

/// Counts of records created by [`seed_demo_catalog`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: u32,
    pub subcategories: u32,
    pub questions: u32,
    pub options: u32,
}

/// Insert a small demo catalog.
///
/// Categories whose name already exists are skipped with their whole subtree,
/// so seeding twice leaves the store unchanged.
///
/// # Errors
///
/// Returns `CatalogError` if validation or repository access fails.
pub async fn seed_demo_catalog(catalog: &CatalogService) -> Result<SeedReport, CatalogError> {
    let mut report = SeedReport::default();

    for category in DEMO_CATALOG {
        let Some(category_id) = catalog.create_category(category.name).await? else {
            info!(category = category.name, "demo category exists; skipping");
            continue;
        };
        report.categories += 1;

        for subcategory in category.subcategories {
            let Some(subcategory_id) = catalog
                .create_subcategory(category_id, subcategory.name)
                .await?
            else {
                continue;
            };
            report.subcategories += 1;

            for question in subcategory.questions {
                let Some(question_id) = catalog
                    .create_question(subcategory_id, question.statement, question.answer)
                    .await?
                else {
                    continue;
                };
                report.questions += 1;

                for &(text, is_correct) in question.options {
                    if catalog
                        .create_option(question_id, text, is_correct)
                        .await?
                        .is_some()
                    {
                        report.options += 1;
                    }
                }
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::Storage;

    #[tokio::test]
    async fn seeding_twice_is_idempotent() {
        let catalog = CatalogService::new(&Storage::in_memory());

        let first = seed_demo_catalog(&catalog).await.unwrap();
        assert_eq!(
            first,
            SeedReport {
                categories: 2,
                subcategories: 3,
                questions: 7,
                options: 6,
            }
        );

        let second = seed_demo_catalog(&catalog).await.unwrap();
        assert_eq!(second, SeedReport::default());

        let tree = catalog.catalog().await.unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].category.name(), "Geography");
        assert_eq!(tree[1].question_count(), 5);
    }
}
