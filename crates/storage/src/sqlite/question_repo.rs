use std::collections::HashMap;

use quiz_core::model::{Question, QuestionDraft, QuestionId, QuestionOption, SubcategoryId};
use super::SqliteRepository;
use super::mapping::{
    id_to_i64, map_option_row, map_question_row, question_id_from_i64, read_err, write_err,
};
use crate::repository::{QuestionRepository, StorageError};

/// Options of a single question, ordered by id.
async fn options_for_question(
    pool: &sqlx::SqlitePool,
    question_id: QuestionId,
) -> Result<Vec<sqlx::sqlite::SqliteRow>, StorageError> {
    sqlx::query(
        r"
        SELECT id, question_id, text, is_correct
        FROM options
        WHERE question_id = ?1
        ORDER BY id ASC
        ",
    )
    .bind(id_to_i64("question_id", question_id.value())?)
    .fetch_all(pool)
    .await
    .map_err(read_err)
}

/// Options of every question in a subcategory, with a single bound parameter
/// however many questions the subcategory holds.
async fn options_for_subcategory(
    pool: &sqlx::SqlitePool,
    subcategory_id: SubcategoryId,
) -> Result<Vec<sqlx::sqlite::SqliteRow>, StorageError> {
    sqlx::query(
        r"
        SELECT id, question_id, text, is_correct
        FROM options
        WHERE question_id IN (SELECT id FROM questions WHERE subcategory_id = ?1)
        ORDER BY id ASC
        ",
    )
    .bind(id_to_i64("subcategory_id", subcategory_id.value())?)
    .fetch_all(pool)
    .await
    .map_err(read_err)
}

fn join_options(
    questions: Vec<Question>,
    option_rows: &[sqlx::sqlite::SqliteRow],
) -> Result<Vec<Question>, StorageError> {
    let mut by_question: HashMap<QuestionId, Vec<QuestionOption>> = HashMap::new();
    for row in option_rows {
        let option = map_option_row(row)?;
        by_question
            .entry(option.question_id())
            .or_default()
            .push(option);
    }

    Ok(questions
        .into_iter()
        .map(|q| {
            let options = by_question.remove(&q.id()).unwrap_or_default();
            q.with_options(options)
        })
        .collect())
}

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn insert_question(&self, draft: QuestionDraft) -> Result<QuestionId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO questions (subcategory_id, statement, answer)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(id_to_i64("subcategory_id", draft.subcategory_id.value())?)
        .bind(draft.statement)
        .bind(draft.answer)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        question_id_from_i64(res.last_insert_rowid())
    }

    async fn update_question(
        &self,
        id: QuestionId,
        statement: &str,
        answer: &str,
    ) -> Result<bool, StorageError> {
        let res = sqlx::query("UPDATE questions SET statement = ?1, answer = ?2 WHERE id = ?3")
            .bind(statement)
            .bind(answer)
            .bind(id_to_i64("question_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(write_err)?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_question(&self, id: QuestionId) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM questions WHERE id = ?1")
            .bind(id_to_i64("question_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(write_err)?;
        Ok(res.rows_affected() > 0)
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, subcategory_id, statement, answer
            FROM questions WHERE id = ?1
            ",
        )
        .bind(id_to_i64("question_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(read_err)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let question = map_question_row(&row)?;
        let option_rows = options_for_question(&self.pool, id).await?;
        Ok(join_options(vec![question], &option_rows)?.pop())
    }

    async fn sample_questions(
        &self,
        subcategory_id: SubcategoryId,
        limit: Option<u32>,
    ) -> Result<Vec<Question>, StorageError> {
        // SQLite treats a negative LIMIT as "no limit".
        let limit = limit.map_or(-1, i64::from);
        let rows = sqlx::query(
            r"
            SELECT id, subcategory_id, statement, answer
            FROM questions
            WHERE subcategory_id = ?1
            ORDER BY RANDOM()
            LIMIT ?2
            ",
        )
        .bind(id_to_i64("subcategory_id", subcategory_id.value())?)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(read_err)?;

        let questions = rows
            .iter()
            .map(map_question_row)
            .collect::<Result<Vec<_>, _>>()?;
        if questions.is_empty() {
            return Ok(questions);
        }
        let option_rows = options_for_subcategory(&self.pool, subcategory_id).await?;
        join_options(questions, &option_rows)
    }
}

/// Every question with its options, grouped by subcategory and ordered by id.
pub(super) async fn questions_by_subcategory(
    pool: &sqlx::SqlitePool,
) -> Result<HashMap<SubcategoryId, Vec<Question>>, StorageError> {
    let rows = sqlx::query(
        r"
        SELECT id, subcategory_id, statement, answer
        FROM questions
        ORDER BY id ASC
        ",
    )
    .fetch_all(pool)
    .await
    .map_err(read_err)?;

    let option_rows = sqlx::query("SELECT id, question_id, text, is_correct FROM options ORDER BY id")
        .fetch_all(pool)
        .await
        .map_err(read_err)?;

    let questions = rows
        .iter()
        .map(map_question_row)
        .collect::<Result<Vec<_>, _>>()?;
    let questions = join_options(questions, &option_rows)?;

    let mut grouped: HashMap<SubcategoryId, Vec<Question>> = HashMap::new();
    for question in questions {
        grouped
            .entry(question.subcategory_id())
            .or_default()
            .push(question);
    }
    Ok(grouped)
}
