use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use tokio::sync::Mutex;

use quiz_core::model::{CategoryId, OptionId, QuestionId, SubcategoryId};
use services::{AppServices, PlayError, PlayRequest, PlaySession, Submission, SubmitOutcome};

use crate::error::ApiError;

type HandlerResult = Result<Response, ApiError>;

/// Shared handler state: the services plus the one live play session.
#[derive(Clone)]
pub(crate) struct AppState {
    services: AppServices,
    session: Arc<Mutex<Option<PlaySession>>>,
}

impl AppState {
    pub(crate) fn new(services: AppServices) -> Self {
        Self {
            services,
            session: Arc::new(Mutex::new(None)),
        }
    }
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/admin", get(catalog))
        .route("/admin/category", post(create_category))
        .route("/admin/category/update", post(update_category))
        .route("/admin/category/delete", post(delete_category))
        .route("/admin/subcategory", post(create_subcategory))
        .route("/admin/subcategory/update", post(update_subcategory))
        .route("/admin/subcategory/delete", post(delete_subcategory))
        .route("/admin/question", post(create_question))
        .route("/admin/question/update", post(update_question))
        .route("/admin/question/delete", post(delete_question))
        .route("/admin/option", post(create_option))
        .route("/admin/option/delete", post(delete_option))
        .route("/play/question", post(play_start))
        .route("/play/answer", post(play_answer))
        .route("/play/timeout", post(play_timeout))
        .with_state(state)
}

fn to_admin() -> Response {
    Redirect::to("/admin").into_response()
}

fn to_home() -> Response {
    Redirect::to("/").into_response()
}

/// HTML-form style flag: present and not an explicit "off" value.
fn form_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        !matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "" | "0" | "false" | "off" | "no"
        )
    })
}

/// Learner index: names and question counts, never answers.
async fn index(State(state): State<AppState>) -> HandlerResult {
    let overview = state.services.catalog().overview().await?;
    Ok(Json(overview).into_response())
}

async fn catalog(State(state): State<AppState>) -> HandlerResult {
    let tree = state.services.catalog().catalog().await?;
    Ok(Json(tree).into_response())
}

//
// ─── ADMIN ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct NameForm {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CategoryForm {
    category_id: CategoryId,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct SubcategoryForm {
    subcategory_id: SubcategoryId,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct NewSubcategoryForm {
    category_id: CategoryId,
    name: String,
}

#[derive(Debug, Deserialize)]
struct NewQuestionForm {
    subcategory_id: SubcategoryId,
    statement: String,
    answer: String,
}

#[derive(Debug, Deserialize)]
struct QuestionForm {
    question_id: QuestionId,
    #[serde(default)]
    statement: String,
    #[serde(default)]
    answer: String,
}

#[derive(Debug, Deserialize)]
struct NewOptionForm {
    question_id: QuestionId,
    text: String,
    is_correct: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OptionForm {
    option_id: OptionId,
}

async fn create_category(
    State(state): State<AppState>,
    Form(form): Form<NameForm>,
) -> HandlerResult {
    state.services.catalog().create_category(form.name).await?;
    Ok(to_admin())
}

async fn update_category(
    State(state): State<AppState>,
    Form(form): Form<CategoryForm>,
) -> HandlerResult {
    state
        .services
        .catalog()
        .update_category(form.category_id, form.name)
        .await?;
    Ok(to_admin())
}

async fn delete_category(
    State(state): State<AppState>,
    Form(form): Form<CategoryForm>,
) -> HandlerResult {
    state
        .services
        .catalog()
        .delete_category(form.category_id)
        .await?;
    Ok(to_admin())
}

async fn create_subcategory(
    State(state): State<AppState>,
    Form(form): Form<NewSubcategoryForm>,
) -> HandlerResult {
    state
        .services
        .catalog()
        .create_subcategory(form.category_id, form.name)
        .await?;
    Ok(to_admin())
}

async fn update_subcategory(
    State(state): State<AppState>,
    Form(form): Form<SubcategoryForm>,
) -> HandlerResult {
    state
        .services
        .catalog()
        .update_subcategory(form.subcategory_id, form.name)
        .await?;
    Ok(to_admin())
}

async fn delete_subcategory(
    State(state): State<AppState>,
    Form(form): Form<SubcategoryForm>,
) -> HandlerResult {
    state
        .services
        .catalog()
        .delete_subcategory(form.subcategory_id)
        .await?;
    Ok(to_admin())
}

async fn create_question(
    State(state): State<AppState>,
    Form(form): Form<NewQuestionForm>,
) -> HandlerResult {
    state
        .services
        .catalog()
        .create_question(form.subcategory_id, form.statement, form.answer)
        .await?;
    Ok(to_admin())
}

async fn update_question(
    State(state): State<AppState>,
    Form(form): Form<QuestionForm>,
) -> HandlerResult {
    state
        .services
        .catalog()
        .update_question(form.question_id, &form.statement, &form.answer)
        .await?;
    Ok(to_admin())
}

async fn delete_question(
    State(state): State<AppState>,
    Form(form): Form<QuestionForm>,
) -> HandlerResult {
    state
        .services
        .catalog()
        .delete_question(form.question_id)
        .await?;
    Ok(to_admin())
}

async fn create_option(
    State(state): State<AppState>,
    Form(form): Form<NewOptionForm>,
) -> HandlerResult {
    state
        .services
        .catalog()
        .create_option(
            form.question_id,
            form.text,
            form_flag(form.is_correct.as_deref()),
        )
        .await?;
    Ok(to_admin())
}

async fn delete_option(
    State(state): State<AppState>,
    Form(form): Form<OptionForm>,
) -> HandlerResult {
    state.services.catalog().delete_option(form.option_id).await?;
    Ok(to_admin())
}

//
// ─── PLAY ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct StartForm {
    subcategory_id: SubcategoryId,
    limit: u32,
    time_limit: u32,
    all_questions: Option<String>,
    exam: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnswerForm {
    question_id: QuestionId,
    subcategory_id: SubcategoryId,
    #[serde(default)]
    user_answer: String,
}

async fn play_start(
    State(state): State<AppState>,
    Form(form): Form<StartForm>,
) -> HandlerResult {
    let request = PlayRequest {
        subcategory_id: form.subcategory_id,
        limit: form.limit,
        time_limit_minutes: form.time_limit,
        all_questions: form_flag(form.all_questions.as_deref()),
        exam: form_flag(form.exam.as_deref()),
    };

    let mut slot = state.session.lock().await;
    match state.services.play().start(request).await {
        Ok(started) => {
            *slot = Some(started.session);
            Ok(Json(started.step).into_response())
        }
        Err(PlayError::Empty) => Ok(to_home()),
        Err(err) => Err(err.into()),
    }
}

async fn play_answer(
    State(state): State<AppState>,
    Form(form): Form<AnswerForm>,
) -> HandlerResult {
    let mut slot = state.session.lock().await;
    let Some(session) = slot.as_mut() else {
        return Ok(to_home());
    };

    let submission = Submission {
        question_id: form.question_id,
        subcategory_id: form.subcategory_id,
        raw_answer: form.user_answer,
    };
    match state.services.play().submit(session, submission).await {
        Ok(outcome) => Ok(Json(outcome).into_response()),
        Err(PlayError::Completed) => Ok(to_home()),
        Err(err) => Err(err.into()),
    }
}

async fn play_timeout(State(state): State<AppState>) -> HandlerResult {
    let mut slot = state.session.lock().await;
    let Some(session) = slot.as_mut() else {
        return Ok(to_home());
    };

    let summary = state.services.play().finalize(session).await?;
    Ok(Json(SubmitOutcome::Finished(summary)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use services::Clock;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState::new(AppServices::in_memory(Clock::system()))
    }

    fn form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    async fn send(state: &AppState, request: Request<Body>) -> Response {
        router(state.clone()).oneshot(request).await.unwrap()
    }

    async fn json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    /// One category with a subcategory holding a single "6*7" question.
    async fn seeded_state() -> (AppState, SubcategoryId, QuestionId) {
        let state = test_state();
        let catalog = state.services.catalog();
        let cat = catalog.create_category("Math").await.unwrap().unwrap();
        let sub = catalog
            .create_subcategory(cat, "Products")
            .await
            .unwrap()
            .unwrap();
        let question = catalog
            .create_question(sub, "6 x 7 = ?", "6*7")
            .await
            .unwrap()
            .unwrap();
        (state, sub, question)
    }

    #[test]
    fn form_flags_follow_checkbox_semantics() {
        assert!(!form_flag(None));
        assert!(!form_flag(Some("0")));
        assert!(!form_flag(Some("")));
        assert!(form_flag(Some("1")));
        assert!(form_flag(Some("on")));
        assert!(form_flag(Some("true")));
    }

    #[tokio::test]
    async fn admin_writes_redirect_and_show_up_in_catalog() {
        let state = test_state();

        let response = send(&state, form("/admin/category", "name=Geography")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/admin");

        let duplicate = send(&state, form("/admin/category", "name=Geography")).await;
        assert_eq!(duplicate.status(), StatusCode::SEE_OTHER);

        let response = send(
            &state,
            form("/admin/subcategory", "category_id=1&name=Rivers"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = send(
            &state,
            Request::builder().uri("/admin").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let tree = json(response).await;
        assert_eq!(tree.as_array().unwrap().len(), 1);
        assert_eq!(tree[0]["name"], "Geography");
        assert_eq!(tree[0]["subcategories"][0]["name"], "Rivers");
    }

    #[tokio::test]
    async fn home_lists_counts_without_answers() {
        let (state, sub, question) = seeded_state().await;
        let response = send(
            &state,
            form(
                "/admin/option",
                &format!("question_id={question}&text=42&is_correct=on"),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let get = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();

        let home = send(&state, get("/")).await;
        assert_eq!(home.status(), StatusCode::OK);
        let bytes = home.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        for hidden in ["6*7", "6 x 7", "is_correct", "\"questions\""] {
            assert!(!body.contains(hidden), "home leaked {hidden}: {body}");
        }
        let home: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(home[0]["name"], "Math");
        assert_eq!(home[0]["subcategories"][0]["id"], sub.value());
        assert_eq!(home[0]["subcategories"][0]["question_count"], 1);

        let admin = json(send(&state, get("/admin")).await).await;
        let question = &admin[0]["subcategories"][0]["questions"][0];
        assert_eq!(question["answer"], "6*7");
        assert_eq!(question["options"][0]["is_correct"], true);
    }

    #[tokio::test]
    async fn unknown_ids_still_redirect() {
        let state = test_state();
        for (uri, body) in [
            ("/admin/category/delete", "category_id=42"),
            ("/admin/subcategory/update", "subcategory_id=42&name=X"),
            ("/admin/question/delete", "question_id=42"),
            ("/admin/option/delete", "option_id=42"),
        ] {
            let response = send(&state, form(uri, body)).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        }
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let state = test_state();
        let response = send(&state, form("/admin/category", "name=+++")).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn play_round_trip_in_training_mode() {
        let (state, sub, question) = seeded_state().await;

        let response = send(
            &state,
            form(
                "/play/question",
                &format!("subcategory_id={sub}&limit=5&time_limit=2"),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let step = json(response).await;
        assert_eq!(step["mode"], "training");
        assert_eq!(step["question"]["id"], question.value());
        assert_eq!(step["progress"]["total"], 1);
        assert!(step["remaining_secs"].as_i64().unwrap() > 100);

        let response = send(
            &state,
            form(
                "/play/answer",
                &format!("question_id={question}&subcategory_id={sub}&user_answer=6+%C3%97+7"),
            ),
        )
        .await;
        let outcome = json(response).await;
        assert_eq!(outcome["status"], "finished");
        assert_eq!(outcome["attempts"], 1);
        assert_eq!(outcome["correct"], 1);
        assert_eq!(outcome["timeout"], false);

        let again = send(
            &state,
            form(
                "/play/answer",
                &format!("question_id={question}&subcategory_id={sub}&user_answer=42"),
            ),
        )
        .await;
        assert_eq!(again.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&again), "/");
    }

    #[tokio::test]
    async fn empty_subcategory_redirects_home_and_keeps_session() {
        let (state, sub, _) = seeded_state().await;
        let empty = state
            .services
            .catalog()
            .create_subcategory(CategoryId::new(1), "Empty")
            .await
            .unwrap()
            .unwrap();

        send(
            &state,
            form(
                "/play/question",
                &format!("subcategory_id={sub}&limit=1&time_limit=5&exam=1"),
            ),
        )
        .await;

        let response = send(
            &state,
            form(
                "/play/question",
                &format!("subcategory_id={empty}&limit=1&time_limit=5"),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let slot = state.session.lock().await;
        let session = slot.as_ref().expect("previous session kept");
        assert_eq!(session.subcategory_id(), sub);
    }

    #[tokio::test]
    async fn timeout_route_finalizes_or_redirects() {
        let (state, sub, _) = seeded_state().await;

        let response = send(&state, form("/play/timeout", "")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        send(
            &state,
            form(
                "/play/question",
                &format!("subcategory_id={sub}&limit=1&time_limit=0&exam=1"),
            ),
        )
        .await;
        let response = send(&state, form("/play/timeout", "")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let summary = json(response).await;
        assert_eq!(summary["status"], "finished");
        assert_eq!(summary["attempts"], 0);
        assert_eq!(summary["timeout"], true);
    }
}
