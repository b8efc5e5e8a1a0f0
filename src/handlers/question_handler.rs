use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::QuestionRequest,
        response::{AuthorQuestionDto, CreatedResponse, MessageResponse},
    },
};

#[get("/tests/{id}/questions")]
async fn list_questions(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let questions = state.test_service.list_questions(&auth.0, &id).await?;
    let body: Vec<AuthorQuestionDto> = questions.iter().map(AuthorQuestionDto::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[post("/tests/{id}/questions")]
async fn add_question(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<QuestionRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let question = state
        .test_service
        .add_question(&auth.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(CreatedResponse {
        message: "Question added".to_string(),
        id: question.id,
    }))
}

#[put("/tests/{id}/questions/{question_id}")]
async fn update_question(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    request: web::Json<QuestionRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (test_id, question_id) = path.into_inner();
    let question = state
        .test_service
        .update_question(&auth.0, &test_id, &question_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(AuthorQuestionDto::from(&question)))
}

#[delete("/tests/{id}/questions/{question_id}")]
async fn delete_question(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (test_id, question_id) = path.into_inner();
    state
        .test_service
        .delete_question(&auth.0, &test_id, &question_id)
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Question deleted".to_string(),
    }))
}

/// Questions as seen by whoever is taking the test.
#[get("/public/tests/{public_id}/questions")]
async fn questions_for_taking(
    state: web::Data<AppState>,
    public_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let questions = state
        .attempt_service
        .questions_for_taking(&auth.0, &public_id)
        .await?;
    Ok(HttpResponse::Ok().json(questions))
}
