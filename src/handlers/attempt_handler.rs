use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::SubmitAnswerRequest,
        response::{FinishAttemptResponse, StartAttemptResponse, SubmitAnswerResponse},
    },
};

#[post("/public/tests/{public_id}/start")]
async fn start_attempt(
    state: web::Data<AppState>,
    public_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .attempt_service
        .start_attempt(&auth.0, &public_id)
        .await?;
    Ok(HttpResponse::Created().json(StartAttemptResponse::from(attempt)))
}

#[post("/attempts/{id}/answers")]
async fn submit_answer(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<SubmitAnswerRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let record = state
        .attempt_service
        .submit_answer(&auth.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(SubmitAnswerResponse::from(record)))
}

#[post("/attempts/{id}/finish")]
async fn finish_attempt(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let outcome = state.attempt_service.finish_attempt(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(FinishAttemptResponse::from(outcome)))
}

#[get("/attempts/mine")]
async fn my_attempts(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let history = state.attempt_service.attempt_history(&auth.0).await?;
    Ok(HttpResponse::Ok().json(history))
}
