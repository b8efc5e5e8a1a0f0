use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::{CreateTestRequest, UpdateTestRequest},
        response::{CreatedResponse, MessageResponse, PublicTestDto, TestDto},
    },
};

#[get("/tests")]
async fn list_tests(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let tests = state.test_service.list_tests(&auth.0).await?;
    let body: Vec<TestDto> = tests.into_iter().map(TestDto::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[post("/tests")]
async fn create_test(
    state: web::Data<AppState>,
    request: web::Json<CreateTestRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let test = state
        .test_service
        .create_test(&auth.0, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(CreatedResponse {
        message: "Test created".to_string(),
        id: test.id,
    }))
}

#[get("/tests/{id}")]
async fn get_test(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let test = state.test_service.get_test(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(TestDto::from(test)))
}

#[put("/tests/{id}")]
async fn update_test(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateTestRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let test = state
        .test_service
        .update_test(&auth.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(TestDto::from(test)))
}

#[delete("/tests/{id}")]
async fn delete_test(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state.test_service.delete_test(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Test deleted".to_string(),
    }))
}

#[get("/tests/{id}/share")]
async fn share_test(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let link = state.test_service.share_link(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(link))
}

#[get("/public/tests/{public_id}")]
async fn public_test(
    state: web::Data<AppState>,
    public_id: web::Path<String>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let test = state.test_service.get_public_test(&public_id).await?;
    Ok(HttpResponse::Ok().json(PublicTestDto::from(test)))
}
