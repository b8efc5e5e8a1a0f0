use async_graphql::{Context, Json, Object};
use serde_json::Value;

use crate::{
    graphql::helpers::{state_and_claims, to_gql},
    models::dto::{
        request::SubmitAnswerRequest,
        response::{FinishAttemptResponse, StartAttemptResponse, SubmitAnswerResponse},
    },
};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn start_attempt(
        &self,
        ctx: &Context<'_>,
        public_id: String,
    ) -> async_graphql::Result<StartAttemptResponse> {
        let (state, claims) = state_and_claims(ctx)?;

        let attempt = to_gql(state.attempt_service.start_attempt(&claims, &public_id).await)?;
        Ok(attempt.into())
    }

    /// `selectedAnswer` is any JSON value; its expected shape depends on the question type.
    async fn submit_answer(
        &self,
        ctx: &Context<'_>,
        attempt_id: String,
        question_id: String,
        selected_answer: Option<Json<Value>>,
    ) -> async_graphql::Result<SubmitAnswerResponse> {
        let (state, claims) = state_and_claims(ctx)?;

        let request = SubmitAnswerRequest {
            question_id,
            selected_answer: selected_answer.map(|json| json.0).unwrap_or(Value::Null),
        };
        let record = to_gql(
            state
                .attempt_service
                .submit_answer(&claims, &attempt_id, request)
                .await,
        )?;
        Ok(record.into())
    }

    async fn finish_attempt(
        &self,
        ctx: &Context<'_>,
        attempt_id: String,
    ) -> async_graphql::Result<FinishAttemptResponse> {
        let (state, claims) = state_and_claims(ctx)?;

        let outcome = to_gql(
            state
                .attempt_service
                .finish_attempt(&claims, &attempt_id)
                .await,
        )?;
        Ok(outcome.into())
    }
}
