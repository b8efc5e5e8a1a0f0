use async_graphql::{Context, Object};

use crate::{
    graphql::helpers::{state_and_claims, to_gql},
    models::dto::response::{AttemptHistoryEntry, PublicTestDto, QuestionForTaking},
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Cover page of a shared test.
    async fn public_test(
        &self,
        ctx: &Context<'_>,
        public_id: String,
    ) -> async_graphql::Result<PublicTestDto> {
        let (state, _claims) = state_and_claims(ctx)?;

        let test = to_gql(state.test_service.get_public_test(&public_id).await)?;
        Ok(test.into())
    }

    async fn questions_for_taking(
        &self,
        ctx: &Context<'_>,
        public_id: String,
    ) -> async_graphql::Result<Vec<QuestionForTaking>> {
        let (state, claims) = state_and_claims(ctx)?;

        to_gql(
            state
                .attempt_service
                .questions_for_taking(&claims, &public_id)
                .await,
        )
    }

    async fn my_attempts(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<AttemptHistoryEntry>> {
        let (state, claims) = state_and_claims(ctx)?;

        to_gql(state.attempt_service.attempt_history(&claims).await)
    }
}
