use async_graphql::{Context, ErrorExtensions};

use crate::{
    app_state::AppState,
    auth::{extract_claims_from_context, Claims},
    errors::{AppError, AppResult},
};

/// Converts a service result into a GraphQL result carrying the error `code` extension.
pub fn to_gql<T>(result: AppResult<T>) -> async_graphql::Result<T> {
    result.map_err(|err| err.extend())
}

/// Shared state plus the caller's claims, which every resolver needs.
pub fn state_and_claims<'a>(ctx: &Context<'a>) -> async_graphql::Result<(&'a AppState, Claims)> {
    let state = ctx
        .data::<AppState>()
        .map_err(|_| AppError::InternalError("Application state missing".to_string()).extend())?;
    let claims = to_gql(extract_claims_from_context(ctx))?;
    Ok((state, claims))
}
