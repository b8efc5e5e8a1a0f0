pub mod attempt_handler;
pub mod graphql_handler;
pub mod health_handler;
pub mod question_handler;
pub mod test_handler;

use actix_web::web;

use crate::{auth::AuthMiddleware, errors::AppError};

pub use attempt_handler::{finish_attempt, my_attempts, start_attempt, submit_answer};
pub use graphql_handler::{graphiql, graphql};
pub use health_handler::{health_check, health_check_live, health_check_ready};
pub use question_handler::{
    add_question, delete_question, list_questions, questions_for_taking, update_question,
};
pub use test_handler::{
    create_test, delete_test, get_test, list_tests, public_test, share_test, update_test,
};

/// Registers every route. Everything under `/api` and `/graphql` needs a Bearer token.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(health_check_ready)
        .service(health_check_live)
        .service(graphql)
        .service(graphiql)
        .service(
            web::scope("/api")
                .wrap(AuthMiddleware)
                .service(my_attempts)
                .service(list_tests)
                .service(create_test)
                .service(get_test)
                .service(update_test)
                .service(delete_test)
                .service(share_test)
                .service(list_questions)
                .service(add_question)
                .service(update_question)
                .service(delete_question)
                .service(public_test)
                .service(questions_for_taking)
                .service(start_attempt)
                .service(submit_answer)
                .service(finish_attempt),
        );
}

/// Malformed JSON bodies become `ValidationError` responses.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(256 * 1024)
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}
