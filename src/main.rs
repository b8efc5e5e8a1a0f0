use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};

use test_constructor_server::{
    app_state::AppState,
    auth::JwtService,
    config::Config,
    db::Database,
    graphql::create_schema,
    handlers::{configure, json_config},
    middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    if config.is_production() {
        if let Err(err) = config.validate_for_production() {
            log::error!("Refusing to start: {}", err);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()));
        }
    }

    let db = Database::connect(&config)
        .await
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))?;
    log::info!("Using database '{}'", db.db_name());

    let jwt_service = web::Data::new(JwtService::new(
        &config.jwt_secret,
        config.jwt_expiration_hours,
    ));
    let bind_address = (config.web_server_host.clone(), config.web_server_port);
    let cors_origin = config.cors_allowed_origin.clone();

    let state = AppState::new(db, config)
        .await
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))?;
    let schema = web::Data::new(create_schema(state.clone()));
    let state = web::Data::new(state);

    log::info!(
        "Starting HTTP server on {}:{}",
        bind_address.0,
        bind_address.1
    );
    log::info!(
        "GraphiQL playground: http://{}:{}/graphiql",
        bind_address.0,
        bind_address.1
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .app_data(schema.clone())
            .app_data(jwt_service.clone())
            .app_data(json_config())
            .wrap(cors)
            .wrap(Logger::new("%a \"%r\" %s %b %T %{x-request-id}o"))
            .wrap(RequestIdMiddleware)
            .configure(configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
