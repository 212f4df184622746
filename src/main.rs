use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;

use taskdeck::auth::{AuthMiddleware, TokenService};
use taskdeck::config::Config;
use taskdeck::routes;
use taskdeck::routes::health;
use taskdeck::store::{TaskStore, UserStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    let token_service = TokenService::new(&config.jwt_secret, pool.clone());
    let user_store = UserStore::new(pool.clone(), config.password_pepper.clone());
    let task_store = TaskStore::new(pool.clone());

    log::info!("Starting taskdeck server at {}", config.server_url());

    let bind_addr = (config.server_host.clone(), config.server_port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(token_service.clone()))
            .app_data(web::Data::new(user_store.clone()))
            .app_data(web::Data::new(task_store.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
