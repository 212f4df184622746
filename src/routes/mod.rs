pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login)
            .service(auth::logout)
            .service(auth::profile),
    )
    .service(
        // The literal /public routes must be registered before /{id}.
        web::scope("/tasks")
            .service(tasks::public_owners)
            .service(tasks::public_tasks)
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task)
            .service(tasks::toggle_public)
            .service(tasks::complete_task),
    );
}
