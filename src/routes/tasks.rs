use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{PublicTask, Task, TaskInput, TaskUpdate},
    store::TaskStore,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Fetches the task and enforces the ownership rule shared by every
/// single-task operation: only the owner may see or mutate a task through
/// these paths. Non-owners get 403 regardless of the operation.
async fn owned_task(store: &TaskStore, id: Uuid, requester: Uuid) -> Result<Task, AppError> {
    let task = store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    if task.owner != requester {
        return Err(AppError::Forbidden(
            "You are not authorized to perform this action".into(),
        ));
    }

    Ok(task)
}

/// Lists the authenticated user's own tasks, full wire fields, newest first.
#[get("")]
pub async fn get_tasks(
    store: web::Data<TaskStore>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let tasks = store.list_by_owner(user.0.id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the authenticated user.
///
/// ## Request Body:
/// - `title`: required, 1..=200 characters.
/// - `description`: required, 1..=1000 characters.
/// - `isPublic` (optional): defaults to false.
///
/// ## Responses:
/// - `201 Created`: `{message, task}`.
/// - `422 Unprocessable Entity`: validation failure.
#[post("")]
pub async fn create_task(
    store: web::Data<TaskStore>,
    task_data: web::Json<TaskInput>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), user.0.id);
    let task = store.create(&task).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Task created successfully",
        "task": task
    })))
}

/// Lists the users who currently have at least one public task.
/// Any authenticated user may browse this index.
#[get("/public")]
pub async fn public_owners(store: web::Data<TaskStore>) -> Result<impl Responder, AppError> {
    let owners = store.distinct_public_owners().await?;
    Ok(HttpResponse::Ok().json(owners))
}

/// Lists another user's public tasks, reduced to title/description/completion.
/// Owner identity and the visibility flag are not leaked in the payload.
#[get("/public/{user_id}")]
pub async fn public_tasks(
    store: web::Data<TaskStore>,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let tasks = store.list_public_by_owner(user_id.into_inner()).await?;
    let tasks: Vec<PublicTask> = tasks.into_iter().map(PublicTask::from).collect();
    Ok(HttpResponse::Ok().json(tasks))
}

/// Retrieves a single task by id. Owner only.
#[get("/{id}")]
pub async fn get_task(
    store: web::Data<TaskStore>,
    task_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let task = owned_task(&store, task_id.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "task": task })))
}

/// Updates a task's title, description, and completion flag. Owner only;
/// visibility is changed through the toggle endpoint.
#[put("/{id}")]
pub async fn update_task(
    store: web::Data<TaskStore>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskUpdate>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task_id = task_id.into_inner();
    owned_task(&store, task_id, user.0.id).await?;

    let task = store.update(task_id, &task_data).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task updated successfully",
        "task": task
    })))
}

/// Deletes a task. Owner only.
#[delete("/{id}")]
pub async fn delete_task(
    store: web::Data<TaskStore>,
    task_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    owned_task(&store, task_id, user.0.id).await?;

    store.delete(task_id).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Task deleted successfully" })))
}

/// Flips a task's visibility. Owner only. Read-modify-write: concurrent
/// double-toggles may interleave, which is acceptable at this scope.
#[patch("/{id}/toggle")]
pub async fn toggle_public(
    store: web::Data<TaskStore>,
    task_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    let task = owned_task(&store, task_id, user.0.id).await?;

    let task = store.set_public(task_id, !task.is_public).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task updated successfully",
        "task": task
    })))
}

/// Flips a task's completion flag. Owner only; visibility is untouched.
#[patch("/{id}/complete")]
pub async fn complete_task(
    store: web::Data<TaskStore>,
    task_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    let task = owned_task(&store, task_id, user.0.id).await?;

    let task = store.set_completed(task_id, !task.is_completed).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task updated successfully",
        "task": task
    })))
}
