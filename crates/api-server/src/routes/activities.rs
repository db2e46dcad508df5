//! Activities on a contact and the caller's task list.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crm_core::activity::{Activity, ActivityDraft, TaskView};

use super::error::{map_core_error, ApiJson, ApiPath, RouteError};
use crate::auth::caller_from_headers;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct TaskStatusRequest {
    #[serde(default)]
    status: String,
}

async fn list_activities(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(contact_id): ApiPath<Uuid>,
) -> Result<Json<Vec<Activity>>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let activities = state
        .crm()
        .list_activities(&caller, contact_id)
        .await
        .map_err(map_core_error)?;
    Ok(Json(activities))
}

async fn create_activity(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(contact_id): ApiPath<Uuid>,
    ApiJson(draft): ApiJson<ActivityDraft>,
) -> Result<(StatusCode, Json<Activity>), RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let activity = state
        .crm()
        .create_activity(&caller, contact_id, draft)
        .await
        .map_err(map_core_error)?;
    Ok((StatusCode::CREATED, Json(activity)))
}

async fn list_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<TaskView>>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let tasks = state.crm().list_tasks(&caller).await.map_err(map_core_error)?;
    Ok(Json(tasks))
}

async fn update_task_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<TaskStatusRequest>,
) -> Result<Json<Activity>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let task = state
        .crm()
        .update_task_status(&caller, id, &req.status)
        .await
        .map_err(map_core_error)?;
    Ok(Json(task))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/contacts/{contact_id}/activities",
            get(list_activities).post(create_activity),
        )
        .route("/api/tasks", get(list_tasks))
        .route("/api/tasks/{id}", put(update_task_status))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{build_app, call, json_request, request, seed_user};

    #[tokio::test]
    async fn tasks_flow() {
        let (app, state, _tmp) = build_app().await;
        let (_bob, token) = seed_user(&state, "Bob").await;

        let (_, contact) = call(
            &app,
            json_request(
                "POST",
                "/api/contacts",
                Some(&token),
                json!({"firstName": "Jane", "lastName": "Doe", "email": "jane@client.com"}),
            ),
        )
        .await;
        let uri = format!("/api/contacts/{}/activities", contact["id"].as_str().unwrap());

        let (status, task) = call(
            &app,
            json_request(
                "POST",
                &uri,
                Some(&token),
                json!({"kind": "Task", "subject": "Send quote", "dueDate": "2030-01-15"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(task["status"], "Pending");

        let (status, call_activity) = call(
            &app,
            json_request("POST", &uri, Some(&token), json!({"kind": "Call", "subject": "Intro"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, tasks) = call(&app, request("GET", "/api/tasks", Some(&token))).await;
        let tasks = tasks.as_array().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0]["contact"]["firstName"], "Jane");

        let task_uri = format!("/api/tasks/{}", task["id"].as_str().unwrap());
        let (status, updated) = call(
            &app,
            json_request("PUT", &task_uri, Some(&token), json!({"status": "Completed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "Completed");

        let not_a_task = format!("/api/tasks/{}", call_activity["id"].as_str().unwrap());
        let (status, body) = call(
            &app,
            json_request("PUT", &not_a_task, Some(&token), json!({"status": "Completed"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "This activity is not a task");

        let (_, activities) = call(&app, request("GET", &uri, Some(&token))).await;
        assert_eq!(activities.as_array().unwrap().len(), 2);
    }
}
