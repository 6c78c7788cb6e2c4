//! Users API handlers.
//!
//! ```text
//! POST   /api/v1/users       {"username":"ada","email":"ada@example.com","password":"secret1"}
//! GET    /api/v1/users
//! GET    /api/v1/users/{id}
//! PUT    /api/v1/users/{id}  {"email":"ada@example.org"}
//! DELETE /api/v1/users/{id}
//! ```
//!
//! Each handler maps repository outcomes onto statuses and messages itself.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use utoipa::ToSchema;

use crate::domain::ports::{UniqueField, UserRepositoryError};
use crate::domain::{Email, Password, User, UserId, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{created, no_content, ok};
use crate::inbound::http::error::ApiError;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, map_user_validation_error, parse_json_body, required,
};

/// Request body for creating a user. Every field is required.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "ada")]
    pub username: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    #[schema(example = "secret1")]
    pub password: Option<String>,
}

/// Request body for a partial update. Absent fields stay unchanged; present
/// fields must be valid.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public view of a user. The password is never included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

fn user_not_found(id: &str) -> ApiError {
    ApiError::not_found("User not found").with_details(json!({ "id": id }))
}

fn conflict_for(field: UniqueField) -> ApiError {
    match field {
        UniqueField::Username => ApiError::conflict("Username already taken"),
        UniqueField::Email => ApiError::conflict("Email already in use"),
    }
}

fn repository_failure(operation: &'static str, err: UserRepositoryError) -> ApiError {
    error!(operation, error = %err, "user repository call failed");
    ApiError::internal(format!("Failed to {operation}: {err}"))
}

fn parse_user_id(raw: &str) -> ApiResult<UserId> {
    UserId::new(raw).map_err(|_| user_not_found(raw))
}

/// Resolve a lookup to "taken" or "free"; only `NotFound` counts as free.
fn is_taken(
    lookup: Result<User, UserRepositoryError>,
    owner: Option<&UserId>,
    operation: &'static str,
) -> ApiResult<bool> {
    match lookup {
        Ok(existing) => Ok(owner.is_none_or(|id| existing.id() != id)),
        Err(UserRepositoryError::NotFound { .. }) => Ok(false),
        Err(err) => Err(repository_failure(operation, err)),
    }
}

async fn load_user(state: &HttpState, raw_id: &str) -> ApiResult<User> {
    let id = parse_user_id(raw_id)?;
    match state.users.find_by_id(&id).await {
        Ok(user) => Ok(user),
        Err(UserRepositoryError::NotFound { .. }) => Err(user_not_found(raw_id)),
        Err(err) => Err(repository_failure("retrieve user", err)),
    }
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = crate::inbound::http::schemas::UserEnvelopeSchema),
        (status = 400, description = "Invalid request body or field", body = crate::inbound::http::schemas::ErrorEnvelopeSchema),
        (status = 409, description = "Username or email already in use", body = crate::inbound::http::schemas::ErrorEnvelopeSchema),
        (status = 500, description = "Internal server error", body = crate::inbound::http::schemas::ErrorEnvelopeSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let CreateUserRequest {
        username,
        email,
        password,
    } = payload.into_inner();
    let username = Username::new(required(username, FieldName::new("username"))?)
        .map_err(map_user_validation_error)?;
    let email =
        Email::new(required(email, FieldName::new("email"))?).map_err(map_user_validation_error)?;
    let password = Password::new(required(password, FieldName::new("password"))?)
        .map_err(map_user_validation_error)?;

    if is_taken(
        state.users.find_by_username(&username).await,
        None,
        "create user",
    )? {
        return Err(conflict_for(UniqueField::Username));
    }
    if is_taken(state.users.find_by_email(&email).await, None, "create user")? {
        return Err(conflict_for(UniqueField::Email));
    }

    let user = User::new(
        UserId::random(),
        username,
        email,
        password,
        state.clock.utc(),
    );
    let stored = state.users.create(user).await.map_err(|err| match err {
        UserRepositoryError::Conflict { field } => conflict_for(field),
        UserRepositoryError::AlreadyExists { .. } => ApiError::conflict("User already exists"),
        other => repository_failure("create user", other),
    })?;
    Ok(created(
        "User created successfully",
        UserResponse::from(&stored),
    ))
}

/// List every user.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users retrieved successfully", body = crate::inbound::http::schemas::UserListEnvelopeSchema),
        (status = 500, description = "Internal server error", body = crate::inbound::http::schemas::ErrorEnvelopeSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let users = state
        .users
        .list()
        .await
        .map_err(|err| repository_failure("retrieve users", err))?;
    let data: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();
    Ok(ok("Users retrieved successfully", data))
}

/// Fetch one user by identifier.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User retrieved successfully", body = crate::inbound::http::schemas::UserEnvelopeSchema),
        (status = 404, description = "User not found", body = crate::inbound::http::schemas::ErrorEnvelopeSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
pub async fn get_user(
    state: web::Data<HttpState>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = load_user(&state, &id).await?;
    Ok(ok("User retrieved successfully", UserResponse::from(&user)))
}

/// Partially update a user.
///
/// The body is parsed only after the user is found, so an unknown id yields
/// 404 even when the body is malformed.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = crate::inbound::http::schemas::UserEnvelopeSchema),
        (status = 400, description = "Invalid request body or field", body = crate::inbound::http::schemas::ErrorEnvelopeSchema),
        (status = 404, description = "User not found", body = crate::inbound::http::schemas::ErrorEnvelopeSchema),
        (status = 409, description = "Username or email already in use", body = crate::inbound::http::schemas::ErrorEnvelopeSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
pub async fn update_user(
    state: web::Data<HttpState>,
    id: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let mut user = load_user(&state, &id).await?;
    let UpdateUserRequest {
        username,
        email,
        password,
    } = parse_json_body(&body)?;

    if let Some(raw) = username {
        let username = Username::new(raw).map_err(map_user_validation_error)?;
        if &username != user.username()
            && is_taken(
                state.users.find_by_username(&username).await,
                Some(user.id()),
                "update user",
            )?
        {
            return Err(conflict_for(UniqueField::Username));
        }
        user.set_username(username);
    }

    if let Some(raw) = email {
        let email = Email::new(raw).map_err(map_user_validation_error)?;
        if &email != user.email()
            && is_taken(
                state.users.find_by_email(&email).await,
                Some(user.id()),
                "update user",
            )?
        {
            return Err(conflict_for(UniqueField::Email));
        }
        user.set_email(email);
    }

    if let Some(raw) = password {
        user.set_password(Password::new(raw).map_err(map_user_validation_error)?);
    }

    let stored = state.users.update(user).await.map_err(|err| match err {
        UserRepositoryError::Conflict { field } => conflict_for(field),
        UserRepositoryError::NotFound { .. } => user_not_found(&id),
        other => repository_failure("update user", other),
    })?;
    Ok(ok("User updated successfully", UserResponse::from(&stored)))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = crate::inbound::http::schemas::ErrorEnvelopeSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
pub async fn delete_user(
    state: web::Data<HttpState>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = load_user(&state, &id).await?;
    match state.users.delete(user.id()).await {
        Ok(()) => Ok(no_content()),
        Err(UserRepositoryError::NotFound { .. }) => Err(user_not_found(&id)),
        Err(err) => Err(repository_failure("delete user", err)),
    }
}

#[cfg(test)]
mod tests;
