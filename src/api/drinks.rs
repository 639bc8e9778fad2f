// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    Extension, Json,
};

use crate::{
    auth::Claims,
    error::ApiError,
    models::{
        CreateDrinkRequest, DeleteDrinkResponse, DrinksLongResponse, DrinksShortResponse,
        UpdateDrinkRequest,
    },
    state::AppState,
};

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::new(rejection.status(), rejection.body_text()))
}

fn drink_id(id: Result<Path<u64>, PathRejection>) -> Result<u64, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|_| ApiError::not_found("requested resource was not found"))
}

#[utoipa::path(
    get,
    path = "/drinks",
    tag = "Drinks",
    responses((status = 200, body = DrinksShortResponse))
)]
pub async fn list_drinks(State(state): State<AppState>) -> Json<DrinksShortResponse> {
    let store = state.store.read().await;
    Json(DrinksShortResponse {
        success: true,
        drinks: store.list_drinks().iter().map(|drink| drink.short()).collect(),
    })
}

#[utoipa::path(
    get,
    path = "/drinks-detail",
    tag = "Drinks",
    security(("bearer" = ["get:drinks-detail"])),
    responses(
        (status = 200, body = DrinksLongResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token lacks get:drinks-detail")
    )
)]
pub async fn drinks_detail(
    Extension(_claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Json<DrinksLongResponse> {
    let store = state.store.read().await;
    Json(DrinksLongResponse {
        success: true,
        drinks: store.list_drinks().iter().map(|drink| drink.long()).collect(),
    })
}

#[utoipa::path(
    post,
    path = "/drinks",
    request_body = CreateDrinkRequest,
    tag = "Drinks",
    security(("bearer" = ["post:drinks"])),
    responses(
        (status = 200, body = DrinksLongResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token lacks post:drinks"),
        (status = 422, description = "Missing title or recipe, or duplicate title")
    )
)]
pub async fn create_drink(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    payload: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksLongResponse>, ApiError> {
    let request = json_body(payload)?;
    let drink = state.store.write().await.insert_drink(request)?;

    tracing::info!(drink_id = drink.id, title = %drink.title, sub = claims.subject(), "Drink created");
    Ok(Json(DrinksLongResponse {
        success: true,
        drinks: vec![drink.long()],
    }))
}

#[utoipa::path(
    patch,
    path = "/drinks/{id}",
    params(
        ("id" = u64, Path, description = "Identifier of the drink to update")
    ),
    request_body = UpdateDrinkRequest,
    tag = "Drinks",
    security(("bearer" = ["patch:drinks"])),
    responses(
        (status = 200, body = DrinksLongResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token lacks patch:drinks"),
        (status = 404, description = "Drink not found")
    )
)]
pub async fn update_drink(
    Extension(claims): Extension<Claims>,
    id: Result<Path<u64>, PathRejection>,
    State(state): State<AppState>,
    payload: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksLongResponse>, ApiError> {
    let id = drink_id(id)?;
    let request = json_body(payload)?;
    let drink = state.store.write().await.update_drink(id, request)?;

    tracing::info!(drink_id = id, sub = claims.subject(), "Drink updated");
    Ok(Json(DrinksLongResponse {
        success: true,
        drinks: vec![drink.long()],
    }))
}

#[utoipa::path(
    delete,
    path = "/drinks/{id}",
    params(
        ("id" = u64, Path, description = "Identifier of the drink to delete")
    ),
    tag = "Drinks",
    security(("bearer" = ["delete:drinks"])),
    responses(
        (status = 200, body = DeleteDrinkResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token lacks delete:drinks"),
        (status = 404, description = "Drink not found")
    )
)]
pub async fn delete_drink(
    Extension(claims): Extension<Claims>,
    id: Result<Path<u64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<DeleteDrinkResponse>, ApiError> {
    let id = drink_id(id)?;
    state.store.write().await.delete_drink(id)?;

    tracing::info!(drink_id = id, sub = claims.subject(), "Drink deleted");
    Ok(Json(DeleteDrinkResponse {
        success: true,
        delete: id,
    }))
}
