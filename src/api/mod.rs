// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    handler::Handler,
    middleware::from_fn_with_state,
    routing::{get, patch},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{
        permissions::{DELETE_DRINKS, GET_DRINKS_DETAIL, PATCH_DRINKS, POST_DRINKS},
        require_permission,
    },
    error::ApiError,
    models::{
        CreateDrinkRequest, DeleteDrinkResponse, DrinkLong, DrinkShort, DrinksLongResponse,
        DrinksShortResponse, Ingredient, IngredientShort, RecipeInput, UpdateDrinkRequest,
    },
    state::AppState,
};

pub mod drinks;
pub mod health;

pub fn router(state: AppState) -> Router {
    let drink_routes = Router::new()
        .route(
            "/drinks",
            get(drinks::list_drinks).post(
                drinks::create_drink
                    .layer(from_fn_with_state(state.guard(POST_DRINKS), require_permission)),
            ),
        )
        .route(
            "/drinks-detail",
            get(drinks::drinks_detail
                .layer(from_fn_with_state(state.guard(GET_DRINKS_DETAIL), require_permission))),
        )
        .route(
            "/drinks/{id}",
            patch(
                drinks::update_drink
                    .layer(from_fn_with_state(state.guard(PATCH_DRINKS), require_permission)),
            )
            .delete(
                drinks::delete_drink
                    .layer(from_fn_with_state(state.guard(DELETE_DRINKS), require_permission)),
            ),
        )
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .fallback(not_found)
        .with_state(state);

    Router::new()
        .merge(drink_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
}

async fn not_found() -> ApiError {
    ApiError::not_found("requested resource was not found")
}

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        drinks::list_drinks,
        drinks::drinks_detail,
        drinks::create_drink,
        drinks::update_drink,
        drinks::delete_drink,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Ingredient,
            IngredientShort,
            DrinkShort,
            DrinkLong,
            RecipeInput,
            CreateDrinkRequest,
            UpdateDrinkRequest,
            DrinksShortResponse,
            DrinksLongResponse,
            DeleteDrinkResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "Drinks", description = "Drink catalog"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
