// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response types for the drinks API. All types derive
//! `Serialize`/`Deserialize` and `ToSchema` for JSON handling and OpenAPI
//! documentation.
//!
//! ## Views
//!
//! A [`Drink`] is exposed in two shapes:
//!
//! - **short** ([`DrinkShort`]): recipe colors and parts only, public
//! - **long** ([`DrinkLong`]): full recipe including ingredient names,
//!   requires `get:drinks-detail` or a write permission

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Drink Models
// =============================================================================

/// One ingredient of a drink recipe.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Ingredient {
    /// Ingredient name (e.g. "espresso").
    pub name: String,
    /// Display color (e.g. "#4b2e1a").
    pub color: String,
    /// Relative amount of this ingredient.
    pub parts: u32,
}

/// A stored drink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: u64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Ingredient as shown to anonymous clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct IngredientShort {
    pub color: String,
    pub parts: u32,
}

/// Public drink view without ingredient names.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DrinkShort {
    pub id: u64,
    pub title: String,
    pub recipe: Vec<IngredientShort>,
}

/// Full drink view.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DrinkLong {
    pub id: u64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|ingredient| IngredientShort {
                    color: ingredient.color.clone(),
                    parts: ingredient.parts,
                })
                .collect(),
        }
    }

    pub fn long(&self) -> DrinkLong {
        DrinkLong {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.clone(),
        }
    }
}

/// A recipe given either as a single ingredient or a list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(untagged)]
pub enum RecipeInput {
    One(Ingredient),
    Many(Vec<Ingredient>),
}

impl From<RecipeInput> for Vec<Ingredient> {
    fn from(value: RecipeInput) -> Self {
        match value {
            RecipeInput::One(ingredient) => vec![ingredient],
            RecipeInput::Many(ingredients) => ingredients,
        }
    }
}

/// Request to create a drink.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateDrinkRequest {
    /// Unique drink title.
    pub title: String,
    /// Recipe, one ingredient or several.
    pub recipe: RecipeInput,
}

/// Request to update a drink. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateDrinkRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub recipe: Option<RecipeInput>,
}

// =============================================================================
// Responses
// =============================================================================

/// Public drink listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrinksShortResponse {
    pub success: bool,
    pub drinks: Vec<DrinkShort>,
}

/// Detailed drink listing, also returned by create and update.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrinksLongResponse {
    pub success: bool,
    pub drinks: Vec<DrinkLong>,
}

/// Result of deleting a drink.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteDrinkResponse {
    pub success: bool,
    /// ID of the deleted drink.
    pub delete: u64,
}
