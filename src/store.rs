// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory drink store.
//!
//! Drinks are kept in a `BTreeMap` keyed by ID so listings come back in
//! creation order. IDs are never reused after deletion.

use std::collections::BTreeMap;

use crate::error::ApiError;
use crate::models::{CreateDrinkRequest, Drink, Ingredient, UpdateDrinkRequest};

#[derive(Default)]
pub struct InMemoryStore {
    drinks: BTreeMap<u64, Drink>,
    last_id: u64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list_drinks(&self) -> Vec<Drink> {
        self.drinks.values().cloned().collect()
    }

    pub fn insert_drink(&mut self, request: CreateDrinkRequest) -> Result<Drink, ApiError> {
        let title = validate_title(&request.title)?;
        let recipe = validate_recipe(request.recipe.into())?;
        self.ensure_title_free(&title, None)?;

        self.last_id += 1;
        let drink = Drink {
            id: self.last_id,
            title,
            recipe,
        };
        self.drinks.insert(drink.id, drink.clone());
        Ok(drink)
    }

    pub fn update_drink(&mut self, id: u64, request: UpdateDrinkRequest) -> Result<Drink, ApiError> {
        if !self.drinks.contains_key(&id) {
            return Err(ApiError::not_found("requested resource was not found"));
        }

        let title = request.title.as_deref().map(validate_title).transpose()?;
        let recipe = request
            .recipe
            .map(|recipe| validate_recipe(recipe.into()))
            .transpose()?;
        if let Some(title) = &title {
            self.ensure_title_free(title, Some(id))?;
        }

        let Some(drink) = self.drinks.get_mut(&id) else {
            return Err(ApiError::not_found("requested resource was not found"));
        };
        if let Some(title) = title {
            drink.title = title;
        }
        if let Some(recipe) = recipe {
            drink.recipe = recipe;
        }
        Ok(drink.clone())
    }

    pub fn delete_drink(&mut self, id: u64) -> Result<(), ApiError> {
        if self.drinks.remove(&id).is_some() {
            Ok(())
        } else {
            Err(ApiError::not_found("requested resource was not found"))
        }
    }

    fn ensure_title_free(&self, title: &str, except: Option<u64>) -> Result<(), ApiError> {
        let taken = self
            .drinks
            .values()
            .any(|drink| drink.title == title && Some(drink.id) != except);
        if taken {
            Err(ApiError::unprocessable(format!(
                "A drink titled '{title}' already exists"
            )))
        } else {
            Ok(())
        }
    }
}

fn validate_title(title: &str) -> Result<String, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::unprocessable("Drink title is required"));
    }
    Ok(title.to_string())
}

fn validate_recipe(recipe: Vec<Ingredient>) -> Result<Vec<Ingredient>, ApiError> {
    if recipe.is_empty() {
        return Err(ApiError::unprocessable(
            "Drink recipe needs at least one ingredient",
        ));
    }
    Ok(recipe)
}
