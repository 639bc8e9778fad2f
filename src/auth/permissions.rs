// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scope-based permission checks.
//!
//! ## Permissions
//!
//! | Permission | Grants |
//! |------------|--------|
//! | `get:drinks-detail` | Read drinks including full recipes |
//! | `post:drinks` | Create drinks |
//! | `patch:drinks` | Edit drinks |
//! | `delete:drinks` | Delete drinks |

use super::{AuthError, Claims};

/// Read the full drink catalog with recipes.
pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
/// Create a drink.
pub const POST_DRINKS: &str = "post:drinks";
/// Update a drink.
pub const PATCH_DRINKS: &str = "patch:drinks";
/// Delete a drink.
pub const DELETE_DRINKS: &str = "delete:drinks";

/// Check that `claims` grant `permission`.
///
/// The `scope` claim is split on whitespace and compared by exact,
/// case-sensitive match.
pub fn check_permissions(permission: &str, claims: &Claims) -> Result<(), AuthError> {
    let scope = claims
        .scope()
        .filter(|scope| !scope.trim().is_empty())
        .ok_or(AuthError::NoPermissions)?;

    if scope.split_whitespace().any(|granted| granted == permission) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied)
    }
}
