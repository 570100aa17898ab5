// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! HTTP middleware.

mod auth;
mod module_gate;

pub use auth::{AuthLayer, AuthMiddleware, DEFAULT_PUBLIC_PATHS};
pub use module_gate::{module_id_from_path, ModuleGate, ModuleGateLayer, MODULE_PATH_PREFIX};
