// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Module access policy.
//!
//! One static table maps each functional module to the role it requires.
//! A role may open a module iff it is the required role or [`Role::Admin`].
//! Modules that are not in the table are never authorized.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Returns `true` if `role` satisfies `required`.
pub fn is_authorized(role: Role, required: Role) -> bool {
    role == required || role.is_admin()
}

// =============================================================================
// ModuleDescriptor
// =============================================================================

/// A functional module of the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    /// Stable identifier used in URLs.
    pub id: String,
    /// Human readable title.
    pub title: String,
    /// Short description.
    pub description: String,
    /// Role required to open the module.
    pub required_role: Role,
}

impl ModuleDescriptor {
    /// Creates a descriptor.
    pub fn new(id: impl Into<String>, title: impl Into<String>, required_role: Role) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            required_role,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision<'a> {
    /// The role may open the module.
    Allowed(&'a ModuleDescriptor),
    /// The module exists but requires another role.
    Denied {
        /// Role the module requires.
        required: Role,
    },
    /// No module has this id.
    UnknownModule,
}

impl AccessDecision<'_> {
    /// Returns `true` for [`AccessDecision::Allowed`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed(_))
    }
}

// =============================================================================
// ModuleAccessPolicy
// =============================================================================

/// Declarative module to role table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleAccessPolicy {
    modules: Vec<ModuleDescriptor>,
}

impl ModuleAccessPolicy {
    /// Creates the default portal policy.
    pub fn new() -> Self {
        Self::builder()
            .module(
                ModuleDescriptor::new("job-tracking", "Job Tracking Dashboard", Role::User)
                    .with_description("Submitted jobs and their progress"),
            )
            .module(
                ModuleDescriptor::new("reconciliation", "Reconciliation Dashboard", Role::Admin)
                    .with_description("Ledger reconciliation and payouts"),
            )
            .module(
                ModuleDescriptor::new("validator", "Validator Dashboard", Role::Validator)
                    .with_description("Validator node health and attestations"),
            )
            .module(
                ModuleDescriptor::new("system-status", "System Status", Role::Guest)
                    .with_description("Public service status"),
            )
            .module(
                ModuleDescriptor::new("monitor", "Monitor Dashboard", Role::Guest)
                    .with_description("Live network metrics"),
            )
            .build()
    }

    /// Creates a policy builder with no modules.
    pub fn builder() -> ModuleAccessPolicyBuilder {
        ModuleAccessPolicyBuilder::default()
    }

    /// Returns every module in table order.
    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    /// Looks up a module.
    pub fn get(&self, module: &str) -> Option<&ModuleDescriptor> {
        self.modules.iter().find(|m| m.id == module)
    }

    /// Returns the role a module requires.
    pub fn required_role(&self, module: &str) -> Option<Role> {
        self.get(module).map(|m| m.required_role)
    }

    /// Returns `true` if `role` may open `module`. Unknown modules are denied.
    pub fn is_authorized(&self, role: Role, module: &str) -> bool {
        self.decide(role, module).is_allowed()
    }

    /// Decides access and says why.
    pub fn decide(&self, role: Role, module: &str) -> AccessDecision<'_> {
        match self.get(module) {
            Some(descriptor) if is_authorized(role, descriptor.required_role) => {
                AccessDecision::Allowed(descriptor)
            }
            Some(descriptor) => AccessDecision::Denied {
                required: descriptor.required_role,
            },
            None => AccessDecision::UnknownModule,
        }
    }

    /// Returns the modules `role` may open, in table order.
    pub fn accessible_modules(&self, role: Role) -> Vec<&ModuleDescriptor> {
        self.modules
            .iter()
            .filter(|m| is_authorized(role, m.required_role))
            .collect()
    }
}

impl Default for ModuleAccessPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ModuleAccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id_width = self
            .modules
            .iter()
            .map(|m| m.id.len())
            .chain(std::iter::once("MODULE".len()))
            .max()
            .unwrap_or(0);

        write!(f, "{:<width$}  {:<9}", "MODULE", "REQUIRES", width = id_width)?;
        for role in Role::ALL {
            write!(f, "  {:<9}", role.as_str())?;
        }
        writeln!(f)?;

        for module in &self.modules {
            write!(
                f,
                "{:<width$}  {:<9}",
                module.id,
                module.required_role.as_str(),
                width = id_width
            )?;
            for role in Role::ALL {
                let mark = if is_authorized(role, module.required_role) {
                    "yes"
                } else {
                    "-"
                };
                write!(f, "  {:<9}", mark)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Builder for [`ModuleAccessPolicy`].
#[derive(Debug, Default)]
pub struct ModuleAccessPolicyBuilder {
    modules: Vec<ModuleDescriptor>,
}

impl ModuleAccessPolicyBuilder {
    /// Adds a module. A later module with the same id replaces the earlier one.
    pub fn module(mut self, descriptor: ModuleDescriptor) -> Self {
        if let Some(existing) = self.modules.iter_mut().find(|m| m.id == descriptor.id) {
            *existing = descriptor;
        } else {
            self.modules.push(descriptor);
        }
        self
    }

    /// Builds the policy.
    pub fn build(self) -> ModuleAccessPolicy {
        ModuleAccessPolicy {
            modules: self.modules,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
