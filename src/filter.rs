//! Category filtering for -e occ= expressions
//!
//! Supports:
//! - Individual categories: -e occ=event,cmd,cmd_vm
//! - The commands class: -e occ=commands (both command categories)

use crate::record::Category;
use anyhow::{bail, Result};
use std::collections::HashSet;

/// Category filter that determines which report bundles to produce.
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    /// Categories to include (None = all categories)
    include: Option<HashSet<Category>>,
}

impl CategoryFilter {
    /// Create a filter that reports every category.
    pub fn all() -> Self {
        Self { include: None }
    }

    /// Parse a filter expression like "occ=event,cmd" or "occ=commands".
    pub fn from_expr(expr: &str) -> Result<Self> {
        if let Some(spec) = expr.strip_prefix("occ=") {
            Self::from_occ_spec(spec)
        } else {
            bail!(
                "Invalid filter expression: {}. Expected format: occ=SPEC",
                expr
            );
        }
    }

    /// Parse an occurrence-type specification (the part after "occ=").
    fn from_occ_spec(spec: &str) -> Result<Self> {
        let mut categories = HashSet::new();

        for part in spec.split(',') {
            let part = part.trim();
            match part {
                "event" | "events" => {
                    categories.insert(Category::Event);
                }
                "cmd" => {
                    categories.insert(Category::Cmd);
                }
                "cmd_vm" | "vm" => {
                    categories.insert(Category::CmdVm);
                }
                "commands" => {
                    categories.insert(Category::Cmd);
                    categories.insert(Category::CmdVm);
                }
                "all" => {
                    categories.extend(Category::ALL);
                }
                "" => {}
                _ => {
                    bail!(
                        "Unknown occurrence category: {}. Expected event, cmd, cmd_vm, commands, or all",
                        part
                    );
                }
            }
        }

        Ok(Self {
            include: Some(categories),
        })
    }

    /// Check if a category should be reported.
    pub fn should_report(&self, category: Category) -> bool {
        match &self.include {
            None => true,
            Some(set) => set.contains(&category),
        }
    }
}
