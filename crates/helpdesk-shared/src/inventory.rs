//! Inventory items: plain records with a low-stock check.

use serde::{Deserialize, Serialize};

use crate::error::DeskResult;
use crate::transition::require_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    #[serde(alias = "good")]
    Baik,
    #[serde(alias = "minor_damage")]
    RusakRingan,
    #[serde(alias = "major_damage")]
    RusakBerat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub stock: u32,
    #[serde(default)]
    pub min_stock: u32,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub version: u64,
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

/// Create/update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryInput {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub stock: u32,
    #[serde(default)]
    pub min_stock: u32,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub condition: Condition,
}

impl InventoryInput {
    pub fn into_item(self, id: String) -> DeskResult<InventoryItem> {
        let name = require_text("item name", &self.name)?;
        Ok(InventoryItem {
            id,
            name,
            category: self.category.trim().to_string(),
            stock: self.stock,
            min_stock: self.min_stock,
            location: self.location.trim().to_string(),
            condition: self.condition,
            version: 0,
        })
    }
}
