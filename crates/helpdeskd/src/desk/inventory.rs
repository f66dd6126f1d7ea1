//! Inventory CRUD and the low-stock view.

use super::{require_role, Desk, ADMIN_ROLES};
use helpdesk_shared::inventory::{InventoryInput, InventoryItem};
use helpdesk_shared::DeskResult;
use tracing::info;
use uuid::Uuid;

impl Desk {
    /// All items, by name
    pub fn inventory(&self) -> DeskResult<Vec<InventoryItem>> {
        let mut items = self.repos.inventory.list()?;
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    pub fn low_stock(&self) -> DeskResult<Vec<InventoryItem>> {
        Ok(self
            .inventory()?
            .into_iter()
            .filter(InventoryItem::is_low_stock)
            .collect())
    }

    pub fn create_inventory_item(
        &self,
        user_id: &str,
        input: InventoryInput,
    ) -> DeskResult<InventoryItem> {
        let user = self.user(user_id)?;
        require_role(&user, ADMIN_ROLES, "managing inventory")?;
        let item = input.into_item(Uuid::new_v4().to_string())?;
        let item = self.repos.inventory.insert(item)?;
        info!("  Inventory item {} added ({} in stock)", item.name, item.stock);
        Ok(item)
    }

    /// Replace an item's fields, keeping its id
    pub fn update_inventory_item(
        &self,
        user_id: &str,
        id: &str,
        input: InventoryInput,
    ) -> DeskResult<InventoryItem> {
        let user = self.user(user_id)?;
        require_role(&user, ADMIN_ROLES, "managing inventory")?;
        let current = self.repos.inventory.require(id)?;
        let mut item = input.into_item(current.id)?;
        item.version = current.version;
        let item = self.repos.inventory.update(item)?;
        if item.is_low_stock() {
            info!("  Inventory item {} is low ({} left)", item.name, item.stock);
        }
        Ok(item)
    }

    pub fn delete_inventory_item(&self, user_id: &str, id: &str) -> DeskResult<()> {
        let user = self.user(user_id)?;
        require_role(&user, ADMIN_ROLES, "managing inventory")?;
        let item = self.repos.inventory.require(id)?;
        self.repos.inventory.delete(id)?;
        info!("  Inventory item {} removed by {}", item.name, user.name);
        Ok(())
    }
}
