use tracing::info;

use pizza_core::ServiceError;

use crate::model::{AddMenuItem, AuthUser, MenuItem, Permission};
use crate::service::PizzaService;

impl PizzaService {
    /// The whole menu, in the order items were added.
    pub fn list_menu(&self) -> Result<Vec<MenuItem>, ServiceError> {
        self.menu.list()
    }

    /// Add an item to the menu and return the updated menu.
    pub fn add_menu_item(
        &self,
        caller: &AuthUser,
        input: AddMenuItem,
    ) -> Result<Vec<MenuItem>, ServiceError> {
        caller.require(Permission::ManageMenu, "add menu item")?;

        let title = input.title.trim();
        if title.is_empty() {
            return Err(ServiceError::Validation("title is required".into()));
        }
        if !input.price.is_finite() || input.price < 0.0 {
            return Err(ServiceError::Validation("price must be a non-negative number".into()));
        }

        let item = self.menu.save_new(MenuItem {
            id: 0,
            title: title.to_string(),
            description: input.description,
            image: input.image,
            price: input.price,
        })?;
        info!(menu_id = item.id, "added menu item '{}'", item.title);

        self.list_menu()
    }
}
