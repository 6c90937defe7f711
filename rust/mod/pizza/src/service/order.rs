use tracing::{info, warn};

use pizza_core::ServiceError;

use crate::factory::{DinerRef, FactoryError};
use crate::model::{AuthUser, CreateOrder, Order, OrderItem, OrderPage, OrderReceipt, Permission};
use crate::service::PizzaService;

/// Outcome of placing an order. The order is stored in both cases.
#[derive(Debug)]
pub enum Fulfilment {
    Fulfilled(OrderReceipt),
    Failed { order: Order, error: FactoryError },
}

impl PizzaService {
    /// Store an order for the caller and hand it to the factory.
    pub async fn place_order(
        &self,
        caller: &AuthUser,
        input: CreateOrder,
    ) -> Result<Fulfilment, ServiceError> {
        caller.require(Permission::PlaceOrder, "place order")?;

        if input.items.is_empty() {
            return Err(ServiceError::Validation("order must contain at least one item".into()));
        }
        match self.stores.get(input.store_id)? {
            Some(store) if store.franchise_id == input.franchise_id => {}
            _ => {
                return Err(ServiceError::NotFound(format!(
                    "unknown store {} for franchise {}",
                    input.store_id, input.franchise_id
                )))
            }
        }

        let mut items = Vec::with_capacity(input.items.len());
        for item in input.items {
            if self.menu.get(item.menu_id)?.is_none() {
                return Err(ServiceError::NotFound(format!("unknown menu item {}", item.menu_id)));
            }
            if !item.price.is_finite() || item.price < 0.0 {
                return Err(ServiceError::Validation("price must be a non-negative number".into()));
            }
            items.push(OrderItem {
                id: 0,
                menu_id: item.menu_id,
                description: item.description,
                price: item.price,
            });
        }

        let order = self.orders.save_new(Order {
            id: 0,
            diner_id: caller.id,
            franchise_id: input.franchise_id,
            store_id: input.store_id,
            date: String::new(),
            items,
        })?;
        info!(order_id = order.id, diner_id = caller.id, "order placed");

        let diner = DinerRef {
            id: caller.id,
            name: caller.name.clone(),
            email: caller.email.clone(),
        };
        match self.factory.submit(&diner, &order).await {
            Ok(receipt) => Ok(Fulfilment::Fulfilled(OrderReceipt {
                order,
                follow_link_to_end_chaos: receipt.report_url,
                jwt: receipt.jwt,
            })),
            Err(error) => {
                warn!(order_id = order.id, "factory failed to fulfil order: {}", error);
                Ok(Fulfilment::Failed { order, error })
            }
        }
    }

    /// One page of the caller's own orders. Pages start at 1.
    pub fn list_orders(&self, caller: &AuthUser, page: usize) -> Result<OrderPage, ServiceError> {
        caller.require(Permission::ListOwnOrders, "list orders")?;

        let page = page.max(1);
        let size = self.config.order_page_size;
        let orders = self
            .orders
            .list_where(|o| o.diner_id == caller.id)?
            .into_iter()
            .skip((page - 1).saturating_mul(size))
            .take(size)
            .collect();

        Ok(OrderPage {
            diner_id: caller.id,
            orders,
            page,
        })
    }
}
