//! Order and catalogue operations.
//!
//! Every mutation follows the same path:
//!
//! ```text
//! validate ──► repository (own transaction) ──► commit ──► publish event
//!    │                   │
//!    ✗ 422               ✗ 404 / 409 / 500, nothing published
//! ```
//!
//! Events are handed to the publisher only once the write is durable, and
//! the publisher returns immediately.

use std::sync::Arc;

use orderly_core::validation::{
    validate_amount, validate_customer_name, validate_description, validate_product_name,
    validate_quantity,
};
use orderly_core::{
    CoreError, NewOrder, NewOrderDetail, NewProduct, Order, OrderDetail, OrderEvent, Page, Product,
};
use orderly_db::{Database, DbError};
use tracing::{debug, info};

use super::{ServiceError, ServiceResult};
use crate::publisher::EventPublisher;

/// Message returned by a successful order delete.
pub const ORDER_DELETED: &str = "Order deleted";

/// Message returned by a successful product delete.
pub const PRODUCT_DELETED: &str = "Product deleted";

#[derive(Clone)]
pub struct OrderService {
    db: Database,
    publisher: Arc<dyn EventPublisher>,
}

impl OrderService {
    pub fn new(db: Database, publisher: Arc<dyn EventPublisher>) -> Self {
        OrderService { db, publisher }
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Creates a `pending` order.
    pub async fn create_order(&self, customer_name: &str, total_amount: f64) -> ServiceResult<Order> {
        let new_order = NewOrder {
            customer_name: validate_customer_name(customer_name)?,
            total_amount: validate_amount("total_amount", total_amount)?,
        };

        let order = self.db.orders().create(&new_order).await?;

        info!(order_id = order.id, total = %order.total_amount(), "Order created");
        self.publisher.publish(OrderEvent::order_created(order.id));

        Ok(order)
    }

    pub async fn read_orders(&self, skip: u32, limit: u32) -> ServiceResult<Vec<Order>> {
        let page = Page::new(skip, limit)?;
        Ok(self.db.orders().list(page).await?)
    }

    pub async fn read_order(&self, id: i64) -> ServiceResult<Order> {
        self.db
            .orders()
            .get(id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(id).into())
    }

    /// Replaces name and total. Status is left as it is.
    pub async fn update_order(
        &self,
        id: i64,
        customer_name: &str,
        total_amount: f64,
    ) -> ServiceResult<Order> {
        let changes = NewOrder {
            customer_name: validate_customer_name(customer_name)?,
            total_amount: validate_amount("total_amount", total_amount)?,
        };

        let order = self
            .db
            .orders()
            .update(id, &changes)
            .await
            .map_err(|e| missing_order(e, id))?;

        info!(order_id = id, "Order updated");
        self.publisher.publish(OrderEvent::order_updated(id));

        Ok(order)
    }

    /// Deletes an order together with its lines.
    pub async fn delete_order(&self, id: i64) -> ServiceResult<&'static str> {
        let lines = self
            .db
            .orders()
            .delete(id)
            .await
            .map_err(|e| missing_order(e, id))?;

        info!(order_id = id, lines, "Order deleted");
        self.publisher.publish(OrderEvent::order_deleted(id));

        Ok(ORDER_DELETED)
    }

    // =========================================================================
    // Order lines
    // =========================================================================

    pub async fn create_order_detail(
        &self,
        order_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> ServiceResult<OrderDetail> {
        validate_quantity(quantity)?;

        let detail = self
            .db
            .order_details()
            .create(order_id, &NewOrderDetail { product_id, quantity })
            .await
            .map_err(|e| match e {
                DbError::NotFound { entity, .. } if entity == "Product" => {
                    CoreError::ProductNotFound(product_id).into()
                }
                other => missing_order(other, order_id),
            })?;

        info!(order_id, detail_id = detail.id, product_id, quantity, "Order line added");
        self.publisher
            .publish(OrderEvent::order_detail_created(detail.id, order_id));

        Ok(detail)
    }

    /// Lines of an existing order.
    pub async fn read_order_details(&self, order_id: i64) -> ServiceResult<Vec<OrderDetail>> {
        if !self.db.orders().exists(order_id).await? {
            return Err(CoreError::OrderNotFound(order_id).into());
        }
        Ok(self.db.order_details().list_for_order(order_id).await?)
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub async fn create_product(
        &self,
        name: &str,
        description: Option<&str>,
        price: f64,
    ) -> ServiceResult<Product> {
        let new_product = new_product(name, description, price)?;
        let product = self.db.products().create(&new_product).await?;

        info!(product_id = product.id, price = %product.price(), "Product created");
        Ok(product)
    }

    pub async fn read_products(&self, skip: u32, limit: u32) -> ServiceResult<Vec<Product>> {
        let page = Page::new(skip, limit)?;
        Ok(self.db.products().list(page).await?)
    }

    pub async fn read_product(&self, id: i64) -> ServiceResult<Product> {
        self.db
            .products()
            .get(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id).into())
    }

    pub async fn update_product(
        &self,
        id: i64,
        name: &str,
        description: Option<&str>,
        price: f64,
    ) -> ServiceResult<Product> {
        let changes = new_product(name, description, price)?;

        let product = self
            .db
            .products()
            .update(id, &changes)
            .await
            .map_err(|e| missing_product(e, id))?;

        info!(product_id = id, "Product updated");
        Ok(product)
    }

    /// Deletes a product no order line refers to.
    pub async fn delete_product(&self, id: i64) -> ServiceResult<&'static str> {
        match self.db.products().delete(id).await {
            Ok(()) => {
                info!(product_id = id, "Product deleted");
                Ok(PRODUCT_DELETED)
            }
            Err(DbError::ForeignKeyViolation { message }) => {
                debug!(product_id = id, %message, "Product still referenced");
                let references = self.db.order_details().count_for_product(id).await?;
                Err(CoreError::ProductInUse {
                    product_id: id,
                    references,
                }
                .into())
            }
            Err(e) => Err(missing_product(e, id)),
        }
    }
}

impl std::fmt::Debug for OrderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderService")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

fn new_product(name: &str, description: Option<&str>, price: f64) -> ServiceResult<NewProduct> {
    Ok(NewProduct {
        name: validate_product_name(name)?,
        description: validate_description(description)?,
        price: validate_amount("price", price)?,
    })
}

fn missing_order(err: DbError, id: i64) -> ServiceError {
    if err.is_not_found() {
        CoreError::OrderNotFound(id).into()
    } else {
        err.into()
    }
}

fn missing_product(err: DbError, id: i64) -> ServiceError {
    if err.is_not_found() {
        CoreError::ProductNotFound(id).into()
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::ChannelPublisher;
    use orderly_core::{OrderEventKind, OrderStatus, ValidationError};
    use orderly_db::DbConfig;
    use tokio::sync::mpsc::UnboundedReceiver;

    async fn setup() -> (OrderService, UnboundedReceiver<OrderEvent>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (publisher, rx) = ChannelPublisher::new();
        (OrderService::new(db, Arc::new(publisher)), rx)
    }

    fn drain(rx: &mut UnboundedReceiver<OrderEvent>) -> Vec<OrderEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_create_order_publishes_once() {
        let (service, mut rx) = setup().await;

        let order = service.create_order("John Doe", 100.0).await.unwrap();
        assert_eq!(order.customer_name, "John Doe");
        assert_eq!(order.total_amount().to_decimal(), 100.0);
        assert_eq!(order.status, OrderStatus::Pending);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, OrderEventKind::OrderCreated);
        assert_eq!(events[0].message, format!("Order {} created", order.id));
    }

    #[tokio::test]
    async fn test_invalid_order_publishes_nothing() {
        let (service, mut rx) = setup().await;

        let err = service.create_order("   ", 10.0).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(CoreError::Validation(ValidationError::Required { .. }))
        ));

        let err = service.create_order("Jane", -1.0).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(CoreError::Validation(_))));

        assert!(drain(&mut rx).is_empty());
        assert!(service.read_orders(0, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_status() {
        let (service, mut rx) = setup().await;
        let order = service.create_order("John Doe", 100.0).await.unwrap();

        let updated = service.update_order(order.id, "Jane Doe", 150.0).await.unwrap();
        assert_eq!(updated.id, order.id);
        assert_eq!(updated.customer_name, "Jane Doe");
        assert_eq!(updated.total_amount().cents(), 15_000);
        assert_eq!(updated.status, OrderStatus::Pending);

        let kinds: Vec<_> = drain(&mut rx).into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![OrderEventKind::OrderCreated, OrderEventKind::OrderUpdated]);
    }

    #[tokio::test]
    async fn test_missing_order_is_not_found() {
        let (service, mut rx) = setup().await;

        assert!(matches!(
            service.read_order(999).await,
            Err(ServiceError::Domain(CoreError::OrderNotFound(999)))
        ));
        assert!(matches!(
            service.update_order(999, "Nobody", 1.0).await,
            Err(ServiceError::Domain(CoreError::OrderNotFound(999)))
        ));
        assert!(matches!(
            service.delete_order(999).await,
            Err(ServiceError::Domain(CoreError::OrderNotFound(999)))
        ));
        assert!(matches!(
            service.read_order_details(999).await,
            Err(ServiceError::Domain(CoreError::OrderNotFound(999)))
        ));

        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_delete_order_removes_lines() {
        let (service, mut rx) = setup().await;
        let product = service.create_product("Widget", None, 2.5).await.unwrap();
        let order = service.create_order("John Doe", 5.0).await.unwrap();
        service
            .create_order_detail(order.id, product.id, 2)
            .await
            .unwrap();

        assert_eq!(service.delete_order(order.id).await.unwrap(), ORDER_DELETED);
        assert!(matches!(
            service.read_order_details(order.id).await,
            Err(ServiceError::Domain(CoreError::OrderNotFound(_)))
        ));

        // The product is free again
        assert_eq!(service.delete_product(product.id).await.unwrap(), PRODUCT_DELETED);

        let kinds: Vec<_> = drain(&mut rx).into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                OrderEventKind::OrderCreated,
                OrderEventKind::OrderDetailCreated,
                OrderEventKind::OrderDeleted,
            ]
        );
    }

    #[tokio::test]
    async fn test_order_detail_lifecycle() {
        let (service, mut rx) = setup().await;
        let product = service.create_product("Widget", Some("Blue"), 9.99).await.unwrap();
        let order = service.create_order("John Doe", 19.98).await.unwrap();
        drain(&mut rx);

        assert!(service.read_order_details(order.id).await.unwrap().is_empty());

        let detail = service
            .create_order_detail(order.id, product.id, 2)
            .await
            .unwrap();
        assert_eq!(detail.order_id, order.id);
        assert_eq!(detail.product_id, product.id);
        assert_eq!(detail.quantity, 2);

        let details = service.read_order_details(order.id).await.unwrap();
        assert_eq!(details, vec![detail.clone()]);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].entity_id, detail.id);
        assert_eq!(events[0].order_id, order.id);
    }

    #[tokio::test]
    async fn test_order_detail_rejections() {
        let (service, mut rx) = setup().await;
        let product = service.create_product("Widget", None, 1.0).await.unwrap();
        let order = service.create_order("John Doe", 1.0).await.unwrap();
        drain(&mut rx);

        assert!(matches!(
            service.create_order_detail(999, product.id, 1).await,
            Err(ServiceError::Domain(CoreError::OrderNotFound(999)))
        ));
        assert!(matches!(
            service.create_order_detail(order.id, 999, 1).await,
            Err(ServiceError::Domain(CoreError::ProductNotFound(999)))
        ));
        assert!(matches!(
            service.create_order_detail(order.id, product.id, 0).await,
            Err(ServiceError::Domain(CoreError::Validation(_)))
        ));

        assert!(drain(&mut rx).is_empty());
        assert!(service.read_order_details(order.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_referenced_product_cannot_be_deleted() {
        let (service, _rx) = setup().await;
        let product = service.create_product("Widget", None, 1.0).await.unwrap();
        let order = service.create_order("John Doe", 3.0).await.unwrap();
        service.create_order_detail(order.id, product.id, 1).await.unwrap();
        service.create_order_detail(order.id, product.id, 2).await.unwrap();

        assert!(matches!(
            service.delete_product(product.id).await,
            Err(ServiceError::Domain(CoreError::ProductInUse {
                references: 2,
                ..
            }))
        ));
        assert!(service.read_product(product.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_product_crud_publishes_nothing() {
        let (service, mut rx) = setup().await;

        let product = service.create_product("Widget", None, 1.5).await.unwrap();
        assert_eq!(product.description, "");

        let updated = service
            .update_product(product.id, "Gadget", Some("Shiny"), 2.0)
            .await
            .unwrap();
        assert_eq!(updated.name, "Gadget");
        assert_eq!(updated.price_cents, 200);

        assert_eq!(service.read_products(0, 10).await.unwrap().len(), 1);
        service.delete_product(product.id).await.unwrap();

        assert!(matches!(
            service.read_product(product.id).await,
            Err(ServiceError::Domain(CoreError::ProductNotFound(_)))
        ));
        assert!(matches!(
            service.update_product(product.id, "Gadget", None, 2.0).await,
            Err(ServiceError::Domain(CoreError::ProductNotFound(_)))
        ));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_paging() {
        let (service, _rx) = setup().await;
        for i in 0..15 {
            service.create_order(&format!("Customer {i}"), 1.0).await.unwrap();
        }

        let first = service.read_orders(0, 10).await.unwrap();
        let rest = service.read_orders(10, 10).await.unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(rest.len(), 5);
        assert!(first.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(rest[0].customer_name, "Customer 10");

        assert!(matches!(
            service.read_orders(0, 0).await,
            Err(ServiceError::Domain(CoreError::Validation(_)))
        ));
        assert!(service.read_orders(0, 101).await.is_err());
    }
}
