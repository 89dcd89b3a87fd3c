//! In-memory fakes for the storage and identity ports.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::web;
use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use storefront_service::domain::errors::DomainError;
use storefront_service::domain::identity::{AdminPolicy, AuthUser};
use storefront_service::domain::order::{NewOrder, Order, OrderStatus};
use storefront_service::domain::ports::{IdentityProvider, OrderRepository, ProductRepository};
use storefront_service::domain::product::{NewProduct, Product, ProductPatch};
use storefront_service::AppState;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const USER_TOKEN: &str = "user-token";
pub const OTHER_USER_TOKEN: &str = "other-user-token";
/// Makes the fake identity service fail.
pub const BROKEN_TOKEN: &str = "broken-token";
/// Resolves to no user, but only after a delay.
pub const SLOW_TOKEN: &str = "slow-token";
pub const ADMIN_EMAIL: &str = "owner@shop.test";

#[derive(Default)]
pub struct InMemoryProducts {
    pub items: Mutex<Vec<Product>>,
}

impl InMemoryProducts {
    pub fn get(&self, id: ObjectId) -> Option<Product> {
        self.items.lock().unwrap().iter().find(|p| p.id == id).cloned()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProducts {
    async fn list(&self) -> Result<Vec<Product>, DomainError> {
        let mut items = self.items.lock().unwrap().clone();
        items.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(items)
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Product>, DomainError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        let created = Product {
            id: ObjectId::new(),
            name: product.name,
            price: product.price,
            category: product.category,
            image: product.image,
            stock: product.stock,
            created_at: Utc::now(),
        };
        self.items.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: ObjectId, patch: ProductPatch) -> Result<(), DomainError> {
        let mut items = self.items.lock().unwrap();
        if let Some(p) = items.iter_mut().find(|p| p.id == id) {
            if let Some(name) = patch.name {
                p.name = name;
            }
            if let Some(price) = patch.price {
                p.price = price;
            }
            if let Some(category) = patch.category {
                p.category = category;
            }
            if let Some(image) = patch.image {
                p.image = image;
            }
            if let Some(stock) = patch.stock {
                p.stock = stock;
            }
        }
        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> Result<(), DomainError> {
        self.items.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryOrders {
    pub items: Mutex<Vec<Order>>,
}

impl InMemoryOrders {
    pub fn count(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn get(&self, id: ObjectId) -> Option<Order> {
        self.items.lock().unwrap().iter().find(|o| o.id == id).cloned()
    }

    fn newest_first(&self, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        let mut items: Vec<Order> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|o| keep(o))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.id.cmp(&a.id));
        items
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrders {
    async fn list(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.newest_first(|_| true))
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Order>, DomainError> {
        Ok(self.newest_first(|o| o.user_id == user_id))
    }

    async fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let created = Order {
            id: ObjectId::new(),
            user_id: order.user_id,
            email: order.email,
            recipient: order.recipient,
            pay: order.pay,
            note: order.note,
            items: order.priced.items,
            subtotal: order.priced.subtotal,
            shipping: order.priced.shipping,
            total: order.priced.total,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        self.items.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_status(&self, id: ObjectId, status: OrderStatus) -> Result<(), DomainError> {
        if let Some(o) = self.items.lock().unwrap().iter_mut().find(|o| o.id == id) {
            o.status = status;
        }
        Ok(())
    }
}

pub struct FakeIdentity {
    users: HashMap<&'static str, AuthUser>,
}

impl Default for FakeIdentity {
    fn default() -> Self {
        let user = |id: &str, email: &str| AuthUser {
            id: id.to_string(),
            email: Some(email.to_string()),
        };
        let mut users = HashMap::new();
        users.insert(ADMIN_TOKEN, user("admin-1", "Owner@Shop.test"));
        users.insert(USER_TOKEN, user("user-1", "ann@shop.test"));
        users.insert(OTHER_USER_TOKEN, user("user-2", "bob@shop.test"));
        Self { users }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn user_for_token(&self, token: &str) -> Result<Option<AuthUser>, DomainError> {
        if token == BROKEN_TOKEN {
            return Err(DomainError::Internal("identity service down".to_string()));
        }
        if token == SLOW_TOKEN {
            tokio::time::sleep(Duration::from_millis(50)).await;
            return Ok(None);
        }
        Ok(self.users.get(token).cloned())
    }
}

pub struct Fixture {
    pub products: Arc<InMemoryProducts>,
    pub orders: Arc<InMemoryOrders>,
    pub admin: AdminPolicy,
}

impl Fixture {
    /// Admin policy restricted to [`ADMIN_EMAIL`].
    pub fn new() -> Self {
        Self::with_policy(AdminPolicy {
            email: Some(ADMIN_EMAIL.to_string()),
            ..Default::default()
        })
    }

    pub fn with_policy(admin: AdminPolicy) -> Self {
        Self {
            products: Arc::new(InMemoryProducts::default()),
            orders: Arc::new(InMemoryOrders::default()),
            admin,
        }
    }

    pub fn state(&self) -> web::Data<AppState> {
        web::Data::new(AppState::new(
            self.products.clone(),
            self.orders.clone(),
            Arc::new(FakeIdentity::default()),
            self.admin.clone(),
        ))
    }

    pub fn seed_product(&self, name: &str, price: f64) -> Product {
        let product = Product {
            id: ObjectId::new(),
            name: name.to_string(),
            price,
            category: "general".to_string(),
            image: format!("https://img.example/{}.png", name),
            stock: 10,
            created_at: Utc::now(),
        };
        self.products.items.lock().unwrap().push(product.clone());
        product
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("authorization", format!("Bearer {}", token))
}

macro_rules! init_app {
    ($fixture:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($fixture.state())
                .configure(storefront_service::configure),
        )
        .await
    };
}

pub(crate) use init_app;
