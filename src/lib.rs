pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::order_service::OrderService;
use application::product_service::ProductService;
use config::AppConfig;
use db::MongoConnector;
use domain::identity::AdminPolicy;
use domain::ports::{IdentityProvider, OrderRepository, ProductRepository};
use handlers::{health, orders, products};
use infrastructure::identity_client::HttpIdentityProvider;
use infrastructure::order_repo::MongoOrderRepository;
use infrastructure::product_repo::MongoProductRepository;

/// Path segment matching a document id.
const ID_SEGMENT: &str = "{id:[0-9a-f]{24}}";

/// Everything a request handler needs, shared across workers.
pub struct AppState {
    pub products: ProductService,
    pub orders: OrderService,
    pub identity: Arc<dyn IdentityProvider>,
    pub admin: AdminPolicy,
}

impl AppState {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
        identity: Arc<dyn IdentityProvider>,
        admin: AdminPolicy,
    ) -> Self {
        Self {
            products: ProductService::new(products.clone()),
            orders: OrderService::new(products, orders),
            identity,
            admin,
        }
    }

    /// Wire the MongoDB repositories and the HTTP identity client.
    ///
    /// No connection is opened here; the first store access connects.
    pub fn from_config(config: &AppConfig) -> Self {
        let conn = Arc::new(MongoConnector::new(&config.mongodb_uri, &config.mongodb_db));
        Self::new(
            Arc::new(MongoProductRepository::new(conn.clone())),
            Arc::new(MongoOrderRepository::new(conn)),
            Arc::new(HttpIdentityProvider::new(&config.auth_url, &config.auth_anon_key)),
            config.admin.clone(),
        )
    }
}

/// Register every route. Unmatched paths and methods answer 404.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let not_found = || web::to(handlers::not_found);

    cfg.service(
        web::resource("/api/health")
            .route(web::get().to(health::health))
            .default_service(not_found()),
    )
    .service(
        web::resource("/api/products")
            .route(web::get().to(products::list_products))
            .route(web::post().to(products::create_product))
            .default_service(not_found()),
    )
    .service(
        web::resource(format!("/api/products/{}", ID_SEGMENT))
            .route(web::put().to(products::update_product))
            .route(web::delete().to(products::delete_product))
            .default_service(not_found()),
    )
    .service(
        web::resource("/api/orders")
            .route(web::get().to(orders::list_orders))
            .route(web::post().to(orders::create_order))
            .default_service(not_found()),
    )
    .service(
        web::resource(format!("/api/orders/{}", ID_SEGMENT))
            .route(web::put().to(orders::update_order_status))
            .default_service(not_found()),
    )
    .service(
        web::resource("/api/my-orders")
            .route(web::get().to(orders::list_my_orders))
            .default_service(not_found()),
    )
    .service(
        SwaggerUi::new("/api/docs/{_:.*}")
            .url("/api/openapi.json", openapi::ApiDoc::openapi()),
    )
    .default_service(not_found());
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: web::Data<AppState>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind((host.to_string(), port))?
    .run())
}
