use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::{health, orders, products, OkResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        products::list_products,
        products::create_product,
        products::update_product,
        products::delete_product,
        orders::list_orders,
        orders::list_my_orders,
        orders::create_order,
        orders::update_order_status,
    ),
    components(schemas(
        OkResponse,
        health::HealthResponse,
        products::CreateProductRequest,
        products::UpdateProductRequest,
        products::ProductResponse,
        orders::CartItemRequest,
        orders::CreateOrderRequest,
        orders::UpdateStatusRequest,
        orders::LineItemResponse,
        orders::OrderResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Liveness"),
        (name = "products", description = "Catalog management"),
        (name = "orders", description = "Checkout and order administration"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}
