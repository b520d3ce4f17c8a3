pub mod application;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::{CatalogService, OrderService};
use infrastructure::{DieselOrderRepository, DieselProductRepository};

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::create_order,
        handlers::orders::list_my_orders,
        handlers::orders::list_all_orders,
        handlers::orders::get_order,
        handlers::orders::edit_order,
        handlers::orders::update_order_status,
        handlers::orders::delete_order,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::decrease_stock,
    ),
    tags(
        (name = "orders", description = "Order lifecycle"),
        (name = "products", description = "Product catalog"),
    )
)]
struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let orders = web::Data::new(OrderService::new(DieselOrderRepository::new(pool.clone())));
    let catalog = web::Data::new(CatalogService::new(DieselProductRepository::new(pool)));

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(orders.clone())
            .app_data(catalog.clone())
            .wrap(Logger::default())
            .service(
                web::scope("/api/v1/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("", web::get().to(handlers::orders::list_all_orders))
                    // Registered before "/{id}" so the literal segment wins.
                    .route("/my-orders", web::get().to(handlers::orders::list_my_orders))
                    .route("/{id}/status", web::patch().to(handlers::orders::update_order_status))
                    .route("/{id}", web::get().to(handlers::orders::get_order))
                    .route("/{id}", web::patch().to(handlers::orders::edit_order))
                    .route("/{id}", web::delete().to(handlers::orders::delete_order)),
            )
            .service(
                web::scope("/api/products")
                    .route("", web::get().to(handlers::products::list_products))
                    .route("", web::post().to(handlers::products::create_product))
                    .route(
                        "/{id}/decrease-stock",
                        web::patch().to(handlers::products::decrease_stock),
                    )
                    .route("/{id}", web::get().to(handlers::products::get_product))
                    .route("/{id}", web::patch().to(handlers::products::update_product))
                    .route("/{id}", web::delete().to(handlers::products::delete_product)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
