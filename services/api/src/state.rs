use std::sync::Arc;

use shop_auth::AuthService;
use shop_database::service::DbService;
use shop_models::cart::Cart;
use shop_models::product::Product;

/// Shared handler state. Everything here is initialized once at startup and
/// injected; handlers never reach for ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub products: Arc<DbService<'static, Product>>,
    pub carts: Arc<DbService<'static, Cart>>,
    pub uploads_dir: String,
}
