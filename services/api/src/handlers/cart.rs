use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shop_error::{AppError, AppResult};
use shop_models::cart::{AddToCartInput, Cart, CartItem, RemoveFromCartInput};
use tracing::info;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CartMutationResponse {
    pub message: String,
    pub cart: Cart,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub cart: Cart,
    pub total: f64,
}

/// Sum of `price × quantity` over the cart lines.
pub fn calculate_total_price(items: &[CartItem]) -> f64 {
    items
        .iter()
        .map(|item| item.product_price * f64::from(item.quantity))
        .sum()
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    Json(input): Json<AddToCartInput>,
) -> AppResult<Json<CartMutationResponse>> {
    // The line item records the product's current price, not a client-sent one.
    let product = state
        .products
        .get_record_by_id(&input.product_id)
        .await
        .map_err(AppError::server_boundary)?
        .ok_or_else(|| AppError::resource_not_found("Product"))?;

    let mut cart = state
        .carts
        .get_record_by_id(&input.user_id)
        .await
        .map_err(AppError::server_boundary)?
        .unwrap_or_else(|| Cart::empty(&input.user_id));

    match cart
        .items
        .iter_mut()
        .find(|item| item.product_id == input.product_id)
    {
        Some(item) => {
            item.quantity += input.quantity;
            item.product_price = product.price;
        }
        None => cart.items.push(CartItem {
            product_id: input.product_id.clone(),
            product_price: product.price,
            quantity: input.quantity,
        }),
    }

    let cart = state
        .carts
        .upsert_record(&input.user_id, cart)
        .await
        .map_err(AppError::server_boundary)?
        .ok_or_else(|| AppError::ServerError(anyhow::anyhow!("Cart upsert returned no record")))?;

    info!("Added product {} to cart of {}", input.product_id, input.user_id);

    Ok(Json(CartMutationResponse {
        message: "Product added to cart successfully".to_string(),
        cart,
    }))
}

pub async fn get_cart(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<CartResponse>> {
    let cart = state
        .carts
        .get_record_by_id(&user_id)
        .await
        .map_err(AppError::server_boundary)?
        .unwrap_or_else(|| Cart::empty(&user_id));

    let total = calculate_total_price(&cart.items);

    Ok(Json(CartResponse { cart, total }))
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    Json(input): Json<RemoveFromCartInput>,
) -> AppResult<Json<CartMutationResponse>> {
    let mut cart = state
        .carts
        .get_record_by_id(&input.user_id)
        .await
        .map_err(AppError::server_boundary)?
        .unwrap_or_else(|| Cart::empty(&input.user_id));

    cart.items.retain(|item| item.product_id != input.product_id);

    let cart = state
        .carts
        .upsert_record(&input.user_id, cart)
        .await
        .map_err(AppError::server_boundary)?
        .ok_or_else(|| AppError::ServerError(anyhow::anyhow!("Cart upsert returned no record")))?;

    Ok(Json(CartMutationResponse {
        message: "Product removed from cart".to_string(),
        cart,
    }))
}
