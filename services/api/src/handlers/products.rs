use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde::Serialize;
use shop_error::{AppError, AppErrorExt, AppResult};
use shop_models::product::{Product, ProductView};
use tracing::info;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub product: ProductView,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub msg: String,
}

/// Fields collected from the multipart product form. Everything is optional
/// at parse time; create decides what is required, update patches.
#[derive(Default)]
struct ProductForm {
    name: Option<String>,
    description: Option<String>,
    price: Option<f64>,
    category: Option<String>,
    image: Option<(String, Vec<u8>)>,
}

async fn parse_product_form(mut multipart: Multipart) -> AppResult<ProductForm> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(format!("Malformed multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::ValidationError(format!("Failed to read image: {}", e)))?;
                if !bytes.is_empty() {
                    form.image = Some((file_name, bytes.to_vec()));
                }
            }
            other => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::ValidationError(format!("Malformed field: {}", e)))?;
                match other {
                    "name" => form.name = Some(text),
                    "description" => form.description = Some(text),
                    "category" => form.category = Some(text),
                    "price" => {
                        let price = text.parse::<f64>().map_err(|_| {
                            AppError::ValidationError("Price must be a number".to_string())
                        })?;
                        form.price = Some(price);
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(form)
}

/// Write the uploaded image under the uploads directory and return the
/// public `/uploads/...` path. The original filename is kept (behind a uuid
/// prefix) but stripped of any directory components.
async fn store_image(uploads_dir: &str, file_name: &str, bytes: &[u8]) -> AppResult<String> {
    let base_name = file_name
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("upload");

    let stored_name = format!("{}-{}", Uuid::new_v4(), base_name);
    let path = std::path::Path::new(uploads_dir).join(&stored_name);

    tokio::fs::write(&path, bytes)
        .await
        .server_err()
        .map_err(|e| {
            tracing::error!("Failed to store uploaded image: {}", e);
            e
        })?;

    Ok(format!("/uploads/{}", stored_name))
}

pub async fn add_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    let form = parse_product_form(multipart).await?;

    let missing_field =
        || AppError::ValidationError("name, description, price and category are required".into());

    let name = form.name.ok_or_else(missing_field)?;
    let description = form.description.ok_or_else(missing_field)?;
    let price = form.price.ok_or_else(missing_field)?;
    let category = form.category.ok_or_else(missing_field)?;

    let image = match &form.image {
        Some((file_name, bytes)) => store_image(&state.uploads_dir, file_name, bytes).await?,
        None => String::new(),
    };

    let product = Product::new(name, description, price, category, image);

    let stored = state
        .products
        .create_record(product)
        .await
        .map_err(AppError::server_boundary)?
        .ok_or_else(|| AppError::ServerError(anyhow::anyhow!("Store returned no product")))?;

    info!("Added product {}", stored.id.id);

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            product: stored.into(),
        }),
    ))
}

pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<ProductView>>> {
    let products = state
        .products
        .get_all_records()
        .await
        .map_err(AppError::server_boundary)?;

    Ok(Json(products.into_iter().map(ProductView::from).collect()))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<ProductResponse>> {
    let form = parse_product_form(multipart).await?;

    let mut product = state
        .products
        .get_record_by_id(&product_id)
        .await
        .map_err(AppError::server_boundary)?
        .ok_or_else(|| AppError::resource_not_found("Product"))?;

    if let Some(name) = form.name {
        product.name = name;
    }
    if let Some(description) = form.description {
        product.description = description;
    }
    if let Some(price) = form.price {
        product.price = price;
    }
    if let Some(category) = form.category {
        product.category = category;
    }
    if let Some((file_name, bytes)) = &form.image {
        product.image = store_image(&state.uploads_dir, file_name, bytes).await?;
    }
    product.updated_at = chrono::Utc::now();

    let updated = state
        .products
        .update_record(&product_id, product)
        .await
        .map_err(AppError::server_boundary)?
        .ok_or_else(|| AppError::resource_not_found("Product"))?;

    Ok(Json(ProductResponse {
        product: updated.into(),
    }))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    let deleted = state
        .products
        .delete_record(&product_id)
        .await
        .map_err(AppError::server_boundary)?;

    if deleted.is_none() {
        return Err(AppError::resource_not_found("Product"));
    }

    info!("Deleted product {}", product_id);

    Ok(Json(DeleteResponse {
        msg: "Product deleted successfully".to_string(),
    }))
}
