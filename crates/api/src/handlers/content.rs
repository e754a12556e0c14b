//! Handlers for AI product-content generation.
//!
//! Two flows share the same adapter:
//! - generate-only: returns the generated content together with the product
//!   form it produces, without touching stored products;
//! - regenerate-for-product: applies generated content to a stored product
//!   and records the inputs used under `details.aiInputs`.
//!
//! Inputs are validated before any network call. A response missing any
//! content field is rejected as a whole and nothing is applied.

use atelier_core::ai_content::{
    validate_ai_inputs, AiInputs, GenerateContentInput, GeneratedContent, ProductForm,
};
use atelier_core::error::CoreError;
use atelier_core::pricing::estimate_price;
use atelier_core::product_details::{
    build_product_view, merge_details, parse_details, resolve_specs, stored_ai_inputs,
    DetailsUpdate,
};
use atelier_core::types::DbId;
use atelier_core::upload::validate_image_upload;
use atelier_db::models::product::ApplyGeneratedContent;
use atelier_db::repositories::ProductRepo;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::ai::client::ImageUpload;
use crate::cache::QueryKey;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of a generate-only request.
///
/// The generator inputs sit at the top level; `form` is the product form as
/// currently filled in, onto which the generated content is applied.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(flatten)]
    pub input: GenerateContentInput,
    #[serde(default)]
    pub form: Option<ProductForm>,
}

/// Generate-only response.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub content: GeneratedContent,
    pub form: ProductForm,
}

/// Body of a regenerate request. Without `inputs`, the stored inputs are reused.
#[derive(Debug, Default, Deserialize)]
pub struct RegenerateRequest {
    #[serde(default)]
    pub inputs: Option<GenerateContentInput>,
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

/// Read a multipart generate request: an `inputs` JSON part and `images` files.
async fn read_multipart_request(
    mut multipart: Multipart,
) -> AppResult<(GenerateRequest, Vec<ImageUpload>)> {
    let mut request: Option<GenerateRequest> = None;
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "inputs" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let parsed = serde_json::from_str(&text)
                    .map_err(|e| AppError::BadRequest(format!("Invalid 'inputs' JSON: {e}")))?;
                request = Some(parsed);
            }
            "images" => {
                let filename = field.file_name().unwrap_or("image").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                validate_image_upload(&filename, data.len())?;
                uploads.push(ImageUpload {
                    filename,
                    content_type,
                    bytes: data.to_vec(),
                });
            }
            _ => {} // ignore unknown fields
        }
    }

    let request =
        request.ok_or_else(|| AppError::BadRequest("Missing required 'inputs' field".into()))?;
    Ok((request, uploads))
}

/// POST /api/v1/admin/content/generate
///
/// Accepts either a JSON [`GenerateRequest`] or a multipart form with an
/// `inputs` JSON part plus `images` files. Returns the generated content and
/// the product form with that content applied.
pub async fn generate_content(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    request: Request,
) -> AppResult<impl IntoResponse> {
    let (body, uploads) = if is_multipart(&request) {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        read_multipart_request(multipart).await?
    } else {
        let Json(body) = Json::<GenerateRequest>::from_request(request, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        (body, Vec::new())
    };

    let inputs = body.input.into_inputs();
    validate_ai_inputs(&inputs)?;

    let upload_count = uploads.len();
    let content = state.ai_client.generate(&inputs, uploads).await?;
    let form = body.form.unwrap_or_default().apply_generated(&content);

    tracing::info!(
        user_id = admin.user_id,
        product_type = %inputs.product_type,
        upload_count,
        "Product content generated"
    );

    Ok(Json(DataResponse {
        data: GenerateResponse { content, form },
    }))
}

/// POST /api/v1/products/{id}/regenerate-content
///
/// Regenerates content for a stored product and applies every generated
/// field in one write. The stored price is the rate-table estimate when the
/// product's specs yield one, and the generator's suggestion otherwise. The
/// scheduled refresh applies the same rule, so it never undoes this write.
pub async fn regenerate_product_content(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<RegenerateRequest>,
) -> AppResult<impl IntoResponse> {
    let product = ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id,
        }))?;

    let inputs: AiInputs = match body.inputs {
        Some(input) => input.into_inputs(),
        None => stored_ai_inputs(product.details.as_deref()).ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "No generation inputs given and none stored for this product".into(),
            ))
        })?,
    };
    validate_ai_inputs(&inputs)?;

    let content = state.ai_client.generate(&inputs, Vec::new()).await?;

    let details = merge_details(
        product.details.as_deref(),
        &DetailsUpdate {
            tagline: Some(&content.tagline),
            detailed_description: Some(&content.detailed_description),
            ai_inputs: Some(&inputs),
        },
    );
    let root = product.as_record().root;
    let specs = resolve_specs(&root, &parse_details(Some(&details))).price_specs();
    let (price_usd, price_inr) =
        match estimate_price(&specs, &state.rates, state.config.inr_per_usd) {
            Some(quote) => (quote.usd, quote.inr),
            None => (content.price_usd, content.price_inr),
        };

    let update = ApplyGeneratedContent {
        name: content.title.clone(),
        description: content.short_description.clone(),
        details,
        calculated_price_usd: price_usd,
        calculated_price_inr: price_inr,
    };

    let updated = ProductRepo::apply_generated_content(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id,
        }))?;
    state.cache.invalidate_where(QueryKey::is_product_data).await;

    tracing::info!(product_id = id, user_id = admin.user_id, "Product content regenerated");

    Ok(Json(DataResponse {
        data: build_product_view(&updated.as_record()),
    }))
}
