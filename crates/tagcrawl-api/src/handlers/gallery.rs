use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tagcrawl_services::GalleryPage;

use crate::error::HttpAppError;
use crate::state::AppState;

pub async fn get_gallery(
    State(state): State<Arc<AppState>>,
    Path(hashtag): Path<String>,
) -> Result<Json<GalleryPage>, HttpAppError> {
    let page = state
        .gallery
        .gallery(&hashtag)
        .await
        .map_err(HttpAppError::from)?;

    tracing::debug!(
        tag = %page.hashtag,
        image_count = page.image_count,
        "Gallery served"
    );

    Ok(Json(page))
}
