use serde::{Deserialize, Serialize};

use super::double_option;
use crate::entities::{LocalizedText, gallery_item};

#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    pub category: Option<String>,
}

/// Create gallery item request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryInput {
    pub title: LocalizedText,
    pub image_url: String,
    pub description: Option<LocalizedText>,
    pub price: Option<String>,
    pub category: Option<String>,
}

/// Partial gallery item update
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryPatch {
    pub title: Option<LocalizedText>,
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<LocalizedText>>,
    #[serde(default, deserialize_with = "double_option")]
    pub price: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
}

#[derive(Debug, Serialize)]
pub struct GalleryListResponse {
    pub items: Vec<gallery_item::Model>,
    pub total: usize,
}
