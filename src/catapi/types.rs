//! Upstream response shapes and the normalized photo record.

use serde::{Deserialize, Serialize};

/// Breed metadata attached to an upstream image record.
#[derive(Debug, Clone, Deserialize)]
pub struct CatBreed {
    pub id: String,
    pub name: String,
    pub temperament: Option<String>,
    pub origin: Option<String>,
    pub description: Option<String>,
    pub wikipedia_url: Option<String>,
}

/// One image record as returned by `GET /v1/images/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct CatImage {
    pub id: String,
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub breeds: Vec<CatBreed>,
}

/// Normalized, immutable projection of one upstream image record.
///
/// Carries no identity beyond the upstream id and is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatPhoto {
    pub id: String,
    pub url: String,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperament: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wikipedia_url: Option<String>,
}

impl From<CatImage> for CatPhoto {
    fn from(image: CatImage) -> Self {
        let primary = image.breeds.into_iter().next();

        let alt = match primary.as_ref() {
            Some(breed) => format!("猫の写真 ({})", breed.name),
            None => "猫の写真".to_string(),
        };
        let attribution = match primary.as_ref() {
            Some(breed) => format!("Image courtesy of The Cat API ― Breed: {}", breed.name),
            None => "Image courtesy of The Cat API".to_string(),
        };

        Self {
            id: image.id,
            url: image.url,
            alt,
            attribution: Some(attribution),
            breed_name: primary.as_ref().map(|b| b.name.clone()),
            temperament: primary.as_ref().and_then(|b| b.temperament.clone()),
            origin: primary.as_ref().and_then(|b| b.origin.clone()),
            wikipedia_url: primary.and_then(|b| b.wikipedia_url),
        }
    }
}
