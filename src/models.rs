//! Domain Models
//!
//! Business entities for the listing catalog, independent of the HTTP
//! layer. The `New*` structs carry the insertable fields; the store
//! assigns ids and creation timestamps.
//!
//! Field names are serialized in camelCase to stay wire-compatible
//! with the front end (`fullName`, `telegramId`, `imageUrl`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub telegram_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub telegram_id: Option<String>,
}

/// A listing. `price`, `area` and `plot_size` are decimal strings as
/// stored upstream; numeric comparisons parse them on the fly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: String,
    pub location: String,
    pub area: String,
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub featured: bool,
    pub is_new_development: bool,
    pub is_new_listing: bool,
    pub category: String,
    pub plot_size: Option<String>,
    pub reference: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub price: String,
    pub location: String,
    pub area: String,
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub featured: bool,
    pub is_new_development: bool,
    pub is_new_listing: bool,
    pub category: String,
    pub plot_size: Option<String>,
    pub reference: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyImage {
    pub id: i64,
    pub property_id: i64,
    pub image_url: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPropertyImage {
    pub property_id: i64,
    pub image_url: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFeature {
    pub id: i64,
    pub property_id: i64,
    pub feature: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPropertyFeature {
    pub property_id: i64,
    pub feature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAgent {
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Audit record appended when a favorite is added. The per-user id
/// set inside the store is the source of truth for reads; this record
/// only witnesses that the add happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub property_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub property_interest: Option<String>,
    pub budget: Option<String>,
    pub message: String,
    pub property_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInquiry {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub property_interest: Option<String>,
    pub budget: Option<String>,
    pub message: String,
    pub property_id: Option<i64>,
}
