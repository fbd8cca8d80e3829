//! Listing API Handlers
//!
//! HTTP endpoints for the catalog, mounted under `/api`:
//! - `GET /properties` - List properties with optional filters
//! - `GET /properties/search` - Full-text search across listings
//! - `GET /properties/{id}` - Property with nested images and features
//! - `GET /agents` / `GET /agents/{id}` - Agent directory
//! - `POST /users/telegram` - Upsert a user by Telegram id
//! - `GET /users/{userId}/favorites` - Favorited property ids
//! - `GET /users/{userId}/favorite-properties` - Favorited properties
//! - `POST /favorites` / `DELETE /favorites` - Manage favorites
//! - `POST /inquiries` - Submit a contact inquiry
//! - `GET /inquiries` - Inquiry log

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::models::{Agent, Favorite, Inquiry, NewInquiry, NewUser, Property, User};
use crate::models::{PropertyFeature, PropertyImage};
use crate::store::{ListingStore, PropertyFilter};

#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<ListingStore>>,
}

impl AppState {
    pub fn new(store: ListingStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    // Every mutation is a single insert, so the store stays valid even
    // if a handler panicked mid-request; recover instead of poisoning
    // the whole process.
    fn read(&self) -> RwLockReadGuard<'_, ListingStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ListingStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyQuery {
    featured: Option<bool>,
    category: Option<String>,
    location: Option<String>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    bedrooms: Option<i64>,
    limit: Option<usize>,
}

impl From<PropertyQuery> for PropertyFilter {
    fn from(q: PropertyQuery) -> Self {
        PropertyFilter {
            featured: q.featured,
            // Empty string params mean "no constraint", as the front
            // end sends them for cleared inputs.
            category: q.category.filter(|c| !c.is_empty()),
            location: q.location.filter(|l| !l.is_empty()),
            min_price: q.min_price,
            max_price: q.max_price,
            bedrooms: q.bedrooms,
            limit: q.limit,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    query: Option<String>,
}

/// `GET /properties/{id}` payload: the listing with its image and
/// feature sequences inlined.
#[derive(Debug, Serialize)]
pub struct PropertyDetails {
    #[serde(flatten)]
    property: Property,
    images: Vec<PropertyImage>,
    features: Vec<PropertyFeature>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramUserRequest {
    telegram_id: Option<String>,
    username: Option<String>,
    full_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    user_id: i64,
    property_id: i64,
}

#[derive(Debug, Serialize)]
pub struct RemoveFavoriteResponse {
    success: bool,
}

fn bad_body(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

/// List properties with optional ANDed filters, in creation order.
async fn list_properties(
    State(state): State<AppState>,
    Query(query): Query<PropertyQuery>,
) -> Json<Vec<Property>> {
    let filter = PropertyFilter::from(query);
    Json(state.read().get_properties(&filter))
}

/// Search across title, description, location, category and reference.
async fn search_properties(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<Property>>, ApiError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Search query is required".to_string()))?;

    Ok(Json(state.read().search_properties(query)))
}

/// Property detail with nested images and features.
async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PropertyDetails>, ApiError> {
    let store = state.read();
    let property = store
        .property(id)
        .ok_or_else(|| ApiError::NotFound("Property not found".to_string()))?;

    Ok(Json(PropertyDetails {
        images: store.property_images(id),
        features: store.property_features(id),
        property,
    }))
}

async fn list_agents(State(state): State<AppState>) -> Json<Vec<Agent>> {
    Json(state.read().agents())
}

async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Agent>, ApiError> {
    state
        .read()
        .agent(id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Agent not found".to_string()))
}

/// Create-or-fetch a user keyed by Telegram id. Existing users are
/// returned as-is; new ones get a default username and a random
/// placeholder password (Telegram users never log in with it).
async fn telegram_user(
    State(state): State<AppState>,
    body: Result<Json<TelegramUserRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(req) = body.map_err(bad_body)?;

    let telegram_id = req
        .telegram_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Telegram ID is required".to_string()))?;

    // One write lock for the whole upsert so concurrent logins with
    // the same id cannot both pass the lookup and create duplicates.
    let mut store = state.write();
    if let Some(existing) = store.user_by_telegram_id(&telegram_id) {
        return Ok(Json(existing));
    }

    let user = store.create_user(NewUser {
        username: req
            .username
            .unwrap_or_else(|| format!("tg_{}", telegram_id)),
        password: uuid::Uuid::new_v4().simple().to_string(),
        full_name: req.full_name,
        email: req.email,
        phone: req.phone,
        telegram_id: Some(telegram_id),
    });

    info!(user_id = user.id, "Created user from Telegram login");
    Ok(Json(user))
}

async fn user_favorites(State(state): State<AppState>, Path(user_id): Path<i64>) -> Json<Vec<i64>> {
    Json(state.read().favorite_ids(user_id))
}

async fn user_favorite_properties(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Json<Vec<Property>> {
    Json(state.read().favorite_properties(user_id))
}

/// Add a favorite. The user and property links are the ones later
/// resolved on reads, so both are validated here.
async fn add_favorite(
    State(state): State<AppState>,
    body: Result<Json<FavoriteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Favorite>), ApiError> {
    let Json(req) = body.map_err(bad_body)?;

    let mut store = state.write();
    if store.property(req.property_id).is_none() {
        return Err(ApiError::NotFound("Property not found".to_string()));
    }
    if store.user(req.user_id).is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let favorite = store.add_favorite(req.user_id, req.property_id);
    info!(
        user_id = req.user_id,
        property_id = req.property_id,
        "Favorite added"
    );
    Ok((StatusCode::CREATED, Json(favorite)))
}

async fn remove_favorite(
    State(state): State<AppState>,
    body: Result<Json<FavoriteRequest>, JsonRejection>,
) -> Result<Json<RemoveFavoriteResponse>, ApiError> {
    let Json(req) = body.map_err(bad_body)?;

    if !state.write().remove_favorite(req.user_id, req.property_id) {
        return Err(ApiError::NotFound("Favorite not found".to_string()));
    }

    info!(
        user_id = req.user_id,
        property_id = req.property_id,
        "Favorite removed"
    );
    Ok(Json(RemoveFavoriteResponse { success: true }))
}

/// Submit a contact inquiry. `propertyId` is kept as a plain id and
/// deliberately not checked against the property table.
async fn create_inquiry(
    State(state): State<AppState>,
    body: Result<Json<NewInquiry>, JsonRejection>,
) -> Result<(StatusCode, Json<Inquiry>), ApiError> {
    let Json(new) = body.map_err(bad_body)?;

    let inquiry = state.write().create_inquiry(new);
    info!(
        inquiry_id = inquiry.id,
        property_id = inquiry.property_id,
        "Inquiry submitted"
    );
    Ok((StatusCode::CREATED, Json(inquiry)))
}

async fn list_inquiries(State(state): State<AppState>) -> Json<Vec<Inquiry>> {
    Json(state.read().inquiries())
}

/// Build the API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/properties", get(list_properties))
        .route("/properties/search", get(search_properties))
        .route("/properties/{id}", get(get_property))
        .route("/agents", get(list_agents))
        .route("/agents/{id}", get(get_agent))
        .route("/users/telegram", post(telegram_user))
        .route("/users/{userId}/favorites", get(user_favorites))
        .route(
            "/users/{userId}/favorite-properties",
            get(user_favorite_properties),
        )
        .route("/favorites", post(add_favorite).delete(remove_favorite))
        .route("/inquiries", post(create_inquiry).get(list_inquiries))
}
