//! In-Memory Listing Store
//!
//! Holds every entity collection for the process lifetime:
//! - keyed tables for users, properties, agents, inquiries
//! - per-property image and feature sequences (relationship index)
//! - per-user favorite id sets, plus an append-only favorite audit log
//!
//! Ids are assigned per entity kind, start at 1, grow monotonically
//! and are never reused. Nothing is ever deleted except favorites.
//! All operations are synchronous and never panic on absent rows;
//! concurrent access is the caller's concern (`api::AppState` wraps
//! the store in an `RwLock`).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::Utc;

use crate::models::{
    Agent, Favorite, Inquiry, NewAgent, NewInquiry, NewProperty, NewPropertyFeature,
    NewPropertyImage, NewUser, Property, PropertyFeature, PropertyImage, User,
};

/// Generic map-backed table with its own id sequence. Keys are the
/// assigned ids, so `BTreeMap` iteration order is creation order.
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    fn get(&self, id: i64) -> Option<&T> {
        self.rows.get(&id)
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }
}

/// Optional, independently ANDed predicates over the property table.
/// `None` means "no constraint"; an explicit `featured: Some(false)`
/// does filter, to non-featured rows only.
#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    pub featured: Option<bool>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub bedrooms: Option<i64>,
    pub limit: Option<usize>,
}

pub struct ListingStore {
    users: Table<User>,
    properties: Table<Property>,
    agents: Table<Agent>,
    inquiries: Table<Inquiry>,

    images: HashMap<i64, Vec<PropertyImage>>,
    next_image_id: i64,
    features: HashMap<i64, Vec<PropertyFeature>>,
    next_feature_id: i64,

    favorites: HashMap<i64, BTreeSet<i64>>,
    favorite_log: Table<Favorite>,
}

impl ListingStore {
    pub fn new() -> Self {
        Self {
            users: Table::new(),
            properties: Table::new(),
            agents: Table::new(),
            inquiries: Table::new(),
            images: HashMap::new(),
            next_image_id: 1,
            features: HashMap::new(),
            next_feature_id: 1,
            favorites: HashMap::new(),
            favorite_log: Table::new(),
        }
    }

    // User operations

    pub fn create_user(&mut self, new: NewUser) -> User {
        self.users.insert_with(|id| User {
            id,
            username: new.username,
            password: new.password,
            full_name: new.full_name,
            email: new.email,
            phone: new.phone,
            telegram_id: new.telegram_id,
        })
    }

    pub fn user(&self, id: i64) -> Option<User> {
        self.users.get(id).cloned()
    }

    /// Linear scan, first match. Username uniqueness is a schema-level
    /// promise the store does not enforce.
    pub fn user_by_username(&self, username: &str) -> Option<User> {
        self.users.iter().find(|u| u.username == username).cloned()
    }

    pub fn user_by_telegram_id(&self, telegram_id: &str) -> Option<User> {
        self.users
            .iter()
            .find(|u| u.telegram_id.as_deref() == Some(telegram_id))
            .cloned()
    }

    // Property operations

    pub fn create_property(&mut self, new: NewProperty) -> Property {
        self.properties.insert_with(|id| Property {
            id,
            title: new.title,
            description: new.description,
            price: new.price,
            location: new.location,
            area: new.area,
            bedrooms: new.bedrooms,
            bathrooms: new.bathrooms,
            featured: new.featured,
            is_new_development: new.is_new_development,
            is_new_listing: new.is_new_listing,
            category: new.category,
            plot_size: new.plot_size,
            reference: new.reference,
            created_at: Utc::now(),
        })
    }

    pub fn property(&self, id: i64) -> Option<Property> {
        self.properties.get(id).cloned()
    }

    /// Filtered bulk read. Results keep creation order; `limit` keeps
    /// the first N after all other predicates, with no ranking.
    pub fn get_properties(&self, filter: &PropertyFilter) -> Vec<Property> {
        let mut out: Vec<Property> = self
            .properties
            .iter()
            .filter(|p| filter.featured.is_none_or(|f| p.featured == f))
            .filter(|p| {
                filter
                    .category
                    .as_deref()
                    .is_none_or(|c| p.category == c)
            })
            .filter(|p| {
                // Case-sensitive, unlike search.
                filter
                    .location
                    .as_deref()
                    .is_none_or(|l| p.location.contains(l))
            })
            .filter(|p| {
                filter
                    .min_price
                    .is_none_or(|min| parsed_price(p).map(|v| v >= min).unwrap_or(false))
            })
            .filter(|p| {
                filter
                    .max_price
                    .is_none_or(|max| parsed_price(p).map(|v| v <= max).unwrap_or(false))
            })
            .filter(|p| filter.bedrooms.is_none_or(|b| p.bedrooms >= b))
            .cloned()
            .collect();

        if let Some(limit) = filter.limit {
            out.truncate(limit);
        }

        out
    }

    /// Case-insensitive substring search across title, description,
    /// location, category and reference; a hit in any field matches.
    pub fn search_properties(&self, query: &str) -> Vec<Property> {
        let needle = query.to_lowercase();
        self.properties
            .iter()
            .filter(|p| {
                p.title.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
                    || p.location.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
                    || p.reference.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    // Property image operations

    /// Appends an image to the property's sequence. The property id is
    /// not validated; an image for an unknown property becomes an
    /// orphaned record.
    pub fn create_property_image(&mut self, new: NewPropertyImage) -> PropertyImage {
        let id = self.next_image_id;
        self.next_image_id += 1;
        let image = PropertyImage {
            id,
            property_id: new.property_id,
            image_url: new.image_url,
            is_primary: new.is_primary,
        };
        self.images
            .entry(new.property_id)
            .or_default()
            .push(image.clone());
        image
    }

    /// Insertion-ordered images for a property; empty when none exist.
    pub fn property_images(&self, property_id: i64) -> Vec<PropertyImage> {
        self.images.get(&property_id).cloned().unwrap_or_default()
    }

    // Property feature operations

    pub fn create_property_feature(&mut self, new: NewPropertyFeature) -> PropertyFeature {
        let id = self.next_feature_id;
        self.next_feature_id += 1;
        let feature = PropertyFeature {
            id,
            property_id: new.property_id,
            feature: new.feature,
        };
        self.features
            .entry(new.property_id)
            .or_default()
            .push(feature.clone());
        feature
    }

    pub fn property_features(&self, property_id: i64) -> Vec<PropertyFeature> {
        self.features.get(&property_id).cloned().unwrap_or_default()
    }

    // Agent operations

    pub fn create_agent(&mut self, new: NewAgent) -> Agent {
        self.agents.insert_with(|id| Agent {
            id,
            name: new.name,
            title: new.title,
            description: new.description,
            image_url: new.image_url,
            phone: new.phone,
            email: new.email,
        })
    }

    pub fn agent(&self, id: i64) -> Option<Agent> {
        self.agents.get(id).cloned()
    }

    pub fn agents(&self) -> Vec<Agent> {
        self.agents.iter().cloned().collect()
    }

    // Favorite operations

    pub fn favorite_ids(&self, user_id: i64) -> Vec<i64> {
        self.favorites
            .get(&user_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Inserts into the user's favorite set (idempotent from the read
    /// side) and appends an audit record with a fresh id either way.
    pub fn add_favorite(&mut self, user_id: i64, property_id: i64) -> Favorite {
        self.favorites
            .entry(user_id)
            .or_default()
            .insert(property_id);
        self.favorite_log.insert_with(|id| Favorite {
            id,
            user_id,
            property_id,
        })
    }

    /// Returns whether the pair was actually favorited.
    pub fn remove_favorite(&mut self, user_id: i64, property_id: i64) -> bool {
        self.favorites
            .get_mut(&user_id)
            .is_some_and(|set| set.remove(&property_id))
    }

    /// Resolves the user's favorite set against the property table,
    /// dropping ids that no longer resolve.
    pub fn favorite_properties(&self, user_id: i64) -> Vec<Property> {
        self.favorite_ids(user_id)
            .into_iter()
            .filter_map(|id| self.property(id))
            .collect()
    }

    // Inquiry operations

    pub fn create_inquiry(&mut self, new: NewInquiry) -> Inquiry {
        self.inquiries.insert_with(|id| Inquiry {
            id,
            full_name: new.full_name,
            email: new.email,
            phone: new.phone,
            property_interest: new.property_interest,
            budget: new.budget,
            message: new.message,
            property_id: new.property_id,
            created_at: Utc::now(),
        })
    }

    pub fn inquiries(&self) -> Vec<Inquiry> {
        self.inquiries.iter().cloned().collect()
    }
}

impl Default for ListingStore {
    fn default() -> Self {
        Self::new()
    }
}

fn parsed_price(property: &Property) -> Option<f64> {
    property.price.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn seeded() -> ListingStore {
        let mut store = ListingStore::new();
        seed::seed(&mut store);
        store
    }

    fn filter() -> PropertyFilter {
        PropertyFilter::default()
    }

    #[test]
    fn ids_are_unique_and_monotonic() {
        let store = seeded();
        let all = store.get_properties(&filter());
        let ids: Vec<i64> = all.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn empty_filter_returns_all_in_creation_order() {
        let store = seeded();
        let all = store.get_properties(&filter());
        assert_eq!(all.len(), 6);
        assert_eq!(all[0].title, "Exclusive Villa");
        assert_eq!(all[5].title, "Luxury Estate");
    }

    #[test]
    fn featured_filter_is_exact() {
        let store = seeded();

        let featured = store.get_properties(&PropertyFilter {
            featured: Some(true),
            ..filter()
        });
        assert_eq!(featured.len(), 1);
        assert!(featured.iter().all(|p| p.featured));

        let rest = store.get_properties(&PropertyFilter {
            featured: Some(false),
            ..filter()
        });
        assert_eq!(rest.len(), 5);
        assert!(rest.iter().all(|p| !p.featured));
    }

    #[test]
    fn price_band_matches_single_seeded_property() {
        let store = seeded();
        let hits = store.get_properties(&PropertyFilter {
            min_price: Some(3_000_000.0),
            max_price: Some(4_000_000.0),
            ..filter()
        });
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].price, "3500000");
    }

    #[test]
    fn bedrooms_is_an_inclusive_lower_bound() {
        let store = seeded();
        let hits = store.get_properties(&PropertyFilter {
            bedrooms: Some(5),
            ..filter()
        });
        assert!(hits.iter().all(|p| p.bedrooms >= 5));
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn location_filter_is_case_sensitive_substring() {
        let store = seeded();
        let hits = store.get_properties(&PropertyFilter {
            location: Some("Marbella".into()),
            ..filter()
        });
        assert_eq!(hits.len(), 3);

        let none = store.get_properties(&PropertyFilter {
            location: Some("marbella".into()),
            ..filter()
        });
        assert!(none.is_empty());
    }

    #[test]
    fn category_filter_is_exact() {
        let store = seeded();
        let hits = store.get_properties(&PropertyFilter {
            category: Some("Penthouse".into()),
            ..filter()
        });
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Beachfront Penthouse");
    }

    #[test]
    fn limit_truncates_after_filtering() {
        let store = seeded();
        let hits = store.get_properties(&PropertyFilter {
            limit: Some(2),
            ..filter()
        });
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, 1);
        assert_eq!(hits[1].id, 2);
    }

    #[test]
    fn filters_combine_with_and() {
        let store = seeded();
        let hits = store.get_properties(&PropertyFilter {
            category: Some("Villa".into()),
            bedrooms: Some(5),
            ..filter()
        });
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|p| p.category == "Villa" && p.bedrooms >= 5));
    }

    #[test]
    fn unparsable_price_fails_numeric_bounds() {
        let mut store = ListingStore::new();
        store.create_property(NewProperty {
            title: "Mystery".into(),
            description: "No price on request".into(),
            price: "POA".into(),
            location: "Marbella".into(),
            area: "100".into(),
            bedrooms: 2,
            bathrooms: 1,
            featured: false,
            is_new_development: false,
            is_new_listing: false,
            category: "Apartment".into(),
            plot_size: None,
            reference: "LS-0001".into(),
        });

        let hits = store.get_properties(&PropertyFilter {
            min_price: Some(0.0),
            ..PropertyFilter::default()
        });
        assert!(hits.is_empty());
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let store = seeded();

        // Category match
        let hits = store.search_properties("penthouse");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Beachfront Penthouse");

        // Reference match
        let hits = store.search_properties("ls-2435");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Exclusive Villa");

        // Location match
        let hits = store.search_properties("SOTOGRANDE");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Luxury Estate");
    }

    #[test]
    fn unknown_property_lookup_is_none() {
        let store = seeded();
        assert!(store.property(999).is_none());
        assert!(store.agent(999).is_none());
        assert!(store.user(999).is_none());
    }

    #[test]
    fn user_lookups_scan_by_field() {
        let store = seeded();
        let by_name = store.user_by_username("telegramuser").unwrap();
        let by_tg = store.user_by_telegram_id("12345").unwrap();
        assert_eq!(by_name.id, by_tg.id);
        assert!(store.user_by_telegram_id("99999").is_none());
    }

    #[test]
    fn add_favorite_is_idempotent_on_the_read_side() {
        let mut store = seeded();
        let first = store.add_favorite(1, 2);
        let second = store.add_favorite(1, 2);

        // Audit records keep their own ids even for duplicate adds.
        assert!(second.id > first.id);
        assert_eq!(store.favorite_ids(1), vec![2]);
    }

    #[test]
    fn remove_favorite_reports_presence() {
        let mut store = seeded();
        assert!(!store.remove_favorite(1, 999));

        store.add_favorite(1, 3);
        assert!(store.remove_favorite(1, 3));
        assert!(store.favorite_ids(1).is_empty());
        assert!(!store.remove_favorite(1, 3));
    }

    #[test]
    fn favorite_properties_drop_dangling_ids() {
        let mut store = seeded();
        store.add_favorite(1, 2);
        store.add_favorite(1, 999);
        let props: Vec<i64> = store.favorite_properties(1).iter().map(|p| p.id).collect();
        assert_eq!(props, vec![2]);
    }

    #[test]
    fn orphaned_images_are_accepted_silently() {
        let mut store = ListingStore::new();
        let image = store.create_property_image(NewPropertyImage {
            property_id: 42,
            image_url: "https://example.com/ghost.jpg".into(),
            is_primary: true,
        });
        assert_eq!(image.property_id, 42);
        assert_eq!(store.property_images(42).len(), 1);
        assert!(store.property(42).is_none());
    }

    #[test]
    fn images_and_features_default_to_empty() {
        let store = seeded();
        assert!(store.property_images(6).is_empty());
        assert!(store.property_features(6).is_empty());
    }

    #[test]
    fn inquiries_append_in_order() {
        let mut store = ListingStore::new();
        for name in ["Ana", "Bo"] {
            store.create_inquiry(NewInquiry {
                full_name: name.into(),
                email: format!("{name}@example.com"),
                phone: None,
                property_interest: None,
                budget: None,
                message: "Interested".into(),
                property_id: Some(999),
            });
        }
        let log = store.inquiries();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].full_name, "Ana");
        assert_eq!(log[1].id, 2);
    }
}
