//! Demonstration Dataset
//!
//! Populates the store before the server starts accepting traffic:
//! one user, two agents and six listings, with images attached to the
//! first three and a feature list on the first. Runs once per
//! process; calling it again duplicates everything under fresh ids.

use crate::models::{NewAgent, NewProperty, NewPropertyFeature, NewPropertyImage, NewUser};
use crate::store::ListingStore;

pub fn seed(store: &mut ListingStore) {
    store.create_user(NewUser {
        username: "telegramuser".into(),
        password: "password123".into(),
        full_name: Some("John Doe".into()),
        email: Some("john@example.com".into()),
        phone: Some("+123456789".into()),
        telegram_id: Some("12345".into()),
    });

    store.create_agent(NewAgent {
        name: "Maria Rodriguez".into(),
        title: "Senior Luxury Real Estate Consultant".into(),
        description: Some(
            "Specialized in high-end properties in Marbella with over 15 years of experience \
             in the luxury real estate market."
                .into(),
        ),
        image_url: Some("https://images.unsplash.com/photo-1573497019940-1c28c88b4f3e".into()),
        phone: Some("+34 951 000 111".into()),
        email: Some("maria@leaderspain.com".into()),
    });

    store.create_agent(NewAgent {
        name: "Carlos Mendez".into(),
        title: "Luxury Property Specialist".into(),
        description: Some("Expert in luxury villas and estates across Costa del Sol.".into()),
        image_url: Some("https://images.unsplash.com/photo-1560250097-0b93528c311a".into()),
        phone: Some("+34 951 000 222".into()),
        email: Some("carlos@leaderspain.com".into()),
    });

    let villa = store.create_property(NewProperty {
        title: "Exclusive Villa".into(),
        description: "This magnificent villa is situated in one of the most prestigious areas \
                      of Puerto Banús, offering breathtaking views of the Mediterranean Sea. \
                      The property has been designed with the utmost attention to detail, \
                      featuring high-end finishes and state-of-the-art technology throughout.\n\n\
                      The open floor plan provides a seamless flow between indoor and outdoor \
                      living spaces, with floor-to-ceiling windows that flood the home with \
                      natural light and showcase the spectacular views."
            .into(),
        price: "3500000".into(),
        location: "Puerto Banús, Marbella".into(),
        area: "650".into(),
        bedrooms: 5,
        bathrooms: 6,
        featured: true,
        is_new_development: false,
        is_new_listing: false,
        category: "Villa".into(),
        plot_size: Some("1200".into()),
        reference: "LS-2435".into(),
    });

    let villa_images = [
        ("https://images.unsplash.com/photo-1600607687939-ce8a6c25118c", true),
        ("https://images.unsplash.com/photo-1584622650111-993a426fbf0a", false),
        ("https://images.unsplash.com/photo-1583608205776-bfd35f0d9f83", false),
        ("https://images.unsplash.com/photo-1539922631499-09155cc609a4", false),
    ];
    for (url, is_primary) in villa_images {
        store.create_property_image(NewPropertyImage {
            property_id: villa.id,
            image_url: url.into(),
            is_primary,
        });
    }

    let villa_features = [
        "Private Pool",
        "Sea Views",
        "Home Automation",
        "Underfloor Heating",
        "Garden",
        "Garage (3 cars)",
        "24h Security",
        "Guest House",
        "Wine Cellar",
    ];
    for feature in villa_features {
        store.create_property_feature(NewPropertyFeature {
            property_id: villa.id,
            feature: feature.into(),
        });
    }

    let modern_house = store.create_property(NewProperty {
        title: "Modern House".into(),
        description: "Contemporary luxury residence with stunning views and exceptional design \
                      elements."
            .into(),
        price: "2100000".into(),
        location: "La Zagaleta, Benahavis".into(),
        area: "420".into(),
        bedrooms: 4,
        bathrooms: 5,
        featured: false,
        is_new_development: false,
        is_new_listing: false,
        category: "Villa".into(),
        plot_size: Some("800".into()),
        reference: "LS-1875".into(),
    });

    store.create_property_image(NewPropertyImage {
        property_id: modern_house.id,
        image_url: "https://images.unsplash.com/photo-1564013799919-ab600027ffc6".into(),
        is_primary: true,
    });

    let penthouse = store.create_property(NewProperty {
        title: "Beachfront Penthouse".into(),
        description: "Luxurious penthouse with direct beach access and panoramic sea views."
            .into(),
        price: "4750000".into(),
        location: "Estepona, Costa del Sol".into(),
        area: "380".into(),
        bedrooms: 3,
        bathrooms: 4,
        featured: false,
        is_new_development: false,
        is_new_listing: true,
        category: "Penthouse".into(),
        plot_size: Some("0".into()),
        reference: "LS-3287".into(),
    });

    store.create_property_image(NewPropertyImage {
        property_id: penthouse.id,
        image_url: "https://images.unsplash.com/photo-1613977257592-4a9a32f9734e".into(),
        is_primary: true,
    });

    store.create_property(NewProperty {
        title: "Modern Villa".into(),
        description: "Contemporary design with panoramic views and infinity pool.".into(),
        price: "2900000".into(),
        location: "Golden Mile, Marbella".into(),
        area: "520".into(),
        bedrooms: 4,
        bathrooms: 5,
        featured: false,
        is_new_development: false,
        is_new_listing: false,
        category: "Villa".into(),
        plot_size: Some("900".into()),
        reference: "LS-2145".into(),
    });

    store.create_property(NewProperty {
        title: "Beach House".into(),
        description: "Stunning beachfront property with direct access to the Mediterranean."
            .into(),
        price: "2950000".into(),
        location: "Nueva Andalucía, Marbella".into(),
        area: "600".into(),
        bedrooms: 5,
        bathrooms: 6,
        featured: false,
        is_new_development: false,
        is_new_listing: false,
        category: "Villa".into(),
        plot_size: Some("1000".into()),
        reference: "LS-2673".into(),
    });

    store.create_property(NewProperty {
        title: "Luxury Estate".into(),
        description: "Magnificent estate with extensive gardens and complete privacy.".into(),
        price: "4100000".into(),
        location: "Sotogrande, Cádiz".into(),
        area: "750".into(),
        bedrooms: 6,
        bathrooms: 7,
        featured: false,
        is_new_development: false,
        is_new_listing: false,
        category: "Estate".into(),
        plot_size: Some("3000".into()),
        reference: "LS-3111".into(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_villa_has_images_and_features_in_attachment_order() {
        let mut store = ListingStore::new();
        seed(&mut store);

        let images = store.property_images(1);
        assert_eq!(images.len(), 4);
        assert!(images[0].is_primary);
        assert!(images[1..].iter().all(|i| !i.is_primary));
        assert_eq!(
            images.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );

        let features = store.property_features(1);
        assert_eq!(features.len(), 9);
        assert_eq!(features[0].feature, "Private Pool");
        assert_eq!(features[8].feature, "Wine Cellar");
    }

    #[test]
    fn seeds_one_user_two_agents_six_properties() {
        let mut store = ListingStore::new();
        seed(&mut store);

        assert!(store.user(1).is_some());
        assert!(store.user(2).is_none());
        assert_eq!(store.agents().len(), 2);
        assert_eq!(
            store.get_properties(&crate::store::PropertyFilter::default()).len(),
            6
        );
    }

    #[test]
    fn seeding_twice_duplicates_under_fresh_ids() {
        let mut store = ListingStore::new();
        seed(&mut store);
        seed(&mut store);

        let all = store.get_properties(&crate::store::PropertyFilter::default());
        assert_eq!(all.len(), 12);
        assert_eq!(all[6].id, 7);
        assert_eq!(all[6].title, "Exclusive Villa");
    }
}
