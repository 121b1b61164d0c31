#![allow(dead_code)]

use dinemap::{memory::InMemoryStore, prelude::*};

/// A fresh directory over an empty in-memory store.
pub fn directory() -> RestaurantDirectory<InMemoryStore> {
    RestaurantDirectory::new(InMemoryStore::new())
}

/// A plausible attribute set; coordinates default to Seoul City Hall.
pub fn attrs(name: &str) -> NewRestaurant {
    NewRestaurant {
        name: name.to_string(),
        address: format!("1 {name} St"),
        location: "Jung-gu".to_string(),
        min_price: 20,
        max_price: 50,
        currency: "KRW".to_string(),
        cuisine: "Korean".to_string(),
        longitude: 126.9780,
        latitude: 37.5665,
        phone_number: "+82-2-000-0000".to_string(),
        url: format!("https://guide.example/{name}"),
        website_url: format!("https://{name}.example"),
        award: String::new(),
        country: "KR".to_string(),
    }
}

/// Attribute set with explicit country/cuisine and coordinates.
pub fn attrs_at(
    name: &str,
    country: &str,
    cuisine: &str,
    longitude: f64,
    latitude: f64,
) -> NewRestaurant {
    NewRestaurant {
        country: country.to_string(),
        cuisine: cuisine.to_string(),
        longitude,
        latitude,
        ..attrs(name)
    }
}
