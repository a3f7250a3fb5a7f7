use serde::{Deserialize, Serialize};

use crate::error::MenuError;

/// A catalog entry as stored in the `menu_items` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub rating: f64,
    /// Pictogram character, remote URL or `data:` URI, shown as given.
    pub image: String,
    pub dietary: Dietary,
    pub available: bool,
    pub calories: u32,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dietary {
    #[serde(rename = "Vegetarian")]
    Vegetarian,
    #[serde(rename = "Tidak Vegetarian", alias = "Non-Vegetarian")]
    NonVegetarian,
}

/// Fields an admin fills in for a brand new catalog entry.
#[derive(Debug, Clone)]
pub struct MenuItemDraft {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub image: String,
    pub dietary: Dietary,
    pub calories: u32,
    pub description: String,
}

impl MenuItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            price,
            rating: 5.0,
            image: String::new(),
            dietary: Dietary::NonVegetarian,
            available: true,
            calories: 0,
            description: String::new(),
        }
    }

    /// Prices must be finite and not negative.
    pub fn validate(&self) -> Result<(), MenuError> {
        if self.price.is_finite() && self.price >= 0.0 {
            Ok(())
        } else {
            Err(MenuError::InvalidPrice { id: self.id.clone(), price: self.price })
        }
    }

    /// Builds a fresh entry from a draft. New items start available and rated 5.0.
    pub fn from_draft(id: impl Into<String>, draft: MenuItemDraft) -> Self {
        Self {
            id: id.into(),
            name: draft.name,
            category: draft.category,
            price: draft.price,
            rating: 5.0,
            image: draft.image,
            dietary: draft.dietary,
            available: true,
            calories: draft.calories,
            description: draft.description,
        }
    }
}

/// Starter catalog inserted by the admin's one-time seed action.
pub fn default_menu() -> Vec<MenuItem> {
    let entry = |id: &str,
                 name: &str,
                 category: &str,
                 price: f64,
                 rating: f64,
                 image: &str,
                 dietary: Dietary,
                 calories: u32,
                 description: &str| MenuItem {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        price,
        rating,
        image: image.to_string(),
        dietary,
        available: true,
        calories,
        description: description.to_string(),
    };

    vec![
        entry("m1", "Nasi Goreng Special", "Main Course", 12.0, 4.8, "🍛", Dietary::NonVegetarian, 450,
            "Fried rice with chicken, egg and fresh vegetables"),
        entry("m2", "Mee Ayam Premium", "Main Course", 10.0, 4.7, "🍜", Dietary::NonVegetarian, 380,
            "Soft noodles with grilled chicken and spiced broth"),
        entry("m3", "Satay Ayam", "Main Course", 15.0, 4.9, "🍢", Dietary::NonVegetarian, 320,
            "Ten chicken satay skewers with peanut sauce and rice cakes"),
        entry("m4", "Gado-Gado", "Salad", 8.0, 4.6, "🥗", Dietary::Vegetarian, 250,
            "Vegetable salad with creamy peanut dressing"),
        entry("m5", "Bakso Jumbo", "Soup", 11.0, 4.8, "🍲", Dietary::NonVegetarian, 420,
            "Jumbo meatballs in hot soup with yellow noodles"),
        entry("m6", "Es Teler", "Drinks", 6.0, 4.5, "🥤", Dietary::Vegetarian, 180,
            "Iced fruit cocktail with coconut milk"),
    ]
}
