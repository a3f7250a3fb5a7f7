//! Device-local key/value persistence, one JSON file per key.
//!
//! Holds session and theme, which only ever live on the device, plus a cached
//! copy of the menu and orders used when the hosted backend cannot be read.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{MenuItem, Order, User};
use crate::store_actor::Theme;

const MENU_KEY: &str = "foodieq_menu";
const ORDERS_KEY: &str = "foodieq_orders";
const THEME_KEY: &str = "foodieq_theme";
const USER_KEY: &str = "foodieq_user";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StorageError {
    #[error("Failed to write {key}: {message}")]
    Io { key: &'static str, message: String },
    #[error("Failed to encode {key}: {message}")]
    Encode { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn menu_items(&self) -> Vec<MenuItem> {
        self.read(MENU_KEY).unwrap_or_default()
    }

    pub fn save_menu_items(&self, items: &[MenuItem]) -> Result<(), StorageError> {
        self.write(MENU_KEY, items)
    }

    pub fn orders(&self) -> Vec<Order> {
        self.read(ORDERS_KEY).unwrap_or_default()
    }

    pub fn save_orders(&self, orders: &[Order]) -> Result<(), StorageError> {
        self.write(ORDERS_KEY, orders)
    }

    pub fn theme(&self) -> Theme {
        self.read(THEME_KEY).unwrap_or_default()
    }

    pub fn save_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.write(THEME_KEY, &theme)
    }

    pub fn user(&self) -> Option<User> {
        self.read::<Option<User>>(USER_KEY).flatten()
    }

    pub fn save_user(&self, user: Option<&User>) -> Result<(), StorageError> {
        self.write(USER_KEY, &user)
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn read<T: DeserializeOwned>(&self, key: &'static str) -> Option<T> {
        let raw = match fs::read_to_string(self.path(key)) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(key, error = %e, "No stored value, using default");
                return None;
            }
        };

        serde_json::from_str(&raw)
            .map_err(|e| warn!(key, error = %e, "Stored value unreadable, using default"))
            .ok()
    }

    fn write<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(value).map_err(|e| StorageError::Encode {
            key,
            message: e.to_string(),
        })?;

        fs::create_dir_all(&self.root)
            .and_then(|_| fs::write(self.path(key), encoded))
            .map_err(|e| StorageError::Io { key, message: e.to_string() })
    }
}
