use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SessionError;
use crate::cart::Cart;
use crate::domain::User;
use crate::storage::LocalStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Messages the UI shows as toasts.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Another session placed an order.
    NewOrder { id: String },
    OrderReady { id: String },
    SyncFailed { message: String },
}

/// Per-device application state owned by the store service.
#[derive(Debug, Default)]
pub struct AppState {
    pub session: Option<User>,
    pub theme: Theme,
    pub cart: Cart,
}

impl AppState {
    pub fn restore(local: &LocalStore) -> Self {
        Self {
            session: local.user(),
            theme: local.theme(),
            cart: Cart::new(),
        }
    }

    pub fn require_admin(&self) -> Result<&User, SessionError> {
        match &self.session {
            Some(user) if user.is_admin() => Ok(user),
            _ => {
                warn!("Admin operation refused");
                Err(SessionError::NotAuthorized)
            }
        }
    }

    /// A different identity never inherits the previous session's cart.
    pub fn sign_in(&mut self, user: User, local: &LocalStore) {
        if self.session.as_ref() != Some(&user) {
            self.cart.clear();
        }
        if let Err(e) = local.save_user(Some(&user)) {
            warn!(error = %e, "Failed to persist session");
        }
        self.session = Some(user);
    }

    /// Drops the session and everything scoped to it.
    pub fn sign_out(&mut self, local: &LocalStore) {
        if let Err(e) = local.save_user(None) {
            warn!(error = %e, "Failed to clear persisted session");
        }
        self.session = None;
        self.cart.clear();
    }

    pub fn toggle_theme(&mut self, local: &LocalStore) -> Theme {
        self.theme = self.theme.toggled();
        if let Err(e) = local.save_theme(self.theme) {
            warn!(error = %e, "Failed to persist theme");
        }
        self.theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MenuItem;

    #[test]
    fn test_sign_out_tears_down_session_and_cart() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::new(dir.path());
        let mut state = AppState::restore(&local);

        state.sign_in(User::customer("Aina", "0123").unwrap(), &local);
        state.cart.add_item(&MenuItem::new("m1", "Satay", "Main", 15.0)).unwrap();
        assert!(local.user().is_some());

        state.sign_out(&local);
        assert_eq!(state.session, None);
        assert!(state.cart.is_empty());
        assert_eq!(local.user(), None);
    }

    #[test]
    fn test_switching_identity_drops_cart() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::new(dir.path());
        let mut state = AppState::restore(&local);
        let satay = MenuItem::new("m1", "Satay", "Main", 15.0);

        state.sign_in(User::customer("Aina", "0123").unwrap(), &local);
        state.cart.add_item(&satay).unwrap();

        // Same customer again keeps the cart.
        state.sign_in(User::customer("Aina", "0123").unwrap(), &local);
        assert_eq!(state.cart.item_count(), 1);

        state.sign_in(User::customer("Budi", "0456").unwrap(), &local);
        assert!(state.cart.is_empty());

        state.cart.add_item(&satay).unwrap();
        state.sign_in(User::admin("admin", "admin123").unwrap(), &local);
        assert!(state.cart.is_empty());
    }

    #[test]
    fn test_require_admin() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::new(dir.path());
        let mut state = AppState::restore(&local);
        assert_eq!(state.require_admin(), Err(SessionError::NotAuthorized));

        state.sign_in(User::customer("Aina", "0123").unwrap(), &local);
        assert_eq!(state.require_admin(), Err(SessionError::NotAuthorized));

        state.sign_in(User::admin("admin", "admin123").unwrap(), &local);
        assert!(state.require_admin().is_ok());
    }

    #[test]
    fn test_theme_toggle_persists() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::new(dir.path());
        let mut state = AppState::restore(&local);

        assert_eq!(state.toggle_theme(&local), Theme::Dark);
        assert_eq!(AppState::restore(&local).theme, Theme::Dark);
    }
}
