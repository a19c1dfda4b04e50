//! Device preferences: colour theme and sidebar visibility.

use std::fmt;

use crate::error::StoreError;
use crate::kv::KeyValueStore;

const THEME_KEY: &str = "theme";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parse a stored value. Anything unknown is the light theme.
    pub fn parse(value: &str) -> Self {
        match value {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read the persisted theme, defaulting to light.
pub fn load_theme<S: KeyValueStore>(store: &S) -> Theme {
    store
        .get(THEME_KEY)
        .map(|v| Theme::parse(&v))
        .unwrap_or_default()
}

/// Persist `theme`.
pub fn save_theme<S: KeyValueStore>(store: &S, theme: Theme) -> Result<(), StoreError> {
    store.set(THEME_KEY, theme.as_str())
}

/// Flip the persisted theme and return the new value.
pub fn toggle_theme<S: KeyValueStore>(store: &S) -> Result<Theme, StoreError> {
    let next = load_theme(store).toggled();
    save_theme(store, next)?;
    Ok(next)
}

/// Sidebar visibility. Not persisted: every session starts with it open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SidebarState {
    pub open: bool,
}

impl Default for SidebarState {
    fn default() -> Self {
        Self { open: true }
    }
}

impl SidebarState {
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[test]
    fn test_theme_defaults_to_light() {
        let store = MemoryStore::new();
        assert_eq!(load_theme(&store), Theme::Light);

        store.set("theme", "purple").unwrap();
        assert_eq!(load_theme(&store), Theme::Light);
    }

    #[test]
    fn test_toggle_theme_persists() {
        let store = MemoryStore::new();
        assert_eq!(toggle_theme(&store).unwrap(), Theme::Dark);
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
        assert_eq!(toggle_theme(&store).unwrap(), Theme::Light);
        assert_eq!(load_theme(&store), Theme::Light);
    }

    #[test]
    fn test_sidebar_starts_open() {
        let mut sidebar = SidebarState::default();
        assert!(sidebar.open);
        sidebar.toggle();
        assert!(!sidebar.open);
    }
}
