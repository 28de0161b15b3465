//! Settings use-case service.
//!
//! # Invariants
//! - After `bootstrap` succeeds the settings record exists in the store.
//! - Updates always write the full merged record.

use crate::model::settings::{Settings, SettingsPatch, Theme};
use crate::store::{get_json, put_json, Namespace, RecordStore, StoreResult};
use log::info;

/// Fixed key of the settings singleton.
pub const SETTINGS_KEY: &str = "app-settings";

pub struct SettingsService<S: RecordStore> {
    store: S,
    system_theme: Theme,
    current: Settings,
}

impl<S: RecordStore> SettingsService<S> {
    /// Loads settings, storing first-run defaults when none exist.
    ///
    /// `system_theme` is the OS color-scheme preference.
    pub fn bootstrap(store: S, system_theme: Theme) -> StoreResult<Self> {
        let current = match get_json::<_, Settings>(&store, Namespace::Settings, SETTINGS_KEY)? {
            Some(saved) => saved,
            None => {
                let defaults = Settings::default_for(system_theme);
                put_json(&store, Namespace::Settings, SETTINGS_KEY, &defaults)?;
                info!(
                    "event=settings_bootstrap module=settings_service status=ok theme={:?}",
                    defaults.theme
                );
                defaults
            }
        };

        Ok(Self {
            store,
            system_theme,
            current,
        })
    }

    /// Reads the stored record.
    pub fn get_settings(&self) -> StoreResult<Option<Settings>> {
        get_json(&self.store, Namespace::Settings, SETTINGS_KEY)
    }

    /// Last settings confirmed by the store.
    pub fn settings(&self) -> Settings {
        self.current
    }

    /// Merges `patch` onto the stored record (or first-run defaults) and
    /// writes the whole result.
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> StoreResult<Settings> {
        let base = self
            .get_settings()?
            .unwrap_or_else(|| Settings::default_for(self.system_theme));
        let merged = base.merged(patch);
        put_json(&self.store, Namespace::Settings, SETTINGS_KEY, &merged)?;
        self.current = merged;
        info!(
            "event=settings_update module=settings_service status=ok theme={:?} sort_by={:?} sort_direction={:?}",
            merged.theme, merged.sort_by, merged.sort_direction
        );
        Ok(merged)
    }

    /// Flips between light and dark.
    pub fn toggle_theme(&mut self) -> StoreResult<Settings> {
        let theme = self.current.theme.toggled();
        self.update_settings(&SettingsPatch {
            theme: Some(theme),
            ..SettingsPatch::default()
        })
    }
}
