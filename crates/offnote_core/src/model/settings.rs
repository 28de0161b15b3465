//! Singleton application settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Parses `light|dark`, case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

/// Note field used as the primary sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    UpdatedAt,
    CreatedAt,
    Title,
}

impl SortBy {
    /// Parses the wire names `updatedAt|createdAt|title`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "updatedAt" => Some(Self::UpdatedAt),
            "createdAt" => Some(Self::CreatedAt),
            "title" => Some(Self::Title),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// Parses `asc|desc`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "asc" => Some(Self::Ascending),
            "desc" => Some(Self::Descending),
            _ => None,
        }
    }
}

/// Persisted settings record, written and read as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,
    pub sort_by: SortBy,
    pub sort_direction: SortDirection,
}

impl Settings {
    /// First-run defaults: theme follows the OS preference, newest edits first.
    pub fn default_for(system_theme: Theme) -> Self {
        Self {
            theme: system_theme,
            sort_by: SortBy::UpdatedAt,
            sort_direction: SortDirection::Descending,
        }
    }

    /// Returns a copy with every present patch field applied.
    pub fn merged(self, patch: &SettingsPatch) -> Self {
        Self {
            theme: patch.theme.unwrap_or(self.theme),
            sort_by: patch.sort_by.unwrap_or(self.sort_by),
            sort_direction: patch.sort_direction.unwrap_or(self.sort_direction),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub sort_by: Option<SortBy>,
    pub sort_direction: Option<SortDirection>,
}

#[cfg(test)]
mod tests {
    use super::{Settings, SettingsPatch, SortBy, SortDirection, Theme};

    #[test]
    fn defaults_follow_system_theme() {
        let settings = Settings::default_for(Theme::Dark);
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.sort_by, SortBy::UpdatedAt);
        assert_eq!(settings.sort_direction, SortDirection::Descending);
    }

    #[test]
    fn wire_names_match_stored_record() {
        let json = serde_json::to_value(Settings::default_for(Theme::Light)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "theme": "light",
                "sortBy": "updatedAt",
                "sortDirection": "desc"
            })
        );
    }

    #[test]
    fn merged_only_overrides_present_fields() {
        let base = Settings::default_for(Theme::Light);
        let merged = base.merged(&SettingsPatch {
            sort_by: Some(SortBy::Title),
            ..SettingsPatch::default()
        });
        assert_eq!(merged.theme, Theme::Light);
        assert_eq!(merged.sort_by, SortBy::Title);
        assert_eq!(merged.sort_direction, SortDirection::Descending);
    }

    #[test]
    fn parsers_accept_wire_names() {
        assert_eq!(Theme::parse(" DARK "), Some(Theme::Dark));
        assert_eq!(SortBy::parse("createdAt"), Some(SortBy::CreatedAt));
        assert_eq!(SortDirection::parse("asc"), Some(SortDirection::Ascending));
        assert_eq!(SortDirection::parse("up"), None);
    }
}
