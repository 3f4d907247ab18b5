//! Parent dashboard settings (`terraParentSettings`).

use serde::{Deserialize, Serialize};

use crate::{SAVE_VERSION, SaveState};

const CONTENT_FILTERS: &[&str] = &["strict", "moderate", "relaxed"];

/// Daily screen-time limits and quiet hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScreenTime {
    /// Minutes of play allowed per day
    pub daily_limit: u32,
    pub break_reminders: bool,
    pub quiet_hours_start: String,
    pub quiet_hours_end: String,
}

impl Default for ScreenTime {
    fn default() -> Self {
        Self {
            daily_limit: 60,
            break_reminders: true,
            quiet_hours_start: "20:00".to_string(),
            quiet_hours_end: "07:00".to_string(),
        }
    }
}

/// Weekly learning goals, in sessions or minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Goals {
    pub weekly_science: u32,
    pub daily_math: u32,
    pub reading_time: u32,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            weekly_science: 5,
            daily_math: 30,
            reading_time: 20,
        }
    }
}

/// Content safety controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Safety {
    /// One of "strict", "moderate", "relaxed"
    pub content_filter: String,
    pub anonymous_analytics: bool,
    pub email_reports: bool,
}

impl Default for Safety {
    fn default() -> Self {
        Self {
            content_filter: "moderate".to_string(),
            anonymous_analytics: false,
            email_reports: true,
        }
    }
}

/// Which notifications the parent receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Notifications {
    pub daily_summary: bool,
    pub weekly_report: bool,
    pub achievements: bool,
    pub goal_alerts: bool,
    pub content_updates: bool,
}

impl Default for Notifications {
    fn default() -> Self {
        Self {
            daily_summary: true,
            weekly_report: true,
            achievements: false,
            goal_alerts: true,
            content_updates: false,
        }
    }
}

/// Everything the parent dashboard persists locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParentSettings {
    pub version: u32,
    pub screen_time: ScreenTime,
    pub goals: Goals,
    pub safety: Safety,
    pub notifications: Notifications,
}

impl Default for ParentSettings {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            screen_time: ScreenTime::default(),
            goals: Goals::default(),
            safety: Safety::default(),
            notifications: Notifications::default(),
        }
    }
}

impl SaveState for ParentSettings {
    const KEY: &'static str = "terraParentSettings";

    fn version(&self) -> u32 {
        self.version
    }

    fn set_version(&mut self, version: u32) {
        self.version = version;
    }

    fn sanitize(&mut self) {
        // Cap the daily limit at 8 hours; 0 means no play allowed
        if self.screen_time.daily_limit > 480 {
            self.screen_time.daily_limit = 480;
        }
        if !CONTENT_FILTERS.contains(&self.safety.content_filter.as_str()) {
            self.safety.content_filter = Safety::default().content_filter;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dashboard() {
        let settings = ParentSettings::default();
        assert_eq!(settings.screen_time.daily_limit, 60);
        assert_eq!(settings.safety.content_filter, "moderate");
        assert!(settings.notifications.daily_summary);
        assert!(!settings.notifications.achievements);
    }

    #[test]
    fn test_partial_nested_blob_merges() {
        // Old dashboards saved only the groups the parent touched
        let raw = r#"{"screenTime": {"dailyLimit": 90}}"#;
        let settings = ParentSettings::load(Some(raw)).unwrap();
        assert_eq!(settings.screen_time.daily_limit, 90);
        // Untouched fields within the touched group still default
        assert!(settings.screen_time.break_reminders);
        assert_eq!(settings.goals.daily_math, 30);
    }

    #[test]
    fn test_invalid_content_filter_reset() {
        let raw = r#"{"safety": {"contentFilter": "none"}}"#;
        let settings = ParentSettings::load(Some(raw)).unwrap();
        assert_eq!(settings.safety.content_filter, "moderate");
    }

    #[test]
    fn test_excessive_daily_limit_capped() {
        let raw = r#"{"screenTime": {"dailyLimit": 100000}}"#;
        let settings = ParentSettings::load(Some(raw)).unwrap();
        assert_eq!(settings.screen_time.daily_limit, 480);
    }
}
