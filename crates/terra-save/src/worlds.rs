//! Per-world save states, one per local-storage key.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{SAVE_VERSION, SaveState};

macro_rules! impl_save_state {
    ($ty:ty, $key:literal) => {
        impl SaveState for $ty {
            const KEY: &'static str = $key;

            fn version(&self) -> u32 {
                self.version
            }

            fn set_version(&mut self, version: u32) {
                self.version = version;
            }

            fn sanitize(&mut self) {
                self.clamp();
            }
        }
    };
}

/// Math Galaxy progress (`mathGalaxyProgress`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MathGalaxySave {
    pub version: u32,
    /// Lesson the player is currently on (1-based)
    pub current_lesson: u32,
    pub completed_lessons: Vec<u32>,
    pub games_played: Vec<String>,
    pub badges: Vec<String>,
    pub total_stars: u32,
    pub challenges_completed: u32,
}

impl Default for MathGalaxySave {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            current_lesson: 1,
            completed_lessons: Vec::new(),
            games_played: Vec::new(),
            badges: Vec::new(),
            total_stars: 0,
            challenges_completed: 0,
        }
    }
}

impl MathGalaxySave {
    fn clamp(&mut self) {
        if self.current_lesson == 0 {
            self.current_lesson = 1;
        }
        self.completed_lessons.sort_unstable();
        self.completed_lessons.dedup();
    }
}

impl_save_state!(MathGalaxySave, "mathGalaxyProgress");

/// Science World progress (`scienceWorldProgress`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScienceWorldSave {
    pub version: u32,
    pub current_level: u32,
    pub total_xp: u32,
    pub experiments_completed: Vec<String>,
    pub current_zone: String,
}

impl Default for ScienceWorldSave {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            current_level: 1,
            total_xp: 0,
            experiments_completed: Vec::new(),
            current_zone: "lab".to_string(),
        }
    }
}

impl ScienceWorldSave {
    fn clamp(&mut self) {
        if self.current_level == 0 {
            self.current_level = 1;
        }
        self.experiments_completed.dedup();
    }
}

impl_save_state!(ScienceWorldSave, "scienceWorldProgress");

/// Progress through one historical storyline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorylineProgress {
    pub chapter: u32,
    pub choices: Vec<String>,
}

/// History Land progress (`terraHistoryProgress`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryLandSave {
    pub version: u32,
    pub current_level: u32,
    /// The browser client wrote this key as `totalXP`
    #[serde(rename = "totalXP")]
    pub total_xp: u32,
    /// Treasure currency specific to this world
    pub treasures: u32,
    pub completed_periods: Vec<String>,
    pub current_period: String,
    pub storyline_progress: HashMap<String, StorylineProgress>,
    pub heroes_unlocked: Vec<String>,
    pub achievements: Vec<String>,
    pub cultural_knowledge: u32,
}

impl Default for HistoryLandSave {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            current_level: 1,
            total_xp: 0,
            treasures: 0,
            completed_periods: Vec::new(),
            current_period: "ancient".to_string(),
            storyline_progress: HashMap::new(),
            heroes_unlocked: Vec::new(),
            achievements: Vec::new(),
            cultural_knowledge: 0,
        }
    }
}

impl HistoryLandSave {
    fn clamp(&mut self) {
        if self.current_level == 0 {
            self.current_level = 1;
        }
        self.completed_periods.dedup();
        self.heroes_unlocked.dedup();
    }
}

impl_save_state!(HistoryLandSave, "terraHistoryProgress");

/// AI Future City progress (`terraFutureProgress`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FutureCitySave {
    pub version: u32,
    pub current_level: u32,
    /// The browser client wrote this key as `totalXP`
    #[serde(rename = "totalXP")]
    pub total_xp: u32,
    /// Token currency specific to this world
    pub tokens: u32,
    /// Concepts mastered, keyed by track (e.g. "machine-learning")
    pub concepts_learned: HashMap<String, Vec<String>>,
    /// Concept currently in progress per track
    pub current_concepts: HashMap<String, String>,
    pub zones_explored: Vec<String>,
    pub current_zone: String,
    pub available_zones: Vec<String>,
    pub robots_built: Vec<String>,
    pub code_projects: Vec<String>,
}

impl Default for FutureCitySave {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            current_level: 1,
            total_xp: 0,
            tokens: 0,
            concepts_learned: HashMap::new(),
            current_concepts: HashMap::new(),
            zones_explored: Vec::new(),
            current_zone: "ai-center".to_string(),
            available_zones: Vec::new(),
            robots_built: Vec::new(),
            code_projects: Vec::new(),
        }
    }
}

impl FutureCitySave {
    fn clamp(&mut self) {
        if self.current_level == 0 {
            self.current_level = 1;
        }
        self.zones_explored.dedup();
        for learned in self.concepts_learned.values_mut() {
            learned.dedup();
        }
    }
}

impl_save_state!(FutureCitySave, "terraFutureProgress");

/// A kindness task in the village world.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoodDeed {
    pub deed: String,
    pub reward: u32,
    pub completed: bool,
}

/// Life-skills village progress (`terraVillageProgress`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VillageSave {
    pub version: u32,
    pub current_level: u32,
    /// The browser client wrote this key as `totalXP`
    #[serde(rename = "totalXP")]
    pub total_xp: u32,
    pub coins: u32,
    /// Skills mastered, keyed by category (e.g. "personal-care")
    pub skills_completed: HashMap<String, Vec<String>>,
    /// Skill currently in progress per category
    pub current_skills: HashMap<String, String>,
    pub buildings_unlocked: Vec<String>,
    pub current_building: String,
    pub completed_buildings: Vec<String>,
    pub good_deeds: Vec<GoodDeed>,
}

impl Default for VillageSave {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            current_level: 1,
            total_xp: 0,
            coins: 0,
            skills_completed: HashMap::new(),
            current_skills: HashMap::new(),
            buildings_unlocked: vec!["home".to_string()],
            current_building: "home".to_string(),
            completed_buildings: Vec::new(),
            good_deeds: Vec::new(),
        }
    }
}

impl VillageSave {
    fn clamp(&mut self) {
        if self.current_level == 0 {
            self.current_level = 1;
        }
        self.buildings_unlocked.dedup();
        // A building cannot be completed without being unlocked
        let unlocked = self.buildings_unlocked.clone();
        self.completed_buildings.retain(|b| unlocked.contains(b));
    }
}

impl_save_state!(VillageSave, "terraVillageProgress");

/// Water-cycle mini-game progress (`terraWaterProgress`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WaterCycleSave {
    pub version: u32,
    /// Stage the player is on (1-based, at most `total_stages`)
    pub current_stage: u32,
    pub total_stages: u32,
    pub xp_per_stage: u32,
    pub base_xp: u32,
}

impl Default for WaterCycleSave {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            current_stage: 1,
            total_stages: 4,
            xp_per_stage: 5,
            base_xp: 60,
        }
    }
}

impl WaterCycleSave {
    fn clamp(&mut self) {
        if self.total_stages == 0 {
            self.total_stages = 4;
        }
        self.current_stage = self.current_stage.clamp(1, self.total_stages);
    }
}

impl_save_state!(WaterCycleSave, "terraWaterProgress");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_blob_merges_with_defaults() {
        // Only two fields persisted; the rest must come from the defaults
        let raw = r#"{"currentLevel": 5, "treasures": 85}"#;
        let save = HistoryLandSave::load(Some(raw)).unwrap();
        assert_eq!(save.current_level, 5);
        assert_eq!(save.treasures, 85);
        assert_eq!(save.current_period, "ancient");
        assert!(save.storyline_progress.is_empty());
    }

    #[test]
    fn test_unknown_fields_are_dropped() {
        let raw = r#"{"currentLesson": 3, "someRemovedField": true}"#;
        let save = MathGalaxySave::load(Some(raw)).unwrap();
        assert_eq!(save.current_lesson, 3);
    }

    #[test]
    fn test_camel_case_field_names_match_browser_blobs() {
        let raw = r#"{
            "currentLevel": 7,
            "totalXP": 1400,
            "tokens": 200,
            "conceptsLearned": {"robotics": ["how-robots-move"]},
            "zonesExplored": ["ai-center"],
            "currentZone": "robot-lab"
        }"#;
        let save = FutureCitySave::load(Some(raw)).unwrap();
        assert_eq!(save.current_level, 7);
        assert_eq!(save.total_xp, 1400);
        assert_eq!(save.tokens, 200);
        assert_eq!(save.current_zone, "robot-lab");
        assert_eq!(
            save.concepts_learned.get("robotics").unwrap(),
            &vec!["how-robots-move".to_string()]
        );
    }

    #[test]
    fn test_water_stage_clamped_into_range() {
        let raw = r#"{"currentStage": 12}"#;
        let save = WaterCycleSave::load(Some(raw)).unwrap();
        assert_eq!(save.current_stage, 4);

        let raw = r#"{"currentStage": 0}"#;
        let save = WaterCycleSave::load(Some(raw)).unwrap();
        assert_eq!(save.current_stage, 1);
    }

    #[test]
    fn test_zero_level_repaired() {
        let raw = r#"{"currentLevel": 0}"#;
        let save = ScienceWorldSave::load(Some(raw)).unwrap();
        assert_eq!(save.current_level, 1);
    }

    #[test]
    fn test_village_completed_requires_unlocked() {
        let raw = r#"{
            "buildingsUnlocked": ["home", "school"],
            "completedBuildings": ["home", "market"]
        }"#;
        let save = VillageSave::load(Some(raw)).unwrap();
        assert_eq!(save.completed_buildings, vec!["home".to_string()]);
    }
}
