//! Scenes: the ~5 second units a video script is made of.
//!
//! Scenes arrive from the external script-writer workflow and are never
//! edited afterwards. Wire field names stay snake_case because that is the
//! shape the workflow produces.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One timed unit of video content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub scene_id: String,
    pub voiceover: String,
    /// What is shown on screen while the voiceover plays.
    pub on_screen: String,
    /// Reference to a proof asset backing this scene, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_asset_id: Option<String>,
    /// Words rendered with kinetic emphasis.
    #[serde(default)]
    pub emphasis_words: Vec<String>,
}

impl Scene {
    /// Split the voiceover into display words.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.voiceover.split_whitespace()
    }

    /// Whether `word` should be rendered with emphasis.
    pub fn is_emphasized(&self, word: &str) -> bool {
        is_emphasized(word, &self.emphasis_words)
    }
}

/// A word is emphasised when any non-empty emphasis token is a
/// case-insensitive substring of it.
pub fn is_emphasized(word: &str, emphasis_words: &[String]) -> bool {
    let lowered = word.to_lowercase();
    emphasis_words
        .iter()
        .map(|token| token.trim())
        .filter(|token| !token.is_empty())
        .any(|token| lowered.contains(&token.to_lowercase()))
}

/// Validate a scene list: ids must be non-empty and unique.
pub fn validate_scenes(scenes: &[Scene]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(scenes.len());
    for (index, scene) in scenes.iter().enumerate() {
        if scene.scene_id.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Scene at index {index} has an empty scene_id"
            )));
        }
        if !seen.insert(scene.scene_id.as_str()) {
            return Err(CoreError::Validation(format!(
                "Duplicate scene_id '{}'",
                scene.scene_id
            )));
        }
    }
    Ok(())
}

fn sample(scene_id: &str, voiceover: &str, on_screen: &str, emphasis: [&str; 2]) -> Scene {
    Scene {
        scene_id: scene_id.to_string(),
        voiceover: voiceover.to_string(),
        on_screen: on_screen.to_string(),
        proof_asset_id: None,
        emphasis_words: emphasis.iter().map(|w| w.to_string()).collect(),
    }
}

/// The five-beat sample script used for previews when no project script
/// exists yet.
pub fn sample_scenes() -> Vec<Scene> {
    vec![
        sample(
            "hook",
            "Here's what just happened and why it matters to you.",
            "Hook visual with bold text",
            ["happened", "matters"],
        ),
        sample(
            "context",
            "The context you need to understand this.",
            "Context explanation",
            ["context", "understand"],
        ),
        sample(
            "insight",
            "The key insight that changes everything.",
            "Main insight visual",
            ["insight", "changes"],
        ),
        sample(
            "implication",
            "What this means for you going forward.",
            "Implication breakdown",
            ["means", "forward"],
        ),
        sample(
            "close",
            "Follow for more insights like this.",
            "Call to action",
            ["Follow", "insights"],
        ),
    ]
}
