//! Project state model and lifecycle.
//!
//! A project tracks one video from the raw idea to the published output.
//! Each lifecycle stage owns an optional sub-record that is filled in as the
//! project advances; [`ProjectState::validate`] checks that no sub-record
//! is present before its stage has been reached.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::scene::{validate_scenes, Scene};
use crate::types::{ProjectId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Prefix of every generated project id.
pub const PROJECT_ID_PREFIX: &str = "proj_";

/// Number of random base36 characters appended to a project id.
pub const PROJECT_ID_SUFFIX_LEN: usize = 6;

/// Maximum length of the raw idea text.
pub const MAX_IDEA_LENGTH: usize = 5_000;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// ---------------------------------------------------------------------------
// Project ids
// ---------------------------------------------------------------------------

/// Render a non-negative integer in lowercase base36.
pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Generate a project id of the form `proj_<base36 millis>_<6 base36 chars>`.
///
/// Ids are unique only with high probability; the store rejects an insert
/// that collides with an existing id.
pub fn generate_project_id(now: Timestamp) -> ProjectId {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    let mut rng = rand::rng();
    let suffix: String = (0..PROJECT_ID_SUFFIX_LEN)
        .map(|_| BASE36_DIGITS[rng.random_range(0..36)] as char)
        .collect();
    format!("{PROJECT_ID_PREFIX}{}_{suffix}", to_base36(millis))
}

// ---------------------------------------------------------------------------
// ProjectStatus
// ---------------------------------------------------------------------------

/// Lifecycle stage of a project. Variants are ordered: a project only ever
/// moves towards `Published` except through [`ProjectState::reset_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Draft,
    Intent,
    Proof,
    Script,
    Preview,
    Rendering,
    Published,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 7] = [
        Self::Draft,
        Self::Intent,
        Self::Proof,
        Self::Script,
        Self::Preview,
        Self::Rendering,
        Self::Published,
    ];

    /// Return the wire-format string for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Intent => "intent",
            Self::Proof => "proof",
            Self::Script => "script",
            Self::Preview => "preview",
            Self::Rendering => "rendering",
            Self::Published => "published",
        }
    }

    /// Parse from a wire-format string.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid status: '{s}'. Must be one of: draft, intent, proof, script, \
                     preview, rendering, published"
                ))
            })
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Insightful,
    Contrarian,
    Calm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Audience {
    Builders,
    General,
    IndiaFirst,
}

/// Target video length in seconds. Serialised as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum TargetLength {
    Short,
    Medium,
    Long,
}

impl TargetLength {
    pub fn seconds(self) -> u16 {
        match self {
            Self::Short => 30,
            Self::Medium => 45,
            Self::Long => 60,
        }
    }
}

impl TryFrom<u16> for TargetLength {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            30 => Ok(Self::Short),
            45 => Ok(Self::Medium),
            60 => Ok(Self::Long),
            other => Err(format!(
                "invalid targetLength {other}, expected one of 30, 45, 60"
            )),
        }
    }
}

impl From<TargetLength> for u16 {
    fn from(value: TargetLength) -> Self {
        value.seconds()
    }
}

/// What the video is about and how it should sound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub raw_idea: String,
    pub intent_statement: String,
    pub tone: Tone,
    pub audience: Audience,
    pub target_length: TargetLength,
    pub confirmed: bool,
}

impl Intent {
    /// Intake defaults: insightful, builders, 45 seconds, unconfirmed.
    pub fn from_idea(raw_idea: &str) -> Self {
        Self {
            raw_idea: raw_idea.trim().to_string(),
            intent_statement: String::new(),
            tone: Tone::Insightful,
            audience: Audience::Builders,
            target_length: TargetLength::Medium,
            confirmed: false,
        }
    }
}

/// Partial edit of a project's intent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentUpdate {
    pub raw_idea: Option<String>,
    pub intent_statement: Option<String>,
    pub tone: Option<Tone>,
    pub audience: Option<Audience>,
    pub target_length: Option<TargetLength>,
    pub confirmed: Option<bool>,
}

// ---------------------------------------------------------------------------
// Proofs, script, preview, output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofType {
    Video,
    Screenshot,
    Tweet,
    Article,
}

/// A credibility asset quoted in the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    pub id: String,
    #[serde(rename = "type")]
    pub proof_type: ProofType,
    pub url: String,
    pub key_line: String,
    pub credibility_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

/// Frame ranges of the five narrative beats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatMap {
    pub hook: [u32; 2],
    pub context: [u32; 2],
    pub insight: [u32; 2],
    pub implication: [u32; 2],
    pub close: [u32; 2],
}

impl BeatMap {
    fn beats(&self) -> [(&'static str, [u32; 2]); 5] {
        [
            ("hook", self.hook),
            ("context", self.context),
            ("insight", self.insight),
            ("implication", self.implication),
            ("close", self.close),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptScores {
    pub clarity: f64,
    pub flow: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub scenes: Vec<Scene>,
    pub beat_map: BeatMap,
    pub scores: ScriptScores,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub blueprint_url: String,
    #[serde(default)]
    pub scene_approvals: BTreeMap<String, bool>,
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    pub video_url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub platform_urls: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

// ---------------------------------------------------------------------------
// Workflow results without a stage of their own
// ---------------------------------------------------------------------------

/// Analysis of the uploaded reference video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, alias = "scenes", skip_serializing_if = "Vec::is_empty")]
    pub detected_scenes: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_moments: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ocr_text: Vec<String>,
    /// Anything else the analysis workflow reported.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Generated voiceover and avatar media.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAssets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voiceover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voiceover_duration_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// The most recent failure reported by the automation system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
    pub occurred_at: Timestamp,
}

// ---------------------------------------------------------------------------
// ProjectState
// ---------------------------------------------------------------------------

/// The complete persisted record of one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    pub id: ProjectId,
    pub status: ProjectStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proofs: Option<Vec<Proof>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<Script>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<Preview>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Output>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ReferenceAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaAssets>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<WorkflowFailure>,
}

impl ProjectState {
    /// A fresh draft with no stage data.
    pub fn new(id: impl Into<ProjectId>, now: Timestamp) -> Self {
        Self {
            id: id.into(),
            status: ProjectStatus::Draft,
            created_at: now,
            updated_at: now,
            intent: None,
            proofs: None,
            script: None,
            preview: None,
            output: None,
            reference_video_url: None,
            analysis: None,
            media: None,
            last_error: None,
        }
    }

    /// Refresh `updated_at`. Every mutation goes through here.
    pub fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
    }

    /// Attach the intake default intent for `raw_idea`.
    pub fn set_default_intent(&mut self, raw_idea: &str, now: Timestamp) -> Result<(), CoreError> {
        validate_idea(raw_idea)?;
        self.intent = Some(Intent::from_idea(raw_idea));
        self.touch(now);
        Ok(())
    }

    /// Move forward to `target`. Staying at the current status is allowed;
    /// moving backwards is a conflict.
    pub fn advance_to(&mut self, target: ProjectStatus, now: Timestamp) -> Result<(), CoreError> {
        if target < self.status {
            return Err(CoreError::Conflict(format!(
                "Project {} is already at '{}' and cannot move back to '{target}'",
                self.id, self.status
            )));
        }
        self.status = target;
        self.touch(now);
        Ok(())
    }

    /// Move back to `target`, dropping data that belongs to later stages.
    pub fn reset_to(&mut self, target: ProjectStatus, now: Timestamp) -> Result<(), CoreError> {
        if target > self.status {
            return Err(CoreError::Conflict(format!(
                "Cannot reset project {} forward from '{}' to '{target}'",
                self.id, self.status
            )));
        }
        if target < ProjectStatus::Intent {
            if let Some(intent) = self.intent.as_mut() {
                intent.confirmed = false;
            }
        }
        if target < ProjectStatus::Proof {
            self.proofs = None;
        }
        if target < ProjectStatus::Script {
            self.script = None;
            self.media = None;
        }
        if target < ProjectStatus::Preview {
            self.preview = None;
        }
        if target < ProjectStatus::Rendering {
            self.output = None;
        }
        self.status = target;
        self.touch(now);
        Ok(())
    }

    /// Apply a partial intent edit. Confirming advances the project to the
    /// intent stage if it has not got there yet.
    pub fn apply_intent_update(
        &mut self,
        update: IntentUpdate,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        if let Some(raw) = update.raw_idea.as_deref() {
            validate_idea(raw)?;
        }
        let intent = match (self.intent.take(), update.raw_idea.as_deref()) {
            (Some(mut intent), raw) => {
                if let Some(raw) = raw {
                    intent.raw_idea = raw.trim().to_string();
                }
                intent
            }
            (None, Some(raw)) => Intent::from_idea(raw),
            (None, None) => {
                return Err(CoreError::Validation(
                    "Project has no intent yet; provide rawIdea".to_string(),
                ))
            }
        };
        let intent = self.intent.insert(intent);

        if let Some(statement) = update.intent_statement {
            intent.intent_statement = statement.trim().to_string();
        }
        if let Some(tone) = update.tone {
            intent.tone = tone;
        }
        if let Some(audience) = update.audience {
            intent.audience = audience;
        }
        if let Some(target_length) = update.target_length {
            intent.target_length = target_length;
        }
        if let Some(confirmed) = update.confirmed {
            intent.confirmed = confirmed;
        }
        let confirmed = intent.confirmed;

        if confirmed && self.status < ProjectStatus::Intent {
            self.advance_to(ProjectStatus::Intent, now)?;
        } else {
            self.touch(now);
        }
        Ok(())
    }

    /// Check stage/sub-record consistency and value ranges.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(intent) = &self.intent {
            if intent.confirmed {
                self.require_stage(ProjectStatus::Intent, "a confirmed intent")?;
            }
        }
        if let Some(proofs) = &self.proofs {
            self.require_stage(ProjectStatus::Proof, "proofs")?;
            for proof in proofs {
                validate_score("credibilityScore", proof.credibility_score)?;
            }
        }
        if let Some(script) = &self.script {
            self.require_stage(ProjectStatus::Script, "a script")?;
            validate_script(script)?;
        }
        if self.preview.is_some() {
            self.require_stage(ProjectStatus::Preview, "a preview")?;
        }
        if let Some(output) = &self.output {
            self.require_stage(ProjectStatus::Rendering, "an output")?;
            if let Some(rating) = output.rating {
                if !(1..=5).contains(&rating) {
                    return Err(CoreError::Validation(format!(
                        "rating must be between 1 and 5, got {rating}"
                    )));
                }
            }
        }
        if self.updated_at < self.created_at {
            return Err(CoreError::Validation(
                "updatedAt must not precede createdAt".to_string(),
            ));
        }
        Ok(())
    }

    fn require_stage(&self, stage: ProjectStatus, what: &str) -> Result<(), CoreError> {
        if self.status < stage {
            return Err(CoreError::Validation(format!(
                "Project {} has {what} but its status is '{}' (requires '{stage}' or later)",
                self.id, self.status
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate idea text: non-empty after trimming and within length limit.
pub fn validate_idea(raw_idea: &str) -> Result<(), CoreError> {
    let trimmed = raw_idea.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Idea must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_IDEA_LENGTH {
        return Err(CoreError::Validation(format!(
            "Idea exceeds maximum length of {MAX_IDEA_LENGTH} characters"
        )));
    }
    Ok(())
}

fn validate_score(name: &str, value: f64) -> Result<(), CoreError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}

/// Validate a script: scenes, beat-map ranges and score ranges.
pub fn validate_script(script: &Script) -> Result<(), CoreError> {
    validate_scenes(&script.scenes)?;
    for (name, [start, end]) in script.beat_map.beats() {
        if start > end {
            return Err(CoreError::Validation(format!(
                "beatMap.{name} starts at frame {start} after it ends at frame {end}"
            )));
        }
    }
    validate_score("scores.clarity", script.scores.clarity)?;
    validate_score("scores.flow", script.scores.flow)?;
    validate_score("scores.confidence", script.scores.confidence)?;
    Ok(())
}
