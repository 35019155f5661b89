//! Automation workflows and the callback stages they report.
//!
//! Both sets are closed: a request naming anything else is rejected while
//! the payload is parsed, before any outbound call is made.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// A named external automation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Workflow {
    /// Analyse an uploaded reference video.
    IngestUnderstand,
    /// Generate a script from intent and proofs.
    ScriptWriter,
    /// Generate voiceover and avatar media.
    VoiceAvatar,
    Render,
    Publish,
}

impl Workflow {
    pub const ALL: [Workflow; 5] = [
        Self::IngestUnderstand,
        Self::ScriptWriter,
        Self::VoiceAvatar,
        Self::Render,
        Self::Publish,
    ];

    /// Return the wire-format string for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IngestUnderstand => "ingest-understand",
            Self::ScriptWriter => "script-writer",
            Self::VoiceAvatar => "voice-avatar",
            Self::Render => "render",
            Self::Publish => "publish",
        }
    }

    /// Webhook path appended to the automation base URL.
    pub fn webhook_path(&self) -> &'static str {
        match self {
            Self::IngestUnderstand => "/ingest",
            Self::ScriptWriter => "/script",
            Self::VoiceAvatar => "/voice",
            Self::Render => "/render",
            Self::Publish => "/publish",
        }
    }

    /// Parse from a wire-format string.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid workflow: '{s}'. Must be one of: ingest-understand, \
                     script-writer, voice-avatar, render, publish"
                ))
            })
    }
}

impl std::fmt::Display for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CallbackStage
// ---------------------------------------------------------------------------

/// A completion event reported by the automation system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallbackStage {
    IngestComplete,
    ScriptComplete,
    VoiceComplete,
    AvatarComplete,
    RenderComplete,
    PublishComplete,
    Error,
}

impl CallbackStage {
    pub const ALL: [CallbackStage; 7] = [
        Self::IngestComplete,
        Self::ScriptComplete,
        Self::VoiceComplete,
        Self::AvatarComplete,
        Self::RenderComplete,
        Self::PublishComplete,
        Self::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IngestComplete => "ingest-complete",
            Self::ScriptComplete => "script-complete",
            Self::VoiceComplete => "voice-complete",
            Self::AvatarComplete => "avatar-complete",
            Self::RenderComplete => "render-complete",
            Self::PublishComplete => "publish-complete",
            Self::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid stage: '{s}'. Must be one of: ingest-complete, script-complete, \
                     voice-complete, avatar-complete, render-complete, publish-complete, error"
                ))
            })
    }
}

impl std::fmt::Display for CallbackStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
