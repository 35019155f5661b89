//! Vertical short-form video composition.
//!
//! A composition is an ordered list of scenes laid end to end in fixed
//! five-second slots. Every frame is a pure function of the frame number and
//! the scene list, so frames can be computed independently and in parallel.

pub mod animation;
pub mod frame;
pub mod timing;

use serde::Serialize;

use crate::error::CoreError;
use crate::scene::{validate_scenes, Scene};

pub use frame::{SceneFrame, WordFrame};
pub use timing::SceneSlot;

/// Composition identifier reported to renderers.
pub const COMPOSITION_ID: &str = "VideoComposition";

/// 9:16 vertical canvas.
pub const VIDEO_WIDTH: u32 = 1080;
pub const VIDEO_HEIGHT: u32 = 1920;
pub const FPS: u32 = 30;

pub const SCENE_DURATION_SECONDS: u32 = 5;
pub const FRAMES_PER_SCENE: u32 = SCENE_DURATION_SECONDS * FPS;

/// Static description of a composition: canvas, duration and slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionMetadata {
    pub id: &'static str,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub duration_in_frames: u32,
    pub slots: Vec<SceneSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Layout of one composition frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionFrame {
    pub frame: u32,
    pub scene: SceneFrame,
}

/// A validated, immutable scene sequence ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoComposition {
    scenes: Vec<Scene>,
    audio_url: Option<String>,
    avatar_url: Option<String>,
}

impl VideoComposition {
    /// Build a composition. The scene list must be non-empty with unique ids.
    pub fn new(scenes: Vec<Scene>, audio_url: Option<String>) -> Result<Self, CoreError> {
        if scenes.is_empty() {
            return Err(CoreError::Validation(
                "A composition needs at least one scene".to_string(),
            ));
        }
        validate_scenes(&scenes)?;
        Ok(Self {
            scenes,
            audio_url,
            avatar_url: None,
        })
    }

    /// Attach an avatar overlay video.
    pub fn with_avatar(mut self, avatar_url: Option<String>) -> Self {
        self.avatar_url = avatar_url;
        self
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn audio_url(&self) -> Option<&str> {
        self.audio_url.as_deref()
    }

    pub fn duration_in_frames(&self) -> u32 {
        timing::total_duration_frames(self.scenes.len())
    }

    pub fn slots(&self) -> Vec<SceneSlot> {
        timing::allocate_slots(self.scenes.iter().map(|s| s.scene_id.as_str()))
    }

    pub fn metadata(&self) -> CompositionMetadata {
        CompositionMetadata {
            id: COMPOSITION_ID,
            width: VIDEO_WIDTH,
            height: VIDEO_HEIGHT,
            fps: FPS,
            duration_in_frames: self.duration_in_frames(),
            slots: self.slots(),
            audio_url: self.audio_url.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }

    /// Lay out `frame`, or `None` when it lies past the end.
    pub fn frame(&self, frame: u32) -> Option<CompositionFrame> {
        let (index, local) = timing::locate_frame(frame, self.scenes.len())?;
        let scene = self::frame::layout_scene(
            &self.scenes[index],
            index,
            self.scenes.len(),
            f64::from(local),
            f64::from(FPS),
        );
        Some(CompositionFrame { frame, scene })
    }
}
