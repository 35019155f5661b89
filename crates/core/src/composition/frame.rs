//! Per-frame layout of a single scene.
//!
//! [`layout_scene`] describes everything a rasteriser needs to draw one
//! frame of a scene: overall opacity, the slide-up offset of the text
//! block, and the style of every voiceover word.

use serde::Serialize;

use super::animation::{interpolate, spring, Easing, SpringConfig};
use crate::scene::Scene;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const FADE_IN_SECONDS: f64 = 0.5;
pub const FADE_OUT_START_SECONDS: f64 = 4.0;
pub const FADE_OUT_SECONDS: f64 = 1.0;

/// Initial downward offset of the text block, in pixels.
pub const SLIDE_DISTANCE_PX: f64 = 30.0;

/// Delay between consecutive words starting to fade in.
pub const WORD_STAGGER_FRAMES: f64 = 2.0;

pub const TEXT_COLOR: &str = "#ffffff";
pub const EMPHASIS_COLOR: &str = "#60a5fa";
pub const TEXT_WEIGHT: u16 = 700;
pub const EMPHASIS_WEIGHT: u16 = 900;

pub const EMPHASIS_SPRING: SpringConfig = SpringConfig {
    damping: 12.0,
    stiffness: 200.0,
    mass: 1.0,
};

const GRADIENT_HOOK: &str = "linear-gradient(135deg, #1a1a2e 0%, #16213e 50%, #0f3460 100%)";
const GRADIENT_CONTEXT: &str = "linear-gradient(135deg, #0f0f1a 0%, #1a1a2e 50%, #2d2d44 100%)";
const GRADIENT_INSIGHT: &str = "linear-gradient(135deg, #1a0a2e 0%, #2d1b4e 50%, #4a2c7a 100%)";
const GRADIENT_IMPLICATION: &str =
    "linear-gradient(135deg, #0a1a2e 0%, #1b3d4e 50%, #2c5a7a 100%)";
const GRADIENT_CLOSE: &str = "linear-gradient(135deg, #1a2e0a 0%, #2d4e1b 50%, #4a7a2c 100%)";

/// Background for a scene id; unknown ids get the hook gradient.
pub fn background_gradient(scene_id: &str) -> &'static str {
    match scene_id {
        "hook" => GRADIENT_HOOK,
        "context" => GRADIENT_CONTEXT,
        "insight" => GRADIENT_INSIGHT,
        "implication" => GRADIENT_IMPLICATION,
        "close" => GRADIENT_CLOSE,
        _ => GRADIENT_HOOK,
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordFrame {
    pub text: String,
    pub emphasized: bool,
    pub opacity: f64,
    pub color: &'static str,
    pub font_weight: u16,
    /// 1.0 for plain words; emphasised words follow the spring.
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneFrame {
    pub scene_id: String,
    pub scene_index: usize,
    pub total_scenes: usize,
    /// Position badge, e.g. `"2/5"`.
    pub indicator: String,
    pub local_frame: f64,
    pub opacity: f64,
    pub slide_up_px: f64,
    pub background: &'static str,
    pub words: Vec<WordFrame>,
    pub on_screen: String,
}

/// Lay out `scene` at `local_frame` frames after its slot starts.
pub fn layout_scene(
    scene: &Scene,
    scene_index: usize,
    total_scenes: usize,
    local_frame: f64,
    fps: f64,
) -> SceneFrame {
    let fade_in = fps * FADE_IN_SECONDS;
    let fade_out_start = fps * FADE_OUT_START_SECONDS;
    let fade_out_end = fade_out_start + fps * FADE_OUT_SECONDS;

    let opacity = interpolate(
        local_frame,
        &[0.0, fade_in, fade_out_start, fade_out_end],
        &[0.0, 1.0, 1.0, 0.0],
        Easing::Linear,
    );

    let slide_up_px = interpolate(
        local_frame,
        &[0.0, fade_in],
        &[SLIDE_DISTANCE_PX, 0.0],
        Easing::OutCubic,
    );

    let emphasis_scale = spring(local_frame - fade_in / 2.0, fps, EMPHASIS_SPRING);

    let words = scene
        .words()
        .enumerate()
        .map(|(i, text)| {
            let delay = i as f64 * WORD_STAGGER_FRAMES;
            let word_opacity = interpolate(
                local_frame,
                &[delay, delay + fade_in / 2.0],
                &[0.0, 1.0],
                Easing::Linear,
            );
            let emphasized = scene.is_emphasized(text);
            WordFrame {
                text: text.to_string(),
                emphasized,
                opacity: word_opacity,
                color: if emphasized { EMPHASIS_COLOR } else { TEXT_COLOR },
                font_weight: if emphasized { EMPHASIS_WEIGHT } else { TEXT_WEIGHT },
                scale: if emphasized { emphasis_scale } else { 1.0 },
            }
        })
        .collect();

    SceneFrame {
        scene_id: scene.scene_id.clone(),
        scene_index,
        total_scenes,
        indicator: format!("{}/{}", scene_index + 1, total_scenes),
        local_frame,
        opacity,
        slide_up_px,
        background: background_gradient(&scene.scene_id),
        words,
        on_screen: scene.on_screen.clone(),
    }
}
