//! Scene slot allocation on the composition timeline.

use serde::Serialize;

use super::FRAMES_PER_SCENE;

/// The half-open frame range `[start_frame, end_frame)` owned by one scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSlot {
    pub index: usize,
    pub scene_id: String,
    pub start_frame: u32,
    pub end_frame: u32,
}

impl SceneSlot {
    pub fn duration_in_frames(&self) -> u32 {
        self.end_frame - self.start_frame
    }
}

/// Total composition length for `scene_count` scenes.
pub fn total_duration_frames(scene_count: usize) -> u32 {
    u32::try_from(scene_count)
        .unwrap_or(u32::MAX)
        .saturating_mul(FRAMES_PER_SCENE)
}

/// Allocate consecutive fixed-length slots, one per scene id.
pub fn allocate_slots<'a>(scene_ids: impl IntoIterator<Item = &'a str>) -> Vec<SceneSlot> {
    scene_ids
        .into_iter()
        .enumerate()
        .map(|(index, scene_id)| {
            let start_frame = total_duration_frames(index);
            SceneSlot {
                index,
                scene_id: scene_id.to_string(),
                start_frame,
                end_frame: start_frame.saturating_add(FRAMES_PER_SCENE),
            }
        })
        .collect()
}

/// Locate the scene owning `frame`: `(scene index, frame within the scene)`.
///
/// Returns `None` when `frame` is past the end of the composition.
pub fn locate_frame(frame: u32, scene_count: usize) -> Option<(usize, u32)> {
    if frame >= total_duration_frames(scene_count) {
        return None;
    }
    let index = (frame / FRAMES_PER_SCENE) as usize;
    Some((index, frame % FRAMES_PER_SCENE))
}
