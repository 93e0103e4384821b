/*
 * Input Module
 *
 * This module maps keyboard keys to the viewer's actions and applies them.
 *
 * Keys:
 * - Y/U/I/O/P: force, repel, attract, follow and friend debug lines
 * - B: world axes
 * - Z: zoom the camera in or out
 * - F: fullscreen
 */

use crate::camera::CameraController;
use crate::debug::DebugConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    ToggleForceLine,
    ToggleRepelLines,
    ToggleAttractLine,
    ToggleFollowLine,
    ToggleFriendLines,
    ToggleAxis,
    Zoom,
    ToggleFullscreen,
}

// What an action changed, so the caller knows what to persist or forward
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionEffect {
    ConfigChanged,
    CameraChanged,
    FullscreenToggled,
}

impl KeyAction {
    pub fn from_key(key: char) -> Option<Self> {
        let action = match key.to_ascii_uppercase() {
            'Y' => Self::ToggleForceLine,
            'U' => Self::ToggleRepelLines,
            'I' => Self::ToggleAttractLine,
            'O' => Self::ToggleFollowLine,
            'P' => Self::ToggleFriendLines,
            'B' => Self::ToggleAxis,
            'Z' => Self::Zoom,
            'F' => Self::ToggleFullscreen,
            _ => return None,
        };
        Some(action)
    }

    pub fn apply(self, config: &mut DebugConfig, camera: &mut CameraController) -> ActionEffect {
        match self {
            Self::ToggleForceLine => config.toggle_force_line(),
            Self::ToggleRepelLines => config.toggle_repel_line(),
            Self::ToggleAttractLine => config.toggle_attract_line(),
            Self::ToggleFollowLine => config.toggle_follow_line(),
            Self::ToggleFriendLines => config.toggle_friend_lines(),
            Self::ToggleAxis => config.toggle_axis(),
            Self::Zoom => {
                camera.zoom();
                return ActionEffect::CameraChanged;
            }
            Self::ToggleFullscreen => return ActionEffect::FullscreenToggled,
        }
        ActionEffect::ConfigChanged
    }
}
