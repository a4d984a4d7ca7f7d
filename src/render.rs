use serde::{Deserialize, Serialize};

/// Shadow-map state owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShadowMapSettings {
    pub enabled: bool,
}

/// Renderer handle shared by everything attached to a scene.
///
/// Drawing is done by the host engine; only the state the components toggle
/// lives here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Renderer {
    pub shadow_map: ShadowMapSettings,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns shadow mapping on. Returns `true` when this call changed it.
    pub fn enable_shadow_map(&mut self) -> bool {
        let changed = !self.shadow_map.enabled;
        self.shadow_map.enabled = true;
        changed
    }

    /// Whether shadow mapping has been turned on for this renderer.
    pub fn shadow_map_enabled(&self) -> bool {
        self.shadow_map.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabling_twice_reports_a_single_change() {
        let mut renderer = Renderer::new();
        assert!(!renderer.shadow_map_enabled());
        assert!(renderer.enable_shadow_map());
        assert!(!renderer.enable_shadow_map());
        assert!(renderer.shadow_map_enabled());
    }
}
