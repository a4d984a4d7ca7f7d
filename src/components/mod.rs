//! Declarative components that keep a scene object in sync with their
//! attribute snapshots.

pub mod shadow_light;
pub mod shadow_plane;

pub use shadow_light::{LightConfig, LightField, ShadowLightComponent, UpdatePolicy};
pub use shadow_plane::{PlaneConfig, PlaneField, ShadowPlaneComponent};

/// Lifecycle callbacks the host drives for an attached component.
///
/// `initialize` runs once on attach, `update` on every attribute change with
/// the previous and the new snapshot, and `remove` on detach. `update` and
/// `remove` must be safe to call when nothing is live.
pub trait Reconciler {
    type Config;

    fn initialize(&mut self, config: &Self::Config);

    fn update(&mut self, old: &Self::Config, new: &Self::Config);

    fn remove(&mut self);

    /// Whether the component currently owns a live scene object.
    fn is_live(&self) -> bool;
}
