//! Turns on shadow mapping once the AR subsystem reports it is ready.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::handle::SceneHandle;

/// One-shot flag an AR subsystem sets when it becomes ready.
#[derive(Debug, Clone, Default)]
pub struct ReadySignal {
    fired: Arc<AtomicBool>,
}

impl ReadySignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self) {
        self.fired.store(true, Ordering::Release);
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

/// What the activator needs from the AR subsystem.
pub trait ArSystem {
    fn is_ready(&self) -> bool;

    /// Registers a signal fired once when the subsystem becomes ready.
    fn on_ready(&mut self) -> ReadySignal;
}

/// In-process AR subsystem whose readiness is driven by the host.
#[derive(Debug, Default)]
pub struct ArSession {
    ready: bool,
    listeners: Vec<ReadySignal>,
}

impl ArSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the session ready and fires every pending listener once.
    pub fn mark_ready(&mut self) {
        self.ready = true;
        for listener in self.listeners.drain(..) {
            listener.fire();
        }
    }

    pub fn pending_listeners(&self) -> usize {
        self.listeners.len()
    }
}

impl ArSystem for ArSession {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn on_ready(&mut self) -> ReadySignal {
        let signal = ReadySignal::new();
        if self.ready {
            signal.fire();
        } else {
            self.listeners.push(signal.clone());
        }
        signal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivatorOptions {
    /// Delay before trying again when no scene is active.
    pub retry_interval: Duration,
}

impl Default for ActivatorOptions {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ActivatorState {
    /// `on_load` has not run yet.
    Idle,
    /// Waiting for the AR subsystem to fire its ready signal.
    AwaitingAr(ReadySignal),
    /// AR is ready; waiting for an active scene. `None` means try now.
    AwaitingScene { next_attempt: Option<Instant> },
    /// Shadow mapping was enabled. Terminal.
    Applied,
}

/// Enables shadow mapping on the active scene's renderer after AR readiness,
/// exactly once.
///
/// The host calls [`on_load`](Self::on_load) when the environment loads and
/// [`poll`](Self::poll) from its update loop.
#[derive(Debug)]
pub struct ShadowMapActivator {
    options: ActivatorOptions,
    state: ActivatorState,
}

impl Default for ShadowMapActivator {
    fn default() -> Self {
        Self::new(ActivatorOptions::default())
    }
}

impl ShadowMapActivator {
    pub fn new(options: ActivatorOptions) -> Self {
        Self {
            options,
            state: ActivatorState::Idle,
        }
    }

    pub fn state(&self) -> &ActivatorState {
        &self.state
    }

    pub fn is_applied(&self) -> bool {
        matches!(self.state, ActivatorState::Applied)
    }

    pub fn on_load(&mut self, ar: &mut dyn ArSystem) {
        if !matches!(self.state, ActivatorState::Idle) {
            return;
        }
        self.state = if ar.is_ready() {
            ActivatorState::AwaitingScene { next_attempt: None }
        } else {
            debug!("AR subsystem not ready, waiting for its signal");
            ActivatorState::AwaitingAr(ar.on_ready())
        };
    }

    /// Advances the activator. Returns `true` once shadow mapping has been
    /// applied.
    pub fn poll(&mut self, now: Instant, active_scene: Option<&SceneHandle>) -> bool {
        if let ActivatorState::AwaitingAr(signal) = &self.state {
            if !signal.is_fired() {
                return false;
            }
            self.state = ActivatorState::AwaitingScene { next_attempt: None };
        }

        if let ActivatorState::AwaitingScene { next_attempt } = self.state {
            if next_attempt.is_some_and(|at| now < at) {
                return false;
            }
            match active_scene {
                Some(scene) => {
                    scene.enable_shadow_map();
                    info!("AR ready, shadow mapping enabled");
                    self.state = ActivatorState::Applied;
                }
                None => {
                    debug!(
                        "no active scene, retrying in {:?}",
                        self.options.retry_interval
                    );
                    self.state = ActivatorState::AwaitingScene {
                        next_attempt: Some(now + self.options.retry_interval),
                    };
                }
            }
        }

        self.is_applied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_immediately_when_ar_is_already_ready() {
        let mut session = ArSession::new();
        session.mark_ready();
        let scene = SceneHandle::new();
        let mut activator = ShadowMapActivator::default();
        activator.on_load(&mut session);

        assert!(activator.poll(Instant::now(), Some(&scene)));
        assert!(scene.shadow_map_enabled());
        assert_eq!(session.pending_listeners(), 0);
    }

    #[test]
    fn waits_for_the_ready_signal() {
        let mut session = ArSession::new();
        let scene = SceneHandle::new();
        let mut activator = ShadowMapActivator::default();
        activator.on_load(&mut session);
        assert_eq!(session.pending_listeners(), 1);

        let now = Instant::now();
        assert!(!activator.poll(now, Some(&scene)));
        assert!(!scene.shadow_map_enabled());

        session.mark_ready();
        assert!(activator.poll(now, Some(&scene)));
        assert!(scene.shadow_map_enabled());
    }

    #[test]
    fn retries_after_interval_without_active_scene() {
        let mut session = ArSession::new();
        session.mark_ready();
        let options = ActivatorOptions {
            retry_interval: Duration::from_millis(250),
        };
        let mut activator = ShadowMapActivator::new(options);
        activator.on_load(&mut session);

        let start = Instant::now();
        assert!(!activator.poll(start, None));
        let scene = SceneHandle::new();
        assert!(!activator.poll(start + Duration::from_millis(100), Some(&scene)));
        assert!(!scene.shadow_map_enabled());
        assert!(activator.poll(start + Duration::from_millis(250), Some(&scene)));
        assert!(scene.shadow_map_enabled());
    }

    #[test]
    fn never_reapplies_after_success() {
        let mut session = ArSession::new();
        session.mark_ready();
        let first = SceneHandle::new();
        let second = SceneHandle::new();
        let mut activator = ShadowMapActivator::default();
        activator.on_load(&mut session);
        assert!(activator.poll(Instant::now(), Some(&first)));

        activator.on_load(&mut session);
        assert!(activator.poll(Instant::now(), Some(&second)));
        assert!(!second.shadow_map_enabled());
    }
}
