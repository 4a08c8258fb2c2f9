//! Platform abstraction layer
//!
//! The engine never touches the DOM. It emits `GameEvent`s and the host
//! routes them to two gateways:
//! - `Presenter`: target visuals, HUD, screens
//! - `Feedback`: sound cues and haptic pulses (fire-and-forget)

use glam::Vec2;

use crate::settings::Settings;
use crate::sim::{GameEvent, Hud, Screen, Target};
use crate::stats::SessionSummary;

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Presentation gateway
pub trait Presenter {
    fn show_screen(&mut self, screen: Screen);
    fn render_target(&mut self, target: &Target);
    fn update_target_visual(&mut self, id: u32, pos: Vec2, size: f32);
    fn remove_target_visual(&mut self, id: u32);
    fn set_hud(&mut self, hud: &Hud);
    fn show_hint(&mut self, text: &str);
    fn show_toast(&mut self, text: &str);
    /// Start (or hide, with `None`) the time-to-hit bar
    fn set_pace(&mut self, duration_ms: Option<f64>);
    fn flash_miss_feedback(&mut self);
    fn show_summary(&mut self, summary: &SessionSummary);
}

/// Audio and haptics gateway; implementations must never panic
pub trait Feedback {
    fn play_hit_cue(&mut self);
    fn play_miss_cue(&mut self);
    fn light_pulse(&mut self);
    fn error_pulse(&mut self);
}

/// Feedback sink that does nothing (native, tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFeedback;

impl Feedback for NoFeedback {
    fn play_hit_cue(&mut self) {}
    fn play_miss_cue(&mut self) {}
    fn light_pulse(&mut self) {}
    fn error_pulse(&mut self) {}
}

/// Dispatch drained engine events to the gateways, honoring settings
pub fn route<P, F>(
    events: impl IntoIterator<Item = GameEvent>,
    presenter: &mut P,
    feedback: &mut F,
    settings: &Settings,
) where
    P: Presenter + ?Sized,
    F: Feedback + ?Sized,
{
    for event in events {
        match event {
            GameEvent::ShowScreen(screen) => presenter.show_screen(screen),
            GameEvent::TargetSpawned(target) => presenter.render_target(&target),
            GameEvent::TargetMoved { id, pos, size } => {
                presenter.update_target_visual(id, pos, size)
            }
            GameEvent::TargetRemoved { id, .. } => presenter.remove_target_visual(id),
            GameEvent::Hud(hud) => presenter.set_hud(&hud),
            GameEvent::Hint(text) => presenter.show_hint(text),
            GameEvent::Toast(text) => presenter.show_toast(text),
            GameEvent::Pace(duration) => {
                presenter.set_pace(duration.filter(|_| settings.show_pace_bar));
            }
            GameEvent::PhaseStarted(_) => {
                if settings.haptics {
                    feedback.light_pulse();
                }
            }
            GameEvent::Hit { .. } => {
                if settings.sound {
                    feedback.play_hit_cue();
                }
                if settings.haptics {
                    feedback.light_pulse();
                }
            }
            GameEvent::Miss(_) => {
                if settings.sound {
                    feedback.play_miss_cue();
                }
                if settings.haptics {
                    feedback.error_pulse();
                }
                if settings.effective_miss_flash() {
                    presenter.flash_miss_feedback();
                }
            }
            GameEvent::SessionEnded(summary) => presenter.show_summary(&summary),
        }
    }
}

/// Presenter that writes to the log (headless runs)
#[derive(Debug, Default)]
pub struct LogPresenter {
    /// Live target ids, for sanity checks
    pub visible: Vec<u32>,
}

impl Presenter for LogPresenter {
    fn show_screen(&mut self, screen: Screen) {
        log::info!("[screen] {:?}", screen);
    }

    fn render_target(&mut self, target: &Target) {
        log::debug!("[target] +#{} {:?} at {:?}", target.id, target.kind, target.pos);
        self.visible.push(target.id);
    }

    fn update_target_visual(&mut self, _id: u32, _pos: Vec2, _size: f32) {}

    fn remove_target_visual(&mut self, id: u32) {
        log::debug!("[target] -#{}", id);
        self.visible.retain(|&v| v != id);
    }

    fn set_hud(&mut self, hud: &Hud) {
        log::debug!(
            "[hud] {} {} {}",
            hud.mode_label,
            hud.timer.as_deref().unwrap_or("-"),
            hud.score_text
        );
    }

    fn show_hint(&mut self, text: &str) {
        log::info!("[hint] {}", text);
    }

    fn show_toast(&mut self, text: &str) {
        log::info!("[toast] {}", text);
    }

    fn set_pace(&mut self, _duration_ms: Option<f64>) {}

    fn flash_miss_feedback(&mut self) {}

    fn show_summary(&mut self, summary: &SessionSummary) {
        log::info!(
            "[result] {} - {} | score {} accuracy {}% best {} streak {}",
            summary.cause.title(),
            summary.verdict.subtitle(),
            summary.score,
            summary.accuracy_pct,
            summary.best,
            summary.streak
        );
    }
}
