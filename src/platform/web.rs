//! DOM presenter and browser feedback (wasm32 only)

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec2;
use js_sys::{Function, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

use super::{Feedback, Presenter};
use crate::audio::{AudioManager, Cue};
use crate::format_clock;
use crate::sim::{HomeStats, Hud, ModeKind, Screen, Target};
use crate::stats::SessionSummary;

const TOAST_MS: i32 = 1200;
const FLASH_MS: i32 = 160;
const SHAKE_MS: i32 = 240;

fn by_id(document: &Document, id: &str) -> Option<HtmlElement> {
    document
        .get_element_by_id(id)
        .and_then(|e| e.dyn_into::<HtmlElement>().ok())
}

/// Run `f` once after `ms` milliseconds
fn after_ms(ms: i32, f: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let cb = Closure::once_into_js(f);
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), ms);
}

fn place(el: &HtmlElement, pos: Vec2, size: f32) {
    let style = el.style();
    let _ = style.set_property("left", &format!("{}px", pos.x));
    let _ = style.set_property("top", &format!("{}px", pos.y));
    let _ = style.set_property("width", &format!("{}px", size));
    let _ = style.set_property("height", &format!("{}px", size));
}

/// Presenter over the page's fixed element ids
pub struct DomPresenter {
    document: Document,
    playfield: Option<HtmlElement>,
    targets: HashMap<u32, HtmlElement>,
    /// Bumped per toast so an old hide timer leaves a newer toast alone
    toast_token: Rc<Cell<u32>>,
}

impl DomPresenter {
    pub fn new(document: Document) -> Self {
        let playfield = by_id(&document, "playfield");
        if playfield.is_none() {
            log::warn!("No #playfield element; targets will not be drawn");
        }
        Self {
            document,
            playfield,
            targets: HashMap::new(),
            toast_token: Rc::new(Cell::new(0)),
        }
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = by_id(&self.document, id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(&self, id: &str, visible: bool) {
        if let Some(el) = by_id(&self.document, id) {
            let _ = el
                .style()
                .set_property("display", if visible { "inline-flex" } else { "none" });
        }
    }

    /// Playfield size in CSS pixels
    pub fn playfield_size(&self) -> Option<(f32, f32)> {
        let rect = self.playfield.as_ref()?.get_bounding_client_rect();
        Some((rect.width() as f32, rect.height() as f32))
    }

    /// Convert viewport coordinates into playfield coordinates
    pub fn to_playfield(&self, client_x: f32, client_y: f32) -> Option<Vec2> {
        let rect = self.playfield.as_ref()?.get_bounding_client_rect();
        Some(Vec2::new(
            client_x - rect.left() as f32,
            client_y - rect.top() as f32,
        ))
    }

    pub fn set_home_stats(&self, stats: HomeStats) {
        self.set_text("best", &stats.best.to_string());
        self.set_text("streak", &stats.streak.to_string());
    }

    /// Show the raw-aim crosshair at `pos`, or hide it
    pub fn set_crosshair(&self, pos: Option<Vec2>) {
        let Some(el) = by_id(&self.document, "crosshair") else {
            return;
        };
        let style = el.style();
        match pos {
            Some(p) => {
                let _ = style.set_property("display", "block");
                let _ = style.set_property(
                    "transform",
                    &format!("translate({}px, {}px)", p.x, p.y),
                );
            }
            None => {
                let _ = style.set_property("display", "none");
            }
        }
    }

    fn render_lives(&self, remaining: u8, max: u8) {
        let Some(el) = by_id(&self.document, "lives") else {
            return;
        };
        let dots: String = (0..max)
            .map(|i| {
                if i < remaining {
                    r#"<div class="lifeDot lifeDot--on"></div>"#
                } else {
                    r#"<div class="lifeDot"></div>"#
                }
            })
            .collect();
        el.set_inner_html(&dots);
    }
}

impl Presenter for DomPresenter {
    fn show_screen(&mut self, screen: Screen) {
        let active = match screen {
            Screen::Home => "home",
            Screen::Game => "game",
            Screen::Result => "result",
        };
        for id in ["home", "game", "result"] {
            if let Some(el) = by_id(&self.document, id) {
                let _ = if id == active {
                    el.class_list().add_1("active")
                } else {
                    el.class_list().remove_1("active")
                };
            }
        }
    }

    fn render_target(&mut self, target: &Target) {
        let Some(playfield) = &self.playfield else {
            return;
        };
        let Ok(el) = self.document.create_element("div") else {
            return;
        };
        let Ok(el) = el.dyn_into::<HtmlElement>() else {
            return;
        };
        el.set_class_name(&format!("target target--{:?}", target.kind).to_lowercase());
        place(&el, target.pos, target.size);
        let _ = playfield.append_child(&el);
        if let Some(old) = self.targets.insert(target.id, el) {
            old.remove();
        }
    }

    fn update_target_visual(&mut self, id: u32, pos: Vec2, size: f32) {
        if let Some(el) = self.targets.get(&id) {
            place(el, pos, size);
        }
    }

    fn remove_target_visual(&mut self, id: u32) {
        if let Some(el) = self.targets.remove(&id) {
            el.remove();
        }
    }

    fn set_hud(&mut self, hud: &Hud) {
        self.set_text("modePill", hud.mode_label);
        self.set_visible("phasePill", hud.phase_label.is_some());
        if let Some(label) = hud.phase_label {
            self.set_text("phasePill", label);
        }
        self.set_visible("timer", hud.timer.is_some());
        if let Some(timer) = &hud.timer {
            self.set_text("timer", timer);
        }
        self.set_text("score", &hud.score_text);
        self.set_visible("lives", hud.lives.is_some());
        if let Some((remaining, max)) = hud.lives {
            self.render_lives(remaining, max);
        }
    }

    fn show_hint(&mut self, text: &str) {
        self.set_text("hint", text);
    }

    fn show_toast(&mut self, text: &str) {
        let Some(el) = by_id(&self.document, "toast") else {
            return;
        };
        el.set_text_content(Some(text));
        let _ = el.class_list().add_1("show");

        let token = self.toast_token.get().wrapping_add(1);
        self.toast_token.set(token);
        let current = self.toast_token.clone();
        after_ms(TOAST_MS, move || {
            if current.get() == token {
                let _ = el.class_list().remove_1("show");
            }
        });
    }

    fn set_pace(&mut self, duration_ms: Option<f64>) {
        let (Some(pace), Some(fill)) = (
            by_id(&self.document, "pace"),
            by_id(&self.document, "paceFill"),
        ) else {
            return;
        };
        let Some(ms) = duration_ms else {
            let _ = pace.class_list().add_1("pace--hidden");
            return;
        };
        let _ = pace.class_list().remove_1("pace--hidden");
        let style = fill.style();
        let _ = style.set_property("transition", "none");
        let _ = style.set_property("width", "100%");
        // Force a reflow so the transition restarts from full width
        let _ = fill.offset_height();
        let _ = style.set_property("transition", &format!("width {}ms linear", ms.round()));
        let _ = style.set_property("width", "0%");
    }

    fn flash_miss_feedback(&mut self) {
        if let Some(flash) = by_id(&self.document, "fieldFlash") {
            let _ = flash.style().set_property("opacity", "1");
            after_ms(FLASH_MS, move || {
                let _ = flash.style().set_property("opacity", "0");
            });
        }
        if let Some(playfield) = self.playfield.clone() {
            let _ = playfield.class_list().add_1("shake");
            after_ms(SHAKE_MS, move || {
                let _ = playfield.class_list().remove_1("shake");
            });
        }
    }

    fn show_summary(&mut self, summary: &SessionSummary) {
        self.set_text("resultTitle", summary.cause.title());
        self.set_text("resultSubtitle", summary.verdict.subtitle());

        let mut rows = vec![
            ("Score", summary.score.to_string()),
            ("Accuracy", format!("{}%", summary.accuracy_pct)),
        ];
        if let Some(ms) = summary.avg_reaction_ms {
            rows.push(("Reaction", format!("{} ms", ms)));
        }
        if let Some(ms) = summary.avg_flick_ms {
            rows.push(("Flick", format!("{} ms", ms)));
        }
        if summary.mode == ModeKind::Warmup {
            rows.push(("Control hits", summary.control_hits.to_string()));
            rows.push((
                "Time",
                format_clock((summary.duration_ms / 1000.0).round() as u32),
            ));
        } else {
            rows.push(("Best", summary.best.to_string()));
        }
        rows.push(("Streak", format!("{} d", summary.streak)));

        let html: String = rows
            .iter()
            .map(|(k, v)| {
                format!(
                    r#"<div class="stat"><span class="stat__k">{}</span><span class="stat__v">{}</span></div>"#,
                    k, v
                )
            })
            .collect();
        if let Some(el) = by_id(&self.document, "resultStats") {
            el.set_inner_html(&html);
        }
    }
}

// === Telegram WebApp ===

/// `window.Telegram.WebApp`, if the page runs inside Telegram
fn telegram_webapp() -> Option<JsValue> {
    let window = web_sys::window()?;
    let tg = Reflect::get(&window, &JsValue::from_str("Telegram")).ok()?;
    let webapp = Reflect::get(&tg, &JsValue::from_str("WebApp")).ok()?;
    if webapp.is_undefined() || webapp.is_null() {
        None
    } else {
        Some(webapp)
    }
}

/// Call `target[method](args...)`; any failure is logged and dropped
fn call_js(target: &JsValue, method: &str, args: &[&str]) {
    let Ok(f) = Reflect::get(target, &JsValue::from_str(method)) else {
        return;
    };
    let Some(f) = f.dyn_ref::<Function>() else {
        return;
    };
    let result = match args {
        [] => f.call0(target),
        [a] => f.call1(target, &JsValue::from_str(a)),
        _ => return,
    };
    if let Err(e) = result {
        log::debug!("Telegram {} failed: {:?}", method, e);
    }
}

/// Tell the host the page is ready and take the full height
pub fn telegram_ready() {
    if let Some(webapp) = telegram_webapp() {
        call_js(&webapp, "ready", &[]);
        call_js(&webapp, "expand", &[]);
        log::info!("Running inside Telegram");
    }
}

/// Close the web view; false when not inside Telegram
pub fn telegram_close() -> bool {
    match telegram_webapp() {
        Some(webapp) => {
            call_js(&webapp, "close", &[]);
            true
        }
        None => false,
    }
}

fn haptic(method: &str, arg: &str) {
    let Some(webapp) = telegram_webapp() else {
        return;
    };
    let Ok(haptics) = Reflect::get(&webapp, &JsValue::from_str("HapticFeedback")) else {
        return;
    };
    if haptics.is_undefined() || haptics.is_null() {
        return;
    }
    call_js(&haptics, method, &[arg]);
}

/// Web Audio cues plus Telegram haptics
#[derive(Default)]
pub struct WebFeedback {
    audio: AudioManager,
}

impl WebFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create/resume the audio context from inside a user gesture
    pub fn unlock_audio(&mut self) {
        self.audio.ensure();
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.audio.set_master_volume(volume);
    }
}

impl Feedback for WebFeedback {
    fn play_hit_cue(&mut self) {
        self.audio.play(Cue::Hit);
    }

    fn play_miss_cue(&mut self) {
        self.audio.play(Cue::Miss);
    }

    fn light_pulse(&mut self) {
        haptic("impactOccurred", "light");
    }

    fn error_pulse(&mut self) {
        haptic("notificationOccurred", "error");
    }
}
