//! Session state machine
//!
//! `Engine` is the single owner of the live session. The host feeds it
//! input and frame deltas; it answers with `GameEvent`s that the host
//! drains and hands to the presentation and feedback gateways.
//!
//! Every scheduled job carries the generation it was armed in. Teardown
//! cancels everything and bumps the generation, so a job that somehow
//! survives is dropped on dispatch instead of touching the next session.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::aim::{AimCursor, PointerMotion};
use super::clock::{CancelHandle, Scheduler};
use super::geometry::{Bounds, Circle};
use super::state::{
    Difficulty, EndCause, GameEvent, Hud, MissReason, ModeKind, Screen, Session, SessionStatus,
    TargetPool,
};
use super::target::{Placement, RemovalReason, Shrink, StepOutcome, Target, TargetKind, TargetSpec};
use crate::consts::{DEFAULT_FIELD_HEIGHT, DEFAULT_FIELD_WIDTH, MAX_FRAME_DT_MS, TICK_MS};
use crate::format_clock;
use crate::highscores::ScoreKey;
use crate::persistence::RecordStore;
use crate::settings::Settings;
use crate::stats::{SessionSummary, summarize};
use crate::streak::{Calendar, LocalCalendar, record_training};
use crate::tuning::{
    ARCADE_FIRST_SPAWN_MS, ARCADE_SEPARATION_FACTOR, ArcadeParams, PhaseKey,
    SHRINK_REPLACEMENT_DELAY_MS, WARMUP_LIVES, WARMUP_PHASES, arcade_params, endless_params,
};

/// Deferred engine work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    /// Warm-up countdown, once per second
    Tick,
    /// The single target ran out of time
    Lifetime { target: u32 },
    /// Delayed Reaction spawn
    ReactionSpawn,
    /// Arcade spawn cadence
    ArcadeSpawn,
    /// Shrink mode backfill after hits
    Replacement,
    /// Per-frame target integration
    Physics,
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    generation: u64,
    job: Job,
}

/// Handles owned by the running session (lifetimes live on the target)
#[derive(Debug, Default)]
struct Handles {
    tick: Option<CancelHandle>,
    physics: Option<CancelHandle>,
    /// Reaction delay or arcade cadence; never both, never two
    spawn: Option<CancelHandle>,
    replacement: Option<CancelHandle>,
}

/// Numbers for the home screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HomeStats {
    pub best: u32,
    pub streak: u32,
}

pub struct Engine<S> {
    session: Session,
    scheduler: Scheduler<Scheduled>,
    generation: u64,
    rng: Pcg32,
    bounds: Bounds,
    raw_aim: bool,
    aim: AimCursor,
    store: S,
    calendar: Box<dyn Calendar>,
    events: Vec<GameEvent>,
    next_target_id: u32,
    handles: Handles,
    /// Shrink mode: hits not yet backfilled
    owed_replacements: usize,
    /// Reaction: a target has appeared in the current spawn cycle
    cycle_spawned: bool,
    last_summary: Option<SessionSummary>,
}

impl<S: RecordStore> Engine<S> {
    pub fn new(store: S, seed: u64) -> Self {
        let bounds = Bounds::new(DEFAULT_FIELD_WIDTH, DEFAULT_FIELD_HEIGHT);
        Self {
            session: Session::default(),
            scheduler: Scheduler::new(),
            generation: 0,
            rng: Pcg32::seed_from_u64(seed),
            bounds,
            raw_aim: false,
            aim: AimCursor::new(bounds),
            store,
            calendar: Box::new(LocalCalendar),
            events: Vec::new(),
            next_target_id: 1,
            handles: Handles::default(),
            owed_replacements: 0,
            cycle_spawned: false,
            last_summary: None,
        }
    }

    /// Replace the day source used for streaks
    pub fn with_calendar(mut self, calendar: impl Calendar + 'static) -> Self {
        self.calendar = Box::new(calendar);
        self
    }

    pub fn set_calendar(&mut self, calendar: impl Calendar + 'static) {
        self.calendar = Box::new(calendar);
    }

    // === Accessors ===

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn now_ms(&self) -> f64 {
        self.scheduler.now_ms()
    }

    pub fn aim(&self) -> &AimCursor {
        &self.aim
    }

    pub fn raw_aim(&self) -> bool {
        self.raw_aim
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Summary of the most recently ended session
    pub fn last_summary(&self) -> Option<&SessionSummary> {
        self.last_summary.as_ref()
    }

    /// Timers and frame hooks still armed
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending_count()
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn home_stats(&self, mode: ModeKind, difficulty: Option<Difficulty>) -> HomeStats {
        HomeStats {
            best: self.store.best(ScoreKey::new(mode, difficulty)),
            streak: self.store.streak().streak,
        }
    }

    // === Aiming ===

    pub fn set_raw_aim(&mut self, enabled: bool) {
        if enabled != self.raw_aim {
            log::info!("Raw aim {}", if enabled { "on" } else { "off" });
            self.aim.recenter(self.bounds);
        }
        self.raw_aim = enabled;
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.aim.set_sensitivity(sensitivity);
    }

    /// The host reports pointer-lock changes here
    pub fn set_pointer_locked(&mut self, locked: bool) {
        self.aim.set_locked(locked);
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_raw_aim(settings.raw_aim);
        self.set_sensitivity(settings.sensitivity);
    }

    // === Host surface ===

    /// Start a session, tearing down whatever ran before
    pub fn start_session(&mut self, mode: ModeKind, difficulty: Option<Difficulty>) {
        if self.session.is_running() {
            log::info!(
                "Interrupting {} session at score {}",
                self.session.mode.label(),
                self.session.score
            );
        }
        self.teardown();

        self.session = Session::new(mode, difficulty, self.scheduler.now_ms());
        self.session.status = SessionStatus::Running;
        self.last_summary = None;
        self.aim.recenter(self.bounds);
        log::info!(
            "Session started: mode={} difficulty={:?}",
            mode.label(),
            self.session.difficulty
        );

        self.events.push(GameEvent::ShowScreen(Screen::Game));
        self.handles.physics = Some(self.on_each_frame(Job::Physics));

        match mode {
            ModeKind::Warmup => {
                self.handles.tick = Some(self.every(TICK_MS, Job::Tick));
                self.start_phase(0);
            }
            ModeKind::Endless => {
                self.events.push(GameEvent::Hint("One miss ends the run"));
                self.spawn_endless_target();
            }
            ModeKind::Shrink | ModeKind::Falling | ModeKind::FallingShrink => {
                self.events.push(GameEvent::Hint("Hit every target before it gets away"));
                self.arm_arcade_spawn(ARCADE_FIRST_SPAWN_MS);
            }
        }
        self.emit_hud();
    }

    /// Leave the game screen; a running session ends as `Stopped`
    pub fn quit_session(&mut self) {
        if self.session.is_running() {
            self.finish(EndCause::Stopped);
        }
        self.events.push(GameEvent::ShowScreen(Screen::Home));
    }

    pub fn on_resize(&mut self, width: f32, height: f32) {
        self.bounds = Bounds::new(width, height);
        self.aim.clamp_to(self.bounds);
        if !self.session.is_running() {
            return;
        }

        if self.session.mode.is_arcade() {
            let bounds = self.bounds;
            if let TargetPool::Field(targets) = &mut self.session.targets {
                for t in targets.iter_mut() {
                    t.clamp_into(bounds);
                    self.events.push(GameEvent::TargetMoved {
                        id: t.id,
                        pos: t.pos,
                        size: t.size,
                    });
                }
            }
        } else if let Some(id) = self.session.targets.single().map(|t| t.id) {
            // Only a visible target is replaced; a pending Reaction spawn
            // will land inside the new bounds anyway
            self.remove_target(id, RemovalReason::Replaced);
            if self.session.mode == ModeKind::Endless {
                self.spawn_endless_target();
            } else {
                self.place_warmup_target();
            }
        }
    }

    /// A click or tap; with raw aim the cursor position is used instead
    pub fn on_pointer_down(&mut self, point: Vec2) {
        if !self.session.is_running() {
            return;
        }
        let aim = if self.raw_aim { self.aim.position() } else { point };
        match self.session.targets.hit_test(aim) {
            Some(id) => {
                self.register_hit(id);
            }
            None => self.register_miss(MissReason::ClickedEmpty),
        }
    }

    /// Pointer motion; only the raw-aim cursor cares
    pub fn on_pointer_move(&mut self, motion: PointerMotion) {
        if self.raw_aim {
            self.aim.apply(motion, self.bounds);
        }
    }

    /// Advance virtual time by one display frame
    ///
    /// Long gaps are cut into slices so physics and timers interleave the
    /// same way they would at a normal frame rate.
    pub fn advance(&mut self, dt_ms: f64) {
        let mut remaining = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        loop {
            let step = remaining.min(MAX_FRAME_DT_MS);
            self.frame(step);
            remaining -= step;
            if remaining <= 0.0 {
                break;
            }
        }
    }

    fn frame(&mut self, dt_ms: f64) {
        let hooks = self.scheduler.begin_frame(dt_ms);
        if self.session.is_running() {
            self.session.elapsed_ms = self.scheduler.now_ms() - self.session.started_at_ms;
        }
        // Physics before spawns: an out-of-play target ends the run first
        for (scheduled, hook_dt) in hooks {
            self.dispatch(scheduled, hook_dt);
        }
        while let Some(scheduled) = self.scheduler.pop_due() {
            self.dispatch(scheduled, 0.0);
        }
    }

    fn dispatch(&mut self, scheduled: Scheduled, dt_ms: f64) {
        if scheduled.generation != self.generation || !self.session.is_running() {
            log::trace!("Dropping stale {:?}", scheduled.job);
            return;
        }
        match scheduled.job {
            Job::Tick => self.on_tick(),
            Job::Lifetime { target } => self.on_lifetime(target),
            Job::ReactionSpawn => {
                self.handles.spawn = None;
                self.place_warmup_target();
            }
            Job::ArcadeSpawn => {
                self.handles.spawn = None;
                self.on_arcade_spawn();
            }
            Job::Replacement => self.on_replacement(),
            Job::Physics => self.step_physics(dt_ms),
        }
    }

    // === Hits and misses ===

    /// Score a hit on a live target. Returns false when nothing was hit.
    pub fn register_hit(&mut self, id: u32) -> bool {
        if !self.session.is_running() {
            return false;
        }
        let Some(target) = self.remove_target(id, RemovalReason::Hit) else {
            return false;
        };
        let latency_ms = self.scheduler.now_ms() - target.spawned_at_ms;
        self.session.score += 1;
        self.events.push(GameEvent::Hit { id, latency_ms });

        match self.session.mode {
            ModeKind::Warmup => {
                match self.session.phase_key() {
                    Some(PhaseKey::Reaction) => self.session.reaction_ms.push(latency_ms),
                    Some(PhaseKey::Flick) => self.session.flick_ms.push(latency_ms),
                    Some(PhaseKey::Control) => self.session.control_hits += 1,
                    None => {}
                }
                self.next_warmup_cycle();
            }
            ModeKind::Endless => self.spawn_endless_target(),
            ModeKind::Shrink => {
                self.owed_replacements += 1;
                if self.handles.replacement.is_none() {
                    self.handles.replacement =
                        Some(self.after(SHRINK_REPLACEMENT_DELAY_MS, Job::Replacement));
                }
            }
            // The spawn cadence backfills
            ModeKind::Falling | ModeKind::FallingShrink => {}
        }
        self.emit_hud();
        true
    }

    pub fn register_miss(&mut self, reason: MissReason) {
        if !self.session.is_running() {
            return;
        }
        match self.session.mode {
            ModeKind::Warmup => self.warmup_miss(reason),
            ModeKind::Endless => {
                self.count_miss(reason);
                self.end(match reason {
                    MissReason::ClickedEmpty => EndCause::Missed,
                    MissReason::LifetimeExpired => EndCause::TimedOut,
                });
            }
            ModeKind::Shrink | ModeKind::Falling | ModeKind::FallingShrink => {
                self.count_miss(reason);
                self.end(EndCause::Defeat);
            }
        }
    }

    fn count_miss(&mut self, reason: MissReason) {
        self.session.misses += 1;
        self.events.push(GameEvent::Miss(reason));
    }

    fn warmup_miss(&mut self, reason: MissReason) {
        let too_early = reason == MissReason::ClickedEmpty
            && self.session.phase_key() == Some(PhaseKey::Reaction)
            && !self.cycle_spawned
            && self.session.targets.is_empty();
        if too_early {
            self.events.push(GameEvent::Toast("Too early"));
            return;
        }

        self.count_miss(reason);
        if let Some(id) = self.session.targets.single().map(|t| t.id) {
            self.remove_target(id, RemovalReason::Replaced);
        }
        self.session.lives = self.session.lives.saturating_sub(1);
        if self.session.lives == 0 {
            self.end(EndCause::OutOfLives);
            return;
        }
        self.events.push(GameEvent::Toast("Life lost"));
        self.next_warmup_cycle();
        self.emit_hud();
    }

    fn on_lifetime(&mut self, id: u32) {
        // Already hit or replaced
        if self.remove_target(id, RemovalReason::Expired).is_none() {
            return;
        }
        self.register_miss(MissReason::LifetimeExpired);
    }

    // === Warm-up ===

    fn on_tick(&mut self) {
        let s = &mut self.session;
        s.total_left_secs = s.total_left_secs.saturating_sub(1);
        s.phase_left_secs = s.phase_left_secs.saturating_sub(1);

        if s.total_left_secs == 0 {
            self.end(EndCause::TimeUp);
            return;
        }
        if s.phase_left_secs == 0 {
            let next = s.phase_index + 1;
            if next < WARMUP_PHASES.len() {
                self.start_phase(next);
            } else {
                self.end(EndCause::Completed);
                return;
            }
        }
        self.emit_hud();
    }

    fn start_phase(&mut self, index: usize) {
        let Some(phase) = WARMUP_PHASES.get(index) else {
            return;
        };
        self.cancel_spawn();
        if let Some(id) = self.session.targets.single().map(|t| t.id) {
            self.remove_target(id, RemovalReason::Replaced);
        }
        self.session.phase_index = index;
        self.session.phase_left_secs = phase.secs;
        self.session.phases_seen.push(phase.key);
        log::info!("Warm-up phase {} ({}s)", phase.label, phase.secs);

        self.events.push(GameEvent::PhaseStarted(phase.key));
        self.events.push(GameEvent::Toast(phase.label));
        self.events.push(GameEvent::Hint(phase.hint()));
        // The first target of a phase shows up right away
        self.place_warmup_target();
    }

    /// Begin the next spawn cycle of the current phase
    fn next_warmup_cycle(&mut self) {
        let Some(phase) = self.session.phase() else {
            return;
        };
        self.cancel_spawn();
        if phase.has_spawn_delay() {
            self.cycle_spawned = false;
            let delay = self
                .rng
                .random_range(phase.delay_min_ms..=phase.delay_max_ms);
            self.handles.spawn = Some(self.after(delay, Job::ReactionSpawn));
        } else {
            self.place_warmup_target();
        }
    }

    fn place_warmup_target(&mut self) {
        let Some(phase) = self.session.phase() else {
            return;
        };
        let spec = TargetSpec {
            kind: if phase.speed.is_some() {
                TargetKind::Bouncing
            } else {
                TargetKind::Stationary
            },
            size: phase.size,
            speed: phase.speed.unwrap_or(0.0),
            shrink: None,
        };
        self.place_single(spec, phase.lifetime_ms);
        self.cycle_spawned = true;
    }

    // === Endless ===

    fn spawn_endless_target(&mut self) {
        let params = endless_params(self.session.score);
        let spec = TargetSpec {
            kind: if params.moving {
                TargetKind::Bouncing
            } else {
                TargetKind::Stationary
            },
            size: params.size,
            speed: params.speed,
            shrink: None,
        };
        self.place_single(spec, Some(params.lifetime_ms));
        self.events.push(GameEvent::Pace(Some(params.lifetime_ms)));
    }

    /// Put a fresh single target on the field with its own lifetime
    fn place_single(&mut self, spec: TargetSpec, lifetime_ms: Option<f64>) {
        if let Some(id) = self.session.targets.single().map(|t| t.id) {
            self.remove_target(id, RemovalReason::Replaced);
        }
        let id = self.alloc_id();
        let now = self.scheduler.now_ms();
        let mut target = Target::spawn(id, &spec, Placement::Anywhere, self.bounds, now, &mut self.rng);
        target.lifetime = lifetime_ms.map(|ms| self.after(ms, Job::Lifetime { target: id }));
        log::debug!("Spawned {:?} #{} size {}", target.kind, id, target.size);

        self.events.push(GameEvent::TargetSpawned(target.clone()));
        self.session.targets = TargetPool::Single(Some(target));
    }

    // === Arcade ===

    fn arcade(&self) -> Option<ArcadeParams> {
        arcade_params(self.session.mode, self.session.difficulty.unwrap_or_default())
    }

    fn arm_arcade_spawn(&mut self, delay_ms: f64) {
        self.cancel_spawn();
        self.handles.spawn = Some(self.after(delay_ms, Job::ArcadeSpawn));
    }

    fn on_arcade_spawn(&mut self) {
        let Some(params) = self.arcade() else {
            return;
        };
        if self.session.targets.len() < params.max_active {
            self.spawn_arcade_target(&params);
        }
        let jitter = if params.spawn_jitter_ms > 0.0 {
            self.rng
                .random_range(-params.spawn_jitter_ms..=params.spawn_jitter_ms)
        } else {
            0.0
        };
        self.arm_arcade_spawn(params.spawn_every_ms + jitter);
    }

    fn on_replacement(&mut self) {
        self.handles.replacement = None;
        let Some(params) = self.arcade() else {
            return;
        };
        let owed = std::mem::take(&mut self.owed_replacements);
        let room = params.max_active.saturating_sub(self.session.targets.len());
        for _ in 0..owed.min(room) {
            self.spawn_arcade_target(&params);
        }
    }

    fn spawn_arcade_target(&mut self, params: &ArcadeParams) {
        let kind = match self.session.mode {
            ModeKind::Shrink => TargetKind::Shrinking,
            ModeKind::Falling => TargetKind::Falling,
            ModeKind::FallingShrink => TargetKind::FallingShrinking,
            ModeKind::Warmup | ModeKind::Endless => return,
        };
        let shrink = params
            .shrink
            .zip(params.shrink_rate())
            .map(|(curve, rate_per_ms)| Shrink {
                rate_per_ms,
                min_size: curve.min_size,
            });
        let spec = TargetSpec {
            kind,
            size: params.base_size,
            speed: params.fall_speed.unwrap_or(0.0),
            shrink,
        };

        let existing: Vec<Circle> = self
            .session
            .targets
            .as_slice()
            .iter()
            .map(Target::circle)
            .collect();
        let placement = Placement::Spaced {
            existing: &existing,
            min_separation: params.base_size * ARCADE_SEPARATION_FACTOR,
        };
        let id = self.alloc_id();
        let now = self.scheduler.now_ms();
        let target = Target::spawn(id, &spec, placement, self.bounds, now, &mut self.rng);
        log::debug!("Spawned {:?} #{} at {:?}", kind, id, target.pos);

        self.events.push(GameEvent::TargetSpawned(target.clone()));
        if let TargetPool::Field(targets) = &mut self.session.targets {
            targets.push(target);
        }
    }

    // === Physics ===

    fn step_physics(&mut self, dt_ms: f64) {
        if dt_ms <= 0.0 {
            return;
        }
        let bounds = self.bounds;
        let out = match &mut self.session.targets {
            TargetPool::Single(slot) => {
                if let Some(t) = slot {
                    t.advance(dt_ms, bounds);
                    if t.kind == TargetKind::Bouncing {
                        self.events.push(GameEvent::TargetMoved {
                            id: t.id,
                            pos: t.pos,
                            size: t.size,
                        });
                    }
                }
                None
            }
            TargetPool::Field(targets) => {
                let mut out = None;
                for t in targets.iter_mut() {
                    let reason = match t.advance(dt_ms, bounds) {
                        StepOutcome::Alive => {
                            self.events.push(GameEvent::TargetMoved {
                                id: t.id,
                                pos: t.pos,
                                size: t.size,
                            });
                            continue;
                        }
                        StepOutcome::ShrinkOut => RemovalReason::ShrinkOut,
                        StepOutcome::FallOut => RemovalReason::FallOut,
                    };
                    // The rest of the field is not worth updating
                    out = Some((t.id, reason));
                    break;
                }
                out
            }
        };

        if let Some((id, reason)) = out {
            log::debug!("Target #{} lost: {:?}", id, reason);
            self.remove_target(id, reason);
            if reason.is_defeat() {
                self.end(EndCause::Defeat);
            }
        }
    }

    // === Teardown and end ===

    fn end(&mut self, cause: EndCause) {
        if self.finish(cause) {
            self.events.push(GameEvent::ShowScreen(Screen::Result));
        }
    }

    /// Close the running session: persist records and emit the summary
    fn finish(&mut self, cause: EndCause) -> bool {
        if !self.session.is_running() {
            return false;
        }
        self.session.elapsed_ms = self.scheduler.now_ms() - self.session.started_at_ms;
        self.teardown();
        self.session.status = SessionStatus::Ended;
        self.session.end_cause = Some(cause);

        let key = ScoreKey::new(self.session.mode, self.session.difficulty);
        let previous_best = self.store.best(key);
        let best = if self.session.score > previous_best {
            self.store.set_best(key, self.session.score);
            self.session.score
        } else {
            previous_best
        };
        let streak = record_training(self.store.streak(), self.calendar.today());
        self.store.set_streak(streak);

        let summary = summarize(&self.session, cause, previous_best, best, streak.streak);
        log::info!(
            "Session ended: mode={} cause={:?} score={} misses={} best={} streak={}",
            self.session.mode.label(),
            cause,
            summary.score,
            summary.misses,
            summary.best,
            summary.streak
        );
        self.events.push(GameEvent::SessionEnded(summary.clone()));
        self.last_summary = Some(summary);
        true
    }

    /// Cancel every handle and clear the field
    fn teardown(&mut self) {
        self.scheduler.cancel_all();
        self.generation += 1;
        self.handles = Handles::default();
        self.owed_replacements = 0;
        self.cycle_spawned = false;
        for target in self.session.targets.take_all() {
            self.events.push(GameEvent::TargetRemoved {
                id: target.id,
                reason: RemovalReason::Cleared,
            });
        }
        if self.session.mode == ModeKind::Endless {
            self.events.push(GameEvent::Pace(None));
        }
    }

    // === Helpers ===

    fn remove_target(&mut self, id: u32, reason: RemovalReason) -> Option<Target> {
        let target = self.session.targets.remove(id)?;
        if let Some(handle) = target.lifetime {
            self.scheduler.cancel(handle);
        }
        self.events.push(GameEvent::TargetRemoved { id, reason });
        Some(target)
    }

    fn cancel_spawn(&mut self) {
        if let Some(handle) = self.handles.spawn.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_target_id;
        self.next_target_id = self.next_target_id.wrapping_add(1).max(1);
        id
    }

    fn after(&mut self, delay_ms: f64, job: Job) -> CancelHandle {
        let generation = self.generation;
        self.scheduler.after(delay_ms, Scheduled { generation, job })
    }

    fn every(&mut self, interval_ms: f64, job: Job) -> CancelHandle {
        let generation = self.generation;
        self.scheduler.every(interval_ms, Scheduled { generation, job })
    }

    fn on_each_frame(&mut self, job: Job) -> CancelHandle {
        let generation = self.generation;
        self.scheduler.on_each_frame(Scheduled { generation, job })
    }

    /// Current HUD snapshot
    pub fn hud(&self) -> Hud {
        let s = &self.session;
        if s.mode == ModeKind::Warmup {
            Hud {
                mode_label: s.mode.label(),
                phase_label: s.phase().map(|p| p.label),
                timer: Some(format_clock(s.total_left_secs)),
                score_text: format!("Hits {}", s.score),
                lives: Some((s.lives, WARMUP_LIVES)),
                pace_ms: None,
            }
        } else {
            Hud {
                mode_label: s.mode.label(),
                phase_label: None,
                timer: None,
                score_text: format!("Score {}", s.score),
                lives: None,
                // The live target was spawned at the current score
                pace_ms: (s.mode == ModeKind::Endless && !s.targets.is_empty())
                    .then(|| endless_params(s.score).lifetime_ms),
            }
        }
    }

    fn emit_hud(&mut self) {
        let hud = self.hud();
        self.events.push(GameEvent::Hud(hud));
    }
}
