//! AI bow controller.
//!
//! `AiShooter` samples bow and target heights every tick, runs the shot
//! heuristic while idle, and walks the Idle → Holding → Cooldown → Idle cycle
//! using absolute deadlines against the injected clock.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use archery_core::constants::{ARROW_BASE_FORCE, BLUE_BOW_X, SHOOT_POINT_OFFSET_X};
use archery_core::enums::{Difficulty, FireTrigger, FiringState, Side};
use archery_core::events::DuelEvent;
use archery_core::ports::{Clock, PositionSource};
use archery_core::state::ShooterView;
use archery_core::types::SecondsRange;

use crate::aim::{self, AimContext};
use crate::profiles::{get_profile, TargetingProfile};
use crate::velocity::VelocityEstimator;

/// Where and how the controlled bow launches arrows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShooterRig {
    pub side: Side,
    /// X coordinate of the shoot point.
    pub shoot_point_x: f64,
    /// Vertical offset of the shoot point from the bow centre.
    pub shoot_offset_y: f64,
    /// Unit launch direction.
    pub facing: DVec2,
    /// Launch speed before the difficulty multiplier.
    pub base_force: f64,
}

impl Default for ShooterRig {
    /// The single-player bot: blue bow on the right, shooting left.
    fn default() -> Self {
        Self {
            side: Side::Blue,
            shoot_point_x: BLUE_BOW_X - SHOOT_POINT_OFFSET_X,
            shoot_offset_y: 0.0,
            facing: DVec2::NEG_X,
            base_force: ARROW_BASE_FORCE,
        }
    }
}

/// Decision state of one AI shooter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShooterState {
    pub difficulty: Difficulty,
    pub bow_y: Option<f64>,
    pub target_y: Option<f64>,
    pub previous_bow_y: Option<f64>,
    pub previous_target_y: Option<f64>,
    pub target_velocity: f64,
    pub firing_state: FiringState,
    /// No fire decision is considered before this time.
    pub next_eligible_fire_time: f64,
    /// Release deadline while Holding.
    pub release_at: f64,
    /// Set when the match went inactive mid-draw; the draw releases nothing.
    pub hold_cancelled: bool,
    pub shots_fired: u32,
}

impl ShooterState {
    fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            bow_y: None,
            target_y: None,
            previous_bow_y: None,
            previous_target_y: None,
            target_velocity: 0.0,
            firing_state: FiringState::Idle,
            next_eligible_fire_time: 0.0,
            release_at: 0.0,
            hold_cancelled: false,
            shots_fired: 0,
        }
    }
}

/// AI-controlled bow.
#[derive(Debug, Clone)]
pub struct AiShooter {
    rig: ShooterRig,
    profile: TargetingProfile,
    state: ShooterState,
    velocity: VelocityEstimator,
}

impl AiShooter {
    /// Create a shooter with the default profile for `difficulty`.
    pub fn new(difficulty: Difficulty, rig: ShooterRig) -> Self {
        Self::with_profile(difficulty, get_profile(difficulty), rig)
    }

    /// Create a shooter with an explicit (e.g. JSON-loaded) profile.
    pub fn with_profile(difficulty: Difficulty, profile: TargetingProfile, rig: ShooterRig) -> Self {
        Self {
            rig,
            profile,
            state: ShooterState::new(difficulty),
            velocity: VelocityEstimator::default(),
        }
    }

    pub fn state(&self) -> &ShooterState {
        &self.state
    }

    pub fn profile(&self) -> &TargetingProfile {
        &self.profile
    }

    pub fn rig(&self) -> &ShooterRig {
        &self.rig
    }

    pub fn view(&self) -> ShooterView {
        ShooterView {
            side: self.rig.side,
            difficulty: self.state.difficulty,
            firing_state: self.state.firing_state,
            target_velocity: self.state.target_velocity,
            shots_fired: self.state.shots_fired,
        }
    }

    /// Return to Idle for a new match. Difficulty and profile are kept.
    pub fn reset(&mut self) {
        self.state = ShooterState::new(self.state.difficulty);
        self.velocity.reset();
    }

    /// Advance the shooter by one tick.
    ///
    /// While `match_active` is false the machine is frozen: no timers run and
    /// nothing is emitted. A draw in progress when the match goes inactive is
    /// cancelled and will never produce a `FireDecision`.
    pub fn tick<P, C, R>(
        &mut self,
        positions: &P,
        clock: &C,
        match_active: bool,
        rng: &mut R,
        events: &mut Vec<DuelEvent>,
    ) where
        P: PositionSource + ?Sized,
        C: Clock + ?Sized,
        R: Rng,
    {
        if !match_active {
            if self.state.firing_state == FiringState::Holding && !self.state.hold_cancelled {
                self.state.hold_cancelled = true;
                debug!(side = ?self.rig.side, "Match inactive mid-draw, shot cancelled");
            }
            return;
        }

        let now = clock.now();
        let bow = positions.bow_y();
        let target = positions.target_y();
        self.state.bow_y = bow;
        self.state.target_y = target;

        if let Some(target_y) = target {
            self.velocity.update(now, target_y);
        }
        self.state.target_velocity = self.velocity.velocity_y();

        match self.state.firing_state {
            FiringState::Idle => self.consider_shot(now, bow, target, events),
            FiringState::Holding => {
                if now >= self.state.release_at {
                    self.release(now, bow, target, rng, events);
                }
            }
            FiringState::Cooldown => {
                if now >= self.state.next_eligible_fire_time {
                    self.state.firing_state = FiringState::Idle;
                }
            }
        }

        self.state.previous_bow_y = bow;
        self.state.previous_target_y = target;
    }

    fn consider_shot(
        &mut self,
        now: f64,
        bow: Option<f64>,
        target: Option<f64>,
        events: &mut Vec<DuelEvent>,
    ) {
        if now < self.state.next_eligible_fire_time {
            return;
        }
        let (Some(bow_y), Some(target_y)) = (bow, target) else {
            return;
        };

        let ctx = AimContext {
            bow_y,
            target_y,
            previous_bow_y: self.state.previous_bow_y,
            previous_target_y: self.state.previous_target_y,
            target_velocity: self.state.target_velocity,
        };

        match aim::evaluate(&ctx, &self.profile) {
            Some(trigger) => self.begin_draw(now, trigger, ctx.distance(), events),
            None => {
                if !aim::is_near(ctx.distance(), &self.profile) {
                    self.state.next_eligible_fire_time = now + self.profile.recheck_interval_secs;
                }
            }
        }
    }

    fn begin_draw(
        &mut self,
        now: f64,
        trigger: FireTrigger,
        distance: f64,
        events: &mut Vec<DuelEvent>,
    ) {
        self.state.firing_state = FiringState::Holding;
        self.state.release_at = now + self.profile.hold_duration_secs;
        self.state.hold_cancelled = false;
        events.push(DuelEvent::BeginDraw {
            side: self.rig.side,
            trigger,
        });
        debug!(
            side = ?self.rig.side,
            difficulty = ?self.state.difficulty,
            ?trigger,
            distance,
            "Fire decision, drawing"
        );
    }

    fn release<R: Rng>(
        &mut self,
        now: f64,
        bow: Option<f64>,
        target: Option<f64>,
        rng: &mut R,
        events: &mut Vec<DuelEvent>,
    ) {
        events.push(DuelEvent::EndDraw {
            side: self.rig.side,
        });

        if self.state.hold_cancelled {
            self.enter_cooldown(now, rng);
            return;
        }

        let Some(bow_y) = bow else {
            warn!(side = ?self.rig.side, "Bow position unavailable at release, shot dropped");
            self.enter_cooldown(now, rng);
            return;
        };

        let correction = target.map_or(0.0, |target_y| {
            aim::aim_correction(bow_y, target_y, self.state.target_velocity, &self.profile)
        });
        let spawn = DVec2::new(
            self.rig.shoot_point_x,
            bow_y + self.rig.shoot_offset_y + correction,
        );
        let velocity = self.rig.facing * self.rig.base_force * self.profile.force_multiplier;

        events.push(DuelEvent::FireDecision {
            side: self.rig.side,
            spawn,
            velocity,
            force_multiplier: self.profile.force_multiplier,
        });
        self.state.shots_fired += 1;
        debug!(side = ?self.rig.side, correction, shots = self.state.shots_fired, "Arrow released");

        self.enter_cooldown(now, rng);
    }

    fn enter_cooldown<R: Rng>(&mut self, now: f64, rng: &mut R) {
        let cooldown = sample_uniform(rng, self.profile.cooldown_secs);
        self.state.firing_state = FiringState::Cooldown;
        self.state.next_eligible_fire_time = now + cooldown;
        self.state.hold_cancelled = false;
    }
}

/// Uniform sample from a seconds range; degenerate ranges return `min`.
pub fn sample_uniform<R: Rng>(rng: &mut R, range: SecondsRange) -> f64 {
    if range.max > range.min {
        rng.gen_range(range.min..=range.max)
    } else {
        range.min
    }
}
