//! Duel engine, the core of the game.
//!
//! `DuelEngine` owns the hecs arena world, the match state machine and the AI
//! shooters, processes queued commands and produces `DuelSnapshot`s.
//! Completely headless, enabling deterministic testing.

use std::collections::VecDeque;

use glam::DVec2;
use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use archery_ai::profiles::{self, TargetingProfile};
use archery_ai::AiShooter;
use archery_core::commands::DuelCommand;
use archery_core::config::{ConfigError, MatchConfig};
use archery_core::enums::{Difficulty, GameMode, Outcome, Role, Side};
use archery_core::events::DuelEvent;
use archery_core::params::MatchParams;
use archery_core::ports::{PositionSource, ResultReporter, WallClock};
use archery_core::state::DuelSnapshot;
use archery_core::types::SimTime;

use crate::match_flow::MatchStateMachine;
use crate::systems;
use crate::systems::sampling::ArenaView;
use crate::world_setup;

/// Configuration for starting a new duel.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same duel.
    pub seed: u64,
    /// Bot difficulty in single-player.
    pub difficulty: Difficulty,
    pub mode: GameMode,
    pub role: Role,
    /// Side this participant plays.
    pub local_side: Side,
    pub match_config: MatchConfig,
    pub params: Option<MatchParams>,
    /// Replaces the difficulty's default targeting profile.
    pub profile: Option<TargetingProfile>,
    /// Let an AI shooter play the local side too.
    pub autopilot: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            difficulty: Difficulty::default(),
            mode: GameMode::Singleplayer,
            role: Role::Authority,
            local_side: Side::Red,
            match_config: MatchConfig::default(),
            params: None,
            profile: None,
            autopilot: false,
        }
    }
}

impl SimConfig {
    /// Derive mode and difficulty from platform parameters.
    ///
    /// A bot opponent means a local single-player match with the bot's
    /// difficulty. Anything else is a networked match where `player_slot`
    /// picks the side and slot 1 is the authority.
    pub fn for_match(params: MatchParams, player_slot: u32, seed: u64) -> Self {
        let mode = params.game_mode();
        let mut config = Self {
            seed,
            difficulty: params.bot_difficulty().unwrap_or_default(),
            mode,
            ..Default::default()
        };
        if mode == GameMode::Multiplayer {
            config.local_side = Side::from_player_slot(player_slot);
            config.role = if player_slot == 1 {
                Role::Authority
            } else {
                Role::Observer
            };
            config.match_config.networked = true;
        }
        config.params = Some(params);
        config
    }

    /// Swap in loaded match tunables. A multiplayer match stays networked
    /// whatever the loaded file says.
    pub fn with_match_config(mut self, match_config: MatchConfig) -> Self {
        let networked = self.match_config.networked || self.mode == GameMode::Multiplayer;
        self.match_config = match_config;
        self.match_config.networked |= networked;
        self
    }
}

/// The duel engine. Owns the arena world and all match state.
pub struct DuelEngine {
    world: World,
    time: SimTime,
    mode: GameMode,
    rng: ChaCha8Rng,
    match_flow: MatchStateMachine,
    shooters: Vec<AiShooter>,
    command_queue: VecDeque<DuelCommand>,
    despawn_buffer: Vec<hecs::Entity>,
    events: Vec<DuelEvent>,
    hits: Vec<Side>,
}

impl DuelEngine {
    /// Create a new engine. Fails on invalid tunables.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.match_config.validate()?;
        if let Some(profile) = &config.profile {
            profiles::validate_for(profile, config.difficulty)?;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut world = World::new();
        world_setup::setup_arena(&mut world, &mut rng);

        let mut ai_sides = Vec::new();
        if config.mode == GameMode::Singleplayer {
            ai_sides.push(config.local_side.opponent());
        }
        if config.autopilot {
            ai_sides.push(config.local_side);
        }
        let shooters = ai_sides
            .into_iter()
            .map(|side| {
                let rig = world_setup::shooter_rig(side);
                match &config.profile {
                    Some(profile) => AiShooter::with_profile(config.difficulty, profile.clone(), rig),
                    None => AiShooter::new(config.difficulty, rig),
                }
            })
            .collect();

        let mut match_flow =
            MatchStateMachine::new(config.match_config, config.role, config.local_side);
        if let Some(params) = config.params {
            match_flow = match_flow.with_params(params);
        }

        info!(
            seed = config.seed,
            mode = ?config.mode,
            role = ?config.role,
            local_side = ?config.local_side,
            difficulty = ?config.difficulty,
            "Duel engine created"
        );

        Ok(Self {
            world,
            time: SimTime::default(),
            mode: config.mode,
            rng,
            match_flow,
            shooters,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
            hits: Vec::new(),
        })
    }

    /// Attach the platform channel results and aborts are sent to.
    pub fn with_reporter(mut self, reporter: Box<dyn ResultReporter>) -> Self {
        self.match_flow = self.match_flow.with_reporter(reporter);
        self
    }

    /// Replace the system wall clock used for networked deadlines.
    pub fn with_wall_clock(mut self, wall_clock: Box<dyn WallClock>) -> Self {
        self.match_flow = self.match_flow.with_wall_clock(wall_clock);
        self
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: DuelCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = DuelCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the duel by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> DuelSnapshot {
        let dt = self.time.dt();

        self.process_commands();
        self.run_systems(dt);
        self.match_flow.tick(dt, &mut self.events);
        self.time.advance();

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            &self.world,
            &self.time,
            &self.match_flow,
            &self.shooters,
            events,
        )
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Get a read-only reference to the match state machine.
    pub fn match_flow(&self) -> &MatchStateMachine {
        &self.match_flow
    }

    /// Get the AI shooters, opponent first.
    pub fn shooters(&self) -> &[AiShooter] {
        &self.shooters
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single command.
    fn handle_command(&mut self, command: DuelCommand) {
        let teardown = self.mode == GameMode::Multiplayer;
        match command {
            DuelCommand::StartCountdown => {
                self.match_flow.start_countdown(&mut self.events);
            }
            DuelCommand::Forfeit => {
                self.match_flow
                    .force_end(Outcome::Lost, teardown, &mut self.events);
            }
            DuelCommand::OpponentForfeit => {
                self.match_flow
                    .force_end(Outcome::Won, teardown, &mut self.events);
            }
            DuelCommand::Reset => match self.match_flow.reset(&mut self.events) {
                Ok(()) => {
                    for shooter in &mut self.shooters {
                        shooter.reset();
                    }
                    systems::cleanup::clear_arrows(&mut self.world, &mut self.despawn_buffer);
                    self.hits.clear();
                }
                Err(err) => warn!(%err, "Reset rejected"),
            },
            DuelCommand::Shoot { side } => self.manual_shot(side),
            DuelCommand::TargetHit { side } => self.hits.push(side),
            DuelCommand::AcknowledgeSubmission => self.match_flow.acknowledge_submission(),
            DuelCommand::ApplyReplica { replica } => {
                self.match_flow.apply_replica(replica, &mut self.events);
            }
            DuelCommand::Abort { code, detail } => self.match_flow.report_abort(code, &detail),
        }
    }

    /// Release an arrow from a human-controlled bow.
    fn manual_shot(&mut self, side: Side) {
        if !self.match_flow.is_active() {
            debug!(?side, "Shot outside active play, ignoring");
            return;
        }
        if self.shooters.iter().any(|s| s.rig().side == side) {
            debug!(?side, "Side is AI-controlled, ignoring manual shot");
            return;
        }
        let Some(bow_y) = ArenaView::new(&self.world, side).bow_y() else {
            warn!(?side, "Bow missing, shot dropped");
            return;
        };

        let rig = world_setup::shooter_rig(side);
        self.events.push(DuelEvent::FireDecision {
            side,
            spawn: DVec2::new(rig.shoot_point_x, bow_y + rig.shoot_offset_y),
            velocity: rig.facing * rig.base_force,
            force_multiplier: 1.0,
        });
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64) {
        // 1. Arena motion
        systems::motion::run(&mut self.world, &mut self.rng, dt);
        // 2. Position sampling + AI decision
        let active = self.match_flow.is_active();
        for shooter in &mut self.shooters {
            let view = ArenaView::new(&self.world, shooter.rig().side);
            shooter.tick(&view, &self.time, active, &mut self.rng, &mut self.events);
        }
        // 3. Arrow spawning
        systems::arrows::spawn_from_events(&mut self.world, &self.events);
        // 4. Arrow flight + hits
        systems::arrows::run(&mut self.world, dt, &mut self.hits, &mut self.despawn_buffer);
        // 5. Scoring, before the match timer runs
        for side in self.hits.drain(..) {
            self.match_flow.record_score(side, 1, &mut self.events);
        }
        // 6. Cleanup (lifetime, OOB)
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);
    }
}
