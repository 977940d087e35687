//! Simulation constants and tuning defaults.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Arena layout (world units, origin at centre) ---

/// Half width of the playfield. Arrows past this are despawned.
pub const ARENA_HALF_WIDTH: f64 = 10.0;

/// Red bow sits on the left and shoots right.
pub const RED_BOW_X: f64 = -7.0;

/// Blue bow sits on the right and shoots left.
pub const BLUE_BOW_X: f64 = 7.0;

/// Red arrows score on the red target, placed on the right.
pub const RED_TARGET_X: f64 = 6.0;

/// Blue arrows score on the blue target, placed on the left.
pub const BLUE_TARGET_X: f64 = -6.0;

/// Horizontal distance from bow centre to arrow spawn point.
pub const SHOOT_POINT_OFFSET_X: f64 = 0.5;

/// Target hit box half extents (x, y).
pub const TARGET_HALF_EXTENTS: (f64, f64) = (0.35, 0.6);

/// Vertical sweep amplitude of targets.
pub const TARGET_MOVE_RANGE: f64 = 3.0;

/// Vertical sweep amplitude of bows.
pub const BOW_MOVE_RANGE: f64 = 2.5;

/// Bounds for the randomized sweep speed (radians of phase per second).
pub const MOVE_SPEED_MIN: f64 = 1.0;
pub const MOVE_SPEED_MAX: f64 = 4.0;

/// How often a sweeping body re-rolls its speed (seconds).
pub const SPEED_CHANGE_INTERVAL_SECS: f64 = 1.0;

// --- Arrows ---

/// Base launch speed of an arrow before difficulty scaling.
pub const ARROW_BASE_FORCE: f64 = 8.0;

/// Arrows still in flight after this many seconds are removed.
pub const ARROW_LIFETIME_SECS: f64 = 3.0;

// --- Targeting ---

/// Minimum spacing between target velocity re-estimates (seconds).
pub const VELOCITY_SAMPLE_INTERVAL_SECS: f64 = 0.1;

/// Target speed below which no aim correction is applied.
pub const MIN_CORRECTION_VELOCITY: f64 = 0.05;

/// Height gap below which no aim correction is applied.
pub const MIN_CORRECTION_DISTANCE: f64 = 0.05;

/// Scale applied to the velocity-proportional aim correction.
pub const CORRECTION_GAIN: f64 = 0.15;

// --- Match ---

/// Absorbs float drift when comparing accumulated tick deltas.
pub const TIME_EPSILON: f64 = 1e-9;

/// Default length of the active phase (seconds).
pub const MATCH_DURATION_SECS: f64 = 60.0;

/// Spacing between countdown beats (seconds).
pub const COUNTDOWN_BEAT_SECS: f64 = 1.0;

/// Delay between showing the result and reporting it (seconds).
pub const RESULT_REPORT_DELAY_SECS: f64 = 3.0;

/// Delay before reporting a forfeit result (seconds).
pub const FORFEIT_REPORT_DELAY_SECS: f64 = 0.1;

/// How long to wait for the platform to acknowledge a submitted result (seconds).
pub const SUBMIT_TIMEOUT_SECS: f64 = 5.0;

// --- Platform parameters ---

/// Region used when the platform does not supply one.
pub const DEFAULT_REGION: &str = "in";

/// Opponent id prefix for Easy bots.
pub const EASY_BOT_PREFIX: &str = "a9";

/// Opponent id prefix for Hard bots.
pub const HARD_BOT_PREFIX: &str = "b9";
