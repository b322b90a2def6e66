/// Track grid constants
pub mod track {
    /// Edge length of one square tile in world units (20 x 15 tiles = 800 x 600)
    pub const TILE_SIZE: f32 = 40.0;

    /// Level 1 of the derby.
    /// `#` = wall, `.` = floor, `S` = spawn, `G` = goal
    /// Corner walls: `1` = top-left, `2` = top-right, `3` = bottom-right, `4` = bottom-left
    pub const LEVEL_1: [&str; 15] = [
        "####################",
        "#S................##",
        "##############.....#",
        "#.............##...#",
        "#...######.....##..#",
        "#......####....##..#",
        "#....#######...##..#",
        "##...#######...#...#",
        "###...######...#...#",
        "###...######...#...#",
        "##....#####....#...#",
        "#....##G.......#...#",
        "#....##########....#",
        "#..................#",
        "####################",
    ];

    /// Racing line through level 1 in world units.
    /// Spawn corridor east, down the right channel, west along the bottom,
    /// up the left pocket, then east and south through the middle to the goal.
    /// Every segment stays more than VEHICLE_RADIUS + JITTER_RADIUS clear of walls.
    pub const LEVEL_1_RACING_LINE: [(f32, f32); 18] = [
        (380.0, 60.0),
        (615.0, 60.0),
        (735.0, 105.0),
        (735.0, 265.0),
        (680.0, 415.0),
        (700.0, 530.0),
        (590.0, 540.0),
        (390.0, 540.0),
        (165.0, 540.0),
        (155.0, 325.0),
        (130.0, 235.0),
        (135.0, 140.0),
        (265.0, 140.0),
        (450.0, 140.0),
        (515.0, 220.0),
        (505.0, 395.0),
        (495.0, 460.0),
        (300.0, 460.0),
    ];
}

/// Player kinetics. Speeds are world units per second, accelerations are
/// speed gained per millisecond of throttle.
pub mod kinetics {
    /// Steering rate in radians per millisecond
    pub const TURN_RATE_PER_MS: f32 = 0.0035;
    pub const FORWARD_ACCEL_PER_MS: f32 = 0.35;
    pub const BRAKE_DECEL_PER_MS: f32 = 0.8;
    pub const REVERSE_ACCEL_PER_MS: f32 = 0.25;
    /// Gain applied to forward throttle and braking
    pub const ACCEL_GAIN: f32 = 1.0;
    /// Gain applied to reverse throttle
    pub const REVERSE_GAIN: f32 = 0.6;
    /// Coast decay applied once per tick, not scaled by delta time
    pub const FRICTION_PER_TICK: f32 = 0.97;
    pub const MAX_FORWARD_SPEED: f32 = 260.0;
    pub const MAX_REVERSE_SPEED: f32 = 100.0;
}

/// Wall impact constants
pub mod collision {
    /// Impacts at or below this speed are free (no damage, no bounce)
    pub const IMPACT_THRESHOLD: f32 = 80.0;
    /// Damage = floor(speed / DAMAGE_DIVISOR), then clamped per profile
    pub const DAMAGE_DIVISOR: f32 = 40.0;

    pub const PLAYER_MIN_DAMAGE: u32 = 5;
    pub const PLAYER_MAX_DAMAGE: u32 = 25;
    pub const PLAYER_RESTITUTION: f32 = 0.66;
    pub const PLAYER_DAMPING: f32 = 0.9;

    pub const NPC_MIN_DAMAGE: u32 = 5;
    pub const NPC_MAX_DAMAGE: u32 = 20;
    pub const NPC_RESTITUTION: f32 = 0.10;
    pub const NPC_DAMPING: f32 = 0.92;
}

/// AI pilot constants
pub mod ai {
    /// Traction is clamped into this band before blending velocities
    pub const TRACTION_MIN: f32 = 0.05;
    pub const TRACTION_MAX: f32 = 0.6;
    /// Waypoint counts as reached when distance^2 < TILE_SIZE^2 * REACH_FACTOR
    pub const REACH_FACTOR: f32 = 1.1;
    /// Maximum per-axis racing-line bias drawn once per agent
    pub const JITTER_RADIUS: f32 = 6.0;
    /// Relative spread applied to roster base speeds at creation
    pub const SPEED_VARIANCE: f32 = 0.05;
}

/// Race lifecycle and roster constants
pub mod race {
    pub const MAX_HEALTH: u32 = 100;
    pub const PLAYER_LABEL: &str = "You";
    pub const PLAYER_COLOR: u32 = 0xF5_D0_3B;
    pub const VEHICLE_SCALE: f32 = 1.0;
    /// Starting heading for every racer (east, along the spawn corridor)
    pub const SPAWN_HEADING: f32 = 0.0;
    /// Grid slots for rivals, relative to the spawn tile centre
    pub const RIVAL_SPAWN_OFFSETS: [(f32, f32); 4] = [(36.0, -6.0), (72.0, 6.0), (108.0, -6.0), (144.0, 6.0)];
}

/// Cosmetic timing constants
pub mod effects {
    /// How long a damage tint stays on after a wall impact
    pub const FLASH_DURATION_MS: f64 = 120.0;
}

/// Reference physics harness constants
pub mod harness {
    /// Collision radius of a car body
    pub const VEHICLE_RADIUS: f32 = 12.0;
    /// Default frame length (60 Hz)
    pub const DEFAULT_TICK_MS: f32 = 1000.0 / 60.0;
}

/// Squared distance under which an AI agent advances to its next waypoint
pub fn waypoint_reach_sq() -> f32 {
    track::TILE_SIZE * track::TILE_SIZE * ai::REACH_FACTOR
}
