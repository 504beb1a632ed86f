/// Engine configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Maximum number of reference hops followed in one resolution.
    /// Chains longer than this are reported as cycles.
    pub max_reference_depth: u32,
    /// Maximum number of concurrently active statuses per entity.
    pub max_status_effects: usize,
    /// Number of faces on each die rolled by `roll` magnitudes.
    pub dice_sides: u32,
    /// Base seed mixed into every dice roll.
    pub world_seed: u64,
}

impl EngineConfig {
    // ===== compile-time constants =====
    /// Dice pool conversion: `value / PIPS_PER_DIE` dice plus `value % PIPS_PER_DIE` pips.
    pub const PIPS_PER_DIE: i64 = 3;
    /// Upper bound on dice rolled for a single magnitude.
    pub const MAX_DICE_PER_ROLL: i64 = 1024;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_REFERENCE_DEPTH: u32 = 16;
    pub const DEFAULT_MAX_STATUS_EFFECTS: usize = 32;
    pub const DEFAULT_DICE_SIDES: u32 = 6;
    pub const DEFAULT_WORLD_SEED: u64 = 0;

    pub fn new() -> Self {
        Self {
            max_reference_depth: Self::DEFAULT_MAX_REFERENCE_DEPTH,
            max_status_effects: Self::DEFAULT_MAX_STATUS_EFFECTS,
            dice_sides: Self::DEFAULT_DICE_SIDES,
            world_seed: Self::DEFAULT_WORLD_SEED,
        }
    }

    pub fn with_world_seed(mut self, world_seed: u64) -> Self {
        self.world_seed = world_seed;
        self
    }

    pub fn with_max_reference_depth(mut self, depth: u32) -> Self {
        self.max_reference_depth = depth;
        self
    }

    pub fn with_max_status_effects(mut self, max: usize) -> Self {
        self.max_status_effects = max;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
