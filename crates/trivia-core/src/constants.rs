/// Lowest reachable level.
pub const MIN_LEVEL: u32 = 1;

/// Highest reachable level with the default curve.
pub const MAX_LEVEL: u32 = 1000;

/// Every level divisible by this is a milestone.
pub const MILESTONE_INTERVAL: u32 = 10;

/// Easiest authored difficulty tier.
pub const MIN_TIER: u8 = 1;

/// Hardest authored difficulty tier.
pub const MAX_TIER: u8 = 5;

/// Number of challenge questions in a daily assignment, one per continent.
pub const CHALLENGE_SIZE: usize = 5;

/// Weekly themes rotate every this many calendar days.
pub const THEME_PERIOD_DAYS: i64 = 7;

/// Theme rotation epoch: 2024-01-01 (a Monday), as days since 1970-01-01.
pub const THEME_EPOCH_DAYS: i64 = 19_723;

/// Mixed into the day number before seeding the daily assignment RNG.
pub const DAILY_SEED_SALT: u64 = 0x7269_7475_616c_2d31;
