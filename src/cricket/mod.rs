pub mod teams;
pub mod venues;

pub use teams::Team;
pub use venues::City;

/// Deliveries in a full T20 innings.
pub const BALLS_PER_INNINGS: u32 = 120;
/// Deliveries in one over.
pub const BALLS_PER_OVER: u32 = 6;
/// Wickets available to a batting side.
pub const WICKETS_PER_INNINGS: u32 = 10;
