/// One owned game as reported for a single member.
#[derive(Debug, Clone, PartialEq)]
pub struct GameEntry {
    pub app_id: u32,
    pub name: String,
    /// Hours played, converted from the API's minute counts. Never negative,
    /// may be zero.
    pub hours: f64,
}

impl GameEntry {
    pub fn from_minutes(app_id: u32, name: String, minutes: u32) -> Self {
        Self {
            app_id,
            name,
            hours: f64::from(minutes) / 60.0,
        }
    }
}

/// The library of one member whose profile was public and reachable.
#[derive(Debug, Clone)]
pub struct PlayerLibrary {
    pub display_name: String,
    pub games: Vec<GameEntry>,
}

/// Per-game totals merged across every fetched library.
///
/// Merging is keyed by game name: at most one entry exists per distinct
/// name, and the first occurrence of a name fixes `app_id`.
#[derive(Debug, Clone)]
pub struct AggregatedGame {
    pub app_id: u32,
    pub name: String,
    pub total_hours: f64,
    pub player_count: u32,
    /// Always `total_hours / player_count`, recomputed after merging.
    pub average_hours: f64,
}
