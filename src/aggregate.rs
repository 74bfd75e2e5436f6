use std::collections::HashMap;

use crate::game::{AggregatedGame, PlayerLibrary};

/// Merges every fetched library into per-game totals.
///
/// Merging is keyed by exact game name, matching the upstream data: the
/// first occurrence of a name fixes the app id and seeds the totals, every
/// later occurrence adds its hours and one player, with no deduplication of
/// repeat contributions. Averages are computed once at the end. The result
/// is sorted by descending total hours; ties keep discovery order.
pub fn aggregate_games(libraries: &[PlayerLibrary]) -> Vec<AggregatedGame> {
    // Index into `merged` per name keeps discovery order without a second
    // pass over a map.
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut merged: Vec<AggregatedGame> = Vec::new();

    for library in libraries {
        for game in &library.games {
            match slots.get(game.name.as_str()) {
                Some(&slot) => {
                    let entry = &mut merged[slot];
                    entry.total_hours += game.hours;
                    entry.player_count += 1;
                }
                None => {
                    slots.insert(&game.name, merged.len());
                    merged.push(AggregatedGame {
                        app_id: game.app_id,
                        name: game.name.clone(),
                        total_hours: game.hours,
                        player_count: 1,
                        average_hours: 0.0,
                    });
                }
            }
        }
    }

    for entry in &mut merged {
        entry.average_hours = entry.total_hours / f64::from(entry.player_count);
    }

    merged.sort_by(|a, b| b.total_hours.total_cmp(&a.total_hours));
    merged
}
