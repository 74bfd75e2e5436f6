use crate::cancel::CancelToken;
use crate::game::{GameEntry, PlayerLibrary};
use crate::steam::{SteamApi, VISIBILITY_PUBLIC};

/// Fetches one member's library.
///
/// Returns `None` for private profiles, unknown ids, and failed requests
/// alike: one member can never abort the batch. The token is checked between
/// the two upstream calls so a cancelled run stops issuing requests early.
pub async fn fetch_player(
    api: &dyn SteamApi,
    steam_id: &str,
    api_key: &str,
    token: &CancelToken,
) -> Option<PlayerLibrary> {
    let summary = match api.player_summary(steam_id, api_key).await {
        Ok(Some(summary)) => summary,
        Ok(None) => return None,
        Err(err) => {
            if !token.is_cancelled() {
                log::debug!("player summary failed for {steam_id}: {err:#}");
            }
            return None;
        }
    };

    if summary.visibility != VISIBILITY_PUBLIC || token.is_cancelled() {
        return None;
    }

    let games = match api.owned_games(steam_id, api_key).await {
        Ok(games) => games,
        Err(err) => {
            if !token.is_cancelled() {
                log::debug!("owned games failed for {steam_id}: {err:#}");
            }
            return None;
        }
    };

    let display_name = summary
        .persona_name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| steam_id.to_string());

    Some(PlayerLibrary {
        display_name,
        games: games
            .into_iter()
            .map(|g| GameEntry::from_minutes(g.app_id, g.name, g.playtime_minutes))
            .collect(),
    })
}
