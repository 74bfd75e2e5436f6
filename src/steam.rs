use anyhow::{Context, Result};
use async_trait::async_trait;

/// Profiles whose game libraries are publicly readable carry this
/// `communityvisibilitystate` value.
pub const VISIBILITY_PUBLIC: i32 = 3;

/// Profile fields relevant to visibility gating.
#[derive(Debug, Clone)]
pub struct PlayerSummary {
    pub persona_name: Option<String>,
    pub visibility: i32,
}

/// One owned-game record before minutes are converted to hours.
#[derive(Debug, Clone)]
pub struct RawGame {
    pub app_id: u32,
    pub name: String,
    pub playtime_minutes: u32,
}

/// The three upstream Steam Web API calls the pipeline depends on.
#[async_trait]
pub trait SteamApi: Send + Sync {
    /// Raw members-list XML for a group.
    async fn member_list(&self, group_id: &str) -> Result<String>;

    /// Profile summary for one member, or `None` when the id matches no
    /// profile.
    async fn player_summary(&self, steam_id: &str, api_key: &str) -> Result<Option<PlayerSummary>>;

    async fn owned_games(&self, steam_id: &str, api_key: &str) -> Result<Vec<RawGame>>;
}

/// reqwest-backed implementation, with an optional proxy prefix for
/// deployments where steamcommunity.com is not directly reachable.
pub struct HttpSteamApi {
    client: reqwest::Client,
    proxy: Option<String>,
}

impl HttpSteamApi {
    pub fn new(proxy: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            proxy,
        }
    }

    /// When a proxy prefix is configured, the percent-encoded target URL is
    /// appended to it.
    fn target(&self, url: &str) -> String {
        match &self.proxy {
            Some(prefix) => {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(url.as_bytes()).collect();
                format!("{prefix}{encoded}")
            }
            None => url.to_string(),
        }
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(self.target(url))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl SteamApi for HttpSteamApi {
    async fn member_list(&self, group_id: &str) -> Result<String> {
        let url = format!("https://steamcommunity.com/groups/{group_id}/memberslistxml/?xml=1");
        self.get_text(&url)
            .await
            .context("members-list request failed")
    }

    async fn player_summary(&self, steam_id: &str, api_key: &str) -> Result<Option<PlayerSummary>> {
        let url = format!(
            "https://api.steampowered.com/ISteamUser/GetPlayerSummaries/v2/?key={}&steamids={}",
            api_key.trim(),
            steam_id.trim(),
        );
        let text = self
            .get_text(&url)
            .await
            .context("player summary request failed")?;
        // JSON parsing fails sometimes because HTML is returned instead.
        let parsed = json::parse(&text).context("player summary response is not JSON")?;
        Ok(parse_player_summary(&parsed))
    }

    async fn owned_games(&self, steam_id: &str, api_key: &str) -> Result<Vec<RawGame>> {
        let url = format!(
            "https://api.steampowered.com/IPlayerService/GetOwnedGames/v1/\
             ?key={}&steamid={}&include_appinfo=1&include_played_free_games=1",
            api_key.trim(),
            steam_id.trim(),
        );
        let text = self
            .get_text(&url)
            .await
            .context("owned games request failed")?;
        let parsed = json::parse(&text).context("owned games response is not JSON")?;
        Ok(parse_owned_games(&parsed))
    }
}

/// Pulls every `<steamID64>` value out of the members-list payload. The
/// payload is flat repeated markers, so a plain scan does the job.
pub fn scan_member_ids(xml: &str) -> Vec<String> {
    const OPEN: &str = "<steamID64>";
    const CLOSE: &str = "</steamID64>";

    let mut ids = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find(OPEN) {
        rest = &rest[start + OPEN.len()..];
        let Some(end) = rest.find(CLOSE) else { break };
        let id = &rest[..end];
        if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
            ids.push(id.to_string());
        }
        rest = &rest[end + CLOSE.len()..];
    }
    ids
}

fn parse_player_summary(parsed: &json::JsonValue) -> Option<PlayerSummary> {
    let player = &parsed["response"]["players"][0];
    if player.is_null() {
        return None;
    }
    Some(PlayerSummary {
        persona_name: player["personaname"].as_str().map(str::to_string),
        visibility: player["communityvisibilitystate"].as_i32().unwrap_or(0),
    })
}

fn parse_owned_games(parsed: &json::JsonValue) -> Vec<RawGame> {
    parsed["response"]["games"]
        .members()
        .filter_map(|g| {
            Some(RawGame {
                app_id: g["appid"].as_u32()?,
                // Records without a name would aggregate under "null".
                name: g["name"].as_str()?.to_string(),
                playtime_minutes: g["playtime_forever"].as_u32().unwrap_or(0),
            })
        })
        .collect()
}
