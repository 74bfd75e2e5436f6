// The members-list XML comes from steamcommunity.com and needs no API key;
// the profile and owned-games endpoints need one. Playtime is reported in
// minutes and only for profiles whose game details are public.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use simplelog::{ColorChoice, Config as LogConfig, LevelFilter, TermLogger, TerminalMode};

use cancel::CancelToken;
use coordinator::{ProgressSink, RunGuard, RunOutcome};
use error::RunError;
use game::AggregatedGame;
use steam::HttpSteamApi;
use view::{Leaderboard, SortDirection, SortField};

mod aggregate;
mod cancel;
mod cli;
mod config;
mod coordinator;
mod error;
mod fetcher;
mod game;
mod resolver;
mod steam;
mod view;

#[tokio::main]
async fn main() {
    let matches = cli::build_command().get_matches();

    let _ = TermLogger::init(
        LevelFilter::Info,
        LogConfig::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );

    let config = match matches.get_one::<String>("config") {
        Some(path) => match config::Config::load(Path::new(path)) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("ERROR: {err:#}");
                return;
            }
        },
        None => config::Config::default(),
    };

    let group_input = matches
        .get_one::<String>("group")
        .cloned()
        .or_else(|| config.group.clone())
        .unwrap_or_default();

    let key_file: PathBuf = matches
        .get_one::<String>("api_key")
        .map(PathBuf::from)
        .or_else(|| config.api_key_file.clone())
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_KEY_FILE));

    let Some(api_key) = config::load_api_key(&key_file) else {
        eprintln!("ERROR: {}", RunError::MissingApiKey);
        return;
    };
    // Keep the default store current when the key came from elsewhere.
    if key_file != Path::new(config::DEFAULT_KEY_FILE) {
        if let Err(err) = config::store_api_key(Path::new(config::DEFAULT_KEY_FILE), &api_key) {
            log::warn!("could not persist API key: {err:#}");
        }
    }

    let proxy = matches
        .get_one::<String>("proxy")
        .cloned()
        .or_else(|| config.proxy.clone());
    let api = HttpSteamApi::new(proxy);

    let mut guard = RunGuard::default();
    let token = guard.begin();

    // Ctrl-C trips the shared token; in-flight fetches settle and their
    // results are discarded.
    {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        });
    }

    match run(&api, &group_input, &api_key, &token).await {
        Ok(Some(games)) => {
            guard.finish();
            if games.is_empty() {
                println!("No public libraries found.");
                return;
            }
            let mut board = Leaderboard::new(games);
            if let Some(field) = matches
                .get_one::<String>("sort")
                .and_then(|flag| sort_field_from_flag(flag))
            {
                board.toggle_sort(field);
            }
            interact(board);
        }
        // Cancelled: no error, no leftover output.
        Ok(None) => guard.finish(),
        Err(err) => {
            if !token.is_cancelled() {
                eprintln!("ERROR: {:#}", anyhow::Error::from(err));
            }
        }
    }
}

/// `total` maps to `None`: it is already the construction default, and a
/// toggle would flip it to ascending.
fn sort_field_from_flag(flag: &str) -> Option<SortField> {
    match flag {
        "average" => Some(SortField::AverageHours),
        "players" => Some(SortField::PlayerCount),
        _ => None,
    }
}

async fn run(
    api: &HttpSteamApi,
    group_input: &str,
    api_key: &str,
    token: &CancelToken,
) -> Result<Option<Vec<AggregatedGame>>, RunError> {
    let members = resolver::resolve_members(api, group_input, token).await?;
    log::info!("group resolved to {} members", members.len());

    let bar = create_progress_bar(members.len());
    let mut sink = BarSink { bar: bar.clone() };
    let outcome = coordinator::collect_libraries(api, &members, api_key, token, &mut sink).await;
    bar.finish_and_clear();

    match outcome {
        RunOutcome::Completed(libraries) => {
            log::info!(
                "{} of {} members shared their libraries",
                libraries.len(),
                members.len()
            );
            Ok(Some(aggregate::aggregate_games(&libraries)))
        }
        RunOutcome::Cancelled => Ok(None),
    }
}

struct BarSink {
    bar: ProgressBar,
}

impl ProgressSink for BarSink {
    fn wave_done(&mut self, processed: usize, _total: usize) {
        self.bar.set_position(processed as u64);
    }

    fn player_done(&mut self, display_name: &str, game_count: usize) {
        self.bar
            .println(format!("{display_name} - {game_count} games"));
    }
}

fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} members {msg}")
            .unwrap()
            .progress_chars("█▓▒░ "),
    );
    pb
}

fn interact(mut board: Leaderboard) {
    render(&board);

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        match line.trim() {
            "" => continue,
            "t" => board.toggle_sort(SortField::TotalHours),
            "a" => board.toggle_sort(SortField::AverageHours),
            "p" => board.toggle_sort(SortField::PlayerCount),
            "n" => board.next_page(),
            "b" => board.prev_page(),
            "q" => return,
            other => match other.parse::<usize>() {
                Ok(page) => board.set_page(page),
                Err(_) => continue,
            },
        }
        render(&board);
    }
}

fn render(board: &Leaderboard) {
    let (field, direction) = board.sort_state();
    let marker = |f: SortField| {
        if f == field {
            match direction {
                SortDirection::Descending => " v",
                SortDirection::Ascending => " ^",
            }
        } else {
            ""
        }
    };

    println!();
    println!(
        "{:<44} {:>14} {:>12} {:>10}",
        "Game",
        format!("Total hours{}", marker(SortField::TotalHours)),
        format!("Avg hours{}", marker(SortField::AverageHours)),
        format!("Players{}", marker(SortField::PlayerCount)),
    );
    for game in board.current_page() {
        println!(
            "{:<44} {:>14.1} {:>12.1} {:>10}",
            clipped(&game.name, 44),
            game.total_hours,
            game.average_hours,
            game.player_count,
        );
    }
    println!(
        "page {}/{} ({} games)  sort: [t]otal [a]verage [p]layers  page: [n]ext [b]ack <number>  [q]uit",
        board.page(),
        board.page_count(),
        board.len(),
    );
}

fn clipped(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        name.to_string()
    } else {
        let mut short: String = name.chars().take(width - 3).collect();
        short.push_str("...");
        short
    }
}
