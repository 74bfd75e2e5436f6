use futures::stream::{FuturesUnordered, StreamExt};

use crate::cancel::CancelToken;
use crate::fetcher::fetch_player;
use crate::game::PlayerLibrary;
use crate::steam::SteamApi;

/// Concurrent fetches per wave. Waves run strictly one after another.
pub const WAVE_SIZE: usize = 20;

/// Progress events emitted by the coordinator, implemented by the CLI
/// progress bar and by test collectors.
pub trait ProgressSink {
    /// A wave settled. `processed` counts attempted members, not successes.
    fn wave_done(&mut self, processed: usize, total: usize);

    /// One member's library arrived, in settlement order within its wave.
    fn player_done(&mut self, display_name: &str, game_count: usize);
}

/// How a run ended. Cancellation is an outcome, never an error, so callers
/// cannot accidentally surface it to the user.
#[derive(Debug)]
pub enum RunOutcome {
    Completed(Vec<PlayerLibrary>),
    Cancelled,
}

/// Drives the fetcher over all members in waves of [`WAVE_SIZE`].
///
/// Every fetch in a wave must settle, successfully or not, before the next
/// wave starts. The token is checked at each wave boundary; once it trips,
/// no further waves start. Successful libraries are collected in settlement
/// order within each wave, concatenated across waves.
pub async fn collect_libraries(
    api: &dyn SteamApi,
    member_ids: &[String],
    api_key: &str,
    token: &CancelToken,
    progress: &mut dyn ProgressSink,
) -> RunOutcome {
    let total = member_ids.len();
    let mut collected = Vec::new();
    let mut processed = 0;

    for wave in member_ids.chunks(WAVE_SIZE) {
        if token.is_cancelled() {
            return RunOutcome::Cancelled;
        }

        let mut fetches: FuturesUnordered<_> = wave
            .iter()
            .map(|id| fetch_player(api, id, api_key, token))
            .collect();

        while let Some(result) = fetches.next().await {
            if let Some(library) = result {
                progress.player_done(&library.display_name, library.games.len());
                collected.push(library);
            }
        }

        processed += wave.len();
        progress.wave_done(processed, total);
    }

    // A cancel that lands during the final wave still counts.
    if token.is_cancelled() {
        return RunOutcome::Cancelled;
    }
    RunOutcome::Completed(collected)
}

/// At most one run may be active: beginning a new run cancels the previous
/// run's token before a fresh one is handed out.
#[derive(Default)]
pub struct RunGuard {
    active: Option<CancelToken>,
}

impl RunGuard {
    pub fn begin(&mut self) -> CancelToken {
        if let Some(previous) = self.active.take() {
            previous.cancel();
        }
        let token = CancelToken::new();
        self.active = Some(token.clone());
        token
    }

    pub fn finish(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::tests::FakeSteam;
    use crate::steam::VISIBILITY_PUBLIC;

    /// Records every progress event for assertions.
    #[derive(Default)]
    struct Recorder {
        waves: Vec<(usize, usize)>,
        lines: Vec<String>,
    }

    impl ProgressSink for Recorder {
        fn wave_done(&mut self, processed: usize, total: usize) {
            self.waves.push((processed, total));
        }

        fn player_done(&mut self, display_name: &str, game_count: usize) {
            self.lines.push(format!("{display_name}:{game_count}"));
        }
    }

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("7656119800000{i:04}")).collect()
    }

    #[tokio::test]
    async fn waves_advance_processed_by_attempted_members() {
        let members = ids(25);
        let mut api = FakeSteam::default();
        for id in &members {
            api = api.with_member(id, id, VISIBILITY_PUBLIC, vec![(10, "Counter-Strike", 60)]);
        }
        // Failures still count toward `processed`.
        api.broken.push(members[3].clone());
        api.broken.push(members[24].clone());

        let token = CancelToken::new();
        let mut recorder = Recorder::default();
        let outcome = collect_libraries(&api, &members, "key", &token, &mut recorder).await;

        let RunOutcome::Completed(libraries) = outcome else {
            panic!("run should complete");
        };
        assert_eq!(libraries.len(), 23);
        assert_eq!(recorder.waves, vec![(20, 25), (25, 25)]);
        assert_eq!(recorder.lines.len(), 23);
    }

    #[tokio::test]
    async fn failures_shrink_the_sample_without_aborting() {
        let members = ids(3);
        let mut api = FakeSteam::default()
            .with_member(&members[0], "a", VISIBILITY_PUBLIC, vec![(1, "X", 60)])
            .with_member(&members[1], "b", VISIBILITY_PUBLIC, vec![(1, "X", 120)]);
        api.broken.push(members[2].clone());

        let token = CancelToken::new();
        let mut recorder = Recorder::default();
        let outcome = collect_libraries(&api, &members, "key", &token, &mut recorder).await;

        let RunOutcome::Completed(libraries) = outcome else {
            panic!("run should complete");
        };
        let mut names: Vec<&str> = libraries.iter().map(|l| l.display_name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(recorder.waves, vec![(3, 3)]);
    }

    #[tokio::test]
    async fn cancel_before_the_first_wave_yields_cancelled() {
        let members = ids(5);
        let mut api = FakeSteam::default();
        for id in &members {
            api = api.with_member(id, id, VISIBILITY_PUBLIC, vec![]);
        }

        let token = CancelToken::new();
        token.cancel();
        let mut recorder = Recorder::default();
        let outcome = collect_libraries(&api, &members, "key", &token, &mut recorder).await;

        assert!(matches!(outcome, RunOutcome::Cancelled));
        assert!(recorder.waves.is_empty());
        assert!(recorder.lines.is_empty());
    }

    #[tokio::test]
    async fn empty_member_list_completes_immediately() {
        let api = FakeSteam::default();
        let token = CancelToken::new();
        let mut recorder = Recorder::default();
        let outcome = collect_libraries(&api, &[], "key", &token, &mut recorder).await;

        let RunOutcome::Completed(libraries) = outcome else {
            panic!("run should complete");
        };
        assert!(libraries.is_empty());
        assert!(recorder.waves.is_empty());
    }

    #[tokio::test]
    async fn a_resolved_group_flows_through_to_the_aggregate() {
        // Three members: A owns X for 60 min, B owns X for 120 min and Y for
        // 30 min, C fails to fetch.
        let mut api = FakeSteam::default()
            .with_member("1", "A", VISIBILITY_PUBLIC, vec![(1, "X", 60)])
            .with_member("2", "B", VISIBILITY_PUBLIC, vec![(1, "X", 120), (2, "Y", 30)]);
        api.members_xml =
            "<steamID64>1</steamID64><steamID64>2</steamID64><steamID64>3</steamID64>".to_string();
        api.broken.push("3".to_string());

        let token = CancelToken::new();
        let members = crate::resolver::resolve_members(&api, "payload", &token)
            .await
            .unwrap();
        assert_eq!(members, vec!["1", "2", "3"]);

        let mut recorder = Recorder::default();
        let outcome = collect_libraries(&api, &members, "key", &token, &mut recorder).await;
        let RunOutcome::Completed(libraries) = outcome else {
            panic!("run should complete");
        };
        assert_eq!(libraries.len(), 2);
        assert_eq!(recorder.waves, vec![(3, 3)]);

        let merged = crate::aggregate::aggregate_games(&libraries);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "X");
        assert_eq!(merged[0].total_hours, 3.0);
        assert_eq!(merged[0].player_count, 2);
        assert_eq!(merged[0].average_hours, 1.5);
        assert_eq!(merged[1].name, "Y");
        assert_eq!(merged[1].total_hours, 0.5);
        assert_eq!(merged[1].player_count, 1);
    }

    #[test]
    fn a_new_run_cancels_the_previous_token() {
        let mut guard = RunGuard::default();
        let first = guard.begin();
        assert!(!first.is_cancelled());

        let second = guard.begin();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        guard.finish();
        assert!(!second.is_cancelled());
    }
}
