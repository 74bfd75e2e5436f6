use crate::game::AggregatedGame;

pub const PAGE_SIZE: usize = 20;
/// Pagination is hard-capped: entries past page 10 stay unreachable.
pub const MAX_PAGES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    TotalHours,
    AverageHours,
    PlayerCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Sortable, paginated window over the aggregate.
///
/// Holds display state only; the underlying entries never change after
/// construction. The aggregator already emits descending total hours, so the
/// initial sort state matches the data as constructed.
pub struct Leaderboard {
    games: Vec<AggregatedGame>,
    field: SortField,
    direction: SortDirection,
    /// 1-based.
    page: usize,
}

impl Leaderboard {
    pub fn new(games: Vec<AggregatedGame>) -> Self {
        Self {
            games,
            field: SortField::TotalHours,
            direction: SortDirection::Descending,
            page: 1,
        }
    }

    pub fn sort_state(&self) -> (SortField, SortDirection) {
        (self.field, self.direction)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.games.len().div_ceil(PAGE_SIZE).min(MAX_PAGES)
    }

    /// Selecting the active column flips its direction; any other column
    /// starts descending. Re-sorting always returns to page 1.
    pub fn toggle_sort(&mut self, field: SortField) {
        self.direction = if self.field == field {
            match self.direction {
                SortDirection::Descending => SortDirection::Ascending,
                SortDirection::Ascending => SortDirection::Descending,
            }
        } else {
            SortDirection::Descending
        };
        self.field = field;
        self.page = 1;
        self.resort();
    }

    fn resort(&mut self) {
        let field = self.field;
        let direction = self.direction;
        self.games.sort_by(|a, b| {
            let ordering = match field {
                SortField::TotalHours => a.total_hours.total_cmp(&b.total_hours),
                SortField::AverageHours => a.average_hours.total_cmp(&b.average_hours),
                SortField::PlayerCount => a.player_count.cmp(&b.player_count),
            };
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    pub fn current_page(&self) -> &[AggregatedGame] {
        let start = (self.page - 1) * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(self.games.len());
        if start >= end {
            &[]
        } else {
            &self.games[start..end]
        }
    }

    /// Clamped to the capped page range.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.page_count().max(1));
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(n: usize) -> Leaderboard {
        // Descending total hours, as the aggregator emits.
        let games = (0..n)
            .map(|i| AggregatedGame {
                app_id: i as u32,
                name: format!("game-{i}"),
                total_hours: (n - i) as f64,
                player_count: (i % 7 + 1) as u32,
                average_hours: (n - i) as f64 / f64::from((i % 7 + 1) as u32),
            })
            .collect();
        Leaderboard::new(games)
    }

    #[test]
    fn active_field_toggles_direction() {
        let mut board = board(5);
        assert_eq!(
            board.sort_state(),
            (SortField::TotalHours, SortDirection::Descending)
        );

        board.toggle_sort(SortField::TotalHours);
        assert_eq!(
            board.sort_state(),
            (SortField::TotalHours, SortDirection::Ascending)
        );

        board.toggle_sort(SortField::TotalHours);
        assert_eq!(
            board.sort_state(),
            (SortField::TotalHours, SortDirection::Descending)
        );
    }

    #[test]
    fn a_new_field_starts_descending() {
        let mut board = board(5);
        board.toggle_sort(SortField::TotalHours); // now ascending
        board.toggle_sort(SortField::PlayerCount);
        assert_eq!(
            board.sort_state(),
            (SortField::PlayerCount, SortDirection::Descending)
        );
    }

    #[test]
    fn sorting_resets_to_page_one() {
        let mut board = board(60);
        board.set_page(3);
        assert_eq!(board.page(), 3);
        board.toggle_sort(SortField::AverageHours);
        assert_eq!(board.page(), 1);
    }

    #[test]
    fn ascending_total_hours_reorders_the_page() {
        let mut board = board(3);
        board.toggle_sort(SortField::TotalHours);
        let totals: Vec<f64> = board.current_page().iter().map(|g| g.total_hours).collect();
        assert_eq!(totals, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn page_count_is_capped_at_ten() {
        let board = board(1000);
        assert_eq!(board.page_count(), MAX_PAGES);
    }

    #[test]
    fn ranks_beyond_the_cap_are_unreachable() {
        let mut board = board(1000);
        board.set_page(usize::MAX);
        assert_eq!(board.page(), MAX_PAGES);

        // The deepest reachable entry is rank 200.
        let last = board.current_page().last().unwrap();
        assert_eq!(last.name, "game-199");
    }

    #[test]
    fn partial_last_page_is_short() {
        let mut board = board(45);
        assert_eq!(board.page_count(), 3);
        board.set_page(3);
        assert_eq!(board.current_page().len(), 5);
    }

    #[test]
    fn paging_is_clamped_both_ways() {
        let mut board = board(45);
        board.prev_page();
        assert_eq!(board.page(), 1);
        board.set_page(2);
        board.next_page();
        board.next_page();
        assert_eq!(board.page(), 3);
    }

    #[test]
    fn empty_board_has_no_pages_and_an_empty_slice() {
        let mut board = board(0);
        assert!(board.is_empty());
        assert_eq!(board.page_count(), 0);
        board.set_page(5);
        assert_eq!(board.page(), 1);
        assert!(board.current_page().is_empty());
    }
}
