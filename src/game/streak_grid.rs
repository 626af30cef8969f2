use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::model::{AppColor, AppIcon, APP_LIST};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GridPhase {
    Running,
    Won,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub color: AppColor,
    pub app: AppIcon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapResult {
    Ignored,
    StreakStarted(AppColor),
    StreakExtended(u32),
    StreakBroken,
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    Ignored,
    Remaining(u32),
    TimedOut,
}

/// How close the countdown is to running out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Urgency {
    Normal,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreakGrid {
    rows: usize,
    cols: usize,
    cells: Vec<GridCell>,
    target_streak: u32,
    current_streak: u32,
    chosen_color: Option<AppColor>,
    seconds_remaining: u32,
    phase: GridPhase,
}

impl StreakGrid {
    /// Paints every cell with an independent uniform pick from the palette and
    /// deals the app icons from a shuffled list.
    pub fn generate(
        rows: usize,
        cols: usize,
        target_streak: u32,
        timer_seconds: u32,
        rng: &mut impl Rng,
    ) -> Self {
        let colors: Vec<AppColor> = (0..rows * cols)
            .map(|_| AppColor::PALETTE[rng.random_range(0..AppColor::PALETTE.len())])
            .collect();

        let mut apps = APP_LIST;
        apps.shuffle(rng);

        let mut grid = Self::with_colors(rows, cols, &colors, target_streak, timer_seconds);
        for (i, cell) in grid.cells.iter_mut().enumerate() {
            cell.app = apps[i % apps.len()];
        }
        trace!(target: "streak_grid", "Generated {}x{} grid: {:?}", rows, cols, colors);
        grid
    }

    /// Builds a grid with explicit colors; icons follow the list order.
    ///
    /// `colors` shorter than `rows * cols` wraps around; an empty slice paints red.
    pub fn with_colors(
        rows: usize,
        cols: usize,
        colors: &[AppColor],
        target_streak: u32,
        timer_seconds: u32,
    ) -> Self {
        let cells = (0..rows * cols)
            .map(|i| GridCell {
                color: if colors.is_empty() {
                    AppColor::Red
                } else {
                    colors[i % colors.len()]
                },
                app: APP_LIST[i % APP_LIST.len()],
            })
            .collect();
        Self {
            rows,
            cols,
            cells,
            target_streak,
            current_streak: 0,
            chosen_color: None,
            seconds_remaining: timer_seconds,
            phase: GridPhase::Running,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&GridCell> {
        self.cells.get(index)
    }

    pub fn target_streak(&self) -> u32 {
        self.target_streak
    }

    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    pub fn chosen_color(&self) -> Option<AppColor> {
        self.chosen_color
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn phase(&self) -> GridPhase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase != GridPhase::Running
    }

    pub fn urgency(&self) -> Urgency {
        match self.seconds_remaining {
            0..=30 => Urgency::Danger,
            31..=60 => Urgency::Warning,
            _ => Urgency::Normal,
        }
    }

    pub fn tap(&mut self, index: usize) -> TapResult {
        if self.is_game_over() {
            return TapResult::Ignored;
        }
        let Some(cell) = self.cells.get(index) else {
            return TapResult::Ignored;
        };
        let color = cell.color;

        if self.current_streak == 0 {
            self.chosen_color = Some(color);
            self.current_streak = 1;
            return self.check_target(TapResult::StreakStarted(color));
        }

        if Some(color) == self.chosen_color {
            self.current_streak += 1;
            self.check_target(TapResult::StreakExtended(self.current_streak))
        } else {
            debug!(
                target: "streak_grid",
                "Streak of {} broken by {} cell {}",
                self.current_streak, color, index
            );
            self.current_streak = 0;
            self.chosen_color = None;
            TapResult::StreakBroken
        }
    }

    fn check_target(&mut self, result: TapResult) -> TapResult {
        if self.current_streak >= self.target_streak {
            self.phase = GridPhase::Won;
            TapResult::Won
        } else {
            result
        }
    }

    /// One second of countdown.
    pub fn tick(&mut self) -> CountdownTick {
        if self.is_game_over() {
            return CountdownTick::Ignored;
        }
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining == 0 {
            self.phase = GridPhase::TimedOut;
            CountdownTick::TimedOut
        } else {
            CountdownTick::Remaining(self.seconds_remaining)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use AppColor::*;

    #[test]
    fn test_three_matching_taps_win() {
        let mut grid = StreakGrid::with_colors(3, 3, &[Red, Red, Red, Blue], 3, 300);

        assert_eq!(grid.tap(0), TapResult::StreakStarted(Red));
        assert_eq!(grid.tap(1), TapResult::StreakExtended(2));
        assert_eq!(grid.tap(2), TapResult::Won);
        assert_eq!(grid.phase(), GridPhase::Won);
        assert_eq!(grid.tap(0), TapResult::Ignored);
    }

    #[test]
    fn test_mismatch_resets_streak() {
        let mut grid = StreakGrid::with_colors(3, 3, &[Red, Blue], 3, 300);

        grid.tap(0);
        assert_eq!(grid.tap(1), TapResult::StreakBroken);
        assert_eq!(grid.current_streak(), 0);
        assert_eq!(grid.chosen_color(), None);
    }

    #[test]
    fn test_first_tap_always_starts_streak() {
        let mut grid = StreakGrid::with_colors(3, 3, &[Red, Blue, Green], 5, 300);

        grid.tap(0);
        grid.tap(1);
        // the tap after a broken streak starts a fresh one with whatever color it hits
        assert_eq!(grid.tap(2), TapResult::StreakStarted(Green));
        assert_eq!(grid.current_streak(), 1);
        assert_eq!(grid.chosen_color(), Some(Green));

        // tapping the same cell again counts as a match
        assert_eq!(grid.tap(2), TapResult::StreakExtended(2));
    }

    #[test]
    fn test_out_of_range_tap_ignored() {
        let mut grid = StreakGrid::with_colors(3, 3, &[Red], 3, 300);
        assert_eq!(grid.tap(9), TapResult::Ignored);
        assert_eq!(grid.current_streak(), 0);
    }

    #[test]
    fn test_countdown_times_out() {
        let mut grid = StreakGrid::with_colors(3, 3, &[Red], 3, 3);

        assert_eq!(grid.tick(), CountdownTick::Remaining(2));
        assert_eq!(grid.tick(), CountdownTick::Remaining(1));
        assert_eq!(grid.tick(), CountdownTick::TimedOut);
        assert_eq!(grid.seconds_remaining(), 0);
        assert_eq!(grid.tick(), CountdownTick::Ignored);
        assert_eq!(grid.tap(0), TapResult::Ignored);
    }

    #[test]
    fn test_urgency_thresholds() {
        let mut grid = StreakGrid::with_colors(3, 3, &[Red], 3, 62);
        assert_eq!(grid.urgency(), Urgency::Normal);
        grid.tick();
        grid.tick();
        assert_eq!(grid.urgency(), Urgency::Warning);
        for _ in 0..30 {
            grid.tick();
        }
        assert_eq!(grid.seconds_remaining(), 30);
        assert_eq!(grid.urgency(), Urgency::Danger);
    }

    #[test]
    fn test_generate_fills_every_cell_from_palette() {
        let mut rng = StdRng::seed_from_u64(3);
        let grid = StreakGrid::generate(7, 6, 4, 120, &mut rng);

        assert_eq!(grid.cells().len(), 42);
        assert_eq!(grid.rows(), 7);
        assert_eq!(grid.cols(), 6);
        assert!(grid
            .cells()
            .iter()
            .all(|cell| AppColor::PALETTE.contains(&cell.color)));
        // the first 25 cells carry distinct apps, then the list repeats
        assert_eq!(grid.cells()[0].app, grid.cells()[25].app);
        assert_eq!(grid.seconds_remaining(), 120);
        assert_eq!(grid.target_streak(), 4);
    }

    #[test]
    fn test_generate_is_reproducible_from_seed() {
        let a = StreakGrid::generate(5, 5, 5, 300, &mut StdRng::seed_from_u64(11));
        let b = StreakGrid::generate(5, 5, 5, 300, &mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
    }
}
