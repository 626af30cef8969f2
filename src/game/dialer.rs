use itertools::Itertools;
use log::{debug, trace};
use rand::Rng;
use serde::Serialize;
use std::fmt::Display;

use crate::model::DialerKey;

pub const DIAL_LENGTH: usize = 7;
/// Positions shown before the dash of `ddd-dddd`.
const PREFIX_LENGTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DialerPhase {
    Entering,
    Called,
    /// The hint timer wanted to give away the final digit.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    Ignored,
    /// The cursor sat on a revealed slot and moved on without using the key.
    Skipped,
    Correct { bonus_seconds: u32 },
    Wrong,
    Symbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintTick {
    Ignored,
    Counting(u32),
    Revealed(usize),
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dialer {
    #[serde(skip)]
    secret: [u8; DIAL_LENGTH],
    revealed: [bool; DIAL_LENGTH],
    entries: [Option<DialerKey>; DIAL_LENGTH],
    cursor: usize,
    hint_interval: u32,
    seconds_to_hint: u32,
    ready_to_call: bool,
    phase: DialerPhase,
}

impl Dialer {
    pub fn generate(hint_interval: u32, rng: &mut impl Rng) -> Self {
        let mut secret = [0; DIAL_LENGTH];
        for digit in secret.iter_mut() {
            *digit = rng.random_range(0..10);
        }
        trace!(target: "dialer", "Generated number {:?}", secret);
        Self::with_secret(secret, hint_interval)
    }

    pub fn with_secret(secret: [u8; DIAL_LENGTH], hint_interval: u32) -> Self {
        Self {
            secret,
            revealed: [false; DIAL_LENGTH],
            entries: [None; DIAL_LENGTH],
            cursor: 0,
            hint_interval,
            seconds_to_hint: hint_interval,
            ready_to_call: false,
            phase: DialerPhase::Entering,
        }
    }

    pub fn secret(&self) -> [u8; DIAL_LENGTH] {
        self.secret
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn entry(&self, position: usize) -> Option<DialerKey> {
        self.entries.get(position).copied().flatten()
    }

    pub fn is_revealed(&self, position: usize) -> bool {
        self.revealed.get(position).copied().unwrap_or(false)
    }

    pub fn seconds_to_hint(&self) -> u32 {
        self.seconds_to_hint
    }

    pub fn is_ready_to_call(&self) -> bool {
        self.ready_to_call
    }

    pub fn phase(&self) -> DialerPhase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase != DialerPhase::Entering
    }

    fn next_unrevealed_after(&self, position: usize) -> usize {
        (position + 1..DIAL_LENGTH)
            .find(|&i| !self.revealed[i])
            .unwrap_or(DIAL_LENGTH)
    }

    fn first_unrevealed(&self) -> Option<usize> {
        (0..DIAL_LENGTH).find(|&i| !self.revealed[i])
    }

    fn is_complete(&self) -> bool {
        self.entries
            .iter()
            .zip(self.secret.iter())
            .all(|(entry, &digit)| *entry == Some(DialerKey::Digit(digit)))
    }

    fn refresh_ready(&mut self) {
        self.ready_to_call = self.is_complete();
    }

    pub fn press(&mut self, key: DialerKey) -> KeyResult {
        if self.is_game_over() || self.cursor >= DIAL_LENGTH {
            return KeyResult::Ignored;
        }
        let position = self.cursor;

        if self.revealed[position] {
            self.cursor = self.next_unrevealed_after(position);
            return KeyResult::Skipped;
        }

        self.entries[position] = Some(key);
        let result = match key.digit() {
            Some(digit) if digit == self.secret[position] => {
                self.seconds_to_hint += self.hint_interval;
                self.cursor = self.next_unrevealed_after(position);
                KeyResult::Correct {
                    bonus_seconds: self.hint_interval,
                }
            }
            Some(_) => KeyResult::Wrong,
            None => KeyResult::Symbol,
        };
        self.refresh_ready();
        result
    }

    /// Clears the nearest non-revealed, non-empty slot before the cursor. A wrong key
    /// sitting at the cursor is replaced by typing over it instead.
    pub fn backspace(&mut self) -> bool {
        if self.is_game_over() {
            return false;
        }
        let start = self.cursor.min(DIAL_LENGTH);
        let Some(position) = (0..start)
            .rev()
            .find(|&i| !self.revealed[i] && self.entries[i].is_some())
        else {
            return false;
        };

        self.entries[position] = None;
        self.cursor = position;
        self.refresh_ready();
        true
    }

    /// Places the call. Only succeeds once every slot holds the right digit.
    pub fn call(&mut self) -> bool {
        if !self.ready_to_call || self.is_game_over() {
            return false;
        }
        self.phase = DialerPhase::Called;
        true
    }

    /// One second of the hint countdown.
    pub fn tick(&mut self) -> HintTick {
        if self.is_game_over() {
            return HintTick::Ignored;
        }
        self.seconds_to_hint = self.seconds_to_hint.saturating_sub(1);
        if self.seconds_to_hint > 0 {
            return HintTick::Counting(self.seconds_to_hint);
        }

        let Some(position) = self.first_unrevealed() else {
            self.seconds_to_hint = self.hint_interval;
            return HintTick::Counting(self.seconds_to_hint);
        };
        if position == DIAL_LENGTH - 1 {
            debug!(target: "dialer", "Hint would reveal the last digit");
            self.phase = DialerPhase::Exhausted;
            return HintTick::Exhausted;
        }

        self.revealed[position] = true;
        self.entries[position] = Some(DialerKey::Digit(self.secret[position]));
        self.cursor = self.first_unrevealed().unwrap_or(DIAL_LENGTH);
        self.seconds_to_hint = self.hint_interval;
        self.refresh_ready();
        debug!(target: "dialer", "Hint revealed position {}", position);
        HintTick::Revealed(position)
    }
}

impl Display for Dialer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = |entry: &Option<DialerKey>| match entry {
            Some(key) => key.to_string(),
            None => "_".to_string(),
        };
        let (prefix, line) = self.entries.split_at(PREFIX_LENGTH);
        write!(
            f,
            "{}-{}",
            prefix.iter().map(slot).join(""),
            line.iter().map(slot).join("")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SECRET: [u8; DIAL_LENGTH] = [5, 5, 5, 1, 2, 3, 4];

    fn dial(dialer: &mut Dialer, digits: &[u8]) -> Vec<KeyResult> {
        digits
            .iter()
            .map(|&d| dialer.press(DialerKey::Digit(d)))
            .collect()
    }

    fn tick_until_event(dialer: &mut Dialer) -> HintTick {
        loop {
            match dialer.tick() {
                HintTick::Counting(_) => continue,
                other => return other,
            }
        }
    }

    #[test]
    fn test_correct_number_enables_call() {
        let mut dialer = Dialer::with_secret(SECRET, 30);
        let results = dial(&mut dialer, &SECRET);

        assert!(results
            .iter()
            .all(|r| *r == KeyResult::Correct { bonus_seconds: 30 }));
        assert!(dialer.is_ready_to_call());
        assert_eq!(dialer.cursor(), DIAL_LENGTH);
        assert!(dialer.call());
        assert_eq!(dialer.phase(), DialerPhase::Called);
        assert!(!dialer.call());
    }

    #[test]
    fn test_call_before_ready_is_ignored() {
        let mut dialer = Dialer::with_secret(SECRET, 30);
        dial(&mut dialer, &SECRET[..6]);
        assert!(!dialer.is_ready_to_call());
        assert!(!dialer.call());
        assert_eq!(dialer.phase(), DialerPhase::Entering);
    }

    #[test]
    fn test_correct_digit_extends_hint_countdown() {
        let mut dialer = Dialer::with_secret(SECRET, 15);
        dialer.tick();
        assert_eq!(dialer.seconds_to_hint(), 14);
        dial(&mut dialer, &[5]);
        assert_eq!(dialer.seconds_to_hint(), 29);
    }

    #[test]
    fn test_wrong_digit_keeps_cursor() {
        let mut dialer = Dialer::with_secret(SECRET, 30);
        assert_eq!(dial(&mut dialer, &[4]), vec![KeyResult::Wrong]);
        assert_eq!(dialer.cursor(), 0);
        assert_eq!(dialer.entry(0), Some(DialerKey::Digit(4)));
        assert_eq!(dialer.seconds_to_hint(), 30);

        // overwrite in place
        assert_eq!(
            dial(&mut dialer, &[5]),
            vec![KeyResult::Correct { bonus_seconds: 30 }]
        );
        assert_eq!(dialer.cursor(), 1);
    }

    #[test]
    fn test_symbols_display_but_never_match() {
        let mut dialer = Dialer::with_secret(SECRET, 30);
        assert_eq!(dialer.press(DialerKey::Star), KeyResult::Symbol);
        assert_eq!(dialer.cursor(), 0);
        assert_eq!(dialer.to_string(), "*__-____");

        // the symbol sits at the cursor, so it is typed over rather than erased
        assert!(!dialer.backspace());
        assert_eq!(dialer.entry(0), Some(DialerKey::Star));
        assert_eq!(dialer.press(DialerKey::Digit(5)), KeyResult::Correct { bonus_seconds: 30 });
    }

    #[test]
    fn test_backspace_clears_nearest_entry() {
        let mut dialer = Dialer::with_secret(SECRET, 30);
        dial(&mut dialer, &[5, 5, 9]);
        assert_eq!(dialer.cursor(), 2);

        // the wrong 9 at the cursor is left alone
        assert!(dialer.backspace());
        assert_eq!(dialer.cursor(), 1);
        assert_eq!(dialer.entry(1), None);
        assert_eq!(dialer.entry(2), Some(DialerKey::Digit(9)));

        assert!(dialer.backspace());
        assert_eq!(dialer.cursor(), 0);
        assert_eq!(dialer.entry(0), None);
        assert!(!dialer.backspace());
    }

    #[test]
    fn test_backspace_skips_revealed_slots() {
        let mut dialer = Dialer::with_secret(SECRET, 1);
        assert_eq!(dialer.tick(), HintTick::Revealed(0));
        assert_eq!(dialer.cursor(), 1);

        assert!(!dialer.backspace());
        assert_eq!(dialer.entry(0), Some(DialerKey::Digit(5)));
    }

    #[test]
    fn test_backspace_past_the_end() {
        let mut dialer = Dialer::with_secret(SECRET, 30);
        dial(&mut dialer, &SECRET);
        assert!(dialer.is_ready_to_call());

        assert!(dialer.backspace());
        assert_eq!(dialer.cursor(), 6);
        assert!(!dialer.is_ready_to_call());
    }

    #[test]
    fn test_hint_reveals_lowest_unrevealed() {
        let mut dialer = Dialer::with_secret(SECRET, 2);
        assert_eq!(dialer.tick(), HintTick::Counting(1));
        assert_eq!(dialer.tick(), HintTick::Revealed(0));
        assert!(dialer.is_revealed(0));
        assert_eq!(dialer.seconds_to_hint(), 2);
        assert_eq!(dialer.to_string(), "5__-____");
    }

    #[test]
    fn test_key_on_revealed_slot_moves_cursor() {
        let mut dialer = Dialer::with_secret(SECRET, 1);
        dial(&mut dialer, &[5]);
        assert_eq!(dialer.cursor(), 1);

        // the hint reveals position 0 and parks the cursor on the lowest unrevealed slot
        assert_eq!(tick_until_event(&mut dialer), HintTick::Revealed(0));
        assert_eq!(dialer.cursor(), 1);
        assert_eq!(tick_until_event(&mut dialer), HintTick::Revealed(1));
        assert_eq!(dialer.cursor(), 2);

        dial(&mut dialer, &[5]);
        assert_eq!(dialer.cursor(), 3);
    }

    #[test]
    fn test_revealed_slot_under_cursor_is_skipped() {
        let mut dialer = Dialer::with_secret(SECRET, 30);
        dialer.revealed[0] = true;
        dialer.entries[0] = Some(DialerKey::Digit(5));

        assert_eq!(dialer.press(DialerKey::Digit(1)), KeyResult::Skipped);
        assert_eq!(dialer.cursor(), 1);
        assert_eq!(dialer.entry(1), None);
    }

    #[test]
    fn test_last_digit_hint_is_a_loss() {
        let mut dialer = Dialer::with_secret(SECRET, 1);
        for position in 0..DIAL_LENGTH - 1 {
            assert_eq!(dialer.tick(), HintTick::Revealed(position));
        }
        assert!(!dialer.is_revealed(6));

        assert_eq!(dialer.tick(), HintTick::Exhausted);
        assert_eq!(dialer.phase(), DialerPhase::Exhausted);
        assert!(!dialer.is_revealed(6));
        assert_eq!(dialer.press(DialerKey::Digit(4)), KeyResult::Ignored);
        assert_eq!(dialer.tick(), HintTick::Ignored);
    }

    #[test]
    fn test_hints_and_entries_complete_together() {
        let mut dialer = Dialer::with_secret(SECRET, 1);
        for _ in 0..6 {
            dialer.tick();
        }
        assert_eq!(dialer.cursor(), 6);
        assert!(!dialer.is_ready_to_call());

        dial(&mut dialer, &[4]);
        assert!(dialer.is_ready_to_call());
        assert!(dialer.call());
    }

    #[test]
    fn test_display_groups_digits() {
        let mut dialer = Dialer::with_secret(SECRET, 30);
        dial(&mut dialer, &[5, 5, 5, 1]);
        dialer.press(DialerKey::Hash);
        assert_eq!(dialer.to_string(), "555-1#__");
    }

    #[test]
    fn test_generate_from_seed() {
        let a = Dialer::generate(45, &mut StdRng::seed_from_u64(9));
        let b = Dialer::generate(45, &mut StdRng::seed_from_u64(9));
        assert_eq!(a.secret(), b.secret());
        assert!(a.secret().iter().all(|&d| d <= 9));
        assert_eq!(a.seconds_to_hint(), 45);
    }
}
