use log::{debug, trace};
use rand::Rng;
use serde::Serialize;

pub const PIN_LENGTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PinPhase {
    /// Accepting digits for the current attempt.
    Locked,
    /// A full attempt was scored; wrong slots are on display until [`PinLock::settle`].
    Evaluating,
    Unlocked,
    Failed,
}

/// What a slot of the lock screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PinSlot {
    Revealed(u8),
    Entered(u8),
    Wrong,
    Blank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinEvaluation {
    /// Some positions are still hidden and attempts remain.
    Retry { newly_revealed: usize },
    Solved,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinInput {
    Ignored,
    Entered { position: usize },
    Evaluated(PinEvaluation),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinLock {
    #[serde(skip)]
    secret: [u8; PIN_LENGTH],
    revealed: [bool; PIN_LENGTH],
    attempt: [Option<u8>; PIN_LENGTH],
    max_attempts: u32,
    attempts_remaining: u32,
    phase: PinPhase,
}

impl PinLock {
    pub fn generate(max_attempts: u32, rng: &mut impl Rng) -> Self {
        let mut secret = [0; PIN_LENGTH];
        for digit in secret.iter_mut() {
            *digit = rng.random_range(0..10);
        }
        trace!(target: "pin_lock", "Generated PIN {:?}", secret);
        Self::with_secret(secret, max_attempts)
    }

    pub fn with_secret(secret: [u8; PIN_LENGTH], max_attempts: u32) -> Self {
        Self {
            secret,
            revealed: [false; PIN_LENGTH],
            attempt: [None; PIN_LENGTH],
            max_attempts,
            attempts_remaining: max_attempts,
            phase: PinPhase::Locked,
        }
    }

    pub fn secret(&self) -> [u8; PIN_LENGTH] {
        self.secret
    }

    pub fn phase(&self) -> PinPhase {
        self.phase
    }

    pub fn is_evaluating(&self) -> bool {
        self.phase == PinPhase::Evaluating
    }

    pub fn is_revealed(&self, position: usize) -> bool {
        self.revealed.get(position).copied().unwrap_or(false)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    /// Lowest position that is neither revealed nor filled in this attempt.
    pub fn cursor(&self) -> Option<usize> {
        (0..PIN_LENGTH).find(|&i| !self.revealed[i] && self.attempt[i].is_none())
    }

    pub fn input_digit(&mut self, digit: u8) -> PinInput {
        if digit > 9 || self.phase != PinPhase::Locked || self.attempts_remaining == 0 {
            return PinInput::Ignored;
        }
        let Some(position) = self.cursor() else {
            return PinInput::Ignored;
        };

        self.attempt[position] = Some(digit);
        if self.cursor().is_some() {
            return PinInput::Entered { position };
        }
        PinInput::Evaluated(self.evaluate())
    }

    fn evaluate(&mut self) -> PinEvaluation {
        self.phase = PinPhase::Evaluating;

        let mut newly_revealed = 0;
        for i in 0..PIN_LENGTH {
            if !self.revealed[i] && self.attempt[i] == Some(self.secret[i]) {
                self.revealed[i] = true;
                newly_revealed += 1;
            }
        }
        self.attempts_remaining = self.attempts_remaining.saturating_sub(1);
        debug!(
            target: "pin_lock",
            "Attempt scored: {} new, {} attempts left",
            newly_revealed, self.attempts_remaining
        );

        if self.revealed.iter().all(|&r| r) {
            self.phase = PinPhase::Unlocked;
            PinEvaluation::Solved
        } else if self.attempts_remaining == 0 {
            self.phase = PinPhase::Failed;
            PinEvaluation::Failed
        } else {
            PinEvaluation::Retry { newly_revealed }
        }
    }

    /// Clears the scored attempt and unlocks input again. Only meaningful after a
    /// [`PinEvaluation::Retry`]; returns false otherwise.
    pub fn settle(&mut self) -> bool {
        if self.phase != PinPhase::Evaluating {
            return false;
        }
        self.attempt = [None; PIN_LENGTH];
        self.phase = PinPhase::Locked;
        true
    }

    pub fn slots(&self) -> [PinSlot; PIN_LENGTH] {
        let show_errors = matches!(self.phase, PinPhase::Evaluating | PinPhase::Failed);
        std::array::from_fn(|i| {
            if self.revealed[i] {
                PinSlot::Revealed(self.secret[i])
            } else {
                match self.attempt[i] {
                    Some(d) if show_errors && d != self.secret[i] => PinSlot::Wrong,
                    Some(d) => PinSlot::Entered(d),
                    None => PinSlot::Blank,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn enter(lock: &mut PinLock, digits: &[u8]) -> Vec<PinInput> {
        digits.iter().map(|&d| lock.input_digit(d)).collect()
    }

    #[test]
    fn test_single_attempt_failure_reveals_matches() {
        let mut lock = PinLock::with_secret([1, 2, 3, 4], 1);

        let results = enter(&mut lock, &[1, 2, 3, 5]);

        assert_eq!(
            results.last(),
            Some(&PinInput::Evaluated(PinEvaluation::Failed))
        );
        assert!(lock.is_revealed(0));
        assert!(lock.is_revealed(1));
        assert!(lock.is_revealed(2));
        assert!(!lock.is_revealed(3));
        assert_eq!(lock.attempts_remaining(), 0);
        assert_eq!(lock.phase(), PinPhase::Failed);
    }

    #[test]
    fn test_correct_pin_unlocks() {
        let mut lock = PinLock::with_secret([0, 9, 0, 9], 3);
        let results = enter(&mut lock, &[0, 9, 0, 9]);

        assert_eq!(
            results,
            vec![
                PinInput::Entered { position: 0 },
                PinInput::Entered { position: 1 },
                PinInput::Entered { position: 2 },
                PinInput::Evaluated(PinEvaluation::Solved),
            ]
        );
        assert_eq!(lock.phase(), PinPhase::Unlocked);
        assert_eq!(lock.attempts_remaining(), 2);
    }

    #[test]
    fn test_input_ignored_while_evaluating() {
        let mut lock = PinLock::with_secret([1, 2, 3, 4], 5);
        enter(&mut lock, &[1, 0, 0, 0]);
        assert!(lock.is_evaluating());

        assert_eq!(lock.input_digit(2), PinInput::Ignored);
        assert_eq!(lock.slots(), [
            PinSlot::Revealed(1),
            PinSlot::Wrong,
            PinSlot::Wrong,
            PinSlot::Wrong
        ]);

        assert!(lock.settle());
        assert_eq!(lock.phase(), PinPhase::Locked);
        assert_eq!(lock.slots(), [
            PinSlot::Revealed(1),
            PinSlot::Blank,
            PinSlot::Blank,
            PinSlot::Blank
        ]);
    }

    #[test]
    fn test_cursor_skips_revealed_positions() {
        let mut lock = PinLock::with_secret([1, 2, 3, 4], 5);
        enter(&mut lock, &[0, 2, 0, 4]);
        lock.settle();

        assert_eq!(lock.cursor(), Some(0));
        assert_eq!(lock.input_digit(1), PinInput::Entered { position: 0 });
        // position 1 is revealed, so the next digit lands on 2
        assert_eq!(lock.cursor(), Some(2));
        assert_eq!(
            lock.input_digit(3),
            PinInput::Evaluated(PinEvaluation::Solved)
        );
    }

    #[test]
    fn test_out_of_range_digit_ignored() {
        let mut lock = PinLock::with_secret([1, 2, 3, 4], 5);
        assert_eq!(lock.input_digit(10), PinInput::Ignored);
        assert_eq!(lock.cursor(), Some(0));
    }

    #[test]
    fn test_input_ignored_after_terminal_states() {
        let mut lock = PinLock::with_secret([1, 1, 1, 1], 1);
        enter(&mut lock, &[2, 2, 2, 2]);
        assert_eq!(lock.phase(), PinPhase::Failed);
        assert!(!lock.settle());
        assert_eq!(lock.input_digit(1), PinInput::Ignored);
    }

    #[test]
    fn test_attempts_decrease_and_reveals_persist() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut lock = PinLock::generate(6, &mut rng);
            let mut previous_revealed = [false; PIN_LENGTH];
            let mut previous_remaining = lock.attempts_remaining();

            while lock.phase() == PinPhase::Locked {
                let digit = rng.random_range(0..10);
                if let PinInput::Evaluated(_) = lock.input_digit(digit) {
                    assert_eq!(lock.attempts_remaining(), previous_remaining - 1);
                    previous_remaining = lock.attempts_remaining();
                    for (i, was_revealed) in previous_revealed.iter().enumerate() {
                        assert!(!was_revealed || lock.is_revealed(i));
                    }
                    previous_revealed = std::array::from_fn(|i| lock.is_revealed(i));
                    lock.settle();
                }
            }
            assert!(matches!(lock.phase(), PinPhase::Unlocked | PinPhase::Failed));
        }
    }

    #[test]
    fn test_generated_digits_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let lock = PinLock::generate(10, &mut rng);
        assert!(lock.secret().iter().all(|&d| d <= 9));
        assert_eq!(lock.attempts_remaining(), 10);
        assert_eq!(lock.max_attempts(), 10);
    }
}
