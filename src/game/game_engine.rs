use log::{debug, error, info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, SystemTime};
use uuid::Uuid;

use super::best_time_store::BestTimeStore;
use super::clock::Clock;
use super::dialer::{Dialer, HintTick, KeyResult};
use super::pin_lock::{PinEvaluation, PinInput, PinLock};
use super::run_session::RunSession;
use super::settings::Settings;
use super::streak_grid::{CountdownTick, StreakGrid, TapResult};
use super::timer_queue::{FiredTask, TimerHandle, TimerQueue};
use crate::destroyable::Destroyable;
use crate::events::{EventEmitter, EventObserver, Unsubscriber};
use crate::model::{
    DialerKey, GameEngineCommand, GameEngineEvent, RunOutcome, RunSnapshot, SettingsChange,
    Stage, StatusMessage,
};

pub const PIN_SETTLE_DELAY: Duration = Duration::from_millis(700);
pub const PIN_SOLVED_DELAY: Duration = Duration::from_millis(600);
pub const PIN_FAILED_DELAY: Duration = Duration::from_millis(700);
pub const GRID_SOLVED_DELAY: Duration = Duration::from_millis(600);
pub const TICK_PERIOD: Duration = Duration::from_secs(1);
pub const STATUS_LIFETIME: Duration = Duration::from_secs(2);

pub const WIN_MESSAGE: &str = "You successfully dialed the secret number!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossReason {
    PinAttemptsExhausted,
    GridTimedOut,
    LastDigitRevealed,
}

impl LossReason {
    pub fn message(&self) -> &'static str {
        match self {
            LossReason::PinAttemptsExhausted => "You ran out of PIN attempts.",
            LossReason::GridTimedOut => "You ran out of time on the app grid.",
            LossReason::LastDigitRevealed => "The last digit was about to be revealed.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScheduledTask {
    SettlePin,
    EnterHome,
    EnterDialer,
    Lose(LossReason),
    GridTick,
    HintTick,
    ExpireStatus(u64),
}

/// Tasks remember the run that scheduled them.
type QueuedTask = (Option<Uuid>, ScheduledTask);

pub struct GameEngine {
    stage: Stage,
    settings: Settings,
    run_settings: Settings,
    session: RunSession,
    pin: Option<PinLock>,
    grid: Option<StreakGrid>,
    dialer: Option<Dialer>,
    run_id: Option<Uuid>,
    timers: TimerQueue<QueuedTask>,
    grid_ticker: Option<TimerHandle>,
    hint_ticker: Option<TimerHandle>,
    status: Option<u64>,
    next_status_id: u64,
    clock: Box<dyn Clock>,
    // due time of the task being run; follow-up tasks are scheduled from it
    task_time: Option<SystemTime>,
    rng: StdRng,
    seed: u64,
    store: Box<dyn BestTimeStore>,
    debug_mode: bool,
    subscription: Option<Unsubscriber<GameEngineCommand>>,
    game_engine_event_emitter: EventEmitter<GameEngineEvent>,
}

impl Destroyable for GameEngine {
    fn destroy(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.timers.clear();
        self.grid_ticker = None;
        self.hint_ticker = None;
    }
}

impl GameEngine {
    pub fn new(
        game_engine_command_observer: EventObserver<GameEngineCommand>,
        game_engine_event_emitter: EventEmitter<GameEngineEvent>,
        settings: Settings,
        clock: Box<dyn Clock>,
        store: Box<dyn BestTimeStore>,
        seed: Option<u64>,
    ) -> Rc<RefCell<Self>> {
        let engine = Self::detached(game_engine_event_emitter, settings, clock, store, seed);
        let refcell = Rc::new(RefCell::new(engine));
        GameEngine::wire_subscription(refcell.clone(), game_engine_command_observer);
        refcell
    }

    /// An engine driven by direct [`GameEngine::handle_command`] calls instead of a channel.
    pub fn detached(
        game_engine_event_emitter: EventEmitter<GameEngineEvent>,
        settings: Settings,
        clock: Box<dyn Clock>,
        store: Box<dyn BestTimeStore>,
        seed: Option<u64>,
    ) -> Self {
        let best_time = match store.load() {
            Ok(best) => best,
            Err(e) => {
                error!(target: "game_engine", "Could not load best time: {}", e);
                None
            }
        };
        let seed = seed.unwrap_or_else(rand::random);
        info!(target: "game_engine", "Engine ready; seed: {}; best time: {:?}", seed, best_time);

        Self {
            stage: Stage::Splash,
            run_settings: settings.clone(),
            settings,
            session: RunSession::new(best_time),
            pin: None,
            grid: None,
            dialer: None,
            run_id: None,
            timers: TimerQueue::new(),
            grid_ticker: None,
            hint_ticker: None,
            status: None,
            next_status_id: 0,
            clock,
            task_time: None,
            rng: StdRng::seed_from_u64(seed),
            seed,
            store,
            debug_mode: Settings::is_debug_mode(),
            subscription: None,
            game_engine_event_emitter,
        }
    }

    fn wire_subscription(
        engine: Rc<RefCell<Self>>,
        game_engine_command_observer: EventObserver<GameEngineCommand>,
    ) {
        let engine_handler = engine.clone();
        let subscription = game_engine_command_observer.subscribe_with_handle(move |command| {
            engine_handler.borrow_mut().handle_command(command.clone());
        });
        engine.borrow_mut().subscription = Some(subscription);
    }

    pub fn handle_command(&mut self, command: GameEngineCommand) {
        if command != GameEngineCommand::Poll {
            trace!(target: "game_engine", "Handling command: {:?}", command);
        }
        match command {
            GameEngineCommand::StartRun => self.start_run(),
            GameEngineCommand::PinDigit(digit) => self.handle_pin_digit(digit),
            GameEngineCommand::GridTap(index) => self.handle_grid_tap(index),
            GameEngineCommand::DialerKey(key) => self.handle_dialer_key(key),
            GameEngineCommand::DialerBackspace => self.handle_dialer_backspace(),
            GameEngineCommand::DialerCall => self.handle_dialer_call(),
            GameEngineCommand::ApplySettings(change) => self.apply_settings(&change),
            GameEngineCommand::Poll => self.poll(),
            GameEngineCommand::DismissOutcome => {
                if self.stage == Stage::Finished {
                    self.set_stage(Stage::Splash);
                }
            }
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn session(&self) -> &RunSession {
        &self.session
    }

    pub fn pin(&self) -> Option<&PinLock> {
        self.pin.as_ref()
    }

    pub fn grid(&self) -> Option<&StreakGrid> {
        self.grid.as_ref()
    }

    pub fn dialer(&self) -> Option<&Dialer> {
        self.dialer.as_ref()
    }

    pub fn run_id(&self) -> Option<Uuid> {
        self.run_id
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn best_time_seconds(&self) -> Option<u32> {
        self.session.best_time_seconds()
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.session.elapsed_seconds(self.clock.now())
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            stage: self.stage,
            run_id: self.run_id,
            settings: self.settings.clone(),
            session: self.session.clone(),
            pin: self.pin.clone(),
            grid: self.grid.clone(),
            dialer: self.dialer.clone(),
        }
    }

    fn emit(&self, event: GameEngineEvent) {
        self.game_engine_event_emitter.emit(event);
    }

    fn set_stage(&mut self, stage: Stage) {
        if self.stage != stage {
            debug!(target: "game_engine", "Stage {} -> {}", self.stage, stage);
            self.stage = stage;
            self.emit(GameEngineEvent::StageChanged(stage));
        }
    }

    fn schedule_once(&mut self, delay: Duration, task: ScheduledTask) -> TimerHandle {
        let now = self.now();
        self.timers.schedule_once(now, delay, (self.run_id, task))
    }

    fn schedule_repeating(&mut self, period: Duration, task: ScheduledTask) -> TimerHandle {
        let now = self.now();
        self.timers.schedule_repeating(now, period, (self.run_id, task))
    }

    fn cancel_ticker(&mut self, ticker: Option<TimerHandle>) {
        if let Some(handle) = ticker {
            self.timers.cancel(handle);
        }
    }

    fn cancel_all_timers(&mut self) {
        self.timers.clear();
        self.grid_ticker = None;
        self.hint_ticker = None;
    }

    fn show_status(&mut self, text: impl Into<String>) {
        self.next_status_id += 1;
        let id = self.next_status_id;
        self.status = Some(id);
        self.schedule_once(STATUS_LIFETIME, ScheduledTask::ExpireStatus(id));
        self.emit(GameEngineEvent::StatusShown(StatusMessage {
            id,
            text: text.into(),
            expires_after: STATUS_LIFETIME,
        }));
    }

    fn clear_status(&mut self) {
        if let Some(id) = self.status.take() {
            self.emit(GameEngineEvent::StatusCleared(id));
        }
    }

    fn start_run(&mut self) {
        self.cancel_all_timers();
        self.clear_status();

        let run_id = Uuid::new_v4();
        self.run_id = Some(run_id);
        self.run_settings = self.settings.clone();
        let pin = PinLock::generate(self.run_settings.pin_max_attempts, &mut self.rng);
        if self.debug_mode {
            info!(target: "game_engine", "PIN: {:?}", pin.secret());
        }
        self.pin = Some(pin.clone());
        self.grid = None;
        self.dialer = None;
        self.session.start(self.clock.now());
        info!(target: "game_engine", "Run {} started", run_id);

        self.set_stage(Stage::Lock);
        self.emit(GameEngineEvent::PinUpdated(pin));
    }

    fn now(&self) -> SystemTime {
        self.task_time.unwrap_or_else(|| self.clock.now())
    }

    fn poll(&mut self) {
        loop {
            let now = self.clock.now();
            let Some(FiredTask {
                handle,
                due,
                task: (run_id, task),
            }) = self.timers.pop_due(now)
            else {
                break;
            };
            if run_id != self.run_id {
                trace!(target: "game_engine", "Dropping {:?} from a superseded run", handle);
                continue;
            }
            self.task_time = Some(due);
            self.run_task(task);
            self.task_time = None;
        }
    }

    fn run_task(&mut self, task: ScheduledTask) {
        match task {
            ScheduledTask::SettlePin => self.settle_pin(),
            ScheduledTask::EnterHome => self.enter_home(),
            ScheduledTask::EnterDialer => self.enter_dialer(),
            ScheduledTask::Lose(reason) => self.end_run(false, reason.message()),
            ScheduledTask::GridTick => self.grid_tick(),
            ScheduledTask::HintTick => self.hint_tick(),
            ScheduledTask::ExpireStatus(id) => {
                if self.status == Some(id) {
                    self.clear_status();
                }
            }
        }
    }

    fn handle_pin_digit(&mut self, digit: u8) {
        if self.stage != Stage::Lock {
            return;
        }
        let Some(pin) = self.pin.as_mut() else {
            return;
        };
        let result = pin.input_digit(digit);
        if result == PinInput::Ignored {
            return;
        }
        let pin = pin.clone();
        self.emit(GameEngineEvent::PinUpdated(pin));

        if let PinInput::Evaluated(evaluation) = result {
            match evaluation {
                PinEvaluation::Retry { .. } => {
                    self.schedule_once(PIN_SETTLE_DELAY, ScheduledTask::SettlePin);
                }
                PinEvaluation::Solved => {
                    self.schedule_once(PIN_SOLVED_DELAY, ScheduledTask::EnterHome);
                }
                PinEvaluation::Failed => {
                    self.schedule_once(
                        PIN_FAILED_DELAY,
                        ScheduledTask::Lose(LossReason::PinAttemptsExhausted),
                    );
                }
            }
        }
    }

    fn settle_pin(&mut self) {
        if let Some(pin) = self.pin.as_mut() {
            if pin.settle() {
                let pin = pin.clone();
                self.emit(GameEngineEvent::PinUpdated(pin));
            }
        }
    }

    fn enter_home(&mut self) {
        let settings = &self.run_settings;
        let grid = StreakGrid::generate(
            settings.grid_rows,
            settings.grid_cols,
            settings.target_streak,
            settings.grid_timer_seconds,
            &mut self.rng,
        );
        self.grid = Some(grid.clone());
        self.grid_ticker = Some(self.schedule_repeating(TICK_PERIOD, ScheduledTask::GridTick));

        self.set_stage(Stage::Home);
        self.emit(GameEngineEvent::GridUpdated(grid));
    }

    fn handle_grid_tap(&mut self, index: usize) {
        if self.stage != Stage::Home {
            return;
        }
        let Some(grid) = self.grid.as_mut() else {
            return;
        };
        let result = grid.tap(index);
        if result == TapResult::Ignored {
            return;
        }
        let grid = grid.clone();
        self.emit(GameEngineEvent::GridUpdated(grid));

        if result == TapResult::Won {
            let ticker = self.grid_ticker.take();
            self.cancel_ticker(ticker);
            self.schedule_once(GRID_SOLVED_DELAY, ScheduledTask::EnterDialer);
        }
    }

    fn grid_tick(&mut self) {
        if self.stage != Stage::Home {
            return;
        }
        let Some(grid) = self.grid.as_mut() else {
            return;
        };
        let result = grid.tick();
        if result == CountdownTick::Ignored {
            return;
        }
        let grid = grid.clone();
        self.emit(GameEngineEvent::GridUpdated(grid));

        if result == CountdownTick::TimedOut {
            self.end_run(false, LossReason::GridTimedOut.message());
        }
    }

    fn enter_dialer(&mut self) {
        let dialer = Dialer::generate(self.run_settings.hint_interval_seconds, &mut self.rng);
        if self.debug_mode {
            info!(target: "game_engine", "Number: {:?}", dialer.secret());
        }
        self.dialer = Some(dialer.clone());
        self.hint_ticker = Some(self.schedule_repeating(TICK_PERIOD, ScheduledTask::HintTick));

        self.set_stage(Stage::Dialer);
        self.emit(GameEngineEvent::DialerUpdated(dialer));
    }

    fn handle_dialer_key(&mut self, key: DialerKey) {
        if self.stage != Stage::Dialer {
            return;
        }
        let Some(dialer) = self.dialer.as_mut() else {
            return;
        };
        let result = dialer.press(key);
        if result == KeyResult::Ignored {
            return;
        }
        let dialer = dialer.clone();
        self.emit(GameEngineEvent::DialerUpdated(dialer));

        match result {
            KeyResult::Correct { bonus_seconds } => {
                self.show_status(format!("+{}s for correct digit", bonus_seconds));
            }
            KeyResult::Wrong => self.show_status("Wrong digit for this position"),
            KeyResult::Symbol => self.show_status("* and # won't help here"),
            KeyResult::Skipped | KeyResult::Ignored => (),
        }
    }

    fn handle_dialer_backspace(&mut self) {
        if self.stage != Stage::Dialer {
            return;
        }
        if let Some(dialer) = self.dialer.as_mut() {
            if dialer.backspace() {
                let dialer = dialer.clone();
                self.emit(GameEngineEvent::DialerUpdated(dialer));
            }
        }
    }

    fn handle_dialer_call(&mut self) {
        if self.stage != Stage::Dialer {
            return;
        }
        let Some(dialer) = self.dialer.as_mut() else {
            return;
        };
        if !dialer.call() {
            return;
        }
        let dialer = dialer.clone();
        self.emit(GameEngineEvent::DialerUpdated(dialer));
        self.end_run(true, WIN_MESSAGE);
    }

    fn hint_tick(&mut self) {
        if self.stage != Stage::Dialer {
            return;
        }
        let Some(dialer) = self.dialer.as_mut() else {
            return;
        };
        let result = dialer.tick();
        if result == HintTick::Ignored {
            return;
        }
        let dialer = dialer.clone();
        self.emit(GameEngineEvent::DialerUpdated(dialer));

        match result {
            HintTick::Revealed(_) => self.show_status("A digit was revealed for you"),
            HintTick::Exhausted => self.end_run(false, LossReason::LastDigitRevealed.message()),
            HintTick::Counting(_) | HintTick::Ignored => (),
        }
    }

    fn end_run(&mut self, won: bool, message: &str) {
        self.cancel_all_timers();
        self.clear_status();

        let elapsed_seconds = self.session.finish(self.now());
        let is_new_best = won && self.session.record_win(elapsed_seconds);
        if is_new_best {
            if let Err(e) = self.store.save(elapsed_seconds) {
                error!(target: "game_engine", "Could not save best time: {}", e);
            }
            self.emit(GameEngineEvent::BestTimeChanged(Some(elapsed_seconds)));
        }

        let outcome = RunOutcome {
            run_id: self.run_id.unwrap_or_else(Uuid::nil),
            won,
            message: message.to_string(),
            elapsed_seconds,
            is_new_best,
            best_seconds: self.session.best_time_seconds(),
        };
        info!(
            target: "game_engine",
            "Run {} over; won: {}; {}s; {}",
            outcome.run_id, won, elapsed_seconds, message
        );

        self.set_stage(Stage::Finished);
        self.emit(GameEngineEvent::RunCompleted(outcome));
    }

    fn apply_settings(&mut self, change: &SettingsChange) {
        let rejected = self.settings.apply(change);
        self.emit(GameEngineEvent::SettingsChanged(self.settings.clone()));
        if !rejected.is_empty() {
            self.emit(GameEngineEvent::SettingsRejected(rejected));
        }
    }
}
