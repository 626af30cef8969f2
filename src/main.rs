use chrono::Local;
use log::{info, warn};
use std::cell::RefCell;
use std::io::{self, BufRead};
use std::rc::Rc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use phone_unlock::destroyable::Destroyable;
use phone_unlock::events::{attach_handler, Channel, EventHandler};
use phone_unlock::game::pin_lock::PinSlot;
use phone_unlock::game::streak_grid::{GridPhase, StreakGrid, Urgency};
use phone_unlock::game::{
    BestTimeStore, GameEngine, JsonFileStore, MemoryStore, Settings, SystemClock,
};
use phone_unlock::helpers::{format_best_time, format_time_12_hour, format_total_time};
use phone_unlock::model::{
    AppColor, DialerKey, GameEngineCommand, GameEngineEvent, SettingsChange, SettingsProjection,
};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn init_logging() {
    env_logger::init();
}

#[derive(Debug, PartialEq)]
enum Input {
    Commands(Vec<GameEngineCommand>),
    ShowSettings,
    ShowClock,
    Dump,
    Help,
    Quit,
    Invalid(String),
}

fn parse_line(line: &str) -> Input {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Input::Commands(Vec::new());
    };
    let rest: Vec<&str> = words.collect();

    match (verb, rest.as_slice()) {
        ("start", []) => Input::Commands(vec![GameEngineCommand::StartRun]),
        ("pin", [digits]) => {
            let digits: Option<Vec<u8>> = digits
                .chars()
                .map(|c| c.to_digit(10).map(|d| d as u8))
                .collect();
            match digits {
                Some(digits) => Input::Commands(
                    digits.into_iter().map(GameEngineCommand::PinDigit).collect(),
                ),
                None => Input::Invalid(format!("not a PIN: {}", rest[0])),
            }
        }
        ("tap", [index]) => match index.parse::<usize>() {
            Ok(index) => Input::Commands(vec![GameEngineCommand::GridTap(index)]),
            Err(_) => Input::Invalid(format!("not a cell number: {}", index)),
        },
        ("dial", [keys]) => {
            let keys: Result<Vec<DialerKey>, char> =
                keys.chars().map(DialerKey::try_from).collect();
            match keys {
                Ok(keys) => Input::Commands(keys.into_iter().map(GameEngineCommand::DialerKey).collect()),
                Err(c) => Input::Invalid(format!("no such key: {}", c)),
            }
        }
        ("back", []) => Input::Commands(vec![GameEngineCommand::DialerBackspace]),
        ("call", []) => Input::Commands(vec![GameEngineCommand::DialerCall]),
        ("close", []) => Input::Commands(vec![GameEngineCommand::DismissOutcome]),
        ("set", [field, value]) => {
            let mut change = SettingsChange::default();
            match change.set_field(field, value) {
                Ok(()) => Input::Commands(vec![GameEngineCommand::ApplySettings(change)]),
                Err(e) => Input::Invalid(e.to_string()),
            }
        }
        ("settings", []) => Input::ShowSettings,
        ("clock", []) => Input::ShowClock,
        ("dump", []) => Input::Dump,
        ("help", []) => Input::Help,
        ("quit" | "exit", []) => Input::Quit,
        _ => Input::Invalid(format!("unknown command: {}", line.trim())),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  start              begin a new run");
    println!("  pin 1234           enter PIN digits");
    println!("  tap N              tap app N on the home screen (0-based)");
    println!("  dial 555*12        press dialer keys");
    println!("  back | call        dialer backspace / place the call");
    println!("  set FIELD VALUE    change a setting for the next run");
    println!("  settings | clock | dump | close | help | quit");
}

fn color_initial(color: AppColor) -> char {
    color.name().chars().next().unwrap_or('?').to_ascii_uppercase()
}

fn render_grid(grid: &StreakGrid) -> String {
    let mut out = String::new();
    for (row, cells) in grid.cells().chunks(grid.cols().max(1)).enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            let index = row * grid.cols() + col;
            out.push_str(&format!(
                "{:>3} {}{} ",
                index,
                cell.app.emoji,
                color_initial(cell.color)
            ));
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "streak {}/{} {}",
        grid.current_streak(),
        grid.target_streak(),
        grid.chosen_color().map_or("-", |c| c.name())
    ));
    out
}

/// Prints engine events to the terminal, skipping countdown noise.
#[derive(Default)]
struct TerminalView {
    grid_state: Option<(u32, Option<AppColor>, GridPhase)>,
    dialer_display: Option<String>,
    sound_on: bool,
}

impl EventHandler<GameEngineEvent> for TerminalView {
    fn handle_event(&mut self, event: &GameEngineEvent) {
        match event {
            GameEngineEvent::StageChanged(stage) => {
                println!("== {} ==", stage);
                self.grid_state = None;
                self.dialer_display = None;
            }
            GameEngineEvent::PinUpdated(pin) => {
                let slots: Vec<String> = pin
                    .slots()
                    .iter()
                    .map(|slot| match slot {
                        PinSlot::Revealed(d) => format!("[{}]", d),
                        PinSlot::Entered(d) => format!(" {} ", d),
                        PinSlot::Wrong => " x ".to_string(),
                        PinSlot::Blank => " _ ".to_string(),
                    })
                    .collect();
                println!(
                    "{}   attempts left: {}",
                    slots.join(""),
                    pin.attempts_remaining()
                );
            }
            GameEngineEvent::GridUpdated(grid) => {
                let state = (grid.current_streak(), grid.chosen_color(), grid.phase());
                if self.grid_state != Some(state) {
                    self.grid_state = Some(state);
                    println!("{}", render_grid(grid));
                }
                let remaining = grid.seconds_remaining();
                if remaining % 30 == 0 || (grid.urgency() == Urgency::Danger && remaining % 5 == 0) {
                    println!("time left {}", format_total_time(remaining));
                }
            }
            GameEngineEvent::DialerUpdated(dialer) => {
                let display = dialer.to_string();
                if self.dialer_display.as_deref() != Some(display.as_str()) {
                    println!(
                        "{}{}",
                        display,
                        if dialer.is_ready_to_call() { "   ready to call" } else { "" }
                    );
                    self.dialer_display = Some(display);
                } else if dialer.seconds_to_hint() % 10 == 0 {
                    println!("next hint in {}s", dialer.seconds_to_hint());
                }
            }
            GameEngineEvent::StatusShown(status) => println!("» {}", status.text),
            GameEngineEvent::StatusCleared(_) => (),
            GameEngineEvent::SettingsChanged(settings) => {
                self.sound_on = settings.sound_on;
                println!("Settings saved; they apply from the next run.");
            }
            GameEngineEvent::SettingsRejected(errors) => {
                for error in errors {
                    println!("rejected: {}", error);
                }
            }
            GameEngineEvent::BestTimeChanged(best) => println!("{}", format_best_time(*best)),
            GameEngineEvent::RunCompleted(outcome) => {
                if self.sound_on {
                    print!("\x07");
                }
                println!("*** {} ***", outcome.title());
                for line in outcome.summary_lines() {
                    println!("  {}", line);
                }
                println!("Type 'close' to dismiss or 'start' to play again.");
            }
        }
    }
}

fn main() {
    init_logging();
    println!("Phone Unlock {}", env!("APP_VERSION"));

    let settings = Settings::from_env();
    let (command_emitter, command_observer) = Channel::<GameEngineCommand>::new();
    let (event_emitter, event_observer) = Channel::<GameEngineEvent>::new();

    let projection = SettingsProjection::new(&settings);
    let _projection_subscription = attach_handler(&event_observer, &projection);
    let view = Rc::new(RefCell::new(TerminalView {
        sound_on: settings.sound_on,
        ..Default::default()
    }));
    let _view_subscription = attach_handler(&event_observer, &view);

    let store: Box<dyn BestTimeStore> = match JsonFileStore::in_data_dir() {
        Some(store) => {
            info!(target: "main", "Best time file: {}", store.path().display());
            Box::new(store)
        }
        None => {
            warn!(target: "main", "No data directory; best time will not be kept");
            Box::new(MemoryStore::default())
        }
    };
    let engine = GameEngine::new(
        command_observer,
        event_emitter,
        settings,
        Box::new(SystemClock),
        store,
        Settings::seed_from_env(),
    );
    println!("{}", format_best_time(engine.borrow().best_time_seconds()));
    println!("Seed {} (set SEED to replay it)", engine.borrow().seed());
    print_help();

    let (line_sender, lines) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if line_sender.send(line).is_err() {
                break;
            }
        }
    });

    loop {
        match lines.recv_timeout(POLL_INTERVAL) {
            Ok(line) => match parse_line(&line) {
                Input::Commands(commands) => {
                    for command in commands {
                        command_emitter.emit(command);
                    }
                }
                Input::ShowSettings => {
                    let projection = projection.borrow();
                    println!("{:#?}", projection.current_settings());
                    for error in projection.last_rejected() {
                        println!("last rejected: {}", error);
                    }
                }
                Input::ShowClock => {
                    let engine = engine.borrow();
                    if engine.session().is_running() {
                        println!(
                            "{}   run time {}",
                            format_time_12_hour(&Local::now()),
                            format_total_time(engine.elapsed_seconds())
                        );
                    } else {
                        println!("{}", format_time_12_hour(&Local::now()));
                    }
                }
                Input::Dump => match engine.borrow().snapshot().to_json() {
                    Ok(json) => println!("{}", json),
                    Err(e) => warn!(target: "main", "Could not serialize snapshot: {}", e),
                },
                Input::Help => print_help(),
                Input::Quit => break,
                Input::Invalid(message) => println!("{}", message),
            },
            Err(RecvTimeoutError::Timeout) => (),
            Err(RecvTimeoutError::Disconnected) => break,
        }
        command_emitter.emit(GameEngineCommand::Poll);
    }

    engine.borrow_mut().destroy();
}
