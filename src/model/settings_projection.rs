use crate::events::EventHandler;
use crate::game::settings::{Settings, SettingsError};
use crate::model::GameEngineEvent;
use std::cell::RefCell;
use std::rc::Rc;

/// Mirror of the engine's settings for a settings form.
pub struct SettingsProjection {
    settings: Settings,
    last_rejected: Vec<SettingsError>,
}

impl SettingsProjection {
    pub fn new(initial: &Settings) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            settings: initial.clone(),
            last_rejected: Vec::new(),
        }))
    }

    pub fn current_settings(&self) -> Settings {
        self.settings.clone()
    }

    pub fn last_rejected(&self) -> &[SettingsError] {
        &self.last_rejected
    }
}

impl EventHandler<GameEngineEvent> for SettingsProjection {
    fn handle_event(&mut self, event: &GameEngineEvent) {
        match event {
            GameEngineEvent::SettingsChanged(new_settings) => {
                self.settings = new_settings.clone();
                self.last_rejected.clear();
            }
            GameEngineEvent::SettingsRejected(errors) => {
                self.last_rejected = errors.clone();
            }
            _ => (),
        }
    }
}
