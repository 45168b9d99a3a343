use color_eyre::Result;
use crop_forecast_viewer::data::Dataset;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::convert::TryFrom;
use std::fmt;
use std::io::Stdout;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::app::{handle_input, handle_mouse, App};
use crate::ui;

/// Where a dataset reload stands
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ReloadState {
    Idle,
    Loading,
    Loaded,
    Failed,
}

impl fmt::Display for ReloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Loading => write!(f, "Loading"),
            Self::Loaded => write!(f, "Loaded"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Clone, Debug)]
enum ReloadEvent {
    Start,
    Loaded(Arc<Dataset>),
    Failed(String),
    Reset,
}

impl fmt::Display for ReloadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "Start"),
            Self::Loaded(dataset) => write!(f, "Loaded({} regions)", dataset.regions().len()),
            Self::Failed(msg) => write!(f, "Failed({msg})"),
            Self::Reset => write!(f, "Reset"),
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid reload transition from {from} with event {event}")]
struct StateTransitionError {
    from: ReloadState,
    event: ReloadEvent,
}

/// Drives `R`: invalidate the memoized dataset, read the files again, and
/// keep the old tables on screen if that fails.
struct ReloadMachine {
    state: ReloadState,
}

impl ReloadMachine {
    const fn new() -> Self {
        Self {
            state: ReloadState::Idle,
        }
    }

    const fn state(&self) -> ReloadState {
        self.state
    }

    fn process_event(
        &mut self,
        event: &ReloadEvent,
        app: &mut App,
    ) -> std::result::Result<(), StateTransitionError> {
        let next_state = NextState::try_from((self.state, event, app))?;
        self.state = next_state.0;
        Ok(())
    }
}

struct NextState(ReloadState);

impl TryFrom<(ReloadState, &ReloadEvent, &mut App)> for NextState {
    type Error = StateTransitionError;

    fn try_from(
        value: (ReloadState, &ReloadEvent, &mut App),
    ) -> std::result::Result<Self, Self::Error> {
        let (current_state, event, app) = value;

        match (current_state, event) {
            (ReloadState::Idle, ReloadEvent::Start) => {
                app.status_message = "Reloading data...".to_string();
                app.store.invalidate(&app.paths);
                Ok(Self(ReloadState::Loading))
            }
            (ReloadState::Loading, ReloadEvent::Loaded(dataset)) => {
                app.install_dataset(Arc::clone(dataset));
                app.status_message = format!(
                    "Reloaded {} regions, {} forecast rows",
                    dataset.regions().len(),
                    dataset.forecasts().len()
                );
                Ok(Self(ReloadState::Loaded))
            }
            (ReloadState::Loading, ReloadEvent::Failed(message)) => {
                app.status_message = format!("Reload failed, keeping previous data: {message}");
                Ok(Self(ReloadState::Failed))
            }
            (ReloadState::Loaded | ReloadState::Failed, ReloadEvent::Reset) => {
                app.reload_requested = false;
                Ok(Self(ReloadState::Idle))
            }
            _ => Err(StateTransitionError {
                from: current_state,
                event: event.clone(),
            }),
        }
    }
}

async fn reload(machine: &mut ReloadMachine, app: &mut App) {
    if let Err(e) = machine.process_event(&ReloadEvent::Start, app) {
        warn!("{e}");
        return;
    }

    let paths = app.paths.clone();
    let outcome = match app.store.load(&paths).await {
        Ok(dataset) => {
            info!(regions = dataset.regions().len(), "dataset reloaded");
            ReloadEvent::Loaded(dataset)
        }
        Err(e) => {
            error!(path = %e.path().display(), "reload failed: {e}");
            ReloadEvent::Failed(e.to_string())
        }
    };

    for event in [outcome, ReloadEvent::Reset] {
        if let Err(e) = machine.process_event(&event, app) {
            warn!("{e}");
        }
    }
}

/// Run the main application event loop
pub async fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    // Configure event poll timeout (ms)
    const EVENT_POLL_TIMEOUT: u64 = 50;

    let mut reload_machine = ReloadMachine::new();

    loop {
        let size = terminal.size()?;
        let canvas = ui::map_canvas(app, Rect::new(0, 0, size.width, size.height));

        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(color_eyre::eyre::eyre!("Terminal draw error: {e}"));
        }

        if matches!(
            event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    handle_input(app, key.code);
                    if !app.running {
                        break;
                    }
                }
                Ok(Event::Mouse(mouse)) => handle_mouse(app, mouse, canvas),
                Ok(_) => {}
                Err(e) => warn!("failed to read terminal event: {e}"),
            }
        }

        if app.reload_requested && reload_machine.state() == ReloadState::Idle {
            reload(&mut reload_machine, app).await;
        }
    }
    Ok(())
}
