//! EVENTGRID TUI entry point.

use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use eventgrid_sync::{RestTransport, SyncController};
use eventgrid_tui::config::TuiConfig;
use eventgrid_tui::error::TuiError;
use eventgrid_tui::events::TuiEvent;
use eventgrid_tui::state::App;
use eventgrid_tui::telemetry;
use eventgrid_tui::views::render_view;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    telemetry::init_logging(&config)?;

    let transport = RestTransport::new(&config.api_base_url, config.request_timeout())?;
    let controller = Arc::new(SyncController::new(transport));

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);

    let listener_tx = event_tx.clone();
    controller.subscribe(move |entry| {
        // A full queue already holds a pending redraw.
        let _ = listener_tx.try_send(TuiEvent::CacheChanged(entry.status()));
    });

    let tick_rate = config.refresh_interval();
    let mut app = App::new(config, controller, event_tx.clone());

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    spawn_input_reader(event_tx);
    app.load_if_idle();

    let mut ticker = tokio::time::interval(tick_rate);

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        let quit = tokio::select! {
            _ = ticker.tick() => app.handle_event(TuiEvent::Tick),
            Some(event) = event_rx.recv() => app.handle_event(event),
        };
        if quit {
            break;
        }
    }

    tracing::info!("EVENTGRID TUI exiting");
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                let event = match evt {
                    CrosstermEvent::Key(key) => TuiEvent::Input(key),
                    CrosstermEvent::Resize(width, height) => TuiEvent::Resize { width, height },
                    _ => continue,
                };
                if sender.blocking_send(event).is_err() {
                    break;
                }
            }
        }
    });
}
