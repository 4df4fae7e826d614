//! Application state.

use crate::config::TuiConfig;
use crate::events::TuiEvent;
use crate::form::EventForm;
use crate::keys::{map_key, Action, InputMode};
use crate::notifications::{Notification, NotificationAction, NotificationLevel};
use crate::theme::SynthBruteTheme;
use eventgrid_core::{ErrorKind, Event, EventId};
use eventgrid_storage::{CacheEntry, CacheStatus};
use eventgrid_sync::{EventTransport, SyncController, WriteStatus};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const MAX_NOTIFICATIONS: usize = 50;

pub struct App<T: EventTransport + 'static> {
    pub config: TuiConfig,
    pub theme: SynthBruteTheme,
    pub controller: Arc<SyncController<T>>,
    /// Last snapshot of the event collection, refreshed on cache events.
    pub entry: CacheEntry<Event>,
    pub mode: InputMode,
    pub query: String,
    pub selected: Option<EventId>,
    pub form: Option<EventForm>,
    pub notifications: Vec<Notification>,
    events: mpsc::Sender<TuiEvent>,
}

impl<T: EventTransport + 'static> App<T> {
    pub fn new(
        config: TuiConfig,
        controller: Arc<SyncController<T>>,
        events: mpsc::Sender<TuiEvent>,
    ) -> Self {
        let entry = controller.snapshot();
        Self {
            config,
            theme: SynthBruteTheme::synthbrute(),
            controller,
            entry,
            mode: InputMode::Normal,
            query: String::new(),
            selected: None,
            form: None,
            notifications: Vec::new(),
            events,
        }
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.push_notification(Notification::new(level, message));
    }

    fn push_notification(&mut self, notification: Notification) {
        self.notifications.push(notification);
        if self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.remove(0);
        }
    }

    pub fn dismiss_notification(&mut self) -> bool {
        self.notifications.pop().is_some()
    }

    /// Events currently shown, after the search query is applied.
    pub fn visible_events(&self) -> Vec<Event> {
        eventgrid_core::filter(self.entry.value(), &self.query)
    }

    pub fn selected_event(&self) -> Option<Event> {
        let selected = self.selected.as_ref()?;
        self.visible_events()
            .into_iter()
            .find(|event| &event.id == selected)
    }

    /// Pull a fresh snapshot from the controller and keep the selection on a
    /// visible event.
    pub fn refresh_snapshot(&mut self) {
        let previous = self.entry.status();
        self.entry = self.controller.snapshot();
        if self.entry.is_error() && previous != CacheStatus::Error {
            if let Some(error) = self.entry.error() {
                let notification = Notification::new(NotificationLevel::Error, error.user_message())
                    .with_action(NotificationAction::Retry);
                self.push_notification(notification);
            }
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let visible = self.visible_events();
        let still_visible = self
            .selected
            .as_ref()
            .is_some_and(|id| visible.iter().any(|event| &event.id == id));
        if !still_visible {
            self.selected = visible.first().map(|event| event.id.clone());
        }
    }

    pub fn select_next(&mut self) {
        let visible = self.visible_events();
        select_next_id(&visible, &mut self.selected);
    }

    pub fn select_previous(&mut self) {
        let visible = self.visible_events();
        select_prev_id(&visible, &mut self.selected);
    }

    pub fn open_search(&mut self) {
        self.mode = InputMode::Search;
    }

    /// Leave the search bar, optionally dropping the query.
    pub fn close_search(&mut self, clear: bool) {
        if clear {
            self.query.clear();
        }
        self.mode = InputMode::Normal;
        self.clamp_selection();
    }

    pub fn push_query(&mut self, c: char) {
        self.query.push(c);
        self.clamp_selection();
    }

    pub fn pop_query(&mut self) {
        self.query.pop();
        self.clamp_selection();
    }

    pub fn open_form(&mut self) {
        if self.form.is_none() {
            self.form = Some(EventForm::new());
        }
        self.mode = InputMode::Form;
    }

    /// Close the add-event popup. A failed write is forgotten with it.
    pub fn close_form(&mut self) {
        self.form = None;
        self.mode = InputMode::Normal;
        self.controller.dismiss_failed_write();
    }

    /// Start a fetch if nothing has been loaded since the last invalidation.
    pub fn load_if_idle(&self) -> Option<JoinHandle<()>> {
        if !self.controller.snapshot().is_idle() {
            return None;
        }
        let controller = Arc::clone(&self.controller);
        Some(tokio::spawn(async move {
            controller.ensure_loaded().await;
        }))
    }

    /// Manual retry. Joins a fetch already in flight.
    pub fn refetch(&self) -> JoinHandle<()> {
        let controller = Arc::clone(&self.controller);
        tokio::spawn(async move {
            controller.refetch().await;
        })
    }

    /// Send the form contents. The outcome arrives as
    /// [`TuiEvent::WriteFinished`].
    pub fn submit_form(&mut self) -> Option<JoinHandle<()>> {
        let form = self.form.as_mut()?;
        if let Err(message) = form.validate() {
            form.error = Some(message);
            return None;
        }
        form.status = Some(WriteStatus::Sending);
        form.error = None;

        let payload = form.to_payload();
        let controller = Arc::clone(&self.controller);
        let events = self.events.clone();
        Some(tokio::spawn(async move {
            let result = controller.submit_event(payload).await;
            if events.send(TuiEvent::WriteFinished(result)).await.is_err() {
                tracing::debug!("event loop closed before write finished");
            }
        }))
    }

    /// Apply a write outcome. Only a form that is still sending belongs to
    /// the write; a draft opened afterwards is left alone.
    pub fn finish_write(&mut self, result: Result<Event, ErrorKind>) {
        let owns_form = self.form.as_ref().is_some_and(EventForm::is_sending);
        match result {
            Ok(event) => {
                if owns_form {
                    self.form = None;
                    if self.mode == InputMode::Form {
                        self.mode = InputMode::Normal;
                    }
                }
                self.notify(
                    NotificationLevel::Success,
                    format!("Added \"{}\"", event.title),
                );
                self.refresh_snapshot();
            }
            Err(ErrorKind::Busy) => {
                self.notify(NotificationLevel::Warning, ErrorKind::Busy.to_string());
            }
            Err(error) => {
                if let Some(form) = self.form.as_mut().filter(|_| owns_form) {
                    form.status = Some(WriteStatus::Failed);
                    form.error = Some(error.to_string());
                }
                let notification = Notification::new(
                    NotificationLevel::Error,
                    format!("Failed to add event: {}", error),
                )
                .with_action(NotificationAction::Dismiss);
                self.push_notification(notification);
            }
        }
    }
}

impl<T: EventTransport + 'static> App<T> {
    /// Route one loop event. Returns `true` when the app should quit.
    pub fn handle_event(&mut self, event: TuiEvent) -> bool {
        match event {
            TuiEvent::Input(key) => {
                if let Some(action) = map_key(key, self.mode) {
                    return self.handle_action(action);
                }
            }
            TuiEvent::Tick => {
                self.refresh_snapshot();
                self.load_if_idle();
            }
            TuiEvent::CacheChanged(status) => {
                tracing::debug!(%status, "cache changed");
                self.refresh_snapshot();
            }
            TuiEvent::WriteFinished(result) => {
                self.finish_write(result);
                self.load_if_idle();
            }
            TuiEvent::Resize { .. } => {}
        }
        false
    }

    /// Apply one key action in the current mode. Returns `true` on quit.
    pub fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return true,
            Action::Refresh => {
                self.refetch();
                return false;
            }
            _ => {}
        }

        match self.mode {
            InputMode::Normal => match action {
                Action::MoveDown => self.select_next(),
                Action::MoveUp => self.select_previous(),
                Action::OpenSearch => self.open_search(),
                Action::NewEvent => self.open_form(),
                Action::Cancel => {
                    if !self.dismiss_notification() {
                        self.close_search(true);
                    }
                }
                _ => {}
            },
            InputMode::Search => match action {
                Action::Insert(c) => self.push_query(c),
                Action::Backspace => self.pop_query(),
                Action::MoveDown => self.select_next(),
                Action::MoveUp => self.select_previous(),
                Action::Confirm => self.close_search(false),
                Action::Cancel => self.close_search(true),
                _ => {}
            },
            InputMode::Form => {
                if let Some(form) = self.form.as_mut() {
                    match action {
                        Action::Insert(c) => form.insert(c),
                        Action::Backspace => form.backspace(),
                        Action::NextField | Action::MoveDown => form.focus_next(),
                        Action::PrevField | Action::MoveUp => form.focus_previous(),
                        _ => {}
                    }
                }
                match action {
                    Action::Confirm => {
                        self.submit_form();
                    }
                    Action::Cancel => self.close_form(),
                    _ => {}
                }
            }
        }
        false
    }
}

fn select_next_id(items: &[Event], selected: &mut Option<EventId>) {
    if items.is_empty() {
        *selected = None;
        return;
    }
    let next = match position(items, selected) {
        Some(index) => (index + 1) % items.len(),
        None => 0,
    };
    *selected = Some(items[next].id.clone());
}

fn select_prev_id(items: &[Event], selected: &mut Option<EventId>) {
    if items.is_empty() {
        *selected = None;
        return;
    }
    let prev = match position(items, selected) {
        Some(0) | None => items.len() - 1,
        Some(index) => index - 1,
    };
    *selected = Some(items[prev].id.clone());
}

fn position(items: &[Event], selected: &Option<EventId>) -> Option<usize> {
    let selected = selected.as_ref()?;
    items.iter().position(|event| &event.id == selected)
}
