use chrono::Local;
use log::debug;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::mail::provider::MailProvider;
use crate::terminal::events::{AppEvent, Command};

pub const SPINNER_INTERVAL: Duration = Duration::from_millis(100);

/// Runs commands off the main loop. Every command gets its own thread and
/// reports back with a single event on the loop's channel.
pub struct Dispatcher {
    provider: Arc<dyn MailProvider>,
    events: Sender<AppEvent>,
    refresh_every: Duration,
    spinner_every: Duration,
}

impl Dispatcher {
    pub fn new(
        provider: Arc<dyn MailProvider>,
        events: Sender<AppEvent>,
        refresh_every: Duration,
    ) -> Self {
        Self {
            provider,
            events,
            refresh_every,
            spinner_every: SPINNER_INTERVAL,
        }
    }

    pub fn with_spinner_interval(mut self, every: Duration) -> Self {
        self.spinner_every = every;
        self
    }

    pub fn dispatch(&self, cmd: Command) {
        debug!("dispatch {cmd:?}");
        match cmd {
            Command::FetchList => self.spawn(|p| AppEvent::ListFetched {
                result: p.list_unread(),
                at: Local::now(),
            }),
            Command::FetchBody(index) => {
                self.spawn(move |p| AppEvent::BodyFetched(p.fetch_body(index)))
            }
            Command::MarkAllRead => self.spawn(|p| AppEvent::MarkedAllRead(p.mark_all_read())),
            Command::ScheduleTick => {
                self.after(self.refresh_every, || AppEvent::Tick(Local::now()))
            }
            Command::ScheduleSpinner => self.after(self.spinner_every, || AppEvent::SpinnerTick),
            // handled by the loop itself
            Command::Quit => {}
        }
    }

    fn spawn<F>(&self, work: F)
    where
        F: FnOnce(&dyn MailProvider) -> AppEvent + Send + 'static,
    {
        let provider = Arc::clone(&self.provider);
        let tx = self.events.clone();
        thread::spawn(move || {
            post(&tx, work(provider.as_ref()));
        });
    }

    fn after<F>(&self, delay: Duration, make: F)
    where
        F: FnOnce() -> AppEvent + Send + 'static,
    {
        let tx = self.events.clone();
        thread::spawn(move || {
            thread::sleep(delay);
            post(&tx, make());
        });
    }
}

/// Deliver a completion to the loop. Returns false once the loop has exited.
fn post(tx: &Sender<AppEvent>, event: AppEvent) -> bool {
    match tx.send(event) {
        Ok(()) => true,
        Err(e) => {
            debug!("event loop gone, dropping {:?}", e.0);
            false
        }
    }
}
