use crossterm::event::{self, Event, KeyEventKind};
use log::error;
use std::sync::mpsc::Sender;
use std::thread;

use crate::terminal::events::AppEvent;

/// Forward key presses and resizes from the terminal into the loop's channel.
/// Stops once the loop has gone away.
pub fn spawn_input_reader(tx: Sender<AppEvent>) {
    thread::spawn(move || {
        loop {
            let ev = match event::read() {
                Ok(ev) => ev,
                Err(e) => {
                    error!("terminal input failed: {e}");
                    return;
                }
            };
            let app_event = match ev {
                Event::Key(key) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                Event::Resize(width, height) => AppEvent::Resize { width, height },
                _ => continue,
            };
            if tx.send(app_event).is_err() {
                return;
            }
        }
    });
}
