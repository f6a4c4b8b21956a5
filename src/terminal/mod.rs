pub mod commands;
pub mod events;
pub mod input;
pub mod list;
pub mod state;
pub mod ui;

use anyhow::{Result, anyhow};
use chrono::Local;
use log::info;
use ratatui::DefaultTerminal;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use crate::mail::provider::MailProvider;
use crate::terminal::commands::Dispatcher;
use crate::terminal::events::{AppEvent, Command};
use crate::terminal::input::spawn_input_reader;
use crate::terminal::state::{ViewState, Viewport};

pub struct TuiOptions {
    pub refresh_every: Duration,
}

/// Take over the terminal and run until the user quits.
pub fn run_tui(provider: Arc<dyn MailProvider>, opts: &TuiOptions) -> Result<()> {
    color_eyre::install().map_err(|e| anyhow!("{e}"))?;

    let mut terminal = ratatui::try_init()?;
    let result = start(&mut terminal, provider, opts);
    ratatui::restore();

    result
}

fn start(
    terminal: &mut DefaultTerminal,
    provider: Arc<dyn MailProvider>,
    opts: &TuiOptions,
) -> Result<()> {
    let size = terminal.size()?;
    let mut state = ViewState::new(
        Viewport {
            width: size.width,
            height: size.height,
        },
        opts.refresh_every,
        Local::now(),
    );

    let (tx, rx) = mpsc::channel();
    let dispatcher = Dispatcher::new(provider, tx.clone(), opts.refresh_every);
    spawn_input_reader(tx);

    for cmd in events::init(&mut state) {
        dispatcher.dispatch(cmd);
    }

    run(terminal, &mut state, &rx, &dispatcher)
}

fn run(
    terminal: &mut DefaultTerminal,
    state: &mut ViewState,
    rx: &Receiver<AppEvent>,
    dispatcher: &Dispatcher,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, state))?;

        let event = rx.recv()?;
        for cmd in events::update(state, event) {
            if cmd == Command::Quit {
                info!("quit requested");
                return Ok(());
            }
            dispatcher.dispatch(cmd);
        }
    }
}
