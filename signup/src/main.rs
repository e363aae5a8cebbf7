//! A TUI for registering an account on the command line

/// The "functional core" to the main module's "imperative shell"
mod app;

/// Configuration and argument parsing
mod config;

/// The macro behind the form's tab order
mod form_fields;

use app::{Action, App, Effect, EffectContext};
use clap::Parser;
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use signup_core::{api, page, TimerId};
use std::{collections::HashMap, io, process::ExitCode, sync::Arc};
use tokio::{
    sync::mpsc::{unbounded_channel, UnboundedSender},
    task::JoinHandle,
    time,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> io::Result<ExitCode> {
    let config = config::Config::parse();

    // The terminal belongs to the UI, so logs go to a file instead.
    let appender = tracing_appender::rolling::daily(config.data_dir(), "signup.log");
    let (writer, _guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let conn = Arc::new(EffectContext::new().map_err(io::Error::other)?);
    let app = App::new(
        api::Client::new(config.server.clone()),
        config.csrf_token.clone(),
    );

    let mut terminal = ratatui::init();
    terminal.clear()?;
    let res = run(terminal, app, conn).await;
    ratatui::restore();

    if let Ok((_, Some(farewell))) = &res {
        println!("{farewell}");
    }

    res.map(|(code, _)| code)
}

/// Manage the lifecycle of the app
async fn run(
    mut terminal: DefaultTerminal,
    mut app: App,
    conn: Arc<EffectContext>,
) -> io::Result<(ExitCode, Option<String>)> {
    // We expect side-effectful behaviors (that is, things like network access)
    // to take place via async tasks. Once those tasks are done, we read their
    // results off of a channel. We keep track of outstanding effects so we can
    // exit cleanly, and of pending timers so the page can cancel them.
    let (action_tx, mut action_rx) = unbounded_channel();
    let mut outstanding_effects = Vec::with_capacity(1);
    let mut timers: HashMap<TimerId, JoinHandle<()>> = HashMap::new();

    for effect in app.init() {
        dispatch(effect, &action_tx, &conn, &mut outstanding_effects, &mut timers);
    }
    terminal.draw(|frame| app.render(frame))?;

    let mut event_stream = EventStream::new();

    // Start our event loop!
    loop {
        // Wait for either external input or the async result of an effect.
        // Not every piece of input turns into an action.
        let next_action_opt = tokio::select! {
            event_opt = event_stream.next() => {
                match event_opt {
                    Some(Ok(Event::Key(key_event))) => Some(Action::Key(key_event)),
                    Some(Err(err)) => Some(Action::Problem(err.to_string())),
                    _ => None,
                }
            },

            action_opt = action_rx.recv() => action_opt,
        };

        if let Some(action) = next_action_opt {
            if let Action::Page(page::Action::TimerFired(id)) = &action {
                timers.remove(id);
            }

            for effect in app.handle(action) {
                dispatch(effect, &action_tx, &conn, &mut outstanding_effects, &mut timers);
            }
        }

        terminal.draw(|frame| app.render(frame))?;

        // This list should never be too long (since we do this on every pass
        // through the event loop) so a full scan is fine.
        outstanding_effects.retain(|handle: &JoinHandle<()>| !handle.is_finished());

        // If the app indicates that it should exit, pending timers no longer
        // matter, but we let in-flight effects finish before leaving.
        if let Some(code) = app.should_exit() {
            for (_, timer) in timers.drain() {
                timer.abort();
            }

            for effect in outstanding_effects.drain(..) {
                if let Err(err) = effect.await {
                    tracing::warn!(?err, "effect task failed while exiting");
                }
            }

            return Ok((code, app.farewell()));
        }
    }
}

/// Start whatever an effect needs: a timer task for timers, or a task that
/// runs the effect and sends the next action back to the app.
fn dispatch(
    effect: Effect,
    action_tx: &UnboundedSender<Action>,
    conn: &Arc<EffectContext>,
    outstanding_effects: &mut Vec<JoinHandle<()>>,
    timers: &mut HashMap<TimerId, JoinHandle<()>>,
) {
    match effect {
        Effect::StartTimer(id, after) => {
            let tx = action_tx.clone();
            let handle = tokio::spawn(async move {
                time::sleep(after).await;

                // A closed channel means we're shutting down, and nobody
                // needs the message cleared anymore.
                let _ = tx.send(Action::Page(page::Action::TimerFired(id)));
            });

            if let Some(previous) = timers.insert(id, handle) {
                previous.abort();
            }
        }

        Effect::CancelTimer(id) => {
            if let Some(handle) = timers.remove(&id) {
                handle.abort();
            }
        }

        effect => {
            let tx = action_tx.clone();
            let conn = Arc::clone(conn);

            outstanding_effects.push(tokio::spawn(async move {
                if let Some(next_action) = effect.run(&conn).await {
                    let _ = tx.send(next_action);
                }
            }));
        }
    }
}
