//! TUI module using ratatui.
//!
//! A single form: one URL field, one action, one output panel. Submissions run
//! to completion one at a time while the busy indicator animates.

pub mod app;
pub mod components;

use crate::agent::Completion;
use crate::loader::ContentLoader;
use crate::pipeline::{Outcome, Pipeline};
use app::App;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::Duration;
use tracing::info;

/// Redraw interval for the busy indicator, also the idle poll interval
const TICK: Duration = Duration::from_millis(100);

/// Run the form until the user quits
pub async fn run<L, C>(pipeline: &Pipeline<L, C>) -> anyhow::Result<()>
where
    L: ContentLoader,
    C: Completion,
{
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, pipeline).await;
    ratatui::restore();
    result
}

async fn event_loop<L, C>(
    terminal: &mut DefaultTerminal,
    pipeline: &Pipeline<L, C>,
) -> anyhow::Result<()>
where
    L: ContentLoader,
    C: Completion,
{
    let mut app = App::new();

    while !app.should_quit {
        terminal.draw(|frame| components::render(frame, &app))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(input) = app.handle_key(key) {
                info!("submission received");
                if let Some(outcome) = process(terminal, &mut app, pipeline, &input).await? {
                    app.finish(outcome);
                }
            }
        }
    }

    Ok(())
}

/// Drive one submission, redrawing the spinner until it completes.
///
/// Returns `None` only when the user quits mid-run.
async fn process<L, C>(
    terminal: &mut DefaultTerminal,
    app: &mut App,
    pipeline: &Pipeline<L, C>,
    input: &str,
) -> anyhow::Result<Option<Outcome>>
where
    L: ContentLoader,
    C: Completion,
{
    let work = pipeline.run(input);
    tokio::pin!(work);
    let mut ticker = tokio::time::interval(TICK);

    loop {
        tokio::select! {
            outcome = &mut work => return Ok(Some(outcome)),
            _ = ticker.tick() => {
                app.tick();
                terminal.draw(|frame| components::render(frame, app))?;

                // Drain keystrokes; only Ctrl-C does anything here
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        app.handle_key(key);
                    }
                }
                if app.should_quit {
                    return Ok(None);
                }
            }
        }
    }
}
