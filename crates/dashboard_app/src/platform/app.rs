use std::collections::BTreeMap;
use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::{DateTime, Utc};
use dashboard_core::{update, AppState, Effect, Msg, PageKind};
use dashboard_engine::{ensure_output_dir, EngineHandle, PageWriter};
use dashboard_logging::{dash_debug, dash_error, dash_info, dash_warn};

use super::config::DashboardConfig;
use super::effects::EffectRunner;
use super::input::{parse_command, Command, HELP};
use super::ui::layout::Document;
use super::ui::render::{render_conversations, render_plugins};

const ENGINE_WAIT: Duration = Duration::from_millis(50);

/// Owns the pure state and everything that turns its effects into IO.
struct Dashboard {
    state: AppState,
    runner: EffectRunner,
    documents: BTreeMap<PageKind, Document>,
    writer: PageWriter,
    msg_tx: mpsc::Sender<Msg>,
    msg_rx: mpsc::Receiver<Msg>,
}

impl Dashboard {
    fn new(config: &DashboardConfig, engine: EngineHandle) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        Self {
            state: AppState::with_intervals(
                config.poll_interval(PageKind::Conversations),
                config.poll_interval(PageKind::Plugins),
            ),
            runner: EffectRunner::new(engine, msg_tx.clone()),
            documents: BTreeMap::new(),
            writer: PageWriter::new(config.output_dir.clone()),
            msg_tx,
            msg_rx,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (next, effects) = update(state, msg);
        self.state = next;

        for effect in effects {
            match effect {
                Effect::RenderSkeleton(page) => {
                    self.documents.insert(page, Document::skeleton(page));
                    let _ = self.msg_tx.send(Msg::SkeletonRendered(page));
                }
                other => self.runner.run(other),
            }
        }
    }

    /// Drains messages queued by effects and store subscribers.
    fn process_pending_messages(&mut self) {
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.dispatch(msg);
        }
    }

    fn drain_engine_events(&mut self) {
        if let Some(event) = self.runner.recv_event(ENGINE_WAIT) {
            self.runner.handle_engine_event(event);
            while let Some(event) = self.runner.try_recv_event() {
                self.runner.handle_engine_event(event);
            }
        }
        self.process_pending_messages();
    }

    fn render_dirty(&mut self, now: DateTime<Utc>) {
        for page in PageKind::ALL {
            let dirty = self.state.consume_dirty(page);
            if dirty.is_empty() {
                continue;
            }
            let Some(document) = self.documents.get_mut(&page) else {
                continue;
            };

            let commands = match page {
                PageKind::Conversations => {
                    render_conversations(&self.state.conversations().view(now), dirty.iter(), now)
                }
                PageKind::Plugins => {
                    render_plugins(&self.state.plugins().view(now), dirty.iter(), now)
                }
            };
            let mut changed = false;
            for command in commands {
                changed |= document.apply(command);
            }
            if !changed {
                continue;
            }

            match self.writer.write(page, &document.to_html()) {
                Ok(Some(path)) => dash_debug!("Wrote {}", path.display()),
                Ok(None) => {}
                Err(err) => dash_error!("Failed to write {} page: {}", page, err),
            }
        }
    }

    fn shutdown(mut self) {
        for page in PageKind::ALL {
            self.dispatch(Msg::Teardown(page));
        }
        self.runner.shutdown();
    }
}

fn spawn_stdin_reader(tx: mpsc::Sender<Command>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match parse_command(&line) {
                Ok(Some(command)) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    dash_warn!("Rejected input '{}': {}", line.trim(), err);
                    eprintln!("{err}\n{HELP}");
                }
            }
        }
    });
}

/// Runs both pages until `quit` is read or `run_for` elapses.
pub fn run_app(config: DashboardConfig, run_for: Option<Duration>) -> anyhow::Result<()> {
    ensure_output_dir(&config.output_dir)
        .with_context(|| format!("cannot use output directory {:?}", config.output_dir))?;
    let engine = EngineHandle::new(config.fetch_settings()).context("cannot start engine")?;

    let mut dashboard = Dashboard::new(&config, engine);
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_stdin_reader(cmd_tx);

    dash_info!(
        "Dashboard polling {} into {}",
        config.base_url,
        config.output_dir.display()
    );
    println!("{HELP}");

    for page in PageKind::ALL {
        dashboard.dispatch(Msg::Mount(page));
    }
    dashboard.process_pending_messages();
    dashboard.render_dirty(Utc::now());

    let started = Instant::now();
    let tick = config.tick_interval();
    let mut last_tick = Instant::now();

    'main: loop {
        dashboard.drain_engine_events();

        while let Ok(command) = cmd_rx.try_recv() {
            match command {
                Command::Send(msg) => {
                    dashboard.dispatch(msg);
                    dashboard.process_pending_messages();
                }
                Command::Help => println!("{HELP}"),
                Command::Quit => {
                    dash_info!("Quit requested");
                    break 'main;
                }
            }
        }

        if last_tick.elapsed() >= tick {
            last_tick = Instant::now();
            dashboard.dispatch(Msg::Tick);
        }

        dashboard.render_dirty(Utc::now());

        if run_for.is_some_and(|limit| started.elapsed() >= limit) {
            dash_info!("Run time elapsed");
            break;
        }
    }

    dashboard.shutdown();
    Ok(())
}
