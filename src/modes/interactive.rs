//! Terminal UI for playing and watching agents learn
//!
//! # Controls
//!
//! - Space: start/stop
//! - Arrows / WASD: steer (human mode)
//! - 1-4: human, Q-learning, SARSA, DQN (resets the session)
//! - F: cycle speed (normal, fast, hyper)
//! - C: lock the current run on the chart (compare mode)
//! - E: export the chart as CSV
//! - R: rebuild the current agent from scratch
//! - Q/Esc: quit

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::error;

use crate::game::GameConfig;
use crate::input::{InputHandler, KeyAction};
use crate::metrics::{ScoreChart, Scoreboard};
use crate::render::{HudView, Renderer};
use crate::rl::{AgentConfig, AgentKind, GridEnvironment};
use crate::session::{EpisodeLoop, SpeedMode};

/// Ticks run back to back per timer fire when the speed asks for no delay
const HYPER_BURST: usize = 25;

/// Frame interval (30 FPS)
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

#[derive(Debug, Clone)]
pub struct InteractiveConfig {
    pub algorithm: AgentKind,
    pub speed: SpeedMode,
    pub seed: Option<u64>,
    /// Destination of the E (export) key
    pub chart_path: PathBuf,
    pub game_config: GameConfig,
    pub agent_config: AgentConfig,
}

impl Default for InteractiveConfig {
    fn default() -> Self {
        Self {
            algorithm: AgentKind::Human,
            speed: SpeedMode::Normal,
            seed: None,
            chart_path: PathBuf::from("snake-rl-chart.csv"),
            game_config: GameConfig::default(),
            agent_config: AgentConfig::default(),
        }
    }
}

pub struct InteractiveMode {
    episode_loop: EpisodeLoop<ScoreChart>,
    scoreboard: Scoreboard,
    renderer: Renderer,
    input_handler: InputHandler,
    speed: SpeedMode,
    chart_path: PathBuf,
    status: Option<String>,
    should_quit: bool,
    /// Tick cadence changed and the timer must be rebuilt
    retime: bool,
    needs_redraw: bool,
}

impl InteractiveMode {
    pub fn new(config: InteractiveConfig) -> Self {
        let env = match config.seed {
            Some(seed) => GridEnvironment::with_seed(config.game_config, seed),
            None => GridEnvironment::new(config.game_config),
        };
        let episode_loop = EpisodeLoop::new(
            env,
            config.algorithm,
            config.agent_config,
            ScoreChart::new(config.algorithm),
        );

        Self {
            episode_loop,
            scoreboard: Scoreboard::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            speed: config.speed,
            chart_path: config.chart_path,
            status: None,
            should_quit: false,
            retime: false,
            needs_redraw: true,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_loop(&mut terminal).await;

        let cleanup = self.cleanup_terminal(&mut terminal);
        if let Err(err) = &cleanup {
            error!(error = %err, "terminal cleanup failed");
        }
        result.and(cleanup)
    }

    async fn run_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut tick_timer = self.tick_timer();
        let mut render_timer = interval(FRAME_INTERVAL);

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                _ = tick_timer.tick() => {
                    self.run_ticks();
                }

                _ = render_timer.tick() => {
                    self.scoreboard.update();
                    if self.needs_redraw {
                        terminal.draw(|frame| {
                            let view = HudView::new(
                                &self.episode_loop,
                                self.speed,
                                &self.scoreboard,
                                self.status.as_deref(),
                            );
                            self.renderer.render(frame, &view);
                        }).context("Failed to draw frame")?;
                        self.needs_redraw = false;
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
            if self.retime {
                tick_timer = self.tick_timer();
                self.retime = false;
            }
        }

        Ok(())
    }

    fn tick_timer(&self) -> Interval {
        let period = self.speed.tick_interval(self.episode_loop.kind());
        let mut timer = interval(period.max(Duration::from_millis(1)));
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        timer
    }

    fn run_ticks(&mut self) {
        let kind = self.episode_loop.kind();
        let burst = if self.speed.tick_interval(kind).is_zero() {
            HYPER_BURST
        } else {
            1
        };

        for _ in 0..burst {
            let Some(report) = self.episode_loop.tick() else {
                break;
            };
            self.scoreboard.on_tick();
            if report.done || self.speed.should_render(kind, report.round_steps) {
                self.needs_redraw = true;
            }
        }
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind != KeyEventKind::Press {
                return;
            }
            self.handle_key(key);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        self.needs_redraw = true;

        match self.input_handler.handle_key_event(key) {
            KeyAction::Move(direction) => self.episode_loop.queue_direction(direction),
            KeyAction::ToggleRun => {
                self.status = None;
                self.episode_loop.toggle();
            }
            KeyAction::SelectAgent(kind) => {
                self.episode_loop.set_agent(kind);
                self.on_session_reset();
            }
            KeyAction::CycleSpeed => {
                self.speed = self.speed.next();
                self.retime = true;
            }
            KeyAction::ToggleCompare => {
                let locked = self.episode_loop.observer_mut().toggle_compare();
                if locked {
                    self.status = Some("Run locked: next session adds a new series".to_string());
                } else {
                    // Leaving compare mode starts over with a single series
                    let kind = self.episode_loop.kind();
                    self.episode_loop.set_agent(kind);
                    self.on_session_reset();
                    self.status = Some("Compare mode off".to_string());
                }
            }
            KeyAction::ExportChart => {
                let result = self.episode_loop.observer().export_csv(&self.chart_path);
                self.status = Some(match result {
                    Ok(()) => format!("Chart saved to {}", self.chart_path.display()),
                    Err(err) => format!("Export failed: {err:#}"),
                });
            }
            KeyAction::ResetAgent => {
                self.episode_loop.reset_agent();
                self.on_session_reset();
            }
            KeyAction::Quit => self.should_quit = true,
            KeyAction::None => {}
        }
    }

    fn on_session_reset(&mut self) {
        self.scoreboard.on_session_reset();
        self.retime = true;
    }

    fn cleanup_terminal(&mut self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
