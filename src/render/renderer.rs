use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, BorderType, Borders, Chart, Clear, Dataset, GraphType, Paragraph},
};

use crate::game::{GameState, Position};
use crate::metrics::{ScoreChart, Scoreboard};
use crate::rl::AgentKind;
use crate::session::{EpisodeLoop, OverlayTitle, SpeedMode};

const SERIES_COLORS: [Color; 5] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::LightRed,
];

/// Everything one frame shows
pub struct HudView<'a> {
    pub state: &'a GameState,
    pub kind: AgentKind,
    pub episode: u32,
    pub high_score: u32,
    pub epsilon: Option<f32>,
    pub agent_ready: bool,
    pub overlay: Option<OverlayTitle>,
    pub speed: SpeedMode,
    pub chart: &'a ScoreChart,
    pub scoreboard: &'a Scoreboard,
    /// Transient message, e.g. the result of a chart export
    pub status: Option<&'a str>,
}

impl<'a> HudView<'a> {
    pub fn new(
        episode_loop: &'a EpisodeLoop<ScoreChart>,
        speed: SpeedMode,
        scoreboard: &'a Scoreboard,
        status: Option<&'a str>,
    ) -> Self {
        Self {
            state: episode_loop.environment().state(),
            kind: episode_loop.kind(),
            episode: episode_loop.episode(),
            high_score: episode_loop.high_score(),
            epsilon: episode_loop.epsilon(),
            agent_ready: episode_loop.agent_ready(),
            overlay: episode_loop.overlay(),
            speed,
            chart: episode_loop.observer(),
            scoreboard,
            status,
        }
    }
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, view: &HudView) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // HUD
                Constraint::Min(0),    // Board and chart
                Constraint::Length(2), // Controls
            ])
            .split(frame.area());

        frame.render_widget(self.render_hud(view), chunks[0]);

        let grid_width = (view.state.grid_width * 2 + 2) as u16;
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(grid_width), Constraint::Min(20)])
            .split(chunks[1]);

        frame.render_widget(self.render_grid(view.state), body[0]);
        if let Some(title) = view.overlay {
            let area = centered(body[0], 24, 5);
            frame.render_widget(Clear, area);
            frame.render_widget(self.render_overlay(title, view.state), area);
        }

        self.render_chart(frame, body[1], view.chart);
        frame.render_widget(self.render_controls(view), chunks[2]);
    }

    fn render_grid(&self, state: &GameState) -> Paragraph<'_> {
        let mut lines = Vec::with_capacity(state.grid_height);
        let head = state.snake.head();

        for y in 0..state.grid_height {
            let mut spans = Vec::with_capacity(state.grid_width);

            for x in 0..state.grid_width {
                let pos = Position::new(x as i32, y as i32);

                let cell = if pos == head {
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if state.snake.occupies(pos) {
                    Span::styled("□ ", Style::default().fg(Color::Green))
                } else if pos == state.food {
                    Span::styled(
                        "● ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::White))
                .title(" Snake "),
        )
    }

    fn render_hud(&self, view: &HudView) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        let mut agent = view.kind.display_name().to_uppercase();
        if !view.agent_ready {
            agent.push_str(" (random)");
        }

        let text = vec![Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(view.state.score.to_string(), value),
            Span::raw("   "),
            Span::styled("Episode: ", label),
            Span::styled(view.episode.to_string(), value),
            Span::raw("   "),
            Span::styled("High: ", label),
            Span::styled(view.high_score.to_string(), value),
            Span::raw("   "),
            Span::styled("ε: ", label),
            Span::styled(format_epsilon(view.epsilon), value),
            Span::raw("   "),
            Span::styled("Agent: ", label),
            Span::styled(agent, Style::default().fg(Color::Cyan)),
            Span::raw("   "),
            Span::styled("Speed: ", label),
            Span::styled(view.speed.label(), value),
            Span::raw("   "),
            Span::styled("Time: ", label),
            Span::styled(view.scoreboard.format_time(), value),
        ])];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM))
    }

    fn render_overlay(&self, title: OverlayTitle, state: &GameState) -> Paragraph<'_> {
        let color = match title {
            OverlayTitle::GameOver => Color::Red,
            OverlayTitle::Paused => Color::Yellow,
            OverlayTitle::Ready => Color::Green,
        };
        let mut text = vec![Line::from(Span::styled(
            title.label(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))];
        if title == OverlayTitle::Paused {
            text.push(Line::from(format!("Score: {}", state.score)));
        }
        text.push(Line::from(Span::styled(
            "Space to start",
            Style::default().fg(Color::Gray),
        )));

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
    }

    fn render_chart(&self, frame: &mut Frame, area: Rect, chart: &ScoreChart) {
        let coordinates: Vec<Vec<(f64, f64)>> =
            chart.series().iter().map(|s| s.coordinates()).collect();

        let datasets: Vec<Dataset> = chart
            .series()
            .iter()
            .zip(&coordinates)
            .enumerate()
            .map(|(i, (series, points))| {
                Dataset::default()
                    .name(series.label.clone())
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
                    .data(points)
            })
            .collect();

        let (first, last) = chart.episode_bounds().unwrap_or((0, 1));
        let x_max = f64::from(last.max(first + 1));
        let y_max = f64::from(chart.max_score().max(1));

        let title = if chart.compare_mode() {
            " Learning curve (runs locked) "
        } else {
            " Learning curve "
        };

        let widget = Chart::new(datasets)
            .block(Block::default().borders(Borders::ALL).title(title))
            .x_axis(
                Axis::default()
                    .title("episode")
                    .style(Style::default().fg(Color::Gray))
                    .bounds([f64::from(first), x_max])
                    .labels([first.to_string(), last.to_string()]),
            )
            .y_axis(
                Axis::default()
                    .title("score")
                    .style(Style::default().fg(Color::Gray))
                    .bounds([0.0, y_max])
                    .labels(["0".to_string(), format!("{y_max:.0}")]),
            );

        frame.render_widget(widget, area);
    }

    fn render_controls(&self, view: &HudView) -> Paragraph<'_> {
        let key = Style::default().fg(Color::Cyan);
        let mut spans = vec![
            Span::styled("Space", key),
            Span::raw(" start/stop | "),
            Span::styled("1-4", key),
            Span::raw(" human/qlearning/sarsa/dqn | "),
            Span::styled("↑↓←→/WASD", key),
            Span::raw(" move | "),
            Span::styled("F", key),
            Span::raw(" speed | "),
            Span::styled("C", key),
            Span::raw(" lock run | "),
            Span::styled("E", key),
            Span::raw(" export | "),
            Span::styled("R", key),
            Span::raw(" reset agent | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" quit"),
        ];
        if let Some(status) = view.status {
            spans.push(Span::raw("   "));
            spans.push(Span::styled(status.to_string(), Style::default().fg(Color::Yellow)));
        }

        Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// `ε` as a whole percentage, `--` for human play
pub fn format_epsilon(epsilon: Option<f32>) -> String {
    epsilon.map_or_else(|| "--".to_string(), |e| format!("{:.0}%", e * 100.0))
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameConfig;
    use crate::rl::{AgentConfig, GridEnvironment};
    use ratatui::{Terminal, backend::TestBackend};

    fn draw(episode_loop: &EpisodeLoop<ScoreChart>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
        let scoreboard = Scoreboard::new();
        terminal
            .draw(|frame| {
                let view = HudView::new(episode_loop, SpeedMode::Fast, &scoreboard, None);
                Renderer::new().render(frame, &view);
            })
            .unwrap();

        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn session(kind: AgentKind) -> EpisodeLoop<ScoreChart> {
        EpisodeLoop::new(
            GridEnvironment::with_seed(GameConfig::default(), 3),
            kind,
            AgentConfig::default(),
            ScoreChart::new(kind),
        )
    }

    #[test]
    fn test_format_epsilon() {
        assert_eq!(format_epsilon(None), "--");
        assert_eq!(format_epsilon(Some(1.0)), "100%");
        assert_eq!(format_epsilon(Some(0.4567)), "46%");
    }

    #[test]
    fn test_idle_session_shows_ready_overlay() {
        let screen = draw(&session(AgentKind::Human));

        assert!(screen.contains("READY"));
        assert!(screen.contains("HUMAN"));
        assert!(screen.contains("Fast"));
    }

    #[test]
    fn test_running_session_hides_overlay() {
        let mut episode_loop = session(AgentKind::Sarsa);
        episode_loop.start();
        episode_loop.tick();

        let screen = draw(&episode_loop);

        assert!(!screen.contains("READY"));
        assert!(screen.contains("SARSA"));
        assert!(screen.contains("100%"));
    }

    #[test]
    fn test_centered_rect_fits_area() {
        let area = Rect::new(0, 0, 10, 4);
        let inner = centered(area, 24, 5);
        assert_eq!(inner, area);

        let inner = centered(Rect::new(2, 2, 40, 20), 24, 5);
        assert_eq!(inner, Rect::new(10, 9, 24, 5));
    }
}
