//! The observe-act-learn loop
//!
//! An [`EpisodeLoop`] owns one [`GridEnvironment`] and, unless a human is
//! playing, one boxed [`Agent`]. Each call to [`EpisodeLoop::tick`] runs one
//! complete cycle; the caller decides the cadence. Finished episodes are
//! reported to an injected [`EpisodeObserver`].
//!
//! ```text
//!         start()                 stop() / human round over
//!   Idle ──────────▶ Running ─────────────────────────────▶ Idle
//! ```

use tracing::{debug, info};

use crate::game::Direction;
use crate::rl::{
    Agent, AgentConfig, AgentKind, EncodedState, Experience, GridEnvironment, StepOutcome,
    create_agent,
};

/// Receives finished episodes
pub trait EpisodeObserver {
    fn on_episode_end(&mut self, episode: u32, score: u32);

    /// The session was reset, either by switching or by rebuilding the agent
    fn on_session_reset(&mut self, _kind: AgentKind) {}
}

impl EpisodeObserver for () {
    fn on_episode_end(&mut self, _episode: u32, _score: u32) {}
}

impl<O: EpisodeObserver + ?Sized> EpisodeObserver for &mut O {
    fn on_episode_end(&mut self, episode: u32, score: u32) {
        (**self).on_episode_end(episode, score);
    }

    fn on_session_reset(&mut self, kind: AgentKind) {
        (**self).on_session_reset(kind);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

/// Banner shown while the loop is idle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayTitle {
    /// Fresh session, nothing played yet
    Ready,
    /// Stopped mid-round
    Paused,
    /// A human round just ended
    GameOver,
}

impl OverlayTitle {
    pub fn label(&self) -> &'static str {
        match self {
            OverlayTitle::Ready => "READY",
            OverlayTitle::Paused => "PAUSED",
            OverlayTitle::GameOver => "GAME OVER",
        }
    }
}

/// Everything a tick produced, for the HUD and headless statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub action: Direction,
    pub reward: f32,
    pub done: bool,
    pub ate_food: bool,
    /// Score of the round this tick belonged to
    pub score: u32,
    /// Steps the round had taken after this tick
    pub round_steps: u32,
    /// Episode index after this tick (already advanced when `done`)
    pub episode: u32,
    pub high_score: u32,
    /// `None` in human mode
    pub epsilon: Option<f32>,
}

/// Drives one environment with one controller
pub struct EpisodeLoop<O: EpisodeObserver = ()> {
    env: GridEnvironment,
    kind: AgentKind,
    agent: Option<Box<dyn Agent>>,
    agent_config: AgentConfig,
    observer: O,
    state: LoopState,
    overlay: OverlayTitle,
    episode: u32,
    high_score: u32,
    /// Human mode: direction applied on every tick until changed
    queued_direction: Direction,
    /// On-policy agents: action already chosen for the current state
    pending_action: Option<Direction>,
}

impl<O: EpisodeObserver> EpisodeLoop<O> {
    pub fn new(
        env: GridEnvironment,
        kind: AgentKind,
        agent_config: AgentConfig,
        observer: O,
    ) -> Self {
        let agent = create_agent(kind, &agent_config);
        Self::assemble(env, kind, agent, agent_config, observer)
    }

    /// Loop around an already-built agent
    pub fn with_agent(
        env: GridEnvironment,
        agent: Box<dyn Agent>,
        agent_config: AgentConfig,
        observer: O,
    ) -> Self {
        let kind = agent.kind();
        Self::assemble(env, kind, Some(agent), agent_config, observer)
    }

    fn assemble(
        mut env: GridEnvironment,
        kind: AgentKind,
        agent: Option<Box<dyn Agent>>,
        agent_config: AgentConfig,
        observer: O,
    ) -> Self {
        env.reset_round();
        let queued_direction = env.direction();
        Self {
            env,
            kind,
            agent,
            agent_config,
            observer,
            state: LoopState::Idle,
            overlay: OverlayTitle::Ready,
            episode: 0,
            high_score: 0,
            queued_direction,
            pending_action: None,
        }
    }

    pub fn start(&mut self) {
        self.state = LoopState::Running;
    }

    /// Takes effect before the next tick
    pub fn stop(&mut self) {
        if self.state == LoopState::Running {
            self.state = LoopState::Idle;
            self.overlay = OverlayTitle::Paused;
        }
    }

    pub fn toggle(&mut self) {
        match self.state {
            LoopState::Idle => self.start(),
            LoopState::Running => self.stop(),
        }
    }

    /// Run one observe-act-learn cycle; `None` while idle
    pub fn tick(&mut self) -> Option<TickReport> {
        if self.state != LoopState::Running {
            return None;
        }
        let report = if self.agent.is_some() {
            self.agent_tick()
        } else {
            self.human_tick()
        };
        Some(report)
    }

    fn human_tick(&mut self) -> TickReport {
        let action = self.queued_direction;
        let outcome = self.env.step(action);
        let report = self.record(action, &outcome);

        if outcome.done {
            self.state = LoopState::Idle;
            self.overlay = OverlayTitle::GameOver;
            self.reset_round();
        }
        report
    }

    fn agent_tick(&mut self) -> TickReport {
        let Some(agent) = self.agent.as_mut() else {
            return self.human_tick();
        };

        let state = self.env.encode();
        let action = match self.pending_action.take() {
            Some(action) => action,
            None => agent.choose_action(&state),
        };
        let outcome = self.env.step(action);
        let next_state = self.env.encode();

        let next_action = agent
            .needs_next_action()
            .then(|| agent.choose_action(&next_state));
        learn(agent.as_mut(), &state, action, &outcome, &next_state, next_action);

        let report = self.record(action, &outcome);
        if outcome.done {
            self.reset_round();
        } else {
            self.pending_action = next_action;
        }
        report
    }

    /// Update counters after a step and report a finished episode
    fn record(&mut self, action: Direction, outcome: &StepOutcome) -> TickReport {
        let score = self.env.score();
        let round_steps = self.env.state().steps;
        if score > self.high_score {
            self.high_score = score;
        }

        if outcome.done {
            debug!(
                episode = self.episode,
                score,
                steps = round_steps,
                agent = %self.kind,
                starved = outcome.starved,
                "episode finished"
            );
            self.observer.on_episode_end(self.episode, score);
            self.episode += 1;
        }

        TickReport {
            action,
            reward: outcome.reward,
            done: outcome.done,
            ate_food: outcome.ate_food,
            score,
            round_steps,
            episode: self.episode,
            high_score: self.high_score,
            epsilon: self.epsilon(),
        }
    }

    fn reset_round(&mut self) {
        self.env.reset_round();
        self.queued_direction = self.env.direction();
        self.pending_action = None;
    }

    /// Queue a human move. Ignored when it reverses the current heading.
    pub fn queue_direction(&mut self, direction: Direction) {
        if !self.kind.is_human() || direction.is_opposite(self.env.direction()) {
            return;
        }
        self.queued_direction = direction;
    }

    /// Switch controller, discarding all learned state and session counters
    pub fn set_agent(&mut self, kind: AgentKind) {
        info!(from = %self.kind, to = %kind, "switching agent");
        self.kind = kind;
        self.agent = create_agent(kind, &self.agent_config);
        self.reset_session();
    }

    /// Rebuild the current algorithm from scratch
    pub fn reset_agent(&mut self) {
        info!(agent = %self.kind, "resetting agent");
        self.agent = create_agent(self.kind, &self.agent_config);
        self.reset_session();
    }

    fn reset_session(&mut self) {
        self.state = LoopState::Idle;
        self.overlay = OverlayTitle::Ready;
        self.episode = 0;
        self.high_score = 0;
        self.observer.on_session_reset(self.kind);
        self.reset_round();
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Banner to show, `None` while running
    pub fn overlay(&self) -> Option<OverlayTitle> {
        (!self.is_running()).then_some(self.overlay)
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn episode(&self) -> u32 {
        self.episode
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn score(&self) -> u32 {
        self.env.score()
    }

    pub fn epsilon(&self) -> Option<f32> {
        self.agent.as_ref().map(|agent| agent.epsilon())
    }

    /// False when the agent fell back to random play
    pub fn agent_ready(&self) -> bool {
        self.agent.as_ref().is_none_or(|agent| agent.is_ready())
    }

    pub fn environment(&self) -> &GridEnvironment {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut GridEnvironment {
        &mut self.env
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }
}

fn learn(
    agent: &mut dyn Agent,
    state: &EncodedState,
    action: Direction,
    outcome: &StepOutcome,
    next_state: &EncodedState,
    next_action: Option<Direction>,
) {
    agent.observe_outcome(Experience {
        state,
        action,
        reward: outcome.reward,
        next_state,
        done: outcome.done,
        next_action,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, GameState, Position, Snake};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        episodes: Vec<(u32, u32)>,
        resets: Vec<AgentKind>,
    }

    impl EpisodeObserver for Recorder {
        fn on_episode_end(&mut self, episode: u32, score: u32) {
            self.episodes.push((episode, score));
        }

        fn on_session_reset(&mut self, kind: AgentKind) {
            self.resets.push(kind);
        }
    }

    #[derive(Default)]
    struct Log {
        chosen_for: Vec<EncodedState>,
        learned: Vec<(Direction, f32, bool, Option<Direction>)>,
    }

    /// Agent replaying a fixed script of moves
    struct ScriptedAgent {
        moves: VecDeque<Direction>,
        on_policy: bool,
        log: Rc<RefCell<Log>>,
    }

    impl Agent for ScriptedAgent {
        fn kind(&self) -> AgentKind {
            if self.on_policy {
                AgentKind::Sarsa
            } else {
                AgentKind::QLearning
            }
        }

        fn choose_action(&mut self, state: &EncodedState) -> Direction {
            self.log.borrow_mut().chosen_for.push(*state);
            self.moves.pop_front().unwrap_or(Direction::Up)
        }

        fn observe_outcome(&mut self, e: Experience<'_>) {
            self.log
                .borrow_mut()
                .learned
                .push((e.action, e.reward, e.done, e.next_action));
        }

        fn epsilon(&self) -> f32 {
            0.5
        }

        fn needs_next_action(&self) -> bool {
            self.on_policy
        }
    }

    fn scripted(
        moves: &[Direction],
        on_policy: bool,
    ) -> (EpisodeLoop<Recorder>, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        let agent = ScriptedAgent {
            moves: moves.iter().copied().collect(),
            on_policy,
            log: Rc::clone(&log),
        };
        let env = GridEnvironment::with_seed(GameConfig::default(), 5);
        let episode_loop =
            EpisodeLoop::with_agent(env, Box::new(agent), AgentConfig::default(), Recorder::default());
        (episode_loop, log)
    }

    fn human_loop() -> EpisodeLoop<Recorder> {
        EpisodeLoop::new(
            GridEnvironment::with_seed(GameConfig::default(), 9),
            AgentKind::Human,
            AgentConfig::default(),
            Recorder::default(),
        )
    }

    fn place(episode_loop: &mut EpisodeLoop<Recorder>, head: Position, dir: Direction, food: Position) {
        episode_loop
            .environment_mut()
            .set_state(GameState::new(Snake::new(head, dir, 3), food, 20, 20));
    }

    #[test]
    fn test_idle_loop_does_nothing() {
        let mut episode_loop = human_loop();
        assert_eq!(episode_loop.state(), LoopState::Idle);
        assert_eq!(episode_loop.overlay(), Some(OverlayTitle::Ready));
        assert!(episode_loop.tick().is_none());
        assert_eq!(episode_loop.environment().state().steps, 0);
    }

    #[test]
    fn test_human_keeps_queued_direction() {
        let mut episode_loop = human_loop();
        place(&mut episode_loop, Position::new(10, 10), Direction::Up, Position::new(0, 0));
        episode_loop.start();
        assert_eq!(episode_loop.overlay(), None);

        episode_loop.queue_direction(Direction::Left);
        episode_loop.tick();
        episode_loop.tick();

        assert_eq!(
            episode_loop.environment().state().snake.head(),
            Position::new(8, 10)
        );
    }

    #[test]
    fn test_human_reversal_is_ignored() {
        let mut episode_loop = human_loop();
        place(&mut episode_loop, Position::new(10, 10), Direction::Up, Position::new(0, 0));
        episode_loop.start();

        episode_loop.queue_direction(Direction::Down);
        let report = episode_loop.tick().unwrap();

        assert_eq!(report.action, Direction::Up);
        assert_eq!(
            episode_loop.environment().state().snake.head(),
            Position::new(10, 9)
        );
    }

    #[test]
    fn test_human_round_over_goes_idle() {
        let mut episode_loop = human_loop();
        place(&mut episode_loop, Position::new(0, 10), Direction::Up, Position::new(5, 5));
        episode_loop.start();
        episode_loop.queue_direction(Direction::Left);

        let report = episode_loop.tick().unwrap();

        assert!(report.done);
        assert_eq!(report.reward, -50.0);
        assert_eq!(report.episode, 1);
        assert_eq!(episode_loop.state(), LoopState::Idle);
        assert_eq!(episode_loop.overlay(), Some(OverlayTitle::GameOver));
        assert_eq!(episode_loop.observer().episodes, vec![(0, 0)]);
        // Fresh round waiting for the next start
        assert!(episode_loop.environment().state().is_alive);
        assert_eq!(episode_loop.environment().direction(), Direction::Up);
        assert!(episode_loop.tick().is_none());
    }

    #[test]
    fn test_agent_auto_continues_after_done() {
        let (mut episode_loop, log) = scripted(&[Direction::Left], false);
        place(&mut episode_loop, Position::new(0, 10), Direction::Up, Position::new(5, 5));
        episode_loop.start();

        let report = episode_loop.tick().unwrap();

        assert!(report.done);
        assert_eq!(report.epsilon, Some(0.5));
        assert!(episode_loop.is_running());
        assert_eq!(episode_loop.episode(), 1);
        assert_eq!(episode_loop.observer().episodes, vec![(0, 0)]);
        assert_eq!(log.borrow().learned, vec![(Direction::Left, -50.0, true, None)]);
        assert_eq!(
            episode_loop.environment().state().snake.head(),
            Position::new(10, 10)
        );
    }

    #[test]
    fn test_on_policy_next_action_is_reused() {
        let (mut episode_loop, log) =
            scripted(&[Direction::Left, Direction::Down, Direction::Right], true);
        place(&mut episode_loop, Position::new(10, 10), Direction::Up, Position::new(0, 0));
        episode_loop.start();

        let first = episode_loop.tick().unwrap();
        let second = episode_loop.tick().unwrap();

        assert_eq!(first.action, Direction::Left);
        assert_eq!(second.action, Direction::Down);
        let log = log.borrow();
        // Left for s0, Down for s1 (reused), Right for s2
        assert_eq!(log.chosen_for.len(), 3);
        assert_eq!(log.learned[0].3, Some(Direction::Down));
        assert_eq!(log.learned[1].3, Some(Direction::Right));
    }

    #[test]
    fn test_high_score_tracks_best_round() {
        let (mut episode_loop, _log) = scripted(&[Direction::Up, Direction::Left], false);
        place(&mut episode_loop, Position::new(0, 10), Direction::Up, Position::new(0, 9));
        episode_loop.start();

        let eat = episode_loop.tick().unwrap();
        assert!(eat.ate_food);
        assert_eq!(eat.score, 1);
        assert_eq!(eat.high_score, 1);

        let crash = episode_loop.tick().unwrap();
        assert!(crash.done);
        assert_eq!(crash.score, 1);
        assert_eq!(episode_loop.high_score(), 1);
        assert_eq!(episode_loop.score(), 0);
        assert_eq!(episode_loop.observer().episodes, vec![(0, 1)]);
    }

    #[test]
    fn test_set_agent_resets_session() {
        let (mut episode_loop, _log) = scripted(&[Direction::Left], false);
        place(&mut episode_loop, Position::new(0, 10), Direction::Up, Position::new(5, 5));
        episode_loop.start();
        episode_loop.tick();
        assert_eq!(episode_loop.episode(), 1);

        episode_loop.set_agent(AgentKind::Sarsa);

        assert_eq!(episode_loop.kind(), AgentKind::Sarsa);
        assert_eq!(episode_loop.state(), LoopState::Idle);
        assert_eq!(episode_loop.overlay(), Some(OverlayTitle::Ready));
        assert_eq!(episode_loop.episode(), 0);
        assert_eq!(episode_loop.high_score(), 0);
        assert_eq!(episode_loop.epsilon(), Some(1.0));
        assert_eq!(episode_loop.observer().resets, vec![AgentKind::Sarsa]);

        episode_loop.set_agent(AgentKind::Human);
        assert_eq!(episode_loop.epsilon(), None);
        assert!(episode_loop.agent_ready());
    }

    #[test]
    fn test_stop_pauses_mid_round() {
        let (mut episode_loop, _log) = scripted(&[], false);
        episode_loop.start();
        episode_loop.tick();

        episode_loop.toggle();

        assert_eq!(episode_loop.overlay(), Some(OverlayTitle::Paused));
        let steps = episode_loop.environment().state().steps;
        assert!(episode_loop.tick().is_none());
        assert_eq!(episode_loop.environment().state().steps, steps);
    }
}
