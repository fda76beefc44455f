use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::Direction;
use crate::rl::AgentKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Move(Direction),
    /// Start or stop the loop
    ToggleRun,
    SelectAgent(AgentKind),
    CycleSpeed,
    ToggleCompare,
    ExportChart,
    ResetAgent,
    Quit,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            KeyCode::Up => KeyAction::Move(Direction::Up),
            KeyCode::Down => KeyAction::Move(Direction::Down),
            KeyCode::Left => KeyAction::Move(Direction::Left),
            KeyCode::Right => KeyAction::Move(Direction::Right),
            KeyCode::Char(c) => Self::handle_char(c.to_ascii_lowercase()),
            KeyCode::Esc => KeyAction::Quit,
            _ => KeyAction::None,
        }
    }

    fn handle_char(c: char) -> KeyAction {
        match c {
            'w' => KeyAction::Move(Direction::Up),
            's' => KeyAction::Move(Direction::Down),
            'a' => KeyAction::Move(Direction::Left),
            'd' => KeyAction::Move(Direction::Right),

            ' ' => KeyAction::ToggleRun,
            '1' => KeyAction::SelectAgent(AgentKind::Human),
            '2' => KeyAction::SelectAgent(AgentKind::QLearning),
            '3' => KeyAction::SelectAgent(AgentKind::Sarsa),
            '4' => KeyAction::SelectAgent(AgentKind::Dqn),
            'f' => KeyAction::CycleSpeed,
            'c' => KeyAction::ToggleCompare,
            'e' => KeyAction::ExportChart,
            'r' => KeyAction::ResetAgent,
            'q' => KeyAction::Quit,
            _ => KeyAction::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyAction {
        InputHandler::new().handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(press(KeyCode::Up), KeyAction::Move(Direction::Up));
        assert_eq!(press(KeyCode::Down), KeyAction::Move(Direction::Down));
        assert_eq!(press(KeyCode::Left), KeyAction::Move(Direction::Left));
        assert_eq!(press(KeyCode::Right), KeyAction::Move(Direction::Right));
    }

    #[test]
    fn test_wasd_keys() {
        assert_eq!(press(KeyCode::Char('w')), KeyAction::Move(Direction::Up));
        assert_eq!(press(KeyCode::Char('a')), KeyAction::Move(Direction::Left));
        assert_eq!(press(KeyCode::Char('s')), KeyAction::Move(Direction::Down));
        assert_eq!(press(KeyCode::Char('D')), KeyAction::Move(Direction::Right));
    }

    #[test]
    fn test_session_keys() {
        assert_eq!(press(KeyCode::Char(' ')), KeyAction::ToggleRun);
        assert_eq!(press(KeyCode::Char('f')), KeyAction::CycleSpeed);
        assert_eq!(press(KeyCode::Char('C')), KeyAction::ToggleCompare);
        assert_eq!(press(KeyCode::Char('e')), KeyAction::ExportChart);
        assert_eq!(press(KeyCode::Char('r')), KeyAction::ResetAgent);
    }

    #[test]
    fn test_agent_selection() {
        let picked: Vec<KeyAction> = ['1', '2', '3', '4']
            .into_iter()
            .map(|c| press(KeyCode::Char(c)))
            .collect();
        let expected: Vec<KeyAction> = AgentKind::ALL
            .into_iter()
            .map(KeyAction::SelectAgent)
            .collect();
        assert_eq!(picked, expected);
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(press(KeyCode::Char('q')), KeyAction::Quit);
        assert_eq!(press(KeyCode::Char('Q')), KeyAction::Quit);
        assert_eq!(press(KeyCode::Esc), KeyAction::Quit);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(InputHandler::new().handle_key_event(ctrl_c), KeyAction::Quit);
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(press(KeyCode::Char('x')), KeyAction::None);
        assert_eq!(press(KeyCode::Tab), KeyAction::None);
    }
}
