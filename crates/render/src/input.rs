use puzzle::{Command, Direction};
use winit::keyboard::KeyCode;

/// Arrow keys move, `R` restarts the level and `Escape` quits.
#[must_use]
pub fn command_for_key(key: KeyCode) -> Option<Command> {
    let command = match key {
        KeyCode::ArrowUp => Command::Move(Direction::Up),
        KeyCode::ArrowDown => Command::Move(Direction::Down),
        KeyCode::ArrowLeft => Command::Move(Direction::Left),
        KeyCode::ArrowRight => Command::Move(Direction::Right),
        KeyCode::KeyR => Command::Reset,
        KeyCode::Escape => Command::Quit,
        _ => return None,
    };
    Some(command)
}
