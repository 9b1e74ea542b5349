use puzzle::{Command, Level};

/// A display an environment can draw its level onto.
pub trait Canvas {
    /// # Errors
    ///
    /// Fails when the display is gone or the frame cannot be presented.
    fn draw(&mut self, level: &Level) -> anyhow::Result<()>;

    /// Keyboard and window input since the last poll.
    fn poll_commands(&mut self) -> Vec<Command> {
        Vec::new()
    }

    fn close(&mut self) {}
}

/// Opens a display on first use. Construction may fail on headless hosts.
pub type CanvasFactory = Box<dyn FnMut() -> anyhow::Result<Box<dyn Canvas>>>;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Never draw.
    #[default]
    None,
    /// Draw into a window. When `interactive`, a window that cannot be
    /// opened is an error; otherwise rendering is disabled with a warning.
    Human { interactive: bool },
}
