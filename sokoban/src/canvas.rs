use puzzle::{Command, Level};
use render::Renderer;
use rl::{Canvas, CanvasFactory};

/// [`Canvas`] backed by a window. Closing it drops the window.
pub struct WindowCanvas {
    renderer: Option<Renderer>,
}

impl WindowCanvas {
    /// A factory opening one window titled `title` per call.
    #[must_use]
    pub fn factory(title: &'static str) -> CanvasFactory {
        Box::new(move || {
            let renderer = Renderer::new(title)?;
            Ok(Box::new(WindowCanvas { renderer: Some(renderer) }) as Box<dyn Canvas>)
        })
    }
}

impl Canvas for WindowCanvas {
    fn draw(&mut self, level: &Level) -> anyhow::Result<()> {
        match self.renderer.as_mut() {
            Some(renderer) => renderer.draw(level),
            None => anyhow::bail!("window already closed"),
        }
    }

    fn poll_commands(&mut self) -> Vec<Command> {
        self.renderer.as_mut().map(Renderer::poll).unwrap_or_default()
    }

    fn close(&mut self) {
        if self.renderer.take().is_some() {
            tracing::debug!("window released");
        }
    }
}
