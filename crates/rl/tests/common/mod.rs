#![allow(dead_code)]

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use puzzle::{Command, Level, LevelConfig};
use rl::{Canvas, CanvasFactory, EnvConfig, SokobanEnv};

#[derive(Clone, Default)]
pub struct Counters {
    pub opened: Rc<Cell<usize>>,
    pub draws: Rc<Cell<usize>>,
    pub closes: Rc<Cell<usize>>,
}

pub struct FakeCanvas {
    counters: Counters,
    commands: Vec<Command>,
}

impl Canvas for FakeCanvas {
    fn draw(&mut self, _level: &Level) -> anyhow::Result<()> {
        self.counters.draws.set(self.counters.draws.get() + 1);
        Ok(())
    }

    fn poll_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    fn close(&mut self) {
        self.counters.closes.set(self.counters.closes.get() + 1);
    }
}

/// A factory handing out canvases that count what happens to them and
/// report `commands` on their first poll.
pub fn fake_factory(counters: &Counters, commands: Vec<Command>) -> CanvasFactory {
    let counters = counters.clone();
    Box::new(move || {
        counters.opened.set(counters.opened.get() + 1);
        Ok(Box::new(FakeCanvas { counters: counters.clone(), commands: commands.clone() }) as Box<dyn Canvas>)
    })
}

pub fn failing_factory() -> CanvasFactory {
    Box::new(|| Err(anyhow::anyhow!("no display")))
}

pub fn small_env(seed: u64) -> SokobanEnv {
    let level = LevelConfig { width: 4, height: 4, num_boxes: 1, box_margin: 1 };
    SokobanEnv::new(level, EnvConfig::default(), seed).unwrap()
}

pub fn default_env(seed: u64) -> SokobanEnv {
    SokobanEnv::new(LevelConfig::default(), EnvConfig::default(), seed).unwrap()
}

/// A fresh directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sokoban-rl-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
