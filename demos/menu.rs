//! Menu Demo: two scenes and a signal.
//!
//! Demonstrates:
//! - A framed main menu whose `selected` signal drives the engine
//! - Switching scenes from inside a hook
//! - Updating a child's behaviour from its parent's input hook
//!
//! Usage: `cargo run --example menu [scene]` (defaults to `main`).
//! Logs go to `stagehand-demo.log`.

use std::fs::File;
use std::sync::Mutex;

use stagehand::widget::{Frame, Label, Menu, Selected};
use stagehand::{Behavior, Colour, Engine, Event, KeyCode, Logger, NodeCore, Result};

/// Title, hint and a menu inside a frame.
struct MainMenu;

impl Behavior for MainMenu {
    fn enter(&mut self, node: &mut NodeCore) -> Result<()> {
        node.add_child(Some("frame"), Frame::fullscreen().with_title("stagehand"))?;
        node.add_child(
            Some("hint"),
            Label::new("up/down to move, enter to pick")
                .at(2, 1)
                .with_colours(Colour::Cyan, Colour::Default),
        )?;
        node.add_child(Some("menu"), Menu::new(["play", "quit"]).at(2, 3))?;

        let engine = node.engine().clone();
        node.get_node_mut("menu")?.connect(Menu::SELECTED, move |selected: &Selected| {
            match selected.option.as_str() {
                "play" => engine.load("play"),
                _ => engine.quit(),
            }
            Ok(())
        })
    }
}

/// Echoes every key until Esc goes back to the menu.
struct Play {
    presses: usize,
}

impl Behavior for Play {
    fn enter(&mut self, node: &mut NodeCore) -> Result<()> {
        node.add_child(Some("help"), Label::new("press keys; esc returns to the menu").at(1, 1))?;
        node.add_child(
            Some("last"),
            Label::new("").at(1, 3).with_colours(Colour::Yellow, Colour::Default),
        )?;
        Ok(())
    }

    fn input(&mut self, node: &mut NodeCore, event: &Event) -> Result<()> {
        if event.key_code() == Some(KeyCode::Esc) {
            node.engine().load("main");
            return Ok(());
        }

        self.presses += 1;
        if let Some(label) = node.get_node_mut("last")?.behavior_mut::<Label>() {
            label.set_text(format!("{event} (#{})", self.presses));
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let root = std::env::args().nth(1).unwrap_or_else(|| "main".to_owned());

    let file = File::create("stagehand-demo.log")?;
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();
    let logger = Logger::scoped("menu-demo", subscriber);

    let mut engine = Engine::new(logger.clone());
    engine.register("main", || MainMenu)?;
    engine.register("play", || Play { presses: 0 })?;

    let result = engine.start(&root);
    logger.close();
    result
}
