//! Engine: scene registry and main loop.
//!
//! The engine owns at most one active scene. Each frame it clears the
//! window, draws the scene tree, flushes the window if anything changed,
//! feeds every pending event into the tree, then sleeps out the rest of
//! the frame period.
//!
//! Nodes reach the engine through an [`EngineHandle`]. Requests made
//! through it (quit, load another scene) are queued and applied after the
//! current dispatch pass, never in the middle of one.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::event::Event;
use crate::logging::Logger;
use crate::scene::{Behavior, Node};
use crate::terminal::{Backend, CrosstermBackend, Window, WindowConfig};
use crate::timer::Timer;

/// Configuration for the [`Engine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Target duration of one frame.
    pub frame_period: Duration,
    /// Window session configuration.
    pub window: WindowConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_period: Duration::from_secs(1) / 8,
            window: WindowConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Set the frame period from a target frame rate.
    #[must_use]
    pub fn with_frame_rate(mut self, fps: u32) -> Self {
        self.frame_period = Duration::from_secs(1) / fps.max(1);
        self
    }
}

/// A change queued by a node for the engine to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Request {
    Load(String),
    Quit,
}

/// State shared between the engine and its handles.
struct Shared {
    running: Cell<bool>,
    requests: RefCell<VecDeque<Request>>,
    logger: Logger,
}

/// A weak back-reference from a node to its engine.
///
/// Detached nodes hold a handle that points nowhere; requests made
/// through it are ignored.
#[derive(Clone, Default)]
pub struct EngineHandle {
    shared: Weak<Shared>,
}

impl EngineHandle {
    pub(crate) fn detached() -> Self {
        Self::default()
    }

    /// Whether the handle still points at a live engine.
    pub fn is_attached(&self) -> bool {
        self.shared.strong_count() > 0
    }

    /// Ask the engine to stop after the current dispatch pass.
    pub fn quit(&self) {
        self.request(Request::Quit);
    }

    /// Ask the engine to switch to scene `name` after the current dispatch pass.
    pub fn load(&self, name: impl Into<String>) {
        self.request(Request::Load(name.into()));
    }

    /// Whether the engine's main loop is running.
    pub fn is_running(&self) -> bool {
        self.shared.upgrade().is_some_and(|shared| shared.running.get())
    }

    /// The engine's logger, or a detached one.
    pub fn logger(&self) -> Logger {
        self.shared
            .upgrade()
            .map_or_else(|| Logger::new("detached"), |shared| shared.logger.clone())
    }

    fn request(&self, request: Request) {
        if let Some(shared) = self.shared.upgrade() {
            shared.requests.borrow_mut().push_back(request);
        }
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Builds a fresh scene behaviour.
type SceneConstructor = Box<dyn Fn() -> Box<dyn Behavior>>;

/// The scene-graph engine.
pub struct Engine {
    /// Configuration.
    config: EngineConfig,
    /// Registered scene constructors.
    scenes: HashMap<String, SceneConstructor>,
    /// The active scene, if any.
    scene: Option<Node>,
    /// Running flag, request queue and logger.
    shared: Rc<Shared>,
}

impl Engine {
    /// Create an engine with default configuration.
    pub fn new(logger: Logger) -> Self {
        Self::with_config(EngineConfig::default(), logger)
    }

    /// Create an engine with custom configuration.
    pub fn with_config(config: EngineConfig, logger: Logger) -> Self {
        Self {
            config,
            scenes: HashMap::new(),
            scene: None,
            shared: Rc::new(Shared {
                running: Cell::new(false),
                requests: RefCell::new(VecDeque::new()),
                logger,
            }),
        }
    }

    /// Configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The session logger.
    pub fn logger(&self) -> &Logger {
        &self.shared.logger
    }

    /// A handle for nodes and callbacks.
    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Whether the main loop is running.
    pub fn is_running(&self) -> bool {
        self.shared.running.get()
    }

    /// The active scene.
    pub const fn scene(&self) -> Option<&Node> {
        self.scene.as_ref()
    }

    /// The active scene, mutably.
    pub const fn scene_mut(&mut self) -> Option<&mut Node> {
        self.scene.as_mut()
    }

    /// Register a scene under `name`. `constructor` builds a fresh scene
    /// behaviour every time the scene is loaded.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateScene`] if `name` is already registered.
    pub fn register<F, B>(&mut self, name: impl Into<String>, constructor: F) -> Result<()>
    where
        F: Fn() -> B + 'static,
        B: Behavior,
    {
        let name = name.into();
        if self.scenes.contains_key(&name) {
            return Err(Error::DuplicateScene(name));
        }

        self.shared.logger.debug(format_args!("registered scene '{name}'"));
        self.scenes
            .insert(name, Box::new(move || Box::new(constructor()) as Box<dyn Behavior>));
        Ok(())
    }

    /// Replace the active scene with a fresh instance of scene `name`.
    ///
    /// The old scene exits completely before the new one enters.
    ///
    /// # Errors
    ///
    /// [`Error::SceneNotFound`] if `name` is not registered, in which case
    /// the active scene is left alone. Otherwise any error from the old
    /// scene's `exit` hooks or the new scene's `enter` hook.
    pub fn load(&mut self, name: &str) -> Result<()> {
        if !self.scenes.contains_key(name) {
            return Err(Error::SceneNotFound(name.to_owned()));
        }

        if let Some(mut old) = self.scene.take() {
            self.shared.logger.debug(format_args!("quitting scene '{}'", old.name()));
            old.dispatch_exit()?;
        }

        let constructor = self
            .scenes
            .get(name)
            .ok_or_else(|| Error::SceneNotFound(name.to_owned()))?;
        let mut scene = Node::from_boxed(name, constructor());
        scene.set_engine(self.handle());

        self.shared.logger.debug(format_args!("loading scene '{name}'"));
        scene.enter()?;
        self.scene = Some(scene);
        Ok(())
    }

    /// Tear down the active scene, if any, and stop the main loop.
    ///
    /// Calling it again does nothing.
    ///
    /// # Errors
    ///
    /// The first error from the scene's `exit` hooks.
    pub fn quit(&mut self) -> Result<()> {
        let was_running = self.shared.running.replace(false);

        if let Some(mut scene) = self.scene.take() {
            self.shared.logger.debug(format_args!("quitting scene '{}'", scene.name()));
            scene.dispatch_exit()?;
        }
        if was_running {
            self.shared.logger.debug("quitting");
        }
        Ok(())
    }

    /// Run scene `root` on the real terminal until it quits.
    ///
    /// # Errors
    ///
    /// See [`Engine::start_with`].
    pub fn start(&mut self, root: &str) -> Result<()> {
        self.start_with(CrosstermBackend::new(), root)
    }

    /// Run scene `root` on `backend` until it quits.
    ///
    /// The window session is released on every exit path, errors included.
    ///
    /// # Errors
    ///
    /// Fails if the window cannot be opened, if `root` is not registered,
    /// if a hook or subscriber fails, or on terminal I/O errors.
    pub fn start_with<B: Backend>(&mut self, backend: B, root: &str) -> Result<()> {
        let mut window = Window::open(backend, self.config.window.clone())?;
        self.shared.logger.debug("session opened");

        let mut result = self.run(&mut window, root);
        if let Err(err) = &result {
            self.shared.logger.error(err);
        }
        // Leave no scene behind, even when the loop failed
        if self.scene.is_some() {
            result = result.and(self.quit());
        }
        self.shared.running.set(false);
        self.shared.requests.borrow_mut().clear();

        let closed = window.close();
        self.shared.logger.debug("session closed");
        result.and(closed)
    }

    fn run<B: Backend>(&mut self, window: &mut Window<B>, root: &str) -> Result<()> {
        let mut timer = Timer::new();

        self.shared.running.set(true);
        self.load(root)?;
        self.apply_requests()?;

        while self.is_running() {
            timer.start(self.config.frame_period);

            window.clear();
            if let Some(scene) = self.scene.as_mut() {
                scene.dispatch_draw(window)?;
            }
            if window.is_dirty() {
                window.update()?;
            }

            while let Some(event) = window.poll()? {
                self.handle_event(&event)?;
                if !self.is_running() {
                    break;
                }
            }

            if self.is_running() {
                std::thread::sleep(timer.remaining());
            }
        }
        Ok(())
    }

    /// Dispatch one event as the main loop would.
    ///
    /// [`Event::Quit`] stops the engine; every other event goes through
    /// the active scene's input pass. Requests queued by nodes during the
    /// pass are applied afterwards.
    ///
    /// # Errors
    ///
    /// The first error from an input hook, a subscriber, or a queued request.
    pub fn handle_event(&mut self, event: &Event) -> Result<()> {
        self.shared.logger.event(event);

        match event {
            Event::Quit => self.quit()?,
            Event::Key(_) | Event::Resize { .. } => {
                if let Some(scene) = self.scene.as_mut() {
                    scene.dispatch_input(event)?;
                }
            }
        }
        self.apply_requests()
    }

    fn apply_requests(&mut self) -> Result<()> {
        loop {
            let request = self.shared.requests.borrow_mut().pop_front();
            match request {
                Some(Request::Quit) => self.quit()?,
                Some(Request::Load(name)) => self.load(&name)?,
                None => return Ok(()),
            }
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("scenes", &self.scenes.keys().collect::<Vec<_>>())
            .field("scene", &self.scene.as_ref().map(|scene| scene.name()))
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyCode;
    use crate::logging::tests::Capture;
    use crate::scene::NodeCore;
    use crate::terminal::TestBackend;
    use crate::widget::{Label, Menu, Selected};

    type Log = Rc<RefCell<Vec<String>>>;

    /// A leaf that records lifecycle hooks.
    struct Leaf {
        tag: &'static str,
        log: Log,
    }

    impl Behavior for Leaf {
        fn enter(&mut self, _node: &mut NodeCore) -> Result<()> {
            self.log.borrow_mut().push(format!("enter:{}", self.tag));
            Ok(())
        }

        fn exit(&mut self, _node: &mut NodeCore) -> Result<()> {
            self.log.borrow_mut().push(format!("exit:{}", self.tag));
            Ok(())
        }
    }

    /// A scene with one leaf child.
    struct Parent {
        tag: &'static str,
        log: Log,
    }

    impl Behavior for Parent {
        fn enter(&mut self, node: &mut NodeCore) -> Result<()> {
            self.log.borrow_mut().push(format!("enter:{}", self.tag));
            node.add_child(
                Some("leaf"),
                Leaf {
                    tag: if self.tag == "a" { "a.leaf" } else { "b.leaf" },
                    log: Rc::clone(&self.log),
                },
            )?;
            Ok(())
        }

        fn exit(&mut self, _node: &mut NodeCore) -> Result<()> {
            self.log.borrow_mut().push(format!("exit:{}", self.tag));
            Ok(())
        }
    }

    /// Main menu: a title and a menu whose "quit" option stops the engine.
    #[derive(Default)]
    struct MenuScene {
        selections: Rc<RefCell<Vec<String>>>,
    }

    impl Behavior for MenuScene {
        fn enter(&mut self, node: &mut NodeCore) -> Result<()> {
            node.add_child(Some("title"), Label::new("Main menu").at(0, 0))?;
            node.add_child(Some("menu"), Menu::new(["play", "quit"]).at(0, 2))?;

            let engine = node.engine().clone();
            let selections = Rc::clone(&self.selections);
            node.get_node_mut("menu")?.connect("selected", move |selected: &Selected| {
                selections.borrow_mut().push(selected.option.clone());
                if selected.option == "quit" {
                    engine.quit();
                }
                Ok(())
            })
        }
    }

    fn engine() -> Engine {
        let mut config = EngineConfig::default().with_frame_rate(1000);
        config.window.handle_interrupt = false;
        Engine::with_config(config, Logger::new("test"))
    }

    fn parents(engine: &mut Engine) -> Log {
        let log: Log = Rc::default();
        for tag in ["a", "b"] {
            let log = Rc::clone(&log);
            engine
                .register(tag, move || Parent {
                    tag,
                    log: Rc::clone(&log),
                })
                .unwrap();
        }
        log
    }

    #[test]
    fn test_duplicate_scene() {
        let mut engine = engine();
        engine.register("menu", MenuScene::default).unwrap();

        let err = engine.register("menu", MenuScene::default).unwrap_err();
        assert!(matches!(err, Error::DuplicateScene(ref name) if name == "menu"));
    }

    #[test]
    fn test_failed_scene_enter_exits_children() {
        struct Broken(Log);

        impl Behavior for Broken {
            fn enter(&mut self, node: &mut NodeCore) -> Result<()> {
                node.add_child(
                    Some("leaf"),
                    Leaf {
                        tag: "broken.leaf",
                        log: Rc::clone(&self.0),
                    },
                )?;
                Err(Error::hook("scene failed"))
            }
        }

        let mut engine = engine();
        let log: Log = Rc::default();
        let scene_log = Rc::clone(&log);
        engine
            .register("broken", move || Broken(Rc::clone(&scene_log)))
            .unwrap();

        let err = engine.load("broken").unwrap_err();
        assert_eq!(err.to_string(), "scene failed");
        assert!(engine.scene().is_none());
        assert_eq!(*log.borrow(), ["enter:broken.leaf", "exit:broken.leaf"]);
    }

    #[test]
    fn test_load_missing_keeps_active_scene() {
        let mut engine = engine();
        let log = parents(&mut engine);
        engine.load("a").unwrap();
        log.borrow_mut().clear();

        let err = engine.load("missing").unwrap_err();
        assert!(matches!(err, Error::SceneNotFound(ref name) if name == "missing"));
        assert_eq!(engine.scene().map(|scene| scene.name()), Some("a"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_switch_exits_before_enter() {
        let mut engine = engine();
        let log = parents(&mut engine);

        engine.load("a").unwrap();
        engine.load("b").unwrap();

        assert_eq!(
            *log.borrow(),
            ["enter:a", "enter:a.leaf", "exit:a.leaf", "exit:a", "enter:b", "enter:b.leaf"]
        );
        assert!(engine.scene().unwrap().child("leaf").is_some());
    }

    #[test]
    fn test_scene_nodes_share_engine_handle() {
        let mut engine = engine();
        parents(&mut engine);
        engine.load("a").unwrap();

        let scene = engine.scene().unwrap();
        assert!(scene.engine().is_attached());
        assert!(scene.get_node("leaf").unwrap().engine().is_attached());
    }

    #[test]
    fn test_quit_is_idempotent() {
        let mut engine = engine();
        let log = parents(&mut engine);
        engine.load("a").unwrap();
        log.borrow_mut().clear();

        engine.quit().unwrap();
        engine.quit().unwrap();

        assert_eq!(*log.borrow(), ["exit:a.leaf", "exit:a"]);
        assert!(engine.scene().is_none());
        assert!(!engine.is_running());
    }

    #[test]
    fn test_deferred_requests() {
        let mut engine = engine();
        let log = parents(&mut engine);
        engine.load("a").unwrap();

        let handle = engine.handle();
        handle.load("b");
        assert_eq!(engine.scene().unwrap().name(), "a");

        engine.handle_event(&Event::key(KeyCode::Tab)).unwrap();
        assert_eq!(engine.scene().unwrap().name(), "b");
        assert!(log.borrow().contains(&"exit:a".to_owned()));
    }

    #[test]
    fn test_detached_handle_ignores_requests() {
        let handle = {
            let engine = engine();
            engine.handle()
        };
        handle.quit();
        assert!(!handle.is_attached());
        assert!(!handle.is_running());
        assert_eq!(handle.logger().name(), "detached");
    }

    #[test]
    fn test_menu_selection_headless() {
        let mut engine = engine();
        let selections: Rc<RefCell<Vec<String>>> = Rc::default();
        let shared = Rc::clone(&selections);
        engine
            .register("menu", move || MenuScene {
                selections: Rc::clone(&shared),
            })
            .unwrap();
        engine.load("menu").unwrap();

        engine.handle_event(&Event::key(KeyCode::Down)).unwrap();
        let menu = engine.scene().unwrap().get_node("menu").unwrap();
        assert_eq!(menu.behavior::<Menu>().unwrap().index(), 1);

        engine.handle_event(&Event::key(KeyCode::Enter)).unwrap();
        assert_eq!(*selections.borrow(), ["quit"]);
        assert!(engine.scene().is_none());
    }

    #[test]
    fn test_start_runs_until_menu_quits() {
        let capture = Capture::default();
        let logger = capture.logger("e2e");
        let mut config = EngineConfig::default().with_frame_rate(1000);
        config.window.handle_interrupt = false;
        let mut engine = Engine::with_config(config, logger);

        let selections: Rc<RefCell<Vec<String>>> = Rc::default();
        let shared = Rc::clone(&selections);
        engine
            .register("menu", move || MenuScene {
                selections: Rc::clone(&shared),
            })
            .unwrap();

        let backend = TestBackend::new(30, 6);
        backend.push_key(KeyCode::Down);
        backend.push_key(KeyCode::Enter);

        engine.start_with(backend.clone(), "menu").unwrap();

        assert_eq!(*selections.borrow(), ["quit"]);
        assert!(!engine.is_running());
        assert!(engine.scene().is_none());
        assert_eq!(backend.enter_count(), 1);
        assert_eq!(backend.leave_count(), 1);

        let mut parser = vt100::Parser::new(6, 30, 0);
        parser.process(&backend.output());
        let contents = parser.screen().contents();
        assert!(contents.contains("Main menu"));
        assert!(contents.contains("play"));

        let logs = capture.text();
        assert!(logs.contains("key pressed: down"));
        assert!(logs.contains("key pressed: enter"));
        assert!(logs.contains("session closed"));
    }

    #[test]
    fn test_start_quits_on_interrupt_key() {
        let mut engine = engine();
        engine.register("menu", MenuScene::default).unwrap();

        let backend = TestBackend::new(30, 6);
        backend.push_key(crate::event::Key::with_modifiers(
            KeyCode::Char('c'),
            crate::event::KeyModifiers::CONTROL,
        ));

        engine.start_with(backend.clone(), "menu").unwrap();
        assert_eq!(backend.leave_count(), 1);
        assert_eq!(backend.pending_keys(), 0);
    }

    #[test]
    fn test_start_releases_window_on_error() {
        let mut engine = engine();
        let backend = TestBackend::new(30, 6);

        let err = engine.start_with(backend.clone(), "missing").unwrap_err();
        assert!(matches!(err, Error::SceneNotFound(_)));
        assert_eq!(backend.leave_count(), 1);
        assert!(!engine.is_running());
    }

    #[test]
    fn test_frame_rate() {
        assert_eq!(
            EngineConfig::default().with_frame_rate(4).frame_period,
            Duration::from_millis(250)
        );
        assert_eq!(EngineConfig::default().frame_period, Duration::from_millis(125));
    }
}
