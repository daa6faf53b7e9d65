//! Logger: an explicit logging handle for one engine session.
//!
//! Messages go through `tracing` under four targets:
//!
//! | method          | level   | target              |
//! |-----------------|---------|---------------------|
//! | [`Logger::debug`] | `DEBUG` | `stagehand::debug` |
//! | [`Logger::event`] | `INFO`  | `stagehand::event` |
//! | [`Logger::alert`] | `WARN`  | `stagehand::alert` |
//! | [`Logger::error`] | `ERROR` | `stagehand::error` |
//!
//! Every record carries a `session` field with the logger's name. Where the
//! records end up is decided by whichever subscriber is installed; a
//! logger never reports a failure to write.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::subscriber::DefaultGuard;

struct Inner {
    name: String,
    guard: RefCell<Option<DefaultGuard>>,
}

/// A cheap, clonable logging handle.
///
/// The engine keeps one and hands clones to every node through its
/// [`EngineHandle`](crate::EngineHandle).
#[derive(Clone)]
pub struct Logger {
    inner: Rc<Inner>,
}

impl Logger {
    /// A logger that forwards to the current `tracing` dispatcher.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(Inner {
                name: name.into(),
                guard: RefCell::new(None),
            }),
        }
    }

    /// A logger that installs `subscriber` as this thread's default until
    /// [`Logger::close`] is called or the last clone is dropped.
    pub fn scoped<S>(name: impl Into<String>, subscriber: S) -> Self
    where
        S: tracing::Subscriber + Send + Sync + 'static,
    {
        let guard = tracing::subscriber::set_default(subscriber);
        let logger = Self::new(name);
        *logger.inner.guard.borrow_mut() = Some(guard);
        logger
    }

    /// Session name carried by every record.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Trace of a structural operation.
    pub fn debug(&self, message: impl fmt::Display) {
        tracing::debug!(target: "stagehand::debug", session = %self.inner.name, "{message}");
    }

    /// One dispatched event.
    pub fn event(&self, message: impl fmt::Display) {
        tracing::info!(target: "stagehand::event", session = %self.inner.name, "{message}");
    }

    /// Something went wrong but the session carries on.
    pub fn alert(&self, message: impl fmt::Display) {
        tracing::warn!(target: "stagehand::alert", session = %self.inner.name, "{message}");
    }

    /// A failure that ends the session.
    pub fn error(&self, message: impl fmt::Display) {
        tracing::error!(target: "stagehand::error", session = %self.inner.name, "{message}");
    }

    /// Uninstall the scoped subscriber, if any. Later records go to the
    /// previous dispatcher.
    pub fn close(&self) {
        self.inner.guard.borrow_mut().take();
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new("stagehand")
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.inner.name)
            .field("scoped", &self.inner.guard.borrow().is_some())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// Shared byte sink for a `tracing-subscriber` fmt layer.
    #[derive(Clone, Default)]
    pub(crate) struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        pub(crate) fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }

        pub(crate) fn logger(&self, name: &str) -> Logger {
            let sink = self.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::TRACE)
                .with_ansi(false)
                .with_writer(move || sink.clone())
                .finish();
            Logger::scoped(name, subscriber)
        }
    }

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_categories_and_session() {
        let capture = Capture::default();
        let logger = capture.logger("menu-demo");

        logger.debug("added child 'menu'");
        logger.event("key pressed: enter");
        logger.alert("interrupt handler not installed");
        logger.error("terminal went away");

        let text = capture.text();
        assert!(text.contains("stagehand::debug"));
        assert!(text.contains("added child 'menu'"));
        assert!(text.contains("stagehand::event"));
        assert!(text.contains("stagehand::alert"));
        assert!(text.contains("stagehand::error"));
        assert!(text.contains("session=menu-demo"));
    }

    #[test]
    fn test_close_uninstalls_subscriber() {
        let capture = Capture::default();
        let logger = capture.logger("closing");

        logger.debug("before close");
        logger.close();
        logger.debug("after close");

        let text = capture.text();
        assert!(text.contains("before close"));
        assert!(!text.contains("after close"));
    }

    #[test]
    fn test_clones_share_name() {
        let logger = Logger::new("shared");
        let clone = logger.clone();
        assert_eq!(clone.name(), "shared");
        assert_eq!(format!("{logger:?}"), r#"Logger { name: "shared", scoped: false }"#);
    }
}
