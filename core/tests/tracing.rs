//! Outcome tracing honours the configured level.

use std::io;
use std::sync::{Arc, Mutex};

use tracing::Level;

use boxit_core::{Executor, OutcomeTrace};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture(run: impl FnOnce()) -> String {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, run);
    captured.text()
}

#[test]
fn failures_are_logged_by_default() {
    let logs = capture(|| {
        let executor = Executor::default();
        let _ = executor.execute_sync(|| Err::<(), _>("disk full"));
        let _ = executor.execute_sync(|| 1_u8);
    });
    assert!(logs.contains("Captured failure"));
    assert!(logs.contains("disk full"));
    assert!(logs.contains("boxit::executor"));
    assert!(!logs.contains("Captured success"));
}

#[test]
fn all_includes_successes() {
    let logs = capture(|| {
        let _ = Executor::new(OutcomeTrace::All).execute_sync(|| 1_u8);
    });
    assert!(logs.contains("Captured success"));
}

#[test]
fn off_is_silent() {
    let logs = capture(|| {
        let _ = Executor::new(OutcomeTrace::Off).execute_sync(|| Err::<(), _>("quiet"));
    });
    assert!(!logs.contains("quiet"));
}
