// src/app/tasks.rs
use std::sync::mpsc::{self, Receiver};
use std::thread;

use tracing::warn;

/// Progress of one background unit of work.
#[derive(Debug)]
pub enum TaskMsg<T> {
    Started,
    Done(T),
}

/// Run `work` on its own thread. The receiver sees `Started` and then exactly
/// one `Done`; there is no cancellation, a dropped receiver just discards the
/// result.
pub fn spawn_task<T, F>(label: &'static str, work: F) -> Receiver<TaskMsg<T>>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(TaskMsg::Started);
        let out = work();
        if tx.send(TaskMsg::Done(out)).is_err() {
            warn!(task = label, "result dropped, nobody is listening");
        }
    });
    rx
}

/// Block until the task reports `Done`. `None` if the worker died first.
pub fn wait<T>(rx: &Receiver<TaskMsg<T>>) -> Option<T> {
    for msg in rx.iter() {
        if let TaskMsg::Done(out) = msg {
            return Some(out);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_started_then_done() {
        let rx = spawn_task("sum", || (1..=4).sum::<i32>());
        assert!(matches!(rx.recv().unwrap(), TaskMsg::Started));
        assert!(matches!(rx.recv().unwrap(), TaskMsg::Done(10)));
        assert!(rx.recv().is_err());
    }

    #[test]
    fn wait_skips_progress_messages() {
        let rx = spawn_task("greet", || String::from("hi"));
        assert_eq!(wait(&rx).as_deref(), Some("hi"));
    }

    #[test]
    fn panicking_worker_yields_nothing() {
        let rx = spawn_task::<(), _>("boom", || panic!("worker failed"));
        assert!(wait(&rx).is_none());
    }
}
