use std::{thread, time::Duration};

use tracing::{debug, info, instrument, warn};

/// Application control surface. Scripts run one at a time to completion;
/// `wait` and `wait_until_tasks_finished` are the only suspension points,
/// and both block the calling script.
#[derive(Debug)]
pub struct Application {
    responsive_ui: bool,
    tasks: Vec<thread::JoinHandle<()>>,
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl Application {
    #[must_use]
    pub fn new() -> Self {
        Self {
            responsive_ui: true,
            tasks: Vec::new(),
        }
    }

    /// Trades interactivity for throughput: with the responsive UI off,
    /// batch scripts run much faster.
    #[instrument(skip(self))]
    pub fn set_responsive_ui(&mut self, state: bool) {
        self.responsive_ui = state;
        info!(state, "responsive ui changed");
    }

    /// Host-side accessor; the script surface itself cannot query this.
    #[must_use]
    pub fn responsive_ui(&self) -> bool {
        self.responsive_ui
    }

    /// Blocks the script for the given duration.
    pub fn wait(&self, duration: Duration) {
        debug!(millis = duration.as_millis() as u64, "script waiting");
        thread::sleep(duration);
    }

    /// Registers a background task the host is running on the script's
    /// behalf.
    pub fn spawn_task<F>(&mut self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.tasks.push(thread::spawn(task));
    }

    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Blocks until every outstanding background task has completed;
    /// returns how many were drained.
    #[instrument(skip(self))]
    pub fn wait_until_tasks_finished(&mut self) -> usize {
        let drained = self.tasks.len();
        for task in self.tasks.drain(..) {
            if task.join().is_err() {
                warn!("background task panicked");
            }
        }
        if drained > 0 {
            info!(drained, "background tasks finished");
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    #[test]
    fn wait_until_tasks_finished_joins_everything() {
        let mut application = Application::new();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let counter = Arc::clone(&counter);
            application.spawn_task(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert_eq!(application.wait_until_tasks_finished(), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(application.pending_tasks(), 0);
        assert_eq!(application.wait_until_tasks_finished(), 0);
    }

    #[test]
    fn responsive_ui_defaults_on() {
        let mut application = Application::new();
        assert!(application.responsive_ui());
        application.set_responsive_ui(false);
        assert!(!application.responsive_ui());
    }
}
