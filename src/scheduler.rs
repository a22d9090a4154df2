use std::time::Duration;

use gpui::{AsyncApp, Context, Task, WeakEntity};

/// A single pending delayed callback. Scheduling again replaces the previous one and
/// dropping the scheduler cancels it.
#[derive(Default)]
pub struct Scheduler {
    task: Option<Task<()>>,
}

impl Scheduler {
    pub fn schedule<T: 'static>(
        &mut self,
        delay: Duration,
        context: &mut Context<T>,
        callback: impl FnOnce(&mut T, &mut Context<T>) + 'static,
    ) {
        let executor = context.background_executor().clone();
        self.task = Some(context.spawn(
            async move |this: WeakEntity<T>, context: &mut AsyncApp| {
                executor.timer(delay).await;
                if let Err(error) = this.update(context, callback) {
                    log::warn!("[scheduler] view dropped before timer fired: {error}");
                }
            },
        ));
    }

    pub fn cancel(&mut self) {
        self.task = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.task.is_some()
    }
}
