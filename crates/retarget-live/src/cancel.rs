use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cloneable cancel signal shared between a scheduler and its controller.
///
/// Setting it never interrupts a tick in progress; the scheduler checks it at
/// the top of the next tick.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
