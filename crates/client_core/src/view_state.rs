//! Per-page view state shared between orchestrators and whatever renders it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Upload,
    Summarize,
    Feedback,
}

impl PendingAction {
    pub fn as_str(self) -> &'static str {
        match self {
            PendingAction::Upload => "upload",
            PendingAction::Summarize => "summarize",
            PendingAction::Feedback => "feedback",
        }
    }
}

/// One flag per dashboard action; a set flag means the matching control should be disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingFlags {
    pub upload: bool,
    pub summarize: bool,
    pub feedback: bool,
}

impl PendingFlags {
    pub fn get(&self, action: PendingAction) -> bool {
        match action {
            PendingAction::Upload => self.upload,
            PendingAction::Summarize => self.summarize,
            PendingAction::Feedback => self.feedback,
        }
    }

    pub fn set(&mut self, action: PendingAction, value: bool) {
        match action {
            PendingAction::Upload => self.upload = value,
            PendingAction::Summarize => self.summarize = value,
            PendingAction::Feedback => self.feedback = value,
        }
    }

    pub fn any(&self) -> bool {
        self.upload || self.summarize || self.feedback
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A message the user has to see, in place of a blocking alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// Shared handle to a page's state. Locks are never held across an await.
#[derive(Debug)]
pub struct StateCell<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for StateCell<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> StateCell<S> {
    pub fn new(state: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, S> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.lock())
    }
}

impl<S: Clone> StateCell<S> {
    pub fn snapshot(&self) -> S {
        self.lock().clone()
    }
}

/// Sets a pending flag for as long as it lives.
///
/// Dropping the guard clears the flag, whether the orchestrator returned early,
/// failed, or its future was dropped mid-request.
pub struct PendingGuard<S> {
    state: StateCell<S>,
    set: fn(&mut S, bool),
    label: &'static str,
}

impl<S> PendingGuard<S> {
    pub fn begin(state: &StateCell<S>, label: &'static str, set: fn(&mut S, bool)) -> Self {
        state.update(|s| set(s, true));
        debug!(action = label, "pending flag set");
        Self {
            state: state.clone(),
            set,
            label,
        }
    }
}

impl<S> Drop for PendingGuard<S> {
    fn drop(&mut self) {
        let set = self.set;
        self.state.update(|s| set(s, false));
        debug!(action = self.label, "pending flag cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default)]
    struct Page {
        pending: PendingFlags,
    }

    fn set_upload(page: &mut Page, value: bool) {
        page.pending.set(PendingAction::Upload, value);
    }

    #[test]
    fn guard_sets_and_clears_flag() {
        let cell = StateCell::new(Page::default());
        {
            let _guard = PendingGuard::begin(&cell, "upload", set_upload);
            assert!(cell.read(|p| p.pending.upload));
            assert!(!cell.read(|p| p.pending.summarize));
        }
        assert!(!cell.read(|p| p.pending.any()));
    }

    #[test]
    fn guard_clears_flag_on_early_error_return() {
        fn failing(cell: &StateCell<Page>) -> Result<(), String> {
            let _guard = PendingGuard::begin(cell, "upload", set_upload);
            let response: Result<u8, String> = Err("boom".to_string());
            response?;
            Ok(())
        }

        let cell = StateCell::new(Page::default());
        assert!(failing(&cell).is_err());
        assert!(!cell.read(|p| p.pending.upload));
    }

    #[test]
    fn flags_are_independent() {
        let mut flags = PendingFlags::default();
        flags.set(PendingAction::Feedback, true);
        assert!(flags.get(PendingAction::Feedback));
        assert!(!flags.get(PendingAction::Upload));
        assert!(!flags.get(PendingAction::Summarize));
        assert!(flags.any());
    }
}
