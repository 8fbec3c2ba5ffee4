/// Transient notifications shown in the corner of the window

use std::time::Duration;

/// Timeout for success messages and mutation errors
pub const SHORT_TIMEOUT: Duration = Duration::from_millis(2000);
/// Timeout for local validation errors
pub const LONG_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub timeout: Duration,
}

impl Toast {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            title: title.into(),
            timeout: SHORT_TIMEOUT,
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            title: title.into(),
            timeout: SHORT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Active notifications, oldest first
#[derive(Debug, Default)]
pub struct Toasts {
    next_id: u64,
    active: Vec<(u64, Toast)>,
}

impl Toasts {
    /// Show a toast; returns its id and how long until it should be dismissed
    pub fn push(&mut self, toast: Toast) -> (u64, Duration) {
        let id = self.next_id;
        self.next_id += 1;
        let timeout = toast.timeout;
        self.active.push((id, toast));
        (id, timeout)
    }

    pub fn dismiss(&mut self, id: u64) {
        self.active.retain(|(toast_id, _)| *toast_id != id);
    }

    pub fn iter(&self) -> impl Iterator<Item = &(u64, Toast)> {
        self.active.iter()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_dismiss() {
        let mut toasts = Toasts::default();

        let (first, timeout) = toasts.push(Toast::success("Saved"));
        let (second, _) = toasts.push(Toast::error("Oops").with_timeout(LONG_TIMEOUT));

        assert_eq!(timeout, SHORT_TIMEOUT);
        assert_ne!(first, second);
        assert_eq!(toasts.len(), 2);

        toasts.dismiss(first);

        let remaining: Vec<_> = toasts.iter().map(|(_, t)| t.title.as_str()).collect();
        assert_eq!(remaining, vec!["Oops"]);

        // Dismissing twice is harmless
        toasts.dismiss(first);
        toasts.dismiss(second);
        assert!(toasts.is_empty());
    }
}
