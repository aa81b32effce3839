//! Developer event log for cache internals (admissions, evictions, resizes).
//!
//! Events go to the global logger at TRACE on target `throughcache::dev` and,
//! when enabled, into a per-thread sink so tests can assert on the exact
//! eviction order without installing a logger.

use std::cell::RefCell;

pub const TARGET: &str = "throughcache::dev";

thread_local! {
    static TL_SINK: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Disables the thread-local sink on drop.
pub struct DevSinkGuard;

impl Drop for DevSinkGuard {
    fn drop(&mut self) {
        TL_SINK.with(|s| *s.borrow_mut() = None);
    }
}

/// Starts capturing events on the current thread until the guard is dropped.
pub fn enable_thread_sink() -> DevSinkGuard {
    TL_SINK.with(|s| *s.borrow_mut() = Some(Vec::new()));
    DevSinkGuard
}

pub fn write_str(msg: &str) {
    TL_SINK.with(|s| {
        if let Some(buf) = s.borrow_mut().as_mut() {
            buf.push(msg.to_owned());
        }
    });
}

/// Takes every captured event. Empty when the sink is disabled.
pub fn drain() -> Vec<String> {
    TL_SINK.with(|s| s.borrow_mut().as_mut().map(std::mem::take).unwrap_or_default())
}

pub fn snapshot() -> Vec<String> {
    TL_SINK.with(|s| s.borrow().as_ref().cloned().unwrap_or_default())
}

/// Emits a developer event.
#[macro_export]
macro_rules! dev {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        $crate::devlog::write_str(&__s);
        log::log!(target: $crate::devlog::TARGET, log::Level::Trace, "{}", __s);
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_captures_and_drains() {
        let _g = enable_thread_sink();
        crate::dev!("evict {}", 1);
        crate::dev!("admit");
        assert_eq!(snapshot(), vec!["evict 1".to_string(), "admit".to_string()]);
        assert_eq!(drain().len(), 2);
        assert!(snapshot().is_empty());
    }

    #[test]
    fn disabled_sink_captures_nothing() {
        crate::dev!("dropped");
        assert!(drain().is_empty());
    }

    #[test]
    fn sinks_are_per_thread() {
        let _g = enable_thread_sink();
        crate::dev!("main");
        let child = std::thread::spawn(|| {
            crate::dev!("child");
            snapshot()
        })
        .join()
        .unwrap();
        assert!(child.is_empty());
        assert_eq!(snapshot(), vec!["main".to_string()]);
    }
}
