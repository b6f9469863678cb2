use std::time::Instant;

/// Scope timer: logs the elapsed time of the enclosing block when dropped.
pub struct ProfileScope {
    label: String,
    start: Instant,
}

impl ProfileScope {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        log::debug!(
            "[PROFILE] {} - {:.3}ms",
            self.label,
            elapsed.as_secs_f64() * 1000.0
        );
    }
}

/// Macro for easy profiling
#[macro_export]
macro_rules! profile_scope {
    ($label:expr) => {
        let _profile_scope = $crate::profiling::ProfileScope::new($label);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_drops_without_panicking() {
        let scope = ProfileScope::new("test");
        drop(scope);
    }
}
