use std::sync::{Mutex, OnceLock};

/// Runs `f` with temporary environment variable overrides under a
/// process-wide lock, so concurrently running tests cannot observe each
/// other's environment. Previous values are restored even if `f` panics.
pub(crate) fn with_locked_env<T>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> T) -> T {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard = LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .expect("env lock should not be poisoned");

    let previous: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(name, _)| ((*name).to_string(), std::env::var(name).ok()))
        .collect();

    for (name, value) in vars {
        apply_env(name, value.as_deref());
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    for (name, value) in previous {
        apply_env(&name, value.as_deref());
    }

    match result {
        Ok(output) => output,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

fn apply_env(name: &str, value: Option<&str>) {
    match value {
        Some(v) => {
            #[allow(unused_unsafe)]
            unsafe {
                std::env::set_var(name, v);
            }
        }
        None => {
            #[allow(unused_unsafe)]
            unsafe {
                std::env::remove_var(name);
            }
        }
    }
}
