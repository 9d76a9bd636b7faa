//! Environment variable helpers
//!
//! Used for `RUNQ_*` runtime configuration and log setup. A variable that is
//! unset or fails to parse falls back to the caller's default.

use std::str::FromStr;

/// Get environment variable parsed as type T, or return default
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    env_get_opt(key).unwrap_or(default)
}

/// Get environment variable as boolean
///
/// Accepts "1", "true", "yes", "on" (case-insensitive) as true and
/// "0", "false", "no", "off" as false. Anything else returns the default.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => match val.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

/// Get environment variable as optional value
///
/// Returns `Some(T)` if the variable is set and parses, `None` otherwise.
/// Surrounding whitespace is ignored.
#[inline]
pub fn env_get_opt<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_get_default() {
        let val: usize = env_get("__RUNQ_TEST_UNSET__", 42);
        assert_eq!(val, 42);
        assert!(env_get_opt::<u64>("__RUNQ_TEST_UNSET__").is_none());
        assert!(env_get_bool("__RUNQ_TEST_UNSET__", true));
    }

    #[test]
    fn test_env_get_with_set_var() {
        std::env::set_var("__RUNQ_TEST_NUM__", " 123 ");
        let val: usize = env_get("__RUNQ_TEST_NUM__", 0);
        assert_eq!(val, 123);

        std::env::set_var("__RUNQ_TEST_NUM__", "lots");
        let val: usize = env_get("__RUNQ_TEST_NUM__", 7);
        assert_eq!(val, 7);
        std::env::remove_var("__RUNQ_TEST_NUM__");
    }

    #[test]
    fn test_env_get_bool_variants() {
        std::env::set_var("__RUNQ_TEST_BOOL__", "YES");
        assert!(env_get_bool("__RUNQ_TEST_BOOL__", false));

        std::env::set_var("__RUNQ_TEST_BOOL__", "off");
        assert!(!env_get_bool("__RUNQ_TEST_BOOL__", true));

        // Garbage keeps the default either way
        std::env::set_var("__RUNQ_TEST_BOOL__", "maybe");
        assert!(env_get_bool("__RUNQ_TEST_BOOL__", true));
        assert!(!env_get_bool("__RUNQ_TEST_BOOL__", false));
        std::env::remove_var("__RUNQ_TEST_BOOL__");
    }
}
