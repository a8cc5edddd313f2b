//! Section/key access to the session configuration.

pub trait ConfigPort {
    /// Trimmed value, `None` when the key is absent or blank.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Falls back to `default` when absent or not an integer.
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    /// Falls back to `default` when absent or not a number.
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
}
