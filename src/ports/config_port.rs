//! Configuration access port trait.
//!
//! Numeric getters distinguish a missing key (`Ok(None)`) from a value that
//! is present but malformed (`Err` with the parser's reason).

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, String>;
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, String>;
}
