use std::fmt;

use serde::Deserialize;
use zeroize::Zeroize;

/// A registry password or token.
///
/// The wrapper keeps the value out of `Debug` output and zeroes it on drop.
/// Use [Secret::revealed] to get the underlying value.
#[derive(Clone, Deserialize)]
#[serde(from = "String")]
pub struct Secret(String);

impl Secret {
    /// Expose the underlying value
    pub fn revealed(&self) -> &str {
        &self.0
    }

    /// Is the secret an empty string?
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Secret(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Secret(value.to_owned())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn secret_hidden_debug() {
        let password = Secret::from("hunter2");

        assert!(!format!("{password:?}").contains("hunter2"));
        assert_eq!(&format!("{password:?}"), "Secret(****)");
        assert_eq!(password.revealed(), "hunter2");
    }

    #[test]
    fn secret_from_json_string() {
        let password: Secret = serde_json::from_str("\"hunter2\"").unwrap();
        assert_eq!(password.revealed(), "hunter2");
        assert!(!password.is_empty());
    }
}
