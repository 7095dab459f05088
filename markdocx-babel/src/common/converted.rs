//! Explicit result of a degradable conversion step.

/// Outcome of converting one node that is allowed to fail locally.
///
/// A failed image fetch or formula translation must not abort the surrounding document, so
/// the converting function returns the literal text to show in place of the node instead of
/// an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Converted<T> {
    Value(T),
    Fallback(String),
}

impl<T> Converted<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Converted::Fallback(_))
    }

    /// Map the converted value, keeping any fallback text untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Converted<U> {
        match self {
            Converted::Value(value) => Converted::Value(f(value)),
            Converted::Fallback(text) => Converted::Fallback(text),
        }
    }

    /// Resolve both arms into one value.
    pub fn unwrap_or_else(self, fallback: impl FnOnce(String) -> T) -> T {
        match self {
            Converted::Value(value) => value,
            Converted::Fallback(text) => fallback(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_preserves_fallback() {
        let failed: Converted<u32> = Converted::Fallback("$x$".to_string());
        assert_eq!(failed.map(|v| v + 1), Converted::Fallback("$x$".to_string()));
        assert_eq!(Converted::Value(1).map(|v| v + 1), Converted::Value(2));
    }

    #[test]
    fn unwrap_or_else_uses_fallback_text() {
        let failed: Converted<String> = Converted::Fallback("![a](b)".to_string());
        assert_eq!(failed.unwrap_or_else(|text| text), "![a](b)");
    }
}
