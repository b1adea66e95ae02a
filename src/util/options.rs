//! Decode and encode options.

/// Limits applied while decoding untrusted input.
///
/// Recursion depth follows the schema nesting of the destination type, but
/// joint hierarchies, JSON trees and debug text nest as deeply as the input
/// says, so every recursive decoder checks `max_depth`. Wire-declared
/// element counts are checked against `max_elements` before allocating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum nesting depth.
    pub max_depth: usize,
    /// Maximum element count of any single array.
    pub max_elements: usize,
}

impl DecodeOptions {
    /// Default nesting limit.
    pub const DEFAULT_MAX_DEPTH: usize = 256;

    /// Default element count limit.
    pub const DEFAULT_MAX_ELEMENTS: usize = 16 * 1024 * 1024;

    /// Set the depth limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the element count limit.
    pub fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = max_elements;
        self
    }

    /// Fail with [`Error::DepthLimit`](super::Error::DepthLimit) if `depth`
    /// exceeds the limit.
    #[inline]
    pub fn check_depth(&self, depth: usize) -> super::Result<()> {
        if depth > self.max_depth {
            return Err(super::Error::DepthLimit { limit: self.max_depth });
        }
        Ok(())
    }

    /// Fail if a declared element count exceeds the limit.
    #[inline]
    pub fn check_count(&self, count: usize) -> super::Result<()> {
        if count > self.max_elements {
            return Err(super::Error::invalid(format!(
                "element count {} exceeds limit {}",
                count, self.max_elements
            )));
        }
        Ok(())
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_elements: Self::DEFAULT_MAX_ELEMENTS,
        }
    }
}

/// Layout options for the JSON serializer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JsonOptions {
    /// Indentation unit, repeated once per nesting level.
    pub indent: char,
    /// Emit newlines and indentation inside records.
    pub pretty: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            indent: '\t',
            pretty: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits() {
        let opts = DecodeOptions::default().with_max_depth(2).with_max_elements(10);
        assert!(opts.check_depth(2).is_ok());
        assert!(opts.check_depth(3).is_err());
        assert!(opts.check_count(10).is_ok());
        assert!(opts.check_count(11).is_err());
    }
}
