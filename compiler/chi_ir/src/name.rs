//! Interned symbol code.

use std::fmt;

/// Code of an interned symbol.
///
/// Codes are assigned sequentially by the [`SymbolTable`](crate::SymbolTable)
/// that produced them, so two names from the same table are equal exactly
/// when their texts are equal.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// The reserved sentinel symbol, `<null>`.
    pub const NULL: Name = Name(0);

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_null() {
        assert!(Name::NULL.is_null());
        assert_eq!(Name::default(), Name::NULL);
        assert!(!Name::from_raw(7).is_null());
    }

    #[test]
    fn test_name_ord() {
        assert!(Name::from_raw(1) < Name::from_raw(2));
        assert_eq!(Name::from_raw(3).raw(), 3);
    }
}
