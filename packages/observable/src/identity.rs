use std::ptr;
use std::rc::Rc;
use std::sync::Arc;

/// Sameness by identity rather than by value.
///
/// Two handles are the same if they refer to the same object, even when a different object
/// would compare equal. Reconciliation relies on this to recognize a model that a producer
/// yields again, so that whatever was built for it can be kept.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
///
/// use observable::Identity;
///
/// let a = Rc::new("model".to_string());
/// let b = Rc::new("model".to_string());
///
/// assert!(a.is_same(&Rc::clone(&a)));
/// assert!(!a.is_same(&b));
/// ```
pub trait Identity {
    /// Whether `self` and `other` refer to the same object.
    fn is_same(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Identity for Rc<T> {
    fn is_same(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl<T: ?Sized> Identity for Arc<T> {
    fn is_same(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl<T: ?Sized> Identity for &T {
    fn is_same(&self, other: &Self) -> bool {
        ptr::eq(*self, *other)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn equal_values_are_not_the_same() {
        let a = Arc::new(5);
        let b = Arc::new(5);

        assert!(a.is_same(&Arc::clone(&a)));
        assert!(!a.is_same(&b));
    }

    #[test]
    fn references_compare_by_address() {
        let values = [1, 1];
        let first = values.first().unwrap();
        let last = values.last().unwrap();

        assert!(first.is_same(&first));
        assert!(!first.is_same(&last));
    }
}
