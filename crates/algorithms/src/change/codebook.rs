//! Transition codebook: ordered class pairs to integer codes

use landshift_core::{Error, Result};
use std::collections::HashMap;

/// Deterministic mapping between ordered (from-class, to-class) pairs and
/// transition codes.
///
/// For `n` classes the codes are `n * index(from) + index(to)`, a bijection
/// onto `[0, n²)`. Codes depend only on the class ordering, so the same class
/// list always produces the same codes.
#[derive(Debug, Clone)]
pub struct TransitionCodebook {
    classes: Vec<i32>,
    index: HashMap<i32, usize>,
}

impl TransitionCodebook {
    /// Build a codebook from an ordered class list.
    ///
    /// Fails with [`Error::InvalidClassSet`] if the list is empty or contains
    /// duplicate labels.
    pub fn new(classes: &[i32]) -> Result<Self> {
        if classes.is_empty() {
            return Err(Error::InvalidClassSet("class set is empty".to_string()));
        }

        let mut index = HashMap::with_capacity(classes.len());
        for (i, &label) in classes.iter().enumerate() {
            if index.insert(label, i).is_some() {
                return Err(Error::InvalidClassSet(format!(
                    "duplicate label {}",
                    label
                )));
            }
        }

        Ok(Self {
            classes: classes.to_vec(),
            index,
        })
    }

    /// The ordered class labels
    pub fn classes(&self) -> &[i32] {
        &self.classes
    }

    /// Number of classes
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Number of transition codes (`n²`)
    pub fn num_codes(&self) -> usize {
        self.classes.len() * self.classes.len()
    }

    /// Whether a label belongs to the class set
    pub fn contains(&self, label: i32) -> bool {
        self.index.contains_key(&label)
    }

    /// Transition code for an ordered (from, to) pair.
    ///
    /// `None` if either label is outside the class set.
    pub fn code(&self, from: i32, to: i32) -> Option<i32> {
        let i = *self.index.get(&from)?;
        let j = *self.index.get(&to)?;
        Some((self.classes.len() * i + j) as i32)
    }

    /// Invert a transition code back to its (from, to) pair
    pub fn decode(&self, code: i32) -> Option<(i32, i32)> {
        let n = self.classes.len();
        let code = usize::try_from(code).ok()?;
        if code >= n * n {
            return None;
        }
        Some((self.classes[code / n], self.classes[code % n]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_bijective() {
        let cb = TransitionCodebook::new(&[0, 1, 2, 3, 4]).unwrap();

        let mut seen = HashSet::new();
        for &from in cb.classes() {
            for &to in cb.classes() {
                let code = cb.code(from, to).unwrap();
                assert!((0..25).contains(&code));
                assert!(seen.insert(code), "code {} assigned twice", code);
                assert_eq!(cb.decode(code), Some((from, to)));
            }
        }
        assert_eq!(seen.len(), cb.num_codes());
    }

    #[test]
    fn test_code_formula() {
        // code = n * i + j with n = 2
        let cb = TransitionCodebook::new(&[0, 1]).unwrap();
        assert_eq!(cb.code(0, 0), Some(0));
        assert_eq!(cb.code(0, 1), Some(1));
        assert_eq!(cb.code(1, 0), Some(2));
        assert_eq!(cb.code(1, 1), Some(3));
    }

    #[test]
    fn test_ordering_matters() {
        let a = TransitionCodebook::new(&[0, 1]).unwrap();
        let b = TransitionCodebook::new(&[1, 0]).unwrap();
        assert_eq!(a.code(0, 1), Some(1));
        assert_eq!(b.code(0, 1), Some(2));
    }

    #[test]
    fn test_noncontiguous_labels() {
        let cb = TransitionCodebook::new(&[10, 20, 42]).unwrap();
        assert_eq!(cb.code(20, 42), Some(5));
        assert_eq!(cb.decode(5), Some((20, 42)));
    }

    #[test]
    fn test_single_class() {
        let cb = TransitionCodebook::new(&[0]).unwrap();
        assert_eq!(cb.num_codes(), 1);
        assert_eq!(cb.code(0, 0), Some(0));
        assert_eq!(cb.decode(0), Some((0, 0)));
        assert_eq!(cb.decode(1), None);
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        assert!(matches!(
            TransitionCodebook::new(&[0, 1, 1]),
            Err(Error::InvalidClassSet(_))
        ));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(TransitionCodebook::new(&[]).is_err());
    }

    #[test]
    fn test_out_of_set_labels() {
        let cb = TransitionCodebook::new(&[0, 1]).unwrap();
        assert_eq!(cb.code(0, 9), None);
        assert_eq!(cb.code(9, 0), None);
        assert_eq!(cb.decode(-1), None);
    }
}
