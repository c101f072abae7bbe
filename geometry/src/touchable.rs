/// Copy-number history of the volume in which a step took place.
///
/// Depth 0 is the innermost (the volume itself), depth 1 its mother, and so
/// on outwards. Replicated volumes report their replica index as their copy
/// number, which is what detector elements are identified by.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Touchable {
    copy_numbers: Vec<i32>,
}

impl Touchable {
    /// `copy_numbers[0]` is the innermost volume's copy number
    pub fn new(copy_numbers: impl Into<Vec<i32>>) -> Self {
        Self { copy_numbers: copy_numbers.into() }
    }

    /// Copy number of the volume `depth` levels above the innermost one.
    ///
    /// `None` when the history is shallower than `depth`.
    pub fn copy_number(&self, depth: usize) -> Option<i32> {
        self.copy_numbers.get(depth).copied()
    }

    pub fn depth(&self) -> usize { self.copy_numbers.len() }

    /// Innermost first
    pub fn copy_numbers(&self) -> &[i32] { &self.copy_numbers }
}

impl From<&[i32]> for Touchable {
    fn from(copy_numbers: &[i32]) -> Self { Self::new(copy_numbers.to_vec()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_numbers_by_depth() {
        let t = Touchable::new([22, 10, 0, 3]);
        assert_eq!(t.depth(), 4);
        assert_eq!(t.copy_number(0), Some(22));
        assert_eq!(t.copy_number(3), Some(3));
        assert_eq!(t.copy_number(4), None);
    }
}
