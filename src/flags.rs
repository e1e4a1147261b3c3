use crate::models::Transaction;

/// An aggregate built from a list of transactions.
pub trait Constituents {
    fn constituents(&self) -> &[&Transaction];

    /// True iff at least one constituent transaction is flagged.
    fn is_flagged(&self) -> bool {
        any_flagged(self.constituents())
    }

    fn flagged_count(&self) -> usize {
        self.constituents().iter().filter(|t| t.is_flagged).count()
    }
}

pub fn any_flagged(transactions: &[&Transaction]) -> bool {
    transactions.iter().any(|t| t.is_flagged)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bundle<'a>(Vec<&'a Transaction>);

    impl<'a> Constituents for Bundle<'a> {
        fn constituents(&self) -> &[&Transaction] {
            &self.0
        }
    }

    #[test]
    fn test_any_flagged() {
        let clean = Transaction::new("t1", "2024-01-01", "A", "B", 1.0, "wire");
        let dirty = Transaction::new("t2", "2024-01-01", "A", "B", 1.0, "wire").flagged(true);
        assert!(!any_flagged(&[]));
        assert!(!any_flagged(&[&clean]));
        assert!(any_flagged(&[&clean, &dirty]));
    }

    #[test]
    fn test_trait_defaults() {
        let clean = Transaction::new("t1", "2024-01-01", "A", "B", 1.0, "wire");
        let dirty = Transaction::new("t2", "2024-01-01", "A", "B", 1.0, "wire").flagged(true);
        let bundle = Bundle(vec![&clean, &dirty]);
        assert!(bundle.is_flagged());
        assert_eq!(bundle.flagged_count(), 1);
        assert!(!Bundle(vec![&clean]).is_flagged());
    }
}
