//! Categorical encoding for model features.

use addzyme_core::{AddzymeError, Result};

/// One-hot vector of length `size` with 1.0 at `index`.
pub fn one_hot(index: usize, size: usize) -> Result<Vec<f64>> {
    if index >= size {
        return Err(AddzymeError::InvalidInput(format!(
            "category index {index} out of range for {size} categories"
        )));
    }
    let mut out = vec![0.0; size];
    out[index] = 1.0;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_set() {
        let v = one_hot(2, 5).unwrap();
        assert_eq!(v, vec![0.0, 0.0, 1.0, 0.0, 0.0]);
        assert_eq!(v.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn bounds() {
        assert_eq!(one_hot(0, 1).unwrap(), vec![1.0]);
        assert!(one_hot(5, 5).is_err());
        assert!(one_hot(0, 0).is_err());
    }
}
