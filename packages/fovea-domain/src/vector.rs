pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("Cannot combine an empty set of embeddings.")]
	Empty,
	#[error("Embedding dimension mismatch: expected {expected}, found {found}.")]
	DimensionMismatch { expected: usize, found: usize },
}

/// Reduces one or more embeddings to a single query vector.
///
/// A single embedding is returned unchanged. Multiple embeddings are reduced to
/// their elementwise arithmetic mean. All inputs must share one dimension; a
/// mismatch is a contract violation between resolver and combiner and fails fast.
pub fn combine(vectors: Vec<Vec<f32>>) -> Result<Vec<f32>> {
	let mut iter = vectors.into_iter();
	let Some(mut acc) = iter.next() else {
		return Err(Error::Empty);
	};
	let mut count = 1_usize;

	for vector in iter {
		if vector.len() != acc.len() {
			return Err(Error::DimensionMismatch { expected: acc.len(), found: vector.len() });
		}

		for (sum, value) in acc.iter_mut().zip(&vector) {
			*sum += value;
		}

		count += 1;
	}

	if count > 1 {
		let divisor = count as f32;

		for value in &mut acc {
			*value /= divisor;
		}
	}

	Ok(acc)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn single_embedding_passes_through_unchanged() {
		let vector = vec![0.25, -1.5, 3.0];
		assert_eq!(combine(vec![vector.clone()]), Ok(vector));
	}

	#[test]
	fn multiple_embeddings_reduce_to_elementwise_mean() {
		let combined = combine(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).expect("Expected mean.");
		assert_eq!(combined, vec![2.0, 3.0]);
	}

	#[test]
	fn mean_is_order_independent() {
		let a = combine(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![2.0, 5.0]]);
		let b = combine(vec![vec![2.0, 5.0], vec![0.0, 1.0], vec![1.0, 0.0]]);
		assert_eq!(a, b);
	}

	#[test]
	fn empty_input_is_rejected() {
		assert_eq!(combine(Vec::new()), Err(Error::Empty));
	}

	#[test]
	fn mismatched_dimensions_fail_fast() {
		let result = combine(vec![vec![1.0, 2.0], vec![1.0, 2.0, 3.0]]);
		assert_eq!(result, Err(Error::DimensionMismatch { expected: 2, found: 3 }));
	}
}
