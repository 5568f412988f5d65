use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

/// Identifies one text encoding. A different model or language yields a different
/// key even for identical text, so a configuration change never returns stale
/// vectors; old entries simply age out.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
	model: String,
	text: String,
	language: Option<String>,
}
impl CacheKey {
	pub fn new(model: &str, text: &str, language: Option<&str>) -> Self {
		Self {
			model: model.to_string(),
			text: text.to_string(),
			language: language.map(str::to_string),
		}
	}
}

/// Process-wide LRU cache for text embeddings, shared by every in-flight search for
/// the lifetime of the service.
///
/// `get` counts as a use for eviction ordering. The lock is never held across an
/// await point and a `put` is an atomic whole-entry write. Concurrent misses for the
/// same key may each call the encoder once; the last write wins.
pub struct TextEmbeddingCache {
	entries: Mutex<LruCache<CacheKey, Vec<f32>>>,
}
impl TextEmbeddingCache {
	pub fn new(capacity: usize) -> Self {
		let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

		Self { entries: Mutex::new(LruCache::new(capacity)) }
	}

	pub fn get(&self, key: &CacheKey) -> Option<Vec<f32>> {
		self.entries.lock().get(key).cloned()
	}

	pub fn put(&self, key: CacheKey, vector: Vec<f32>) {
		self.entries.lock().put(key, vector);
	}

	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn key(text: &str) -> CacheKey {
		CacheKey::new("clip", text, Some("en"))
	}

	#[test]
	fn stores_and_returns_vectors_by_key() {
		let cache = TextEmbeddingCache::new(4);
		cache.put(key("beach"), vec![1.0, 2.0]);
		assert_eq!(cache.get(&key("beach")), Some(vec![1.0, 2.0]));
		assert_eq!(cache.get(&key("mountain")), None);
	}

	#[test]
	fn model_and_language_are_part_of_the_key() {
		let cache = TextEmbeddingCache::new(4);
		cache.put(CacheKey::new("clip", "beach", Some("en")), vec![1.0]);
		assert_eq!(cache.get(&CacheKey::new("clip", "beach", Some("de"))), None);
		assert_eq!(cache.get(&CacheKey::new("siglip", "beach", Some("en"))), None);
		assert_eq!(cache.get(&CacheKey::new("clip", "beach", None)), None);
	}

	#[test]
	fn evicts_least_recently_used_past_capacity() {
		let cache = TextEmbeddingCache::new(100);

		for i in 0..101 {
			cache.put(key(&format!("query {i}")), vec![i as f32]);
		}

		assert_eq!(cache.len(), 100);
		assert_eq!(cache.get(&key("query 0")), None);
		assert_eq!(cache.get(&key("query 1")), Some(vec![1.0]));
		assert_eq!(cache.get(&key("query 100")), Some(vec![100.0]));
	}

	#[test]
	fn get_refreshes_recency() {
		let cache = TextEmbeddingCache::new(2);
		cache.put(key("a"), vec![1.0]);
		cache.put(key("b"), vec![2.0]);
		// Touch "a" so "b" becomes the eviction candidate.
		assert!(cache.get(&key("a")).is_some());
		cache.put(key("c"), vec![3.0]);
		assert_eq!(cache.get(&key("a")), Some(vec![1.0]));
		assert_eq!(cache.get(&key("b")), None);
		assert_eq!(cache.get(&key("c")), Some(vec![3.0]));
	}

	#[test]
	fn concurrent_gets_and_puts_never_exceed_capacity() {
		use std::{sync::Arc, thread};

		let capacity = 8;
		let cache = Arc::new(TextEmbeddingCache::new(capacity));
		let handles: Vec<_> = (0..4_usize)
			.map(|worker| {
				let cache = cache.clone();

				thread::spawn(move || {
					for i in 0..250 {
						let entry = key(&format!("query {}", (worker + i) % 16));

						cache.put(entry.clone(), vec![i as f32]);
						cache.get(&entry);
					}
				})
			})
			.collect();

		for handle in handles {
			handle.join().expect("Worker finished.");
		}

		assert!(cache.len() <= capacity);
		assert!(!cache.is_empty());

		// Every surviving entry is one of the 16 keys and still retrievable.
		let retrievable =
			(0..16).filter(|i| cache.get(&key(&format!("query {i}"))).is_some()).count();
		assert_eq!(retrievable, cache.len());
	}

	#[test]
	fn put_overwrites_existing_entry() {
		let cache = TextEmbeddingCache::new(2);
		cache.put(key("a"), vec![1.0]);
		cache.put(key("a"), vec![9.0]);
		assert_eq!(cache.len(), 1);
		assert_eq!(cache.get(&key("a")), Some(vec![9.0]));
	}
}
