use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Shared async map used by providers to avoid refetching price histories.
#[derive(Clone)]
pub struct Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, V>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Send + Sync + std::fmt::Debug,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let cache = self.inner.lock().await;
        let value = cache.get(key).cloned();
        if value.is_some() {
            debug!("Cache HIT for {key:?}");
        } else {
            debug!("Cache MISS for {key:?}");
        }
        value
    }

    pub async fn put(&self, key: K, value: V) {
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for {key:?}");
        cache.insert(key, value);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Send + Sync + std::fmt::Debug,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_get_put() {
        let cache = Cache::<String, Vec<f64>>::new();

        assert!(cache.get(&"AAPL".to_string()).await.is_none());

        cache.put("AAPL".to_string(), vec![1.0, 2.0]).await;

        assert_eq!(cache.get(&"AAPL".to_string()).await, Some(vec![1.0, 2.0]));
        assert!(cache.get(&"MSFT".to_string()).await.is_none());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_cache_clones_share_entries() {
        let cache = Cache::<String, i32>::new();
        let shared = cache.clone();

        shared.put("key".to_string(), 7).await;
        assert_eq!(cache.get(&"key".to_string()).await, Some(7));
    }
}
