use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// ~100 лет; больше chrono::Duration не вмещает без риска переполнения
const MAX_TTL_SECONDS: u64 = 100 * 365 * 24 * 3600;

#[derive(Debug, Clone)]
struct CacheItem {
    value: Value,
    expires_at: Option<DateTime<Utc>>,
}

impl CacheItem {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Общий пул ключ-значение (in-memory), разделяемый всеми заданиями процесса.
#[derive(Clone)]
pub struct CachePool {
    items: Arc<RwLock<HashMap<String, CacheItem>>>,
    default_ttl: Duration,
}

impl CachePool {
    pub fn new(default_ttl_seconds: u64) -> Self {
        Self {
            items: Arc::new(RwLock::new(HashMap::new())),
            default_ttl: Duration::seconds(default_ttl_seconds.min(MAX_TTL_SECONDS) as i64),
        }
    }

    // Пул не хранит инвариантов между ключами, поэтому отравленная блокировка не страшна.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheItem>> {
        self.items.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheItem>> {
        self.items.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Значение ключа, если оно есть и не просрочено
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Utc::now();
        self.read()
            .get(key)
            .filter(|item| !item.is_expired(now))
            .map(|item| item.value.clone())
    }

    /// Сохраняет значение со сроком жизни по умолчанию
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.set_with_ttl(key, value, Some(self.default_ttl));
    }

    /// `ttl = None`: бессрочно
    pub fn set_with_ttl(&self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        let expires_at = ttl.and_then(|ttl| Utc::now().checked_add_signed(ttl));
        self.write().insert(key.into(), CacheItem { value, expires_at });
    }

    pub fn delete(&self, key: &str) -> bool {
        self.write().remove(key).is_some()
    }

    /// Удаляет просроченные записи, возвращает их количество
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut items = self.write();
        let before = items.len();
        items.retain(|_, item| !item.is_expired(now));
        before - items.len()
    }

    pub fn clear(&self) -> usize {
        let mut items = self.write();
        let count = items.len();
        items.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
