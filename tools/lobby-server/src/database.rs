use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use uuid::Uuid;

pub type Db = Arc<RoomDatabase>;

/// A single JSON tree addressed by `/`-separated paths.
///
/// Same rules as a Firebase Realtime Database: reading a missing path yields
/// `null`, writing `null` deletes, and objects left empty disappear.
#[derive(Debug, Default)]
pub struct RoomDatabase {
    root: RwLock<Value>,
    pushes: AtomicU64,
}

impl RoomDatabase {
    pub fn new() -> Db {
        Arc::new(Self::default())
    }

    pub fn get(&self, path: &[String]) -> Value {
        let root = self.root.read();
        let mut node = &*root;
        for key in path {
            match node.get(key.as_str()) {
                Some(child) => node = child,
                None => return Value::Null,
            }
        }
        node.clone()
    }

    pub fn set(&self, path: &[String], value: Value) {
        set_at(&mut self.root.write(), path, value);
    }

    /// Merges each child of `children` into the object at `path`.
    pub fn update(&self, path: &[String], children: Map<String, Value>) {
        let mut root = self.root.write();
        for (key, value) in children {
            let mut child_path = path.to_vec();
            child_path.extend(key.split('/').filter(|k| !k.is_empty()).map(str::to_string));
            set_at(&mut root, &child_path, value);
        }
    }

    /// Stores `value` under a fresh key below `path` and returns that key.
    ///
    /// Keys sort in push order, so chat lines read back chronologically.
    pub fn push(&self, path: &[String], value: Value) -> String {
        let seq = self.pushes.fetch_add(1, Ordering::Relaxed);
        let nonce = Uuid::new_v4().simple().to_string();
        let key = format!("-{:012}{}", seq, &nonce[..8]);

        let mut child_path = path.to_vec();
        child_path.push(key.clone());
        self.set(&child_path, value);
        key
    }

    pub fn remove(&self, path: &[String]) {
        self.set(path, Value::Null);
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn set_at(node: &mut Value, path: &[String], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *node = if is_empty(&value) { Value::Null } else { value };
        return;
    };

    if !node.is_object() {
        if value.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }

    let now_empty = match node {
        Value::Object(map) => {
            let child = map.entry(head.clone()).or_insert(Value::Null);
            set_at(child, rest, value);
            if is_empty(child) {
                map.remove(head);
            }
            map.is_empty()
        }
        _ => false,
    };
    if now_empty {
        *node = Value::Null;
    }
}
