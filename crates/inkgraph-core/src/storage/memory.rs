//! In-memory storage.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::Document;

/// Keeps each document as its JSON text, so loading decodes it the same
/// way a file load does.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, String>>,
}

fn lock_error(err: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {err}"))
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &Document) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let json = document.to_json();
        Box::pin(async move {
            let json = json?;
            self.documents.write().map_err(lock_error)?.insert(id, json);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Document>> {
        let id = id.to_string();
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            let json = docs.get(&id).ok_or(StorageError::NotFound(id.clone()))?;
            Ok(Document::from_json(json)?)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.documents.write().map_err(lock_error)?.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            let mut ids: Vec<String> = docs.keys().cloned().collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.documents.read().map_err(lock_error)?.contains_key(&id)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{LineShape, Shape};
    use crate::storage::block_on;
    use kurbo::Point;

    #[test]
    fn test_save_and_load_keeps_sharing() {
        let storage = MemoryStorage::new();
        let mut doc = Document::new();
        let a = doc.points.add(Point::new(0.0, 0.0));
        let p = doc.points.add(Point::new(10.0, 10.0));
        let c = doc.points.add(Point::new(20.0, 0.0));
        doc.add_shape(Shape::Line(LineShape::new(a, p, "default")));
        doc.add_shape(Shape::Line(LineShape::new(p, c, "default")));

        block_on(storage.save("test", &doc)).unwrap();
        let loaded = block_on(storage.load("test")).unwrap();

        assert_eq!(loaded.id, doc.id);
        assert_eq!(loaded.points.len(), 3);
        let (Shape::Line(first), Shape::Line(second)) = (&loaded.shapes[0], &loaded.shapes[1]) else {
            panic!("expected lines");
        };
        assert_eq!(first.end, second.start);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_list_delete_exists() {
        let storage = MemoryStorage::new();
        let doc = Document::new();
        block_on(storage.save("b", &doc)).unwrap();
        block_on(storage.save("a", &doc)).unwrap();
        assert_eq!(block_on(storage.list()).unwrap(), vec!["a", "b"]);

        block_on(storage.delete("a")).unwrap();
        assert!(!block_on(storage.exists("a")).unwrap());
        assert!(block_on(storage.exists("b")).unwrap());
        block_on(storage.delete("missing")).unwrap();
    }
}
