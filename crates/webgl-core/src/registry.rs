//! Per-context object registry.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::objects::{ContextId, ObjectKind, WebGLObject};

/// Maps driver-issued names to the wrappers handed to scripts, one map per
/// named kind.
#[derive(Debug)]
pub struct Registry {
    context: ContextId,
    objects: HashMap<ObjectKind, HashMap<u32, Rc<WebGLObject>>>,
}

impl Registry {
    pub fn new(context: ContextId) -> Self {
        Self {
            context,
            objects: ObjectKind::NAMED
                .iter()
                .map(|kind| (*kind, HashMap::new()))
                .collect(),
        }
    }

    /// Register a fresh driver name.
    pub fn create(&mut self, kind: ObjectKind, id: u32) -> Rc<WebGLObject> {
        self.insert(Rc::new(WebGLObject::named(kind, id, self.context)))
    }

    /// Register a shader, which carries source and translation state.
    pub fn create_shader(&mut self, id: u32, shader_type: u32) -> Rc<WebGLObject> {
        self.insert(Rc::new(WebGLObject::shader(id, shader_type, self.context)))
    }

    fn insert(&mut self, object: Rc<WebGLObject>) -> Rc<WebGLObject> {
        debug!(kind = object.kind().name(), id = object.native_id(), "Object created");
        self.objects
            .entry(object.kind())
            .or_default()
            .insert(object.native_id(), Rc::clone(&object));
        object
    }

    /// Find the live wrapper for a driver name. Id 0 never resolves.
    pub fn lookup(&self, kind: ObjectKind, id: u32) -> Option<Rc<WebGLObject>> {
        if id == 0 {
            return None;
        }
        self.objects.get(&kind)?.get(&id).cloned()
    }

    /// Mark deleted and drop membership. Returns the name to free.
    pub fn delete(&mut self, object: &WebGLObject) -> u32 {
        let id = object.native_id();
        object.mark_deleted();
        if let Some(map) = self.objects.get_mut(&object.kind()) {
            map.remove(&id);
        }
        debug!(kind = object.kind().name(), id, "Object deleted");
        id
    }

    /// Number of live objects of a kind.
    pub fn len(&self, kind: ObjectKind) -> usize {
        self.objects.get(&kind).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.objects.values().all(HashMap::is_empty)
    }

    /// Remove every live object, marking each deleted.
    pub fn drain(&mut self) -> Vec<Rc<WebGLObject>> {
        let mut drained = Vec::new();
        for map in self.objects.values_mut() {
            drained.extend(map.drain().map(|(_, object)| object));
        }
        for object in &drained {
            object.mark_deleted();
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_lookup() {
        let mut registry = Registry::new(ContextId::new());
        let buffer = registry.create(ObjectKind::Buffer, 4);

        let found = registry.lookup(ObjectKind::Buffer, 4).unwrap();
        assert!(Rc::ptr_eq(&buffer, &found));
        assert!(registry.lookup(ObjectKind::Texture, 4).is_none());
        assert!(registry.lookup(ObjectKind::Buffer, 0).is_none());
    }

    #[test]
    fn test_delete_removes_membership() {
        let mut registry = Registry::new(ContextId::new());
        let texture = registry.create(ObjectKind::Texture, 9);

        assert_eq!(registry.delete(&texture), 9);
        assert!(texture.is_deleted());
        assert_eq!(texture.webgl_id(), 0);
        assert!(registry.lookup(ObjectKind::Texture, 9).is_none());
        assert_eq!(registry.len(ObjectKind::Texture), 0);
    }

    #[test]
    fn test_ids_are_per_kind() {
        let mut registry = Registry::new(ContextId::new());
        let buffer = registry.create(ObjectKind::Buffer, 1);
        let program = registry.create(ObjectKind::Program, 1);

        assert!(Rc::ptr_eq(&registry.lookup(ObjectKind::Buffer, 1).unwrap(), &buffer));
        assert!(Rc::ptr_eq(&registry.lookup(ObjectKind::Program, 1).unwrap(), &program));
    }

    #[test]
    fn test_drain_marks_everything_deleted() {
        let mut registry = Registry::new(ContextId::new());
        let shader = registry.create_shader(2, crate::constants::FRAGMENT_SHADER);
        let framebuffer = registry.create(ObjectKind::Framebuffer, 3);

        let drained = registry.drain();
        assert_eq!(drained.len(), 2);
        assert!(shader.is_deleted());
        assert!(framebuffer.is_deleted());
        assert!(registry.is_empty());
    }
}
