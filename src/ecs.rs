//! A minimal entity-component runtime.
//!
//! Entities are plain ids. Each component type lives in its own insertion-ordered
//! table, and every insert is stamped with a world-wide sequence number so that
//! components of different types can be merged back into registration order.
//! Resources are typed singletons. Systems are plain function pointers run in
//! registration order by [`World::update`].

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use tracing::debug;

use crate::error::PlanError;
use crate::observer::{FrameObserver, NoOpFrameObserver};

/// Identifier of an entity. Ids are never reused within a world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u32);

impl EntityId {
    pub const fn from_raw(raw: u32) -> Self {
        EntityId(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Marker for types that can be attached to entities.
pub trait Component: 'static {}

/// A per-frame system.
pub type System = fn(&mut World, &mut dyn FrameObserver);

struct Slot<C> {
    seq: u64,
    value: C,
}

type Table<C> = IndexMap<EntityId, Slot<C>, FxBuildHasher>;

/// Type-erased view of a component table, enough to detach a deleted entity.
trait AnyStore {
    fn detach(&mut self, entity: EntityId);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct Store<C> {
    table: Table<C>,
}

impl<C: Component> AnyStore for Store<C> {
    fn detach(&mut self, entity: EntityId) {
        self.table.shift_remove(&entity);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Owner of all entities, components, resources and systems.
pub struct World {
    next_id: u32,
    next_seq: u64,
    entities: BTreeMap<EntityId, Vec<TypeId>>,
    stores: BTreeMap<TypeId, Box<dyn AnyStore>>,
    resources: BTreeMap<TypeId, Box<dyn Any>>,
    systems: Vec<System>,
}

/// Attaches components to a freshly created entity.
pub struct EntityBuilder<'w> {
    world: &'w mut World,
    id: EntityId,
}

impl<'w> EntityBuilder<'w> {
    pub fn with<C: Component>(self, component: C) -> Self {
        self.world.attach(self.id, component);
        self
    }

    pub fn id(self) -> EntityId {
        self.id
    }
}

impl World {
    pub fn new() -> Self {
        World {
            next_id: 0,
            next_seq: 0,
            entities: BTreeMap::new(),
            stores: BTreeMap::new(),
            resources: BTreeMap::new(),
            systems: Vec::new(),
        }
    }

    // ---- Entities ----

    pub fn create_entity(&mut self) -> EntityBuilder<'_> {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, Vec::new());
        EntityBuilder { world: self, id }
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    /// Live entities in creation order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Delete an entity along with every component attached to it.
    pub fn delete_entity(&mut self, entity: EntityId) -> Result<(), PlanError> {
        let types = self.entities.remove(&entity).ok_or(PlanError::UnknownEntity(entity))?;
        for ty in &types {
            if let Some(store) = self.stores.get_mut(ty) {
                store.detach(entity);
            }
        }
        debug!(%entity, components = types.len(), "entity deleted");
        Ok(())
    }

    // ---- Components ----

    /// Attach `component`, replacing (and returning) any previous component of the
    /// same type. A replacement counts as a new registration.
    pub fn add<C: Component>(&mut self, entity: EntityId, component: C) -> Result<Option<C>, PlanError> {
        if !self.is_alive(entity) {
            return Err(PlanError::UnknownEntity(entity));
        }
        Ok(self.attach(entity, component))
    }

    fn attach<C: Component>(&mut self, entity: EntityId, component: C) -> Option<C> {
        let seq = self.next_seq;
        self.next_seq += 1;
        let table = self.table_or_insert::<C>();
        let previous = table.shift_remove(&entity).map(|slot| slot.value);
        table.insert(entity, Slot { seq, value: component });
        if let Some(types) = self.entities.get_mut(&entity) {
            let ty = TypeId::of::<C>();
            if !types.contains(&ty) {
                types.push(ty);
            }
        }
        previous
    }

    pub fn remove<C: Component>(&mut self, entity: EntityId) -> Option<C> {
        let removed = self.table_mut::<C>()?.shift_remove(&entity)?;
        if let Some(types) = self.entities.get_mut(&entity) {
            types.retain(|ty| *ty != TypeId::of::<C>());
        }
        Some(removed.value)
    }

    pub fn get<C: Component>(&self, entity: EntityId) -> Option<&C> {
        self.table::<C>()?.get(&entity).map(|slot| &slot.value)
    }

    pub fn get_mut<C: Component>(&mut self, entity: EntityId) -> Option<&mut C> {
        self.table_mut::<C>()?.get_mut(&entity).map(|slot| &mut slot.value)
    }

    /// Like [`World::get`], but says why the component is not there.
    pub fn try_get<C: Component>(&self, entity: EntityId) -> Result<&C, PlanError> {
        if !self.is_alive(entity) {
            return Err(PlanError::UnknownEntity(entity));
        }
        self.get::<C>(entity).ok_or_else(|| PlanError::missing::<C>(entity))
    }

    pub fn try_get_mut<C: Component>(&mut self, entity: EntityId) -> Result<&mut C, PlanError> {
        if !self.is_alive(entity) {
            return Err(PlanError::UnknownEntity(entity));
        }
        self.get_mut::<C>(entity).ok_or_else(|| PlanError::missing::<C>(entity))
    }

    pub fn has<C: Component>(&self, entity: EntityId) -> bool {
        self.get::<C>(entity).is_some()
    }

    /// All components of type `C`, in registration order.
    pub fn components<C: Component>(&self) -> impl Iterator<Item = (EntityId, &C)> + '_ {
        self.table::<C>()
            .into_iter()
            .flat_map(|table| table.iter().map(|(id, slot)| (*id, &slot.value)))
    }

    pub fn components_mut<C: Component>(&mut self) -> impl Iterator<Item = (EntityId, &mut C)> + '_ {
        self.table_mut::<C>()
            .into_iter()
            .flat_map(|table| table.iter_mut().map(|(id, slot)| (*id, &mut slot.value)))
    }

    /// Components of type `C` with their registration sequence numbers.
    pub fn sequenced<C: Component>(&self) -> impl Iterator<Item = (u64, EntityId, &C)> + '_ {
        self.table::<C>()
            .into_iter()
            .flat_map(|table| table.iter().map(|(id, slot)| (slot.seq, *id, &slot.value)))
    }

    pub fn count<C: Component>(&self) -> usize {
        self.table::<C>().map_or(0, |table| table.len())
    }

    /// Move the `C` component of `from` onto `to`. It is detached from `from`
    /// before it is attached anywhere else.
    pub fn transfer<C: Component>(&mut self, from: EntityId, to: EntityId) -> Result<Option<C>, PlanError> {
        if !self.is_alive(to) {
            return Err(PlanError::UnknownEntity(to));
        }
        if !self.is_alive(from) {
            return Err(PlanError::UnknownEntity(from));
        }
        let component = self.remove::<C>(from).ok_or_else(|| PlanError::missing::<C>(from))?;
        Ok(self.attach(to, component))
    }

    fn table<C: Component>(&self) -> Option<&Table<C>> {
        self.stores
            .get(&TypeId::of::<C>())
            .and_then(|store| store.as_any().downcast_ref::<Store<C>>())
            .map(|store| &store.table)
    }

    fn table_mut<C: Component>(&mut self) -> Option<&mut Table<C>> {
        self.stores
            .get_mut(&TypeId::of::<C>())
            .and_then(|store| store.as_any_mut().downcast_mut::<Store<C>>())
            .map(|store| &mut store.table)
    }

    fn table_or_insert<C: Component>(&mut self) -> &mut Table<C> {
        let store = self
            .stores
            .entry(TypeId::of::<C>())
            .or_insert_with(|| -> Box<dyn AnyStore> {
                Box::new(Store::<C> { table: IndexMap::with_hasher(FxBuildHasher) })
            });
        match store.as_any_mut().downcast_mut::<Store<C>>() {
            Some(store) => &mut store.table,
            None => unreachable!("component table keyed by a foreign TypeId"),
        }
    }

    // ---- Resources ----

    /// Insert a resource, returning the one it replaces.
    pub fn insert_resource<R: 'static>(&mut self, resource: R) -> Option<R> {
        self.resources
            .insert(TypeId::of::<R>(), Box::new(resource))
            .and_then(|old| old.downcast::<R>().ok())
            .map(|old| *old)
    }

    pub fn resource<R: 'static>(&self) -> Option<&R> {
        self.resources.get(&TypeId::of::<R>())?.downcast_ref::<R>()
    }

    pub fn resource_mut<R: 'static>(&mut self) -> Option<&mut R> {
        self.resources.get_mut(&TypeId::of::<R>())?.downcast_mut::<R>()
    }

    // ---- Systems ----

    pub fn register_system(&mut self, system: System) {
        self.systems.push(system);
    }

    /// Run every system once, in registration order.
    pub fn update(&mut self) {
        self.update_observed(&mut NoOpFrameObserver);
    }

    pub fn update_observed(&mut self, observer: &mut dyn FrameObserver) {
        for i in 0..self.systems.len() {
            let system = self.systems[i];
            system(self, observer);
        }
        observer.on_frame_complete();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[derive(Debug, PartialEq)]
    struct Label(&'static str);
    impl Component for Label {}

    #[derive(Debug, PartialEq)]
    struct Weight(u32);
    impl Component for Weight {}

    #[test]
    fn ids_are_never_reused() {
        let mut world = World::new();
        let a = world.create_entity().id();
        world.delete_entity(a).unwrap();
        let b = world.create_entity().id();
        assert_ne!(a, b);
        assert!(!world.is_alive(a));
    }

    #[test]
    fn replacement_moves_to_the_end() {
        let mut world = World::new();
        let a = world.create_entity().with(Label("a")).id();
        let b = world.create_entity().with(Label("b")).id();
        let old = world.add(a, Label("a2")).unwrap();
        assert_eq!(old, Some(Label("a")));
        let order: Vec<_> = world.components::<Label>().map(|(id, _)| id).collect();
        assert_eq!(order, vec![b, a]);
    }

    #[test]
    fn sequence_numbers_span_types() {
        let mut world = World::new();
        let e = world.create_entity().with(Label("x")).with(Weight(3)).id();
        let label_seq = world.sequenced::<Label>().next().unwrap().0;
        let weight_seq = world.sequenced::<Weight>().next().unwrap().0;
        assert!(label_seq < weight_seq);
        assert!(world.has::<Weight>(e));
    }

    #[test]
    fn add_to_dead_entity_fails() {
        let mut world = World::new();
        let e = world.create_entity().id();
        world.delete_entity(e).unwrap();
        assert_eq!(world.add(e, Weight(1)), Err(PlanError::UnknownEntity(e)));
        assert_eq!(world.delete_entity(e), Err(PlanError::UnknownEntity(e)));
    }

    #[test]
    fn resources_replace() {
        let mut world = World::new();
        assert_eq!(world.insert_resource(5u32), None);
        assert_eq!(world.insert_resource(7u32), Some(5));
        *world.resource_mut::<u32>().unwrap() += 1;
        assert_eq!(world.resource::<u32>(), Some(&8));
        assert!(world.resource::<u64>().is_none());
    }
}
