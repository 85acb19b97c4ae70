//! Entity instance graphs.
//!
//! Entities live in an arena owned by [`EntityGraph`] and refer to each other
//! by [`EntityId`]. A property holds a scalar, a nested entity owned by the
//! property's entity, or a reference to an independent entity. A nested
//! entity records its parent's id so the resolver can walk back towards the
//! root; nothing owns through that link.

mod binding;

use std::sync::Arc;

use compact_str::CompactString;
use hashbrown::{HashMap, HashSet};

use crate::error::{QuarryError, Result};
use crate::schema::Table;
use crate::value::Value;

/// Index of an entity in its [`EntityGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(usize);

impl EntityId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The content of one named property.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Value(Value),
    /// Owned sub-entity; removed together with its owner.
    Nested(EntityId),
    /// Independent entity, e.g. the target of a foreign key.
    Reference(EntityId),
}

impl Property {
    /// The entity this property points at, if any.
    #[inline]
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            Property::Value(_) => None,
            Property::Nested(id) | Property::Reference(id) => Some(*id),
        }
    }
}

/// One entity instance.
#[derive(Debug, Clone, Default)]
pub struct Entity {
    table: Option<Arc<Table>>,
    parent: Option<EntityId>,
    properties: HashMap<CompactString, Property>,
    read_only: HashSet<CompactString>,
}

impl Entity {
    #[inline]
    pub fn table(&self) -> Option<&Arc<Table>> {
        self.table.as_ref()
    }

    #[inline]
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    #[inline]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.properties.iter().map(|(name, p)| (name.as_str(), p))
    }

    #[inline]
    pub fn is_read_only(&self, name: &str) -> bool {
        self.read_only.contains(name)
    }
}

/// Arena of entities.
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    slots: Vec<Option<Entity>>,
}

impl EntityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a root entity, optionally typed by a table.
    pub fn create(&mut self, table: impl Into<Option<Arc<Table>>>) -> EntityId {
        self.insert(Entity {
            table: table.into(),
            ..Entity::default()
        })
    }

    /// Creates an untyped entity whose parent is `parent`. It is not yet
    /// stored under any of the parent's properties; see
    /// [`EntityGraph::attach_nested`].
    pub fn create_child(&mut self, parent: EntityId) -> Result<EntityId> {
        self.get(parent)?;
        Ok(self.insert(Entity {
            parent: Some(parent),
            ..Entity::default()
        }))
    }

    fn insert(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.slots.len());
        self.slots.push(Some(entity));
        id
    }

    #[inline]
    pub fn contains(&self, id: EntityId) -> bool {
        matches!(self.slots.get(id.0), Some(Some(_)))
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: EntityId) -> Result<&Entity> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| QuarryError::configuration(format!("unknown entity {id}")))
    }

    pub fn get_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| QuarryError::configuration(format!("unknown entity {id}")))
    }

    #[inline]
    pub fn parent(&self, id: EntityId) -> Result<Option<EntityId>> {
        Ok(self.get(id)?.parent)
    }

    pub fn property(&self, id: EntityId, name: &str) -> Result<Option<&Property>> {
        Ok(self.get(id)?.properties.get(name))
    }

    /// The scalar stored under `name`.
    ///
    /// An entity stored there is a [`QuarryError::Configuration`] error.
    pub fn value(&self, id: EntityId, name: &str) -> Result<Option<&Value>> {
        match self.property(id, name)? {
            None => Ok(None),
            Some(Property::Value(value)) => Ok(Some(value)),
            Some(_) => Err(QuarryError::configuration(format!(
                "property `{name}` of entity {id} holds an entity, not a value"
            ))),
        }
    }

    /// The entity stored under `name`. A NULL scalar counts as absent; any
    /// other scalar is a [`QuarryError::Configuration`] error.
    pub fn child(&self, id: EntityId, name: &str) -> Result<Option<EntityId>> {
        match self.property(id, name)? {
            None | Some(Property::Value(Value::Null)) => Ok(None),
            Some(Property::Nested(child) | Property::Reference(child)) => Ok(Some(*child)),
            Some(Property::Value(_)) => Err(QuarryError::configuration(format!(
                "property `{name}` of entity {id} holds a value, not an entity"
            ))),
        }
    }

    /// Marks `name` read-only; only forced writes may change it afterwards.
    pub fn mark_read_only(&mut self, id: EntityId, name: impl Into<CompactString>) -> Result<()> {
        self.get_mut(id)?.read_only.insert(name.into());
        Ok(())
    }

    pub(crate) fn check_writable(&self, id: EntityId, name: &str, force: bool) -> Result<()> {
        if !force && self.get(id)?.is_read_only(name) {
            return Err(QuarryError::ReadOnlyProperty {
                property: name.to_string(),
            });
        }
        Ok(())
    }

    /// Stores a scalar.
    pub fn set_value(
        &mut self,
        id: EntityId,
        name: &str,
        value: impl Into<Value>,
        force: bool,
    ) -> Result<()> {
        self.check_writable(id, name, force)?;
        if let Some(Property::Nested(_) | Property::Reference(_)) = self.property(id, name)? {
            return Err(QuarryError::configuration(format!(
                "property `{name}` of entity {id} holds an entity, not a value"
            )));
        }
        self.get_mut(id)?
            .properties
            .insert(CompactString::from(name), Property::Value(value.into()));
        Ok(())
    }

    /// Stores `child` as a nested entity of `parent` and re-parents it.
    ///
    /// The same child may be stored under several names of one parent.
    pub fn attach_nested(
        &mut self,
        parent: EntityId,
        name: &str,
        child: EntityId,
        force: bool,
    ) -> Result<()> {
        self.check_writable(parent, name, force)?;
        self.get_mut(child)?.parent = Some(parent);
        self.get_mut(parent)?
            .properties
            .insert(CompactString::from(name), Property::Nested(child));
        Ok(())
    }

    /// Stores a reference to an independent entity.
    pub fn attach_reference(
        &mut self,
        owner: EntityId,
        name: &str,
        target: EntityId,
        force: bool,
    ) -> Result<()> {
        self.check_writable(owner, name, force)?;
        self.get(target)?;
        self.get_mut(owner)?
            .properties
            .insert(CompactString::from(name), Property::Reference(target));
        Ok(())
    }

    /// Removes an entity and, recursively, every nested entity it owns.
    ///
    /// The entity is unlinked from its parent. Referenced entities survive;
    /// references pointing at a removed entity resolve to a
    /// [`QuarryError::Configuration`] error.
    pub fn remove(&mut self, id: EntityId) -> Result<()> {
        let parent = self.get(id)?.parent;
        if let Some(parent) = parent.and_then(|p| self.slots.get_mut(p.0)).and_then(Option::as_mut) {
            parent
                .properties
                .retain(|_, p| !matches!(p, Property::Nested(child) if *child == id));
        }

        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let Some(entity) = self.slots.get_mut(current.0).and_then(Option::take) else {
                continue;
            };
            pending.extend(entity.properties.values().filter_map(|p| match p {
                Property::Nested(child) => Some(*child),
                _ => None,
            }));
        }
        Ok(())
    }

    /// The nearest entity, starting at `id` and walking up through parents,
    /// that is typed by a table.
    pub fn owning_table(&self, id: EntityId) -> Result<(EntityId, &Arc<Table>)> {
        let mut current = id;
        loop {
            let entity = self.get(current)?;
            if let Some(table) = &entity.table {
                return Ok((current, table));
            }
            match entity.parent {
                Some(parent) => current = parent,
                None => {
                    return Err(QuarryError::configuration(format!(
                        "entity {id} has no table"
                    )));
                }
            }
        }
    }
}
