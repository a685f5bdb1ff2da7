#![warn(missing_docs)]

//! 2D sketch entity, variable, and constraint model for the pcad solver.
//!
//! A [`Sketch`] owns three registries: entities (the 2D primitives), the
//! flat variable vector the solver iterates on, and constraints. Entities
//! decompose into scalar variables on insertion; solved values are written
//! back through the tagged variable descriptors.
//!
//! # Example
//!
//! ```
//! use pcad_sketch::{EntityGeometry, Sketch};
//! use pcad_math::Point2;
//!
//! let mut sketch = Sketch::new();
//! let line = sketch.add_entity(EntityGeometry::Line {
//!     start: Point2::new(0.0, 0.0),
//!     end: Point2::new(5.0, 3.0),
//! });
//! assert_eq!(sketch.variable_count(), 4);
//! assert!(sketch.entity(line).is_some());
//! ```

mod constraint;
mod entity;

pub use constraint::{Constraint, ConstraintId, ConstraintKind};
pub use entity::{Entity, EntityGeometry, EntityId, PointRef, VarKind, Variable, MIN_RADIUS};

use thiserror::Error;

/// Errors from sketch registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SketchError {
    /// The referenced entity does not exist in this sketch.
    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),

    /// The referenced constraint does not exist in this sketch.
    #[error("unknown constraint {0:?}")]
    UnknownConstraint(ConstraintId),

    /// The constraint kind has no scalar target to update.
    #[error("constraint {0:?} has no scalar target")]
    NoTarget(ConstraintId),
}

/// An instantiable 2D sketch: entities, variables, and constraints.
///
/// One sketch per editing session; there are no process-wide registries.
/// The solver takes `&mut Sketch` for the duration of a solve, which
/// serializes re-entrant solve attempts at compile time.
#[derive(Debug, Clone, Default)]
pub struct Sketch {
    entities: Vec<Entity>,
    constraints: Vec<Constraint>,
    variables: Vec<Variable>,
    next_entity: u64,
    next_constraint: u64,
}

impl Sketch {
    /// Create an empty sketch.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Entity registry
    // =========================================================================

    /// Add an entity and append its variables to the variable vector.
    ///
    /// New variables take the vector's current length as their first
    /// index; indices are never reused while the entity set is stable.
    pub fn add_entity(&mut self, geometry: EntityGeometry) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        let entity = Entity {
            id,
            geometry,
            construction: false,
            version: 0,
        };
        for (kind, point, value) in entity.variables() {
            self.variables.push(Variable {
                entity: id,
                kind,
                point,
                value,
            });
        }
        self.entities.push(entity);
        id
    }

    /// Remove an entity, cascading removal of every constraint that
    /// references it, and rebuild the variable vector.
    ///
    /// Variable indices are NOT stable across this call; callers must not
    /// cache indices across add/remove cycles.
    pub fn remove_entity(&mut self, id: EntityId) -> Result<(), SketchError> {
        let pos = self
            .entities
            .iter()
            .position(|e| e.id == id)
            .ok_or(SketchError::UnknownEntity(id))?;
        self.entities.remove(pos);
        self.constraints.retain(|c| !c.kind.entity_ids().contains(&id));
        self.rebuild_variables();
        Ok(())
    }

    /// Look up an entity by id.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Iterate all entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Number of entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Replace an entity's geometry (interactive edit path).
    ///
    /// Bumps the version and rebuilds the variable vector, since the new
    /// geometry may contribute a different variable set.
    pub fn replace_geometry(
        &mut self,
        id: EntityId,
        geometry: EntityGeometry,
    ) -> Result<(), SketchError> {
        let entity = self
            .entities
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(SketchError::UnknownEntity(id))?;
        entity.geometry = geometry;
        entity.version += 1;
        self.rebuild_variables();
        Ok(())
    }

    /// Mark or unmark an entity as construction geometry.
    pub fn set_construction(&mut self, id: EntityId, construction: bool) -> Result<(), SketchError> {
        let entity = self
            .entities
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(SketchError::UnknownEntity(id))?;
        entity.construction = construction;
        entity.version += 1;
        Ok(())
    }

    // =========================================================================
    // Variable vector
    // =========================================================================

    /// The solver's unknown vector.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Number of free variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Current value of variable `index`, or 0.0 when out of range.
    pub fn variable_value(&self, index: usize) -> f64 {
        self.variables.get(index).map(|v| v.value).unwrap_or(0.0)
    }

    /// Write a solved value through to the owning entity field.
    ///
    /// Out-of-range indices and stale descriptors are ignored; a solve in
    /// progress must not be derailed by a single bad write.
    pub fn set_variable(&mut self, index: usize, value: f64) {
        let Some(var) = self.variables.get(index).copied() else {
            return;
        };
        if let Some(entity) = self.entities.iter_mut().find(|e| e.id == var.entity) {
            if entity.apply_variable(var.kind, var.point, value) {
                self.variables[index].value = value;
            }
        }
    }

    /// Rebuild the variable vector from current entity state.
    ///
    /// Called after structural changes; also usable to resynchronize the
    /// vector after direct geometry edits.
    pub fn rebuild_variables(&mut self) {
        self.variables.clear();
        for entity in &self.entities {
            for (kind, point, value) in entity.variables() {
                self.variables.push(Variable {
                    entity: entity.id,
                    kind,
                    point,
                    value,
                });
            }
        }
    }

    /// Variable indices the given constraint kind depends on: every
    /// variable contributed by its referenced entities.
    ///
    /// Entries the residual does not actually react to are harmless; the
    /// Jacobian builder drops their near-zero derivatives.
    pub fn dependencies_of(&self, kind: &ConstraintKind) -> Vec<usize> {
        let ids = kind.entity_ids();
        self.variables
            .iter()
            .enumerate()
            .filter(|(_, v)| ids.contains(&v.entity))
            .map(|(i, _)| i)
            .collect()
    }

    // =========================================================================
    // Constraint registry
    // =========================================================================

    /// Register a constraint. Every referenced entity must exist.
    pub fn add_constraint(&mut self, kind: ConstraintKind) -> Result<ConstraintId, SketchError> {
        for id in kind.entity_ids() {
            if self.entity(id).is_none() {
                return Err(SketchError::UnknownEntity(id));
            }
        }
        let id = ConstraintId(self.next_constraint);
        self.next_constraint += 1;
        self.constraints.push(Constraint {
            id,
            kind,
            locked: false,
            priority: 0,
            version: 0,
        });
        Ok(id)
    }

    /// Remove a constraint by id.
    pub fn remove_constraint(&mut self, id: ConstraintId) -> Result<(), SketchError> {
        let pos = self
            .constraints
            .iter()
            .position(|c| c.id == id)
            .ok_or(SketchError::UnknownConstraint(id))?;
        self.constraints.remove(pos);
        Ok(())
    }

    /// Look up a constraint by id.
    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.id == id)
    }

    /// Iterate all constraints in insertion order.
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    /// Number of registered constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Update the scalar target of a dimensional constraint.
    pub fn set_constraint_target(
        &mut self,
        id: ConstraintId,
        value: f64,
    ) -> Result<(), SketchError> {
        let constraint = self
            .constraints
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(SketchError::UnknownConstraint(id))?;
        if !constraint.kind.set_target(value) {
            return Err(SketchError::NoTarget(id));
        }
        constraint.version += 1;
        Ok(())
    }

    /// Evaluate every constraint's residual, in registry order.
    ///
    /// Read-only on entities; the returned vector is the solver's
    /// residual vector.
    pub fn residuals(&self) -> Vec<f64> {
        self.constraints
            .iter()
            .map(|c| c.kind.residual(self))
            .collect()
    }
}
