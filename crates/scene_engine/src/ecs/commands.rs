//! Deferred scene edits
//!
//! Component hooks run while the scene is mutably borrowed, so structural
//! changes (destroying entities, reparenting, removing components) are queued
//! here and applied by the scene once the current pass has finished.

use super::component::ComponentId;
use super::entity::EntityId;

/// A single queued scene edit
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Destroy an entity and its subtree
    Destroy(EntityId),
    /// Toggle an entity's active flag
    SetActive {
        /// Target entity
        entity: EntityId,
        /// New active flag
        active: bool,
    },
    /// Attach `child` under `parent`, or detach it when `parent` is `None`
    SetParent {
        /// Entity being moved
        child: EntityId,
        /// New parent
        parent: Option<EntityId>,
    },
    /// Remove one component, running its destroy hook
    RemoveComponent {
        /// Owning entity
        entity: EntityId,
        /// Component to remove
        component: ComponentId,
    },
}

/// Queue of deferred scene edits
#[derive(Debug, Default, Clone)]
pub struct Commands {
    queue: Vec<Command>,
}

impl Commands {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue destruction of an entity and its subtree
    pub fn destroy(&mut self, entity: EntityId) {
        self.queue.push(Command::Destroy(entity));
    }

    /// Queue an active-flag change
    pub fn set_active(&mut self, entity: EntityId, active: bool) {
        self.queue.push(Command::SetActive { entity, active });
    }

    /// Queue a reparent
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) {
        self.queue.push(Command::SetParent { child, parent });
    }

    /// Queue removal of a component
    pub fn remove_component(&mut self, entity: EntityId, component: ComponentId) {
        self.queue.push(Command::RemoveComponent { entity, component });
    }

    /// Queue an already-built command
    pub fn push(&mut self, command: Command) {
        self.queue.push(command);
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every queued command
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Move every command out of `other` into this queue, keeping order
    pub fn append(&mut self, other: &mut Commands) {
        self.queue.append(&mut other.queue);
    }

    pub(crate) fn take_all(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_keep_order() {
        let a = EntityId::new();
        let b = EntityId::new();
        let mut commands = Commands::new();
        commands.set_active(a, false);
        commands.destroy(b);

        let mut other = Commands::new();
        other.set_parent(a, Some(b));
        commands.append(&mut other);

        assert!(other.is_empty());
        assert_eq!(
            commands.take_all(),
            vec![
                Command::SetActive { entity: a, active: false },
                Command::Destroy(b),
                Command::SetParent { child: a, parent: Some(b) },
            ]
        );
        assert!(commands.is_empty());
    }
}
