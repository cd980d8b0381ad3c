use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use menu_types::{ActorId, OrganizationId};

use crate::error::{MenuError, MenuResult};

/// An actor's role within one organization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Admin,
    Editor,
    Viewer,
}

impl Role {
    pub fn can_publish(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin | Self::Editor)
    }

    pub fn can_record_prices(&self) -> bool {
        !matches!(self, Self::Viewer)
    }
}

/// Identity collaborator: who belongs to which organization, with what role.
pub trait ActorDirectory: Send + Sync {
    /// `Ok(None)` when the actor is not a member.
    fn role_of(&self, actor: &ActorId, org: &OrganizationId) -> MenuResult<Option<Role>>;
}

#[derive(Debug, Default)]
pub struct InMemoryActorDirectory {
    members: RwLock<HashMap<(ActorId, OrganizationId), Role>>,
}

impl InMemoryActorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(&self, actor: ActorId, org: OrganizationId, role: Role) -> MenuResult<()> {
        self.members
            .write()
            .map_err(|_| MenuError::Storage("actor directory lock poisoned".into()))?
            .insert((actor, org), role);
        Ok(())
    }

    pub fn remove_member(&self, actor: &ActorId, org: &OrganizationId) -> MenuResult<bool> {
        Ok(self
            .members
            .write()
            .map_err(|_| MenuError::Storage("actor directory lock poisoned".into()))?
            .remove(&(actor.clone(), org.clone()))
            .is_some())
    }
}

impl ActorDirectory for InMemoryActorDirectory {
    fn role_of(&self, actor: &ActorId, org: &OrganizationId) -> MenuResult<Option<Role>> {
        let members = self
            .members
            .read()
            .map_err(|_| MenuError::Storage("actor directory lock poisoned".into()))?;
        Ok(members.get(&(actor.clone(), org.clone())).copied())
    }
}
