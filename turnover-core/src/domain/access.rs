//! Caller identity resolved upstream by the authenticating proxy.

use turnover_model::{Property, UserId};

use crate::error::{Result, TurnoverError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Admin { id: UserId },
    Owner { id: UserId },
}

impl Actor {
    pub fn id(&self) -> UserId {
        match self {
            Actor::Admin { id } | Actor::Owner { id } => *id,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Actor::Admin { .. })
    }

    /// Admins act on any property; owners only on their own.
    pub fn authorize_for(&self, property: &Property) -> Result<()> {
        match self {
            Actor::Admin { .. } => Ok(()),
            Actor::Owner { id } if *id == property.owner_id => Ok(()),
            Actor::Owner { id } => Err(TurnoverError::Forbidden(format!(
                "user {id} does not own property {}",
                property.id
            ))),
        }
    }

    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(TurnoverError::Forbidden(
                "operation requires an administrator".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::property;

    #[test]
    fn owner_is_limited_to_own_property() {
        let property = property();
        let owner = Actor::Owner {
            id: property.owner_id,
        };
        let stranger = Actor::Owner { id: UserId::new() };

        assert!(owner.authorize_for(&property).is_ok());
        assert!(matches!(
            stranger.authorize_for(&property),
            Err(TurnoverError::Forbidden(_))
        ));
        assert!(owner.require_admin().is_err());
    }

    #[test]
    fn admin_may_act_anywhere() {
        let admin = Actor::Admin { id: UserId::new() };
        assert!(admin.authorize_for(&property()).is_ok());
        assert!(admin.require_admin().is_ok());
    }
}
