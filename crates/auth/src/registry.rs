use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chaintrack_core::{Aggregate, DomainError, DomainResult, Identity};
use chaintrack_events::Event;

use crate::Role;

/// Event: the ledger got its admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerInitialized {
    pub admin: Identity,
    pub occurred_at: DateTime<Utc>,
}

/// Event: `account` was granted `role` (emitted even when it already held it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGranted {
    pub account: Identity,
    pub role: Role,
    pub granted_by: Identity,
    pub occurred_at: DateTime<Utc>,
}

/// Event: `role` was removed from `account` (emitted even when it was not held).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRevoked {
    pub account: Identity,
    pub role: Role,
    pub revoked_by: Identity,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleEvent {
    LedgerInitialized(LedgerInitialized),
    RoleGranted(RoleGranted),
    RoleRevoked(RoleRevoked),
}

impl Event for RoleEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RoleEvent::LedgerInitialized(_) => "auth.ledger.initialized",
            RoleEvent::RoleGranted(_) => "auth.role.granted",
            RoleEvent::RoleRevoked(_) => "auth.role.revoked",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            RoleEvent::LedgerInitialized(e) => e.occurred_at,
            RoleEvent::RoleGranted(e) => e.occurred_at,
            RoleEvent::RoleRevoked(e) => e.occurred_at,
        }
    }
}

/// Aggregate: who holds which role.
///
/// Invariants:
/// - there is at most one admin and it never changes once set;
/// - the admin always holds `Manufacturer` and `Handler`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleRegistry {
    admin: Option<Identity>,
    manufacturers: BTreeSet<Identity>,
    handlers: BTreeSet<Identity>,
    version: u64,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admin(&self) -> Option<&Identity> {
        self.admin.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.admin.is_some()
    }

    /// Pure lookup.
    pub fn has(&self, role: Role, identity: &Identity) -> bool {
        match role {
            Role::Admin => self.admin.as_ref() == Some(identity),
            Role::Manufacturer => self.manufacturers.contains(identity),
            Role::Handler => self.handlers.contains(identity),
        }
    }

    /// Identities currently holding `role`, in sorted order.
    pub fn holders(&self, role: Role) -> Vec<&Identity> {
        match role {
            Role::Admin => self.admin.iter().collect(),
            Role::Manufacturer => self.manufacturers.iter().collect(),
            Role::Handler => self.handlers.iter().collect(),
        }
    }

    /// Fail with `Unauthorized` unless `caller` holds `role`.
    pub fn require(&self, role: Role, caller: &Identity) -> DomainResult<()> {
        if self.has(role, caller) {
            Ok(())
        } else {
            Err(DomainError::unauthorized(format!("{caller} does not hold {role}")))
        }
    }

    pub fn initialize(&self, admin: &Identity, at: DateTime<Utc>) -> DomainResult<Vec<RoleEvent>> {
        if self.is_initialized() {
            return Err(DomainError::AlreadyInitialized);
        }
        ensure_identity(admin)?;

        Ok(vec![RoleEvent::LedgerInitialized(LedgerInitialized {
            admin: admin.clone(),
            occurred_at: at,
        })])
    }

    pub fn grant(
        &self,
        role: Role,
        account: &Identity,
        caller: &Identity,
        at: DateTime<Utc>,
    ) -> DomainResult<Vec<RoleEvent>> {
        self.require(Role::Admin, caller)?;
        ensure_grantable(role)?;
        ensure_identity(account)?;

        Ok(vec![RoleEvent::RoleGranted(RoleGranted {
            account: account.clone(),
            role,
            granted_by: caller.clone(),
            occurred_at: at,
        })])
    }

    pub fn revoke(
        &self,
        role: Role,
        account: &Identity,
        caller: &Identity,
        at: DateTime<Utc>,
    ) -> DomainResult<Vec<RoleEvent>> {
        self.require(Role::Admin, caller)?;
        ensure_grantable(role)?;
        if self.admin.as_ref() == Some(account) {
            return Err(DomainError::invalid_input(format!(
                "the ledger admin always holds {role}"
            )));
        }

        Ok(vec![RoleEvent::RoleRevoked(RoleRevoked {
            account: account.clone(),
            role,
            revoked_by: caller.clone(),
            occurred_at: at,
        })])
    }

    fn set_mut(&mut self, role: Role) -> Option<&mut BTreeSet<Identity>> {
        match role {
            Role::Admin => None,
            Role::Manufacturer => Some(&mut self.manufacturers),
            Role::Handler => Some(&mut self.handlers),
        }
    }
}

impl Aggregate for RoleRegistry {
    type Event = RoleEvent;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            RoleEvent::LedgerInitialized(e) => {
                self.admin = Some(e.admin.clone());
                self.manufacturers.insert(e.admin.clone());
                self.handlers.insert(e.admin.clone());
            }
            RoleEvent::RoleGranted(e) => {
                if let Some(set) = self.set_mut(e.role) {
                    set.insert(e.account.clone());
                }
            }
            RoleEvent::RoleRevoked(e) => {
                if let Some(set) = self.set_mut(e.role) {
                    set.remove(&e.account);
                }
            }
        }

        self.version += 1;
    }

    fn version(&self) -> u64 {
        self.version
    }
}

fn ensure_grantable(role: Role) -> DomainResult<()> {
    if role.is_grantable() {
        Ok(())
    } else {
        Err(DomainError::invalid_input("ADMIN is fixed at initialization"))
    }
}

fn ensure_identity(identity: &Identity) -> DomainResult<()> {
    if identity.as_str().trim().is_empty() {
        return Err(DomainError::invalid_input("identity cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Identity {
        Identity::new("0xADMIN")
    }

    fn initialized() -> RoleRegistry {
        let mut registry = RoleRegistry::new();
        for ev in registry.initialize(&admin(), Utc::now()).unwrap() {
            registry.apply(&ev);
        }
        registry
    }

    fn run(registry: &mut RoleRegistry, events: DomainResult<Vec<RoleEvent>>) {
        for ev in events.unwrap() {
            registry.apply(&ev);
        }
    }

    #[test]
    fn initialize_makes_admin_manufacturer_and_handler() {
        let registry = initialized();

        assert_eq!(registry.admin(), Some(&admin()));
        assert!(registry.has(Role::Admin, &admin()));
        assert!(registry.has(Role::Manufacturer, &admin()));
        assert!(registry.has(Role::Handler, &admin()));
        assert_eq!(registry.version(), 1);
    }

    #[test]
    fn initialize_twice_fails() {
        let registry = initialized();
        let err = registry.initialize(&Identity::new("0xOTHER"), Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::AlreadyInitialized);
    }

    #[test]
    fn initialize_rejects_blank_identity() {
        let err = RoleRegistry::new().initialize(&Identity::new("  "), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn admin_grants_and_revokes_manufacturer() {
        let mut registry = initialized();
        let m = Identity::new("0xM");

        let granted = registry.grant(Role::Manufacturer, &m, &admin(), Utc::now());
        run(&mut registry, granted);
        assert!(registry.has(Role::Manufacturer, &m));
        assert!(!registry.has(Role::Handler, &m));

        let revoked = registry.revoke(Role::Manufacturer, &m, &admin(), Utc::now());
        run(&mut registry, revoked);
        assert!(!registry.has(Role::Manufacturer, &m));
    }

    #[test]
    fn granting_a_held_role_still_emits_an_event() {
        let mut registry = initialized();
        let h = Identity::new("0xH");

        let first = registry.grant(Role::Handler, &h, &admin(), Utc::now());
        run(&mut registry, first);
        let again = registry.grant(Role::Handler, &h, &admin(), Utc::now()).unwrap();

        assert_eq!(again.len(), 1);
        assert!(matches!(&again[0], RoleEvent::RoleGranted(e) if e.account == h));
    }

    #[test]
    fn revoking_an_unheld_role_is_a_noop_with_event() {
        let mut registry = initialized();
        let h = Identity::new("0xH");
        let before = registry.holders(Role::Handler).len();

        let revoked = registry.revoke(Role::Handler, &h, &admin(), Utc::now());
        run(&mut registry, revoked);

        assert_eq!(registry.holders(Role::Handler).len(), before);
    }

    #[test]
    fn non_admin_cannot_grant_or_revoke() {
        let mut registry = initialized();
        let m = Identity::new("0xM");
        let granted = registry.grant(Role::Manufacturer, &m, &admin(), Utc::now());
        run(&mut registry, granted);

        let err = registry
            .grant(Role::Handler, &Identity::new("0xX"), &m, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));

        let err = registry.revoke(Role::Manufacturer, &m, &m, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[test]
    fn uninitialized_registry_authorizes_nobody() {
        let registry = RoleRegistry::new();
        let err = registry
            .grant(Role::Handler, &Identity::new("0xH"), &admin(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[test]
    fn admin_role_cannot_be_granted_or_revoked() {
        let registry = initialized();
        let other = Identity::new("0xOTHER");

        let err = registry.grant(Role::Admin, &other, &admin(), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));

        let err = registry.revoke(Role::Admin, &admin(), &admin(), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn admin_keeps_its_operational_roles() {
        let registry = initialized();
        let err = registry
            .revoke(Role::Handler, &admin(), &admin(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn decisions_do_not_mutate_state() {
        let registry = initialized();
        let snapshot = registry.clone();

        let _ = registry.grant(Role::Handler, &Identity::new("0xH"), &admin(), Utc::now());
        let _ = registry.revoke(Role::Manufacturer, &Identity::new("0xM"), &admin(), Utc::now());

        assert_eq!(registry, snapshot);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: grant then has == true; a later revoke makes it false again.
            #[test]
            fn grant_then_revoke_round_trips(
                account in "0x[0-9a-f]{8}",
                manufacturer in any::<bool>(),
            ) {
                let role = if manufacturer { Role::Manufacturer } else { Role::Handler };
                let account = Identity::new(account);
                let mut registry = initialized();

                let granted = registry.grant(role, &account, &admin(), Utc::now()).unwrap();
                for ev in &granted {
                    registry.apply(ev);
                }
                prop_assert!(registry.has(role, &account));

                let revoked = registry.revoke(role, &account, &admin(), Utc::now()).unwrap();
                for ev in &revoked {
                    registry.apply(ev);
                }
                prop_assert!(!registry.has(role, &account));
                prop_assert!(registry.has(role, &admin()));
            }
        }
    }
}
