//! Admin privilege checks.

use tracing::warn;

use teamline_store::MembershipStore;

/// Result of an admin lookup.
///
/// Absent records and store errors both come back as non-admin: privilege
/// fails closed, and this call never errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminCheck {
    pub is_admin: bool,
    pub group_name: Option<String>,
}

pub async fn check_admin(store: &dyn MembershipStore, phone: &str) -> AdminCheck {
    match store.get_user(phone).await {
        Ok(Some(user)) => AdminCheck {
            is_admin: user.is_admin,
            group_name: user.group_name,
        },
        Ok(None) => AdminCheck::default(),
        Err(e) => {
            warn!(phone, error = %e, "admin lookup failed, treating as non-admin");
            AdminCheck::default()
        },
    }
}

/// Reason a group write was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteDenied {
    NotAdmin,
    /// Admins may only write within their own group.
    WrongGroup,
}

impl std::fmt::Display for WriteDenied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAdmin => write!(f, "sender is not an admin"),
            Self::WrongGroup => write!(f, "you can only update your own group"),
        }
    }
}

/// Authorize a broadcast/schedule write against `target_group`.
///
/// Requires an admin whose own group equals the target. Callers derive the
/// target from the admin's record, never from the message, so `WrongGroup`
/// is a hard invariant rather than a routine denial.
pub fn authorize_group_write(check: &AdminCheck, target_group: &str) -> Result<(), WriteDenied> {
    if !check.is_admin {
        return Err(WriteDenied::NotAdmin);
    }
    if check.group_name.as_deref() != Some(target_group) {
        return Err(WriteDenied::WrongGroup);
    }
    Ok(())
}
