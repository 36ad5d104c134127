//! Session identity and the access gate.
//!
//! Authentication sits behind the [`Authenticator`] trait. The only
//! implementation, [`DemoAuthenticator`], accepts any non-empty credentials
//! and must be replaced before this code is used outside a demo.

use crate::{Error, Result, Role, User};

/// Credential check performed at login
pub trait Authenticator {
    fn authenticate(&self, username: &str, password: &str, role: Role) -> Result<User>;
}

/// Accepts any non-empty username and password without verification
#[derive(Clone, Copy, Debug, Default)]
pub struct DemoAuthenticator;

impl Authenticator for DemoAuthenticator {
    fn authenticate(&self, username: &str, password: &str, role: Role) -> Result<User> {
        if username.is_empty() || password.is_empty() {
            return Err(Error::Authentication(
                "enter username and password".into(),
            ));
        }
        Ok(User {
            name: username.to_string(),
            role,
        })
    }
}

/// Actions that may be restricted by role
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Export,
    Delete,
    Edit,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Export => "export",
            Action::Delete => "delete",
            Action::Edit => "edit",
        }
    }
}

/// The current user, or a guest when nobody is logged in
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    /// Start a guest session
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    /// Header label: the role label, or `Guest`
    pub fn role_label(&self) -> &'static str {
        self.role().map(Role::label).unwrap_or("Guest")
    }

    /// Replace the session user wholesale with whoever the authenticator accepts
    pub fn login(
        &mut self,
        auth: &dyn Authenticator,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<&User> {
        let user = auth.authenticate(username, password, role)?;
        tracing::info!("Logged in as {} ({})", user.name, user.role.label());
        Ok(self.user.insert(user))
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::info!("Logged out {}", user.name);
        }
    }

    pub fn can_export(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    pub fn can_delete(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    /// Editing is open to every session, guests included.
    pub fn can_edit(&self) -> bool {
        true
    }

    pub fn permits(&self, action: Action) -> bool {
        match action {
            Action::Export => self.can_export(),
            Action::Delete => self.can_delete(),
            Action::Edit => self.can_edit(),
        }
    }

    /// Fail with `PermissionDenied` unless the session may perform `action`
    pub fn require(&self, action: Action) -> Result<()> {
        if self.permits(action) {
            return Ok(());
        }
        tracing::warn!(
            "Denied {} for {}",
            action.as_str(),
            self.role_label()
        );
        Err(Error::PermissionDenied {
            action: action.as_str(),
            role: self.role(),
        })
    }
}
