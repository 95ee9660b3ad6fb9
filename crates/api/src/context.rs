use fellowship_auth::Principal;

/// Identity of the caller for one request.
///
/// Anonymous requests carry no principal. Handlers receive this explicitly
/// and pass the principal on to every policy decision.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct PrincipalContext {
    principal: Option<Principal>,
}

impl PrincipalContext {
    pub fn anonymous() -> Self {
        Self { principal: None }
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}
