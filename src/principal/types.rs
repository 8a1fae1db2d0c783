/// Which proxy group of a principal a delegate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyMode {
    Read,
    Write,
}

impl ProxyMode {
    /// Name of the proxy group collection below a principal.
    pub fn group_name(self) -> &'static str {
        match self {
            ProxyMode::Read => "calendar-proxy-read",
            ProxyMode::Write => "calendar-proxy-write",
        }
    }
}

/// A calendar home the current principal can reach as a proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxiedFor {
    pub href: String,
    pub mode: ProxyMode,
}

/// `delegate` acting on behalf of `principal` with the rights of `mode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRelation {
    /// Principal URL of the account being delegated.
    pub principal: String,
    /// User id of the delegate, e.g. `bob` for `principals/bob`.
    pub delegate: String,
    pub mode: ProxyMode,
}

impl ProxyRelation {
    pub fn new(principal: impl Into<String>, delegate: impl Into<String>, mode: ProxyMode) -> Self {
        Self {
            principal: principal.into(),
            delegate: delegate.into(),
            mode,
        }
    }

    /// URL of the proxy group whose `group-member-set` holds the delegate.
    pub fn group_url(&self) -> String {
        format!(
            "{}/{}/",
            self.principal.trim_end_matches('/'),
            self.mode.group_name()
        )
    }
}
