use super::context::AuthenticationContext;

/// Path matcher used by access rules.
///
/// `"/auth/**"` matches `/auth` and everything below it, `"/**"` matches every
/// path, anything else must match exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Any,
    Exact(String),
    Prefix(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some("") => PathPattern::Any,
            Some(prefix) => PathPattern::Prefix(prefix.to_string()),
            None if pattern == "**" => PathPattern::Any,
            None => PathPattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Any => true,
            PathPattern::Exact(exact) => path == exact,
            PathPattern::Prefix(prefix) => match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }
}

/// What a request must carry to pass a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
    /// Authenticated and holding the named authority.
    Authority(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    pub pattern: PathPattern,
    pub requirement: Requirement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    /// No identity where one is needed (401).
    AuthenticationRequired,
    /// Identity present but not allowed (403).
    AccessDenied,
}

/// Ordered rule table mapping request paths to requirements.
///
/// Rules are evaluated top-down and the first match wins. Paths no rule
/// matches fall back to `Requirement::Authenticated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationPolicy {
    rules: Vec<AccessRule>,
    fallback: Requirement,
}

impl AuthorizationPolicy {
    /// Empty table: every path requires authentication.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: Requirement::Authenticated,
        }
    }

    /// Forum rules: login and registration are public, everything else is not.
    pub fn forum() -> Self {
        Self::new().permit_all("/auth/**")
    }

    pub fn rule(mut self, pattern: &str, requirement: Requirement) -> Self {
        self.rules.push(AccessRule {
            pattern: PathPattern::parse(pattern),
            requirement,
        });
        self
    }

    pub fn permit_all(self, pattern: &str) -> Self {
        self.rule(pattern, Requirement::Public)
    }

    pub fn authenticated(self, pattern: &str) -> Self {
        self.rule(pattern, Requirement::Authenticated)
    }

    pub fn has_authority(self, pattern: &str, authority: &str) -> Self {
        self.rule(pattern, Requirement::Authority(authority.to_string()))
    }

    /// Requirement of the first rule matching `path`, or the fallback.
    pub fn requirement_for(&self, path: &str) -> &Requirement {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map(|rule| &rule.requirement)
            .unwrap_or(&self.fallback)
    }

    pub fn evaluate(
        &self,
        path: &str,
        context: Option<&AuthenticationContext>,
    ) -> AccessDecision {
        match (self.requirement_for(path), context) {
            (Requirement::Public, _) => AccessDecision::Granted,
            (_, None) => AccessDecision::AuthenticationRequired,
            (Requirement::Authenticated, Some(_)) => AccessDecision::Granted,
            (Requirement::Authority(authority), Some(context)) => {
                if context.has_authority(authority) {
                    AccessDecision::Granted
                } else {
                    AccessDecision::AccessDenied
                }
            }
        }
    }
}

impl Default for AuthorizationPolicy {
    fn default() -> Self {
        Self::forum()
    }
}
