use super::Lookup;

/// Name of the hosting environment the process runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEnvironment {
    Development,
    Staging,
    Production,
    Other(String),
}

impl HostEnvironment {
    /// Reads APP_ENVIRONMENT (default: "Production").
    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        lookup("APP_ENVIRONMENT")
            .map(|name| Self::from_name(&name))
            .unwrap_or(HostEnvironment::Production)
    }

    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name.eq_ignore_ascii_case("development") {
            HostEnvironment::Development
        } else if name.eq_ignore_ascii_case("staging") {
            HostEnvironment::Staging
        } else if name.eq_ignore_ascii_case("production") || name.is_empty() {
            HostEnvironment::Production
        } else {
            HostEnvironment::Other(name.to_string())
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, HostEnvironment::Development)
    }
}

impl std::fmt::Display for HostEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostEnvironment::Development => write!(f, "Development"),
            HostEnvironment::Staging => write!(f, "Staging"),
            HostEnvironment::Production => write!(f, "Production"),
            HostEnvironment::Other(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::map_lookup;

    #[test]
    fn should_default_to_production() {
        assert_eq!(
            HostEnvironment::from_lookup(&map_lookup(&[])),
            HostEnvironment::Production
        );
    }

    #[test]
    fn should_match_names_case_insensitively() {
        assert!(HostEnvironment::from_name("development").is_development());
        assert!(HostEnvironment::from_name("DEVELOPMENT").is_development());
        assert_eq!(HostEnvironment::from_name("Staging"), HostEnvironment::Staging);
    }

    #[test]
    fn should_keep_custom_environment_names() {
        let env = HostEnvironment::from_name("QA");
        assert_eq!(env, HostEnvironment::Other("QA".to_string()));
        assert!(!env.is_development());
        assert_eq!(env.to_string(), "QA");
    }
}
