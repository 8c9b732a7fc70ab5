use std::fmt;
use std::str::FromStr;

use crate::error::ConnectError;

/// Social provider families an account can be connected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Twitter,
    Facebook,
    LinkedIn,
    TripIt,
}

/// Static description of a provider's API family.
#[derive(Debug)]
pub struct ProviderSpec {
    pub kind: ProviderKind,
    /// Stable identifier stored in the `provider` column (e.g., "twitter").
    pub id: &'static str,
    pub display_name: &'static str,
    pub api_base_url: &'static str,
}

/// Lookup table, indexed by `ProviderKind as usize`.
static PROVIDERS: [ProviderSpec; 4] = [
    ProviderSpec {
        kind: ProviderKind::Twitter,
        id: "twitter",
        display_name: "Twitter",
        api_base_url: "https://api.twitter.com/1.1",
    },
    ProviderSpec {
        kind: ProviderKind::Facebook,
        id: "facebook",
        display_name: "Facebook",
        api_base_url: "https://graph.facebook.com",
    },
    ProviderSpec {
        kind: ProviderKind::LinkedIn,
        id: "linkedin",
        display_name: "LinkedIn",
        api_base_url: "https://api.linkedin.com/v1",
    },
    ProviderSpec {
        kind: ProviderKind::TripIt,
        id: "tripit",
        display_name: "TripIt",
        api_base_url: "https://api.tripit.com/v1",
    },
];

impl ProviderKind {
    /// All known providers, in table order.
    pub fn all() -> impl Iterator<Item = ProviderKind> {
        PROVIDERS.iter().map(|spec| spec.kind)
    }

    pub fn spec(self) -> &'static ProviderSpec {
        &PROVIDERS[self as usize]
    }

    pub fn id(self) -> &'static str {
        self.spec().id
    }

    pub fn display_name(self) -> &'static str {
        self.spec().display_name
    }

    /// Get a provider by its stored identifier.
    pub fn from_id(id: &str) -> Option<ProviderKind> {
        PROVIDERS
            .iter()
            .find(|spec| spec.id.eq_ignore_ascii_case(id))
            .map(|spec| spec.kind)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderKind {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderKind::from_id(s).ok_or_else(|| ConnectError::UnknownProvider(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_kind() {
        for kind in ProviderKind::all() {
            assert_eq!(kind.spec().kind, kind);
        }
    }

    #[test]
    fn parses_ids_case_insensitively() {
        assert_eq!("twitter".parse::<ProviderKind>().unwrap(), ProviderKind::Twitter);
        assert_eq!("LinkedIn".parse::<ProviderKind>().unwrap(), ProviderKind::LinkedIn);
        assert!(matches!(
            "myspace".parse::<ProviderKind>(),
            Err(ConnectError::UnknownProvider(id)) if id == "myspace"
        ));
    }

    #[test]
    fn display_uses_stored_id() {
        assert_eq!(ProviderKind::TripIt.to_string(), "tripit");
        assert_eq!(ProviderKind::Facebook.display_name(), "Facebook");
    }
}
