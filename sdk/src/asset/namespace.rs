//! Namespace ids and the well-known asset namespaces.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{digest_words, parse_id_hex};
use crate::config::{NAMESPACE_BIT, NAMESPACE_MAX_DEPTH, NAMESPACE_MAX_PART_LENGTH};
use crate::crypto::hash::sha3_256_multi;
use crate::identity::IdentityError;
use crate::uint64::Uint64Dto;

/// Identifier of a namespace at any depth.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Uint64Dto", into = "Uint64Dto")]
pub struct NamespaceId(u64);

impl NamespaceId {
    /// Parent of every root namespace.
    pub const ROOT: NamespaceId = NamespaceId(0);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Id of the leaf of a dotted name such as `prx.xpx`.
    pub fn from_name(name: &str) -> Result<Self, IdentityError> {
        let path = Self::namespace_path(name)?;
        // Non-empty: namespace_path rejects names without parts.
        Ok(path[path.len() - 1])
    }

    /// Ids of every level of a dotted name, root first.
    pub fn namespace_path(name: &str) -> Result<Vec<NamespaceId>, IdentityError> {
        let parts = split_name(name)?;
        let mut parent = Self::ROOT;
        Ok(parts
            .into_iter()
            .map(|part| {
                parent = parent.child(part);
                parent
            })
            .collect())
    }

    /// Id of `part` directly below `self`.
    fn child(self, part: &str) -> NamespaceId {
        let words = Uint64Dto::from_u64(self.0);
        let digest = sha3_256_multi(&[
            &words.low().to_le_bytes(),
            &words.high().to_le_bytes(),
            part.as_bytes(),
        ]);
        let (low, high) = digest_words(&digest);
        NamespaceId(Uint64Dto::new(low, high | NAMESPACE_BIT).to_u64())
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, IdentityError> {
        parse_id_hex(hex_str).map(Self)
    }

    pub fn id(&self) -> u64 {
        self.0
    }

    pub fn to_hex(&self) -> String {
        format!("{:016X}", self.0)
    }

    pub fn to_dto(&self) -> Uint64Dto {
        Uint64Dto::from_u64(self.0)
    }
}

fn split_name(name: &str) -> Result<Vec<&str>, IdentityError> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > NAMESPACE_MAX_DEPTH {
        return Err(IdentityError::InvalidNamespaceName(format!(
            "'{name}' has {} levels, at most {NAMESPACE_MAX_DEPTH} allowed",
            parts.len()
        )));
    }
    for part in &parts {
        validate_part(name, part)?;
    }
    Ok(parts)
}

fn validate_part(name: &str, part: &str) -> Result<(), IdentityError> {
    let invalid = |reason: &str| IdentityError::InvalidNamespaceName(format!("'{name}': {reason}"));

    if part.is_empty() {
        return Err(invalid("empty part"));
    }
    if part.len() > NAMESPACE_MAX_PART_LENGTH {
        return Err(invalid("part longer than 64 chars"));
    }
    let mut chars = part.chars();
    if !chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err(invalid("part must start with a lowercase letter or digit"));
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-') {
        return Err(invalid("allowed characters are a-z, 0-9, '_' and '-'"));
    }
    Ok(())
}

impl From<Uint64Dto> for NamespaceId {
    fn from(dto: Uint64Dto) -> Self {
        Self(dto.to_u64())
    }
}

impl From<NamespaceId> for Uint64Dto {
    fn from(id: NamespaceId) -> Self {
        id.to_dto()
    }
}

impl FromStr for NamespaceId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NamespaceId({})", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Well-known namespaces
// ---------------------------------------------------------------------------

/// Derives a hard-coded name. Only called with literals below, which are
/// valid by construction, so validation is skipped.
fn derive_fixed(name: &str) -> NamespaceId {
    name.split('.').fold(NamespaceId::ROOT, NamespaceId::child)
}

lazy_static! {
    /// `nem.xem`
    pub static ref XEM_NAMESPACE_ID: NamespaceId = derive_fixed("nem.xem");
    /// `prx.xpx`, the native currency.
    pub static ref XPX_NAMESPACE_ID: NamespaceId = derive_fixed("prx.xpx");
    /// `prx.so`, the storage unit.
    pub static ref STORAGE_NAMESPACE_ID: NamespaceId = derive_fixed("prx.so");
    /// `prx.sm`, the streaming unit.
    pub static ref STREAMING_NAMESPACE_ID: NamespaceId = derive_fixed("prx.sm");
    /// `prx.sc`, the super contract unit.
    pub static ref SUPER_CONTRACT_NAMESPACE_ID: NamespaceId = derive_fixed("prx.sc");
}

/// The namespaces every network registers at genesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnown {
    Xem,
    Xpx,
    Storage,
    Streaming,
    SuperContract,
}

impl WellKnown {
    pub const ALL: [WellKnown; 5] = [
        WellKnown::Xem,
        WellKnown::Xpx,
        WellKnown::Storage,
        WellKnown::Streaming,
        WellKnown::SuperContract,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WellKnown::Xem => "nem.xem",
            WellKnown::Xpx => "prx.xpx",
            WellKnown::Storage => "prx.so",
            WellKnown::Streaming => "prx.sm",
            WellKnown::SuperContract => "prx.sc",
        }
    }

    pub fn id(self) -> NamespaceId {
        match self {
            WellKnown::Xem => *XEM_NAMESPACE_ID,
            WellKnown::Xpx => *XPX_NAMESPACE_ID,
            WellKnown::Storage => *STORAGE_NAMESPACE_ID,
            WellKnown::Streaming => *STREAMING_NAMESPACE_ID,
            WellKnown::SuperContract => *SUPER_CONTRACT_NAMESPACE_ID,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_vector() {
        let nem = NamespaceId::from_name("nem").unwrap();
        assert_eq!(nem.id(), 0x84B3_552D_375F_FA4B);
        assert_eq!(nem.to_dto(), Uint64Dto::new(929036875, 2226345261));
    }

    #[test]
    fn test_path_is_seeded_by_parent() {
        let path = NamespaceId::namespace_path("prx.xpx").unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path[0], NamespaceId::from_name("prx").unwrap());
        assert_eq!(path[0].id(), 0xB16D_77FD_8B6F_B3BE);
        assert_eq!(path[1].id(), 0xBFFB_42A1_9116_BDF6);
    }

    #[test]
    fn test_three_levels() {
        let path = NamespaceId::namespace_path("a.b.c").unwrap();
        assert_eq!(
            path.iter().map(NamespaceId::id).collect::<Vec<_>>(),
            vec![0xA535_DA36_BC8C_7FA4, 0xA4B1_4473_1D78_FBDE, 0xA2F4_875D_7DBA_6D0F]
        );
    }

    #[test]
    fn test_namespace_bit_always_set() {
        for name in ["a", "zz", "0-_", "prx.so"] {
            assert_eq!(NamespaceId::from_name(name).unwrap().id() >> 63, 1, "{name}");
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in [
            "",
            "a..b",
            ".a",
            "a.b.c.d",
            "Prx",
            "-prx",
            "_prx",
            "prx.x!",
            "p rx",
            &"a".repeat(65),
        ] {
            assert!(
                matches!(
                    NamespaceId::from_name(name),
                    Err(IdentityError::InvalidNamespaceName(_))
                ),
                "{name:?} accepted"
            );
        }
        assert!(NamespaceId::from_name(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn test_well_known_ids() {
        assert_eq!(XEM_NAMESPACE_ID.id(), 0xD525_AD41_D95F_CF29);
        assert_eq!(XPX_NAMESPACE_ID.id(), 0xBFFB_42A1_9116_BDF6);
        assert_eq!(STORAGE_NAMESPACE_ID.id(), 0x837B_327B_077F_AB05);
        assert_eq!(STREAMING_NAMESPACE_ID.id(), 0xAC51_AD7D_C983_6494);
        assert_eq!(SUPER_CONTRACT_NAMESPACE_ID.id(), 0xB296_8F56_7F04_394A);
        for known in WellKnown::ALL {
            assert_eq!(known.id(), NamespaceId::from_name(known.name()).unwrap());
        }
    }

    #[test]
    fn test_hex_round_trip() {
        let id = NamespaceId::new(0x84B3_552D_375F_FA4B);
        assert_eq!(id.to_string(), "84B3552D375FFA4B");
        assert_eq!("84b3552d375ffa4b".parse::<NamespaceId>().unwrap(), id);
    }
}
