//! The header shared by every transaction.

use chrono::{DateTime, TimeZone, Utc};

use super::buffer::{TransactionReader, TransactionWriter};
use super::dto::{self, TransactionHeaderDto, TransactionInfoDto};
use super::types::{Amount, EntityType, Hash, Height, Signature};
use super::TransactionError;
use crate::config::{DEFAULT_DEADLINE_HOURS, NETWORK_EPOCH_UNIX_MS};
use crate::identity::{NetworkType, PublicAccount};
use crate::uint64::wide_u64;

// ---------------------------------------------------------------------------
// Deadline
// ---------------------------------------------------------------------------

wide_u64!(
    /// Expiry of a transaction in milliseconds since the network epoch
    /// (2016-04-01T00:00:00Z).
    Deadline
);

impl Deadline {
    /// A deadline `ttl` from now.
    pub fn new(ttl: chrono::Duration) -> Self {
        Self::from_timestamp(Utc::now() + ttl)
    }

    /// A deadline one default time-to-live from now.
    pub fn with_default_ttl() -> Self {
        Self::new(chrono::Duration::hours(DEFAULT_DEADLINE_HOURS))
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Converts a wall-clock instant. Instants before the epoch clamp to 0.
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        let millis = at.timestamp_millis() - NETWORK_EPOCH_UNIX_MS;
        Self(millis.max(0) as u64)
    }

    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn to_timestamp(&self) -> Option<DateTime<Utc>> {
        let unix = i64::try_from(self.0).ok()?.checked_add(NETWORK_EPOCH_UNIX_MS)?;
        Utc.timestamp_millis_opt(unix).single()
    }
}

/// Where a confirmed transaction sits in the chain. Absent on unconfirmed
/// transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionInfo {
    pub height: Height,
    pub index: u32,
    pub id: String,
    pub hash: Option<Hash>,
    pub merkle_component_hash: Option<Hash>,
    pub aggregate_hash: Option<Hash>,
    pub aggregate_id: Option<String>,
}

impl TransactionInfo {
    /// `true` for transactions nested in an aggregate.
    pub fn is_embedded(&self) -> bool {
        self.aggregate_hash.is_some() || self.aggregate_id.is_some()
    }
}

impl TryFrom<TransactionInfoDto> for TransactionInfo {
    type Error = TransactionError;

    fn try_from(dto: TransactionInfoDto) -> Result<Self, Self::Error> {
        Ok(Self {
            height: dto.height.map(Height::from).unwrap_or_default(),
            index: dto.index.unwrap_or_default(),
            id: dto.id.unwrap_or_default(),
            hash: dto.hash.as_deref().map(|h| dto::parse_hash("meta.hash", h)).transpose()?,
            merkle_component_hash: dto
                .merkle_component_hash
                .as_deref()
                .map(|h| dto::parse_hash("meta.merkleComponentHash", h))
                .transpose()?,
            aggregate_hash: dto
                .aggregate_hash
                .as_deref()
                .map(|h| dto::parse_hash("meta.aggregateHash", h))
                .transpose()?,
            aggregate_id: dto.aggregate_id,
        })
    }
}

// ---------------------------------------------------------------------------
// AbstractTransaction
// ---------------------------------------------------------------------------

/// Fields every transaction carries. Owned by exactly one concrete
/// transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct AbstractTransaction {
    pub network_type: NetworkType,
    /// Entity version, without the network byte.
    pub version: u32,
    pub entity_type: EntityType,
    pub deadline: Deadline,
    pub max_fee: Amount,
    pub signer: Option<PublicAccount>,
    pub signature: Option<Signature>,
    pub info: Option<TransactionInfo>,
}

impl AbstractTransaction {
    pub fn new(
        entity_type: EntityType,
        version: u32,
        network_type: NetworkType,
        deadline: Deadline,
    ) -> Self {
        Self {
            network_type,
            version,
            entity_type,
            deadline,
            max_fee: Amount(0),
            signer: None,
            signature: None,
            info: None,
        }
    }

    /// `network_byte << 24 | version`, as written in the version slot.
    pub fn packed_version(&self) -> u32 {
        (u32::from(self.network_type.as_byte()) << 24) | (self.version & 0x00FF_FFFF)
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    pub fn is_confirmed(&self) -> bool {
        self.info.as_ref().is_some_and(|info| info.height.0 > 0)
    }

    fn signer_key(&self) -> [u8; 32] {
        self.signer.as_ref().map(|s| *s.public_key()).unwrap_or([0u8; 32])
    }

    fn write_size(w: &mut TransactionWriter, size: usize) -> Result<(), TransactionError> {
        let size = u32::try_from(size)
            .map_err(|_| TransactionError::validation(format!("{size} bytes exceed the size slot")))?;
        w.put_u32(size);
        Ok(())
    }

    /// Writes the 122-byte header announcing `size` bytes in total.
    pub(crate) fn write(&self, w: &mut TransactionWriter, size: usize) -> Result<(), TransactionError> {
        Self::write_size(w, size)?;
        w.put_bytes(self.signature.unwrap_or(Signature::ZERO).as_bytes());
        w.put_bytes(&self.signer_key());
        w.put_u32(self.packed_version());
        w.put_u16(self.entity_type.as_u16());
        w.put_u64(self.max_fee.0);
        w.put_u64(self.deadline.0);
        Ok(())
    }

    /// Writes the 42-byte embedded header announcing `size` bytes.
    pub(crate) fn write_embedded(
        &self,
        w: &mut TransactionWriter,
        size: usize,
    ) -> Result<(), TransactionError> {
        Self::write_size(w, size)?;
        w.put_bytes(&self.signer_key());
        w.put_u32(self.packed_version());
        w.put_u16(self.entity_type.as_u16());
        Ok(())
    }

    fn read_size(r: &mut TransactionReader<'_>, available: usize) -> Result<(), TransactionError> {
        let announced = r.get_u32()? as usize;
        if announced != available {
            return Err(TransactionError::SizeMismatch {
                expected: announced,
                actual: available,
            });
        }
        Ok(())
    }

    fn read_identity(
        r: &mut TransactionReader<'_>,
    ) -> Result<(Option<PublicAccount>, NetworkType, u32, EntityType), TransactionError> {
        let signer = r.get_key()?;
        let packed = r.get_u32()?;
        let raw_type = r.get_u16()?;
        let entity_type = EntityType::try_from(raw_type)
            .map_err(|e| TransactionError::UnsupportedTransactionType(e.0))?;
        let network_type = NetworkType::from_packed_version(packed)?;
        let signer = (signer != [0u8; 32])
            .then(|| PublicAccount::from_public_key_bytes(signer, network_type));
        Ok((signer, network_type, packed & 0x00FF_FFFF, entity_type))
    }

    /// Reads a full header. `available` is the length of the slice the
    /// transaction was decoded from and must equal the announced size.
    pub(crate) fn read(
        r: &mut TransactionReader<'_>,
        available: usize,
    ) -> Result<Self, TransactionError> {
        Self::read_size(r, available)?;
        let signature = Signature(r.get_signature()?);
        let (signer, network_type, version, entity_type) = Self::read_identity(r)?;
        let max_fee = Amount(r.get_u64()?);
        let deadline = Deadline(r.get_u64()?);
        Ok(Self {
            network_type,
            version,
            entity_type,
            deadline,
            max_fee,
            signer,
            signature: (!signature.is_zero()).then_some(signature),
            info: None,
        })
    }

    /// Reads an embedded header. The dropped fields come back as zero.
    pub(crate) fn read_embedded(
        r: &mut TransactionReader<'_>,
        available: usize,
    ) -> Result<Self, TransactionError> {
        Self::read_size(r, available)?;
        let (signer, network_type, version, entity_type) = Self::read_identity(r)?;
        Ok(Self {
            network_type,
            version,
            entity_type,
            deadline: Deadline(0),
            max_fee: Amount(0),
            signer,
            signature: None,
            info: None,
        })
    }

    /// Resolves the header fields of a JSON `transaction` object.
    pub fn from_dto(
        dto: &TransactionHeaderDto,
        info: Option<TransactionInfo>,
    ) -> Result<Self, TransactionError> {
        let entity_type = EntityType::try_from(dto.entity_type)
            .map_err(|e| TransactionError::UnsupportedTransactionType(e.0))?;
        let network_type = NetworkType::from_packed_version(dto.version)?;

        let signer = match dto.signer.as_deref() {
            Some(key) => {
                let key = dto::parse_key("signer", key)?;
                (key != [0u8; 32]).then(|| PublicAccount::from_public_key_bytes(key, network_type))
            }
            None => None,
        };
        let signature = match dto.signature.as_deref() {
            Some(sig) => {
                let sig: Signature = sig
                    .parse()
                    .map_err(|e| TransactionError::malformed("signature", e))?;
                (!sig.is_zero()).then_some(sig)
            }
            None => None,
        };

        Ok(Self {
            network_type,
            version: dto.version & 0x00FF_FFFF,
            entity_type,
            deadline: Deadline::from(dto.deadline),
            max_fee: Amount::from(dto.max_fee),
            signer,
            signature,
            info,
        })
    }

    pub fn to_dto(&self) -> TransactionHeaderDto {
        TransactionHeaderDto {
            signature: self.signature.map(|s| s.to_hex()),
            signer: self.signer.as_ref().map(PublicAccount::public_key_hex),
            version: self.packed_version(),
            entity_type: self.entity_type.as_u16(),
            max_fee: self.max_fee.into(),
            deadline: self.deadline.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_counts_from_network_epoch() {
        let epoch = Utc.timestamp_millis_opt(NETWORK_EPOCH_UNIX_MS).unwrap();
        assert_eq!(Deadline::from_timestamp(epoch).as_millis(), 0);

        let later = epoch + chrono::Duration::hours(2);
        let deadline = Deadline::from_timestamp(later);
        assert_eq!(deadline.as_millis(), 7_200_000);
        assert_eq!(deadline.to_timestamp(), Some(later));
    }

    #[test]
    fn deadline_before_epoch_clamps() {
        let before = Utc.timestamp_millis_opt(0).unwrap();
        assert_eq!(Deadline::from_timestamp(before).as_millis(), 0);
    }

    #[test]
    fn default_deadline_is_in_the_future() {
        let now = Deadline::from_timestamp(Utc::now());
        assert!(Deadline::with_default_ttl() > now);
    }

    #[test]
    fn packed_version_puts_network_in_high_byte() {
        let header = AbstractTransaction::new(
            EntityType::JoinToDrive,
            1,
            NetworkType::MijinTest,
            Deadline::from_millis(1),
        );
        assert_eq!(header.packed_version(), 0x9000_0001);
    }

    #[test]
    fn header_dto_round_trip() {
        let mut header = AbstractTransaction::new(
            EntityType::EndDrive,
            1,
            NetworkType::PublicTest,
            Deadline::from_millis(123_456),
        );
        header.max_fee = Amount(10);
        let dto = header.to_dto();
        assert_eq!(AbstractTransaction::from_dto(&dto, None).unwrap(), header);
    }

    #[test]
    fn unknown_type_in_dto_rejected() {
        let mut dto = AbstractTransaction::new(
            EntityType::EndDrive,
            1,
            NetworkType::Mijin,
            Deadline::from_millis(0),
        )
        .to_dto();
        dto.entity_type = 0xFFFF;
        assert!(matches!(
            AbstractTransaction::from_dto(&dto, None),
            Err(TransactionError::UnsupportedTransactionType(0xFFFF))
        ));
    }
}
