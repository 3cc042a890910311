//! Session seeding: participant identifier and counterbalanced order.
//!
//! A [`SessionSeed`] is drawn once per session and consumed by
//! [`StudyEngine::start`](crate::phase::StudyEngine::start), so neither
//! value can be re-drawn for a running session.

use rand::rngs::OsRng;
use rand::{Rng, TryRngCore};
use tracing::debug;

use crate::error::EntropyError;
use crate::study::{Condition, ConditionOrder};

/// Bytes of entropy consumed per seed: 16 for the identifier, 1 for the order.
const SEED_BYTES: usize = 17;

/// Identifier and condition order for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSeed {
    participant_id: String,
    condition_order: ConditionOrder,
}

impl SessionSeed {
    /// Draws a seed from the operating system's entropy source.
    ///
    /// # Errors
    ///
    /// Returns [`EntropyError`] when the OS source is unavailable; the
    /// session cannot start without a valid identifier.
    pub fn from_os_entropy() -> Result<Self, EntropyError> {
        let mut bytes = [0_u8; SEED_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| EntropyError(e.to_string()))?;
        Ok(Self::from_bytes(bytes))
    }

    /// Draws a seed from any random number generator.
    ///
    /// Used with a seeded `StdRng` for reproducible pilot sessions.
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0_u8; SEED_BYTES];
        rng.fill_bytes(&mut bytes);
        Self::from_bytes(bytes)
    }

    fn from_bytes(bytes: [u8; SEED_BYTES]) -> Self {
        let mut id_bytes = [0_u8; 16];
        id_bytes.copy_from_slice(&bytes[..16]);
        let participant_id = uuid::Builder::from_random_bytes(id_bytes)
            .into_uuid()
            .hyphenated()
            .to_string();

        let first = if bytes[16] & 1 == 0 {
            Condition::Transparent
        } else {
            Condition::Opaque
        };
        let condition_order = ConditionOrder::starting_with(first);

        debug!(%participant_id, %condition_order, "session seeded");

        Self {
            participant_id,
            condition_order,
        }
    }

    /// Builds a seed from known values.
    #[must_use]
    pub fn fixed(participant_id: impl Into<String>, condition_order: ConditionOrder) -> Self {
        Self {
            participant_id: participant_id.into(),
            condition_order,
        }
    }

    /// Opaque participant identifier (UUID v4 text).
    #[must_use]
    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    /// Counterbalanced condition order.
    #[must_use]
    pub const fn condition_order(&self) -> ConditionOrder {
        self.condition_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn os_entropy_produces_uuid_v4() {
        let seed = SessionSeed::from_os_entropy().unwrap();
        let parsed = uuid::Uuid::parse_str(seed.participant_id()).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn same_rng_seed_is_reproducible() {
        let a = SessionSeed::from_rng(&mut StdRng::seed_from_u64(42));
        let b = SessionSeed::from_rng(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn identifiers_differ_between_sessions() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = SessionSeed::from_rng(&mut rng);
        let b = SessionSeed::from_rng(&mut rng);
        assert_ne!(a.participant_id(), b.participant_id());
    }

    #[test]
    fn both_orders_occur() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut transparent_first = 0;
        let mut opaque_first = 0;
        for _ in 0..400 {
            match SessionSeed::from_rng(&mut rng).condition_order() {
                ConditionOrder::TRANSPARENT_FIRST => transparent_first += 1,
                _ => opaque_first += 1,
            }
        }
        // Fair coin over 400 draws: far outside these bounds is a bias bug.
        assert!((140..=260).contains(&transparent_first), "{transparent_first}");
        assert!((140..=260).contains(&opaque_first), "{opaque_first}");
    }

    #[test]
    fn order_bit_selects_first_condition() {
        let mut bytes = [0_u8; SEED_BYTES];
        assert_eq!(
            SessionSeed::from_bytes(bytes).condition_order(),
            ConditionOrder::TRANSPARENT_FIRST
        );
        bytes[16] = 1;
        assert_eq!(
            SessionSeed::from_bytes(bytes).condition_order(),
            ConditionOrder::OPAQUE_FIRST
        );
    }
}
