//! Property-based tests for key derivation and request building.

use newsroom_lib::request::{build_subscribe_payload, split_list_ids};
use newsroom_lib::{derive_key, ClientConfiguration, DigestAlgorithm, SubscriptionRequest};
use proptest::prelude::*;

fn digest_strategy() -> impl Strategy<Value = DigestAlgorithm> {
    prop_oneof![Just(DigestAlgorithm::Md5), Just(DigestAlgorithm::Sha256)]
}

proptest! {
    /// Same inputs always produce the same key.
    #[test]
    fn key_is_deterministic(
        email in "[A-Za-z0-9._%+-]{1,20}@[A-Za-z0-9.-]{1,20}",
        secret in ".{0,40}",
        digest in digest_strategy(),
        normalize in any::<bool>(),
    ) {
        prop_assert_eq!(
            derive_key(&email, &secret, digest, normalize),
            derive_key(&email, &secret, digest, normalize)
        );
    }

    /// Keys are lowercase hex of the digest length.
    #[test]
    fn key_is_lower_hex(email in ".{0,40}", secret in ".{0,40}", digest in digest_strategy()) {
        let key = derive_key(&email, &secret, digest, false);
        let expected_len = match digest {
            DigestAlgorithm::Md5 => 32,
            DigestAlgorithm::Sha256 => 64,
        };
        prop_assert_eq!(key.len(), expected_len);
        prop_assert!(key.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    /// Normalization changes the key exactly when the email is not already
    /// lower case.
    #[test]
    fn normalization_only_matters_for_mixed_case(
        email in "[A-Za-z]{1,10}@[A-Za-z]{1,10}\\.eu",
        secret in "[a-z0-9-]{1,30}",
        digest in digest_strategy(),
    ) {
        let plain = derive_key(&email, &secret, digest, false);
        let normalized = derive_key(&email, &secret, digest, true);
        prop_assert_eq!(plain == normalized, email == email.to_lowercase());
        prop_assert_eq!(normalized, derive_key(&email.to_lowercase(), &secret, digest, false));
    }

    /// The payload's sv_id lists the requested IDs in order, comma-joined.
    #[test]
    fn sv_id_preserves_request_order(list_ids in prop::collection::vec("[0-9]{1,6}", 1..8)) {
        let request = SubscriptionRequest::new("a@b.eu", list_ids.clone());
        let config = ClientConfiguration::new("U", "A", "s");
        let payload = build_subscribe_payload(&request, &config);

        prop_assert_eq!(split_list_ids(&payload.subscription.sv_id), request.list_ids.clone());
        prop_assert!(request.list_ids.iter().all(|id| list_ids.contains(id)));
    }
}
