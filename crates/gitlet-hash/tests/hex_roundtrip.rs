//! Property-based tests for the hex codec and ObjectId parsing.

use gitlet_hash::hex::{encode, is_hex_digits};
use gitlet_hash::ObjectId;
use proptest::prelude::*;

proptest! {
    /// Encoding any 20 bytes and parsing the result gives back the same OID.
    #[test]
    fn oid_hex_roundtrip(bytes in any::<[u8; 20]>()) {
        let oid = ObjectId::from_bytes(&bytes).unwrap();
        let hex = oid.to_hex();
        prop_assert_eq!(hex.len(), 40);
        prop_assert!(is_hex_digits(&hex));
        prop_assert!(hex.bytes().all(|b| !b.is_ascii_uppercase()));
        let parsed = ObjectId::from_hex(&hex).unwrap();
        prop_assert_eq!(parsed, oid);
    }

    /// Parsing is case-insensitive; output is always lowercase.
    #[test]
    fn parse_is_case_insensitive(bytes in any::<[u8; 20]>()) {
        let hex = encode(&bytes);
        let upper = hex.to_ascii_uppercase();
        let a = ObjectId::from_hex(&hex).unwrap();
        let b = ObjectId::from_hex(&upper).unwrap();
        prop_assert_eq!(a, b);
        prop_assert_eq!(b.to_hex(), hex);
    }

    /// Any string that is not exactly 40 chars is rejected.
    #[test]
    fn wrong_length_rejected(s in "[0-9a-f]{0,39}") {
        prop_assert!(ObjectId::from_hex(&s).is_err());
    }

    /// Ordering on OIDs matches ordering on the raw bytes.
    #[test]
    fn ordering_matches_bytes(
        a in any::<[u8; 20]>(),
        b in any::<[u8; 20]>(),
    ) {
        let oa = ObjectId::from_bytes(&a).unwrap();
        let ob = ObjectId::from_bytes(&b).unwrap();
        prop_assert_eq!(oa.cmp(&ob), a.cmp(&b));
    }
}
