//! Generation of fresh unique identifiers.
//!
//! New UIDs are derived from random UUIDs under the `2.25` root,
//! as described in [PS3.5 B.2][1].
//!
//! [1]: https://dicom.nema.org/medical/dicom/current/output/chtml/part05/sect_B.2.html
use uuid::Uuid;

/// The UID root for UUID-derived identifiers.
pub const UUID_UID_ROOT: &str = "2.25";

/// Generate a new, globally unique DICOM UID.
///
/// The outcome is at most 44 characters long.
pub fn generate_uid() -> String {
    format!("{}.{}", UUID_UID_ROOT, Uuid::new_v4().as_u128())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn uid_is_well_formed() {
        let uid = generate_uid();
        assert!(uid.starts_with("2.25."));
        assert!(uid.len() <= 64);
        assert!(uid.chars().all(|c| c.is_ascii_digit() || c == '.'));

        // no leading zeros in the UUID component
        let component = &uid["2.25.".len()..];
        assert!(!component.is_empty());
        assert!(component == "0" || !component.starts_with('0'));
    }

    #[test]
    fn uids_do_not_repeat() {
        let uids: HashSet<_> = (0..256).map(|_| generate_uid()).collect();
        assert_eq!(uids.len(), 256);
    }
}
