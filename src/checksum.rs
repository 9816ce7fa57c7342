//! Report checksum
//!
//! XOR of every byte from offset 2 up to (not including) the checksum byte.
//! Status and transaction id are outside the covered range, so the device can
//! rewrite them without invalidating the checksum.

use std::ops::Range;

use zerocopy::IntoBytes;

use crate::report::{Report, CHECKSUM_OFFSET};

/// Byte range covered by the checksum
pub const CHECKSUM_RANGE: Range<usize> = 2..CHECKSUM_OFFSET;

/// Compute the checksum of a report without modifying it
pub fn compute_checksum(report: &Report) -> u8 {
    report.as_bytes()[CHECKSUM_RANGE]
        .iter()
        .fold(0u8, |acc, &b| acc ^ b)
}

/// Store the computed checksum in the report
pub fn apply_checksum(report: &mut Report) {
    report.checksum = compute_checksum(report);
}

/// Whether the stored checksum matches the report contents
pub fn verify_checksum(report: &Report) -> bool {
    report.checksum == compute_checksum(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::REPORT_LEN;
    use zerocopy::FromBytes;

    #[test]
    fn test_known_value() {
        // Set brightness: class 0x0F, id 0x04, 3 args
        let report = Report::new(0x0F, 0x04, 0x03).with_arguments(&[0x01, 0x05, 0xFF]);
        let expected = 0x03 ^ 0x0F ^ 0x04 ^ 0x01 ^ 0x05 ^ 0xFF;
        assert_eq!(compute_checksum(&report), expected);
    }

    #[test]
    fn test_empty_report_is_zero() {
        assert_eq!(compute_checksum(&Report::empty()), 0);
    }

    #[test]
    fn test_compute_does_not_mutate() {
        let report = Report::new(0x00, 0x81, 0x02);
        let before = report.to_bytes();
        let _ = compute_checksum(&report);
        assert_eq!(report.to_bytes(), before);
        assert_eq!(report.checksum, 0);
    }

    #[test]
    fn test_bytes_outside_range_are_ignored() {
        let base = Report::new(0x0F, 0x02, 0x06).with_arguments(&[1, 2, 3, 4, 5, 6]);
        let expected = compute_checksum(&base);

        for offset in [0usize, 1, CHECKSUM_OFFSET, REPORT_LEN - 1] {
            let mut bytes = base.to_bytes();
            bytes[offset] ^= 0x5A;
            let mutated = Report::read_from_bytes(&bytes[..]).unwrap();
            assert_eq!(compute_checksum(&mutated), expected, "offset {offset}");
        }
    }

    #[test]
    fn test_every_byte_in_range_matters() {
        let base = Report::new(0x0F, 0x02, 0x06);
        let expected = compute_checksum(&base);

        for offset in CHECKSUM_RANGE {
            let mut bytes = base.to_bytes();
            bytes[offset] ^= 0x01;
            let mutated = Report::read_from_bytes(&bytes[..]).unwrap();
            assert_ne!(compute_checksum(&mutated), expected, "offset {offset}");
        }
    }

    #[test]
    fn test_apply_then_verify() {
        let mut report = Report::new(0x03, 0x0A, 0x02).with_arguments(&[0x01, 0x02]);
        assert!(!verify_checksum(&report));
        apply_checksum(&mut report);
        assert!(verify_checksum(&report));

        // Status and transaction id may change freely
        report.status = 0x02;
        report.transaction_id = 0xFF;
        assert!(verify_checksum(&report));

        report.arguments[0] ^= 0x80;
        assert!(!verify_checksum(&report));
    }
}
