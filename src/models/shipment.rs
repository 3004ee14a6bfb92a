//! Shipment identifier and report row data structures.

use std::fmt;

/// One shipment's (ARN, ASN) identifier pair, addressing its wizard page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentId {
    /// Amazon reference number
    pub arn: String,

    /// Advance shipment notice id
    pub asn: String,
}

impl ShipmentId {
    /// Parse a queue label's composite `id` attribute.
    ///
    /// The attribute is hyphen-delimited; the ARN and ASN sit at positions
    /// 3 and 4. Anything with fewer than five tokens, or empty tokens at
    /// those positions, is not a shipment label.
    pub fn from_label_id(label_id: &str) -> Option<Self> {
        let parts: Vec<&str> = label_id.split('-').collect();
        if parts.len() < 5 {
            return None;
        }
        let (arn, asn) = (parts[3], parts[4]);
        if arn.is_empty() || asn.is_empty() {
            return None;
        }
        Some(Self {
            arn: arn.to_string(),
            asn: asn.to_string(),
        })
    }
}

impl fmt::Display for ShipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.arn, self.asn)
    }
}

/// One extracted label/tracking pair, as written to the report.
///
/// Insertion order is the only record of work performed, so rows are never
/// sorted or deduplicated after extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingRow {
    pub arn: String,
    pub asn: String,
    /// Carton label text (carrier-prefixed)
    pub label: String,
    /// Tracking value resolved through the picklist
    pub tracking: String,
    /// Raw warehouse label, empty when unresolved
    pub warehouse: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_five_token_label_id() {
        let id = ShipmentId::from_label_id("sq-sl-cell-4401877234-9QJWD8LP").unwrap();
        assert_eq!(id.arn, "4401877234");
        assert_eq!(id.asn, "9QJWD8LP");
    }

    #[test]
    fn extra_tokens_do_not_shift_positions() {
        let id = ShipmentId::from_label_id("sq-sl-cell-P1-S1-trailing").unwrap();
        assert_eq!(id.arn, "P1");
        assert_eq!(id.asn, "S1");
    }

    #[test]
    fn rejects_short_label_id() {
        assert!(ShipmentId::from_label_id("sq-sl-cell-P1").is_none());
        assert!(ShipmentId::from_label_id("").is_none());
    }

    #[test]
    fn rejects_empty_positional_tokens() {
        assert!(ShipmentId::from_label_id("sq-sl-cell--S1").is_none());
        assert!(ShipmentId::from_label_id("sq-sl-cell-P1-").is_none());
    }

    #[test]
    fn display_joins_both_ids() {
        let id = ShipmentId {
            arn: "P1".to_string(),
            asn: "S1".to_string(),
        };
        assert_eq!(id.to_string(), "P1/S1");
    }
}
