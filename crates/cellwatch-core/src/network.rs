//! Network-type classification.
//!
//! The router reports its radio state as a free-form vendor string. The
//! classifier folds the known names into a closed enum once per cycle; the
//! update policies and the renderer only ever look at the enum.

/// Closed set of network states, derived fresh each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkKind {
    #[default]
    Unknown,
    Umts,
    Lte,
    /// LTE with a carrier-aggregation session (active or deactivated — the
    /// secondary-cell fields stay meaningful in both states).
    LtePlus,
    /// 5G NSA with actual NR reception.
    NrNsaActive,
    /// Base station is NSA-capable but only the LTE anchor is received.
    NrNsaPassive,
    NrSa,
}

const UMTS_NAMES: &[&str] = &[
    "HSPA", "HSDPA", "HSUPA", "HSPA+", "DC-HSPA+", "UMTS", "CDMA", "CDMA_EVDO", "EVDO_EHRPD",
    "TDSCDMA",
];

const NR_NSA_NAMES: &[&str] = &["ENDC", "EN-DC", "LTE-NSA"];

impl NetworkKind {
    /// Classify the raw `network_type` field, using the `wan_lte_ca`
    /// indicator to distinguish plain LTE from an LTE CA session.
    pub fn classify(network_type: &str, wan_lte_ca: &str) -> Self {
        if UMTS_NAMES.contains(&network_type) {
            return NetworkKind::Umts;
        }

        if network_type == "LTE" {
            // A deactivated CA session still counts: the router keeps
            // reporting usable secondary-cell fields for it.
            return if wan_lte_ca == "ca_activated" || wan_lte_ca == "ca_deactivated" {
                NetworkKind::LtePlus
            } else {
                NetworkKind::Lte
            };
        }

        if NR_NSA_NAMES.contains(&network_type) {
            // "LTE-NSA" is the one NSA name that means zero NR reception.
            return if network_type == "LTE-NSA" {
                NetworkKind::NrNsaPassive
            } else {
                NetworkKind::NrNsaActive
            };
        }

        if network_type == "SA" {
            return NetworkKind::NrSa;
        }

        NetworkKind::Unknown
    }

    pub fn label(self) -> &'static str {
        match self {
            NetworkKind::Unknown => "Unknown",
            NetworkKind::Umts => "UMTS",
            NetworkKind::Lte => "LTE",
            NetworkKind::LtePlus => "LTE+",
            NetworkKind::NrNsaActive => "NR-NSA",
            NetworkKind::NrNsaPassive => "NR-NSA (LTE-only)",
            NetworkKind::NrSa => "NR-SA",
        }
    }

    pub fn is_umts(self) -> bool {
        self == NetworkKind::Umts
    }

    /// LTE family. NSA is included: an NSA session always carries an LTE
    /// anchor cell.
    pub fn is_lte(self) -> bool {
        matches!(self, NetworkKind::Lte | NetworkKind::LtePlus) || self.is_nr_nsa()
    }

    pub fn is_nr(self) -> bool {
        self.is_nr_nsa() || self.is_nr_sa()
    }

    pub fn is_nr_nsa(self) -> bool {
        matches!(self, NetworkKind::NrNsaActive | NetworkKind::NrNsaPassive)
    }

    pub fn is_nr_nsa_active(self) -> bool {
        self == NetworkKind::NrNsaActive
    }

    pub fn is_nr_sa(self) -> bool {
        self == NetworkKind::NrSa
    }
}

impl std::fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lte_with_ca_indicator_classifies_as_lte_plus() {
        assert_eq!(NetworkKind::classify("LTE", "ca_activated"), NetworkKind::LtePlus);
        assert_eq!(NetworkKind::classify("LTE", "ca_deactivated"), NetworkKind::LtePlus);
        assert_eq!(NetworkKind::classify("LTE", ""), NetworkKind::Lte);
        assert_eq!(NetworkKind::classify("LTE", "something_else"), NetworkKind::Lte);
    }

    #[test]
    fn nsa_names_split_active_and_passive() {
        assert_eq!(NetworkKind::classify("ENDC", ""), NetworkKind::NrNsaActive);
        assert_eq!(NetworkKind::classify("EN-DC", ""), NetworkKind::NrNsaActive);
        assert_eq!(NetworkKind::classify("LTE-NSA", ""), NetworkKind::NrNsaPassive);
    }

    #[test]
    fn umts_sa_and_unknown() {
        assert_eq!(NetworkKind::classify("HSPA+", ""), NetworkKind::Umts);
        assert_eq!(NetworkKind::classify("TDSCDMA", ""), NetworkKind::Umts);
        assert_eq!(NetworkKind::classify("SA", ""), NetworkKind::NrSa);
        assert_eq!(NetworkKind::classify("GSM", ""), NetworkKind::Unknown);
        assert_eq!(NetworkKind::classify("", ""), NetworkKind::Unknown);
    }

    #[test]
    fn family_predicates() {
        assert!(NetworkKind::LtePlus.is_lte());
        assert!(!NetworkKind::LtePlus.is_nr());

        // NSA counts as both families; passive NSA is still not "active".
        assert!(NetworkKind::NrNsaActive.is_lte());
        assert!(NetworkKind::NrNsaActive.is_nr());
        assert!(NetworkKind::NrNsaPassive.is_lte());
        assert!(NetworkKind::NrNsaPassive.is_nr());
        assert!(!NetworkKind::NrNsaPassive.is_nr_nsa_active());

        assert!(NetworkKind::NrSa.is_nr());
        assert!(!NetworkKind::NrSa.is_lte());
        assert!(!NetworkKind::Unknown.is_lte());
    }

    #[test]
    fn labels() {
        assert_eq!(NetworkKind::NrNsaPassive.label(), "NR-NSA (LTE-only)");
        assert_eq!(NetworkKind::LtePlus.to_string(), "LTE+");
    }
}
