//! OID tables used when decoding certificates.

use super::PolicyType;

/// Long names of relative distinguished name attribute types.
///
/// Attribute types missing from this table are reported by their dotted OID.
pub const RDN_NAMES: &[(&str, &str)] = &[
    ("2.5.4.3", "commonName"),
    ("2.5.4.4", "surname"),
    ("2.5.4.5", "serialNumber"),
    ("2.5.4.6", "countryName"),
    ("2.5.4.7", "localityName"),
    ("2.5.4.8", "stateOrProvinceName"),
    ("2.5.4.9", "streetAddress"),
    ("2.5.4.10", "organizationName"),
    ("2.5.4.11", "organizationalUnitName"),
    ("2.5.4.12", "title"),
    ("2.5.4.15", "businessCategory"),
    ("2.5.4.17", "postalCode"),
    ("2.5.4.42", "givenName"),
    ("2.5.4.46", "dnQualifier"),
    ("2.5.4.97", "organizationIdentifier"),
    ("0.9.2342.19200300.100.1.1", "userID"),
    ("0.9.2342.19200300.100.1.25", "domainComponent"),
    ("1.2.840.113549.1.9.1", "emailAddress"),
    ("1.3.6.1.4.1.311.60.2.1.1", "jurisdictionLocalityName"),
    ("1.3.6.1.4.1.311.60.2.1.2", "jurisdictionStateOrProvinceName"),
    ("1.3.6.1.4.1.311.60.2.1.3", "jurisdictionCountryName"),
];

/// Certificate policy OIDs that identify a validation level.
pub const POLICY_TYPES: &[(&str, PolicyType)] = &[
    // CA/Browser Forum baseline identifiers
    ("2.23.140.1.1", PolicyType::Ev),
    ("2.23.140.1.2.1", PolicyType::Dv),
    ("2.23.140.1.2.2", PolicyType::Ov),
    ("2.23.140.1.2.3", PolicyType::Ov),
    // CA-specific EV identifiers still seen in the wild
    ("2.16.840.1.114412.2.1", PolicyType::Ev),
    ("2.16.840.1.114028.10.1.2", PolicyType::Ev),
    ("2.16.840.1.114413.1.7.23.3", PolicyType::Ev),
    ("2.16.840.1.114414.1.7.23.3", PolicyType::Ev),
    ("1.3.6.1.4.1.6449.1.2.1.5.1", PolicyType::Ev),
    ("1.3.6.1.4.1.4146.1.1", PolicyType::Ev),
    ("1.3.6.1.4.1.34697.2.1", PolicyType::Ev),
    // CA-specific OV and DV identifiers
    ("2.16.840.1.114412.1.1", PolicyType::Ov),
    ("2.16.840.1.114412.1.2", PolicyType::Dv),
    ("1.3.6.1.4.1.4146.1.20", PolicyType::Ov),
    ("1.3.6.1.4.1.4146.1.10", PolicyType::Dv),
];

// Authority Information Access methods
pub const OID_AIA_OCSP: &str = "1.3.6.1.5.5.7.48.1";
pub const OID_AIA_CA_ISSUERS: &str = "1.3.6.1.5.5.7.48.2";

// Subject public key algorithms
pub const OID_KEY_RSA: &str = "1.2.840.113549.1.1.1";
pub const OID_KEY_EC: &str = "1.2.840.10045.2.1";
pub const OID_KEY_DSA: &str = "1.2.840.10040.4.1";
pub const OID_KEY_ED25519: &str = "1.3.101.112";
pub const OID_KEY_ED448: &str = "1.3.101.113";

pub fn rdn_name(oid: &str) -> Option<&'static str> {
    RDN_NAMES
        .iter()
        .find(|(known, _)| *known == oid)
        .map(|(_, name)| *name)
}

pub fn policy_type_of(oid: &str) -> Option<PolicyType> {
    POLICY_TYPES
        .iter()
        .find(|(known, _)| *known == oid)
        .map(|(_, policy)| *policy)
}
