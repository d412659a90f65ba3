//! The well-known `Domain` tag the bridge acts on.

/// The bridge only acts on instances whose `Domain` equals this value; all
/// others are observed and ignored.
pub const CC_APP_DOMAIN: &str = "cc-app";
