//! # Consensus Limits
//!
//! Length and batch bounds enforced by fact self-validation. These values are
//! part of the consensus rules: every node must agree on them, so they are
//! constants rather than configuration.

/// Minimum service ID length.
pub const MIN_SERVICE_ID_LEN: usize = 3;
/// Maximum service ID length.
pub const MAX_SERVICE_ID_LEN: usize = 10;

/// Minimum currency ID length.
pub const MIN_CURRENCY_ID_LEN: usize = 3;
/// Maximum currency ID length.
pub const MAX_CURRENCY_ID_LEN: usize = 10;

/// Maximum template ID length, in characters.
pub const MAX_TEMPLATE_ID_LEN: usize = 20;
/// Maximum credential ID length, in characters.
pub const MAX_CREDENTIAL_ID_LEN: usize = 20;
/// Maximum credential value length, in characters.
pub const MAX_CREDENTIAL_VALUE_LEN: usize = 1024;
/// Maximum DID length, in characters.
pub const MAX_DID_LEN: usize = 1024;

/// Maximum template name, display name and subject key length.
pub const MAX_TEMPLATE_LABEL_LEN: usize = 20;
/// Maximum template description length.
pub const MAX_TEMPLATE_DESCRIPTION_LEN: usize = 1024;

/// Maximum number of items in one assign or revoke operation.
pub const MAX_ITEMS: usize = 100;
