/// Maximum secret length accepted on the wire.
pub const MAX_SECRET_LENGTH: usize = 256;

/// Maximum number of bidders tracked by a single auction.
pub const MAX_BIDDERS: usize = 65_536;

/// Domain separator mixed into every bid commitment.
pub const COMMITMENT_NAMESPACE: &[u8] = b"_SEALBID_COMMIT";

/// Error codes reported to clients alongside failed operations
pub const ERROR_INVALID_PHASE: u8 = 1;
pub const ERROR_NO_SUCH_COMMITMENT: u8 = 2;
pub const ERROR_TERMINAL_PHASE: u8 = 3;
pub const ERROR_ALREADY_SETTLED: u8 = 4;
pub const ERROR_NOTHING_TO_WITHDRAW: u8 = 5;
pub const ERROR_TRANSFER_FAILURE: u8 = 6;
pub const ERROR_ALREADY_REVEALED: u8 = 7;
pub const ERROR_EMPTY_SECRET: u8 = 8;
pub const ERROR_SECRET_TOO_LONG: u8 = 9;
pub const ERROR_DEPOSIT_TOO_LOW: u8 = 10;
pub const ERROR_OVERFLOW: u8 = 11;
pub const ERROR_STATE: u8 = 12;
pub const ERROR_BIDDER_LIMIT: u8 = 13;
pub const ERROR_INVALID_CONFIG: u8 = 14;
