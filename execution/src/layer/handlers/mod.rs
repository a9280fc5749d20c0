use super::*;

use crate::commitment::CommitmentError;

mod ledger;
mod phase;
mod settlement;

pub use settlement::select_winner;

fn secret_error(err: CommitmentError) -> AuctionError {
    match err {
        CommitmentError::EmptySecret => AuctionError::EmptySecret,
        CommitmentError::SecretTooLong { len, max } => AuctionError::SecretTooLong { len, max },
        CommitmentError::InvalidDigestHex { value } => {
            AuctionError::State(anyhow::anyhow!("unexpected digest error: {value}"))
        }
    }
}
