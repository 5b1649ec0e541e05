//! Checks run around the deployment of a mined salt.
//!
//! Every failure here is fatal: the predicted address is a pure function of
//! deployer, salt and init code, so a mismatch means one of those inputs
//! changed and retrying the same transaction cannot succeed.

use alloy_primitives::{Address, B256};
use tracing::{error, info};

use crate::create2::create2_address;
use crate::error::VerifyError;
use crate::miner::MinedSalt;

impl MinedSalt {
    /// Recomputes the address from the recorded inputs.
    pub fn verify(&self) -> Result<(), VerifyError> {
        let derived = create2_address(self.deployer, self.salt, self.init_code_hash);
        if derived != self.address {
            return Err(VerifyError::PredictionMismatch {
                salt: self.salt,
                recorded: self.address,
                derived,
            });
        }
        if !self.flags.matches(&derived) {
            return Err(VerifyError::FlagMismatch {
                address: derived,
                flags: self.flags,
            });
        }
        Ok(())
    }

    /// Compares the hash of the init code about to be broadcast with the one
    /// the salt was mined against.
    pub fn check_init_code(&self, current: B256) -> Result<(), VerifyError> {
        if current != self.init_code_hash {
            return Err(VerifyError::InitCodeDrift {
                mined: self.init_code_hash,
                current,
            });
        }
        Ok(())
    }

    pub fn verify_deployment(&self, actual: Address) -> Result<(), VerifyError> {
        verify_deployment(self.address, actual)
    }
}

pub fn verify_deployment(predicted: Address, actual: Address) -> Result<(), VerifyError> {
    if predicted != actual {
        error!(%predicted, %actual, "Deployed address does not match prediction");
        return Err(VerifyError::AddressMismatch { predicted, actual });
    }
    info!(address = %actual, "Deployed address matches prediction");
    Ok(())
}
