use kastle_addresses::Address;
use kastle_consensus_core::tx::TransactionOutput;
use kastle_txscript::pay_to_address_script;

/// A recipient and the amount it is paid, prior to script synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutput {
    pub address: Address,
    pub amount: u64,
}

impl PaymentOutput {
    pub fn new(address: Address, amount: u64) -> Self {
        Self { address, amount }
    }
}

impl From<&PaymentOutput> for TransactionOutput {
    fn from(output: &PaymentOutput) -> Self {
        TransactionOutput::new(output.amount, pay_to_address_script(&output.address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kastle_addresses::{Prefix, Version};

    #[test]
    fn test_payment_output_conversion() {
        let address = Address::new(Prefix::Mainnet, Version::PubKey, &[0xAA; 32]).unwrap();
        let output: TransactionOutput = (&PaymentOutput::new(address.clone(), 5000)).into();
        assert_eq!(output.value, 5000);
        assert_eq!(output.script_public_key, pay_to_address_script(&address));
    }
}
