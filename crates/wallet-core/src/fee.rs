use chain_utxo::transaction::SignedTransaction;

use crate::error::WalletError;

/// Fee rate in base units per virtual byte, rounded up.
///
/// `weight` is in weight units (four per virtual byte).
pub fn fee_rate(fee: u64, weight: u64) -> Result<u64, WalletError> {
    if weight == 0 {
        return Err(WalletError::InvalidWeight { weight });
    }
    let scaled = u128::from(fee) * 4;
    let rate = scaled.div_ceil(u128::from(weight));
    u64::try_from(rate).map_err(|_| WalletError::InvalidWeight { weight })
}

/// Fee paid by `tx` given the total value of the outputs it spends.
pub fn transaction_fee(tx: &SignedTransaction, total_input: u64) -> Result<u64, WalletError> {
    let total_output = tx.total_output();
    total_input
        .checked_sub(total_output)
        .ok_or_else(|| WalletError::NegativeFee(total_output - total_input))
}

/// Fee rate of a signed transaction.
pub fn transaction_fee_rate(tx: &SignedTransaction, total_input: u64) -> Result<u64, WalletError> {
    fee_rate(transaction_fee(tx, total_input)?, tx.weight())
}
