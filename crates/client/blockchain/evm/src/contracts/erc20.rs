//! ERC-20 token integration (the subset token games need).

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::utils::{UnitsError, format_units, parse_units};
use alloy_primitives::{Address, I256, U256};
use client_blockchain_core::{
    BindingError, BlockchainTransport, ContractHandle, TxReceipt, TxSubmitter,
};
use serde::{Deserialize, Serialize};

use super::{abi, bind, string_at, uint, uint_at};

/// ERC-20 token contract.
#[derive(Debug, Clone)]
pub struct Erc20 {
    handle: ContractHandle,
}

impl Erc20 {
    pub fn new(address: Address) -> Result<Self, BindingError> {
        Ok(Self {
            handle: bind(address, abi::ERC20)?,
        })
    }

    pub fn address(&self) -> Address {
        self.handle.address()
    }

    /// Approve `spender` for exactly `amount`.
    pub async fn approve<T>(
        &self,
        submitter: &TxSubmitter<T>,
        spender: Address,
        amount: U256,
    ) -> Result<TxReceipt, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        tracing::debug!(token = %self.address(), %spender, %amount, "Approving allowance");
        self.handle
            .send(
                submitter,
                "approve",
                &[DynSolValue::Address(spender), uint(amount, 256)],
                None,
            )
            .await
    }

    pub async fn balance_of<T>(&self, transport: &T, account: Address) -> Result<U256, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        const METHOD: &str = "balanceOf";
        let values = self
            .handle
            .read(transport, METHOD, &[DynSolValue::Address(account)])
            .await?;
        uint_at(METHOD, &values, 0)
    }

    pub async fn allowance<T>(
        &self,
        transport: &T,
        owner: Address,
        spender: Address,
    ) -> Result<U256, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        const METHOD: &str = "allowance";
        let values = self
            .handle
            .read(
                transport,
                METHOD,
                &[DynSolValue::Address(owner), DynSolValue::Address(spender)],
            )
            .await?;
        uint_at(METHOD, &values, 0)
    }

    pub async fn decimals<T>(&self, transport: &T) -> Result<u8, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        const METHOD: &str = "decimals";
        let values = self.handle.read(transport, METHOD, &[]).await?;
        let decimals = uint_at(METHOD, &values, 0)?;
        u8::try_from(decimals).map_err(|_| BindingError::Decoding {
            method: METHOD.to_string(),
            reason: format!("decimals out of range: {decimals}"),
        })
    }

    pub async fn symbol<T>(&self, transport: &T) -> Result<String, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        const METHOD: &str = "symbol";
        let values = self.handle.read(transport, METHOD, &[]).await?;
        string_at(METHOD, &values, 0)
    }

    /// Symbol and decimals, for display.
    pub async fn metadata<T>(&self, transport: &T) -> Result<TokenMetadata, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        Ok(TokenMetadata {
            address: self.address(),
            symbol: self.symbol(transport).await?,
            decimals: self.decimals(transport).await?,
        })
    }
}

/// Display information of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenMetadata {
    /// Native currency, formatted like an 18-decimals token.
    pub fn native(symbol: impl Into<String>) -> Self {
        Self {
            address: Address::ZERO,
            symbol: symbol.into(),
            decimals: 18,
        }
    }

    /// `amount` in whole units, trailing zeros trimmed.
    pub fn format(&self, amount: U256) -> String {
        trim_units(format_units(amount, self.decimals))
    }

    /// Signed variant of [`format`](Self::format), for profits.
    pub fn format_signed(&self, amount: I256) -> String {
        trim_units(format_units(amount, self.decimals))
    }

    /// Parse a decimal string (e.g. `"0.01"`) into base units.
    pub fn parse(&self, amount: &str) -> Result<U256, UnitsError> {
        parse_units(amount, self.decimals).map(Into::into)
    }
}

fn trim_units(formatted: Result<String, UnitsError>) -> String {
    match formatted {
        Ok(s) if s.contains('.') => s.trim_end_matches('0').trim_end_matches('.').to_string(),
        Ok(s) => s,
        Err(e) => format!("<{e}>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usdt() -> TokenMetadata {
        TokenMetadata {
            address: Address::repeat_byte(0x64),
            symbol: "USDT".to_string(),
            decimals: 6,
        }
    }

    #[test]
    fn formats_with_token_decimals() {
        let usdt = usdt();
        assert_eq!(usdt.format(U256::from(10_000)), "0.01");
        assert_eq!(usdt.format(U256::from(5_000_000)), "5");
        assert_eq!(usdt.format_signed(I256::try_from(-2_500_000i64).unwrap()), "-2.5");
    }

    #[test]
    fn parses_decimal_amounts() {
        assert_eq!(usdt().parse("0.01").unwrap(), U256::from(10_000));
        assert_eq!(
            TokenMetadata::native("ETH").parse("0.1").unwrap(),
            U256::from(100_000_000_000_000_000u64)
        );
        assert!(usdt().parse("abc").is_err());
    }
}
