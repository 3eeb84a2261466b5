//! Deployment information management.
//!
//! Deployment information is stored in the .env file using environment variables:
//! - NETWORK - Network label
//! - CONTRACT_ADDRESS - Deployed RockPaperScissors address
//! - DEPLOY_TX_HASH - Contract creation transaction
//! - DEPLOY_BLOCK - Block the contract was created in

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, Bytes};
use anyhow::{Context, Result};
use client_blockchain_core::TxHash;

/// RockPaperScissors deployment information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentInfo {
    /// Network label (e.g., "testnet", "local")
    pub network: String,

    /// Deployed contract address
    pub contract_address: Address,

    /// Contract creation transaction
    pub tx_hash: Option<TxHash>,

    /// Inclusion block of the creation transaction
    pub block_number: Option<u64>,
}

impl DeploymentInfo {
    /// Create new deployment info.
    pub fn new(network: String, contract_address: Address) -> Self {
        Self {
            network,
            contract_address,
            tx_hash: None,
            block_number: None,
        }
    }

    pub fn with_transaction(mut self, tx_hash: TxHash, block_number: u64) -> Self {
        self.tx_hash = Some(tx_hash);
        self.block_number = Some(block_number);
        self
    }

    /// Save deployment info to `.env` in the working directory.
    pub fn save_to_env(&self) -> Result<()> {
        self.save_to_env_file(&PathBuf::from(".env"))
    }

    /// Save deployment info to an env file.
    ///
    /// Updates existing variables in place and appends new ones; every other
    /// line is kept as is.
    pub fn save_to_env_file(&self, env_path: &Path) -> Result<()> {
        let existing_content = if env_path.exists() {
            fs::read_to_string(env_path).context("Failed to read existing .env file")?
        } else {
            String::new()
        };

        let mut lines: Vec<String> = existing_content.lines().map(str::to_string).collect();

        Self::upsert_var(&mut lines, "NETWORK", &self.network);
        Self::upsert_var(
            &mut lines,
            "CONTRACT_ADDRESS",
            &self.contract_address.to_checksum(None),
        );

        if let Some(tx_hash) = self.tx_hash {
            Self::upsert_var(&mut lines, "DEPLOY_TX_HASH", &tx_hash.to_string());
        }

        if let Some(block) = self.block_number {
            Self::upsert_var(&mut lines, "DEPLOY_BLOCK", &block.to_string());
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(env_path)
            .context("Failed to open .env file for writing")?;

        if existing_content.is_empty() {
            writeln!(file, "# RockPaperScissors deployment configuration")?;
            writeln!(file)?;
        }

        for line in lines {
            writeln!(file, "{}", line)?;
        }

        tracing::info!(path = %env_path.display(), address = %self.contract_address, "Deployment saved");
        Ok(())
    }

    fn upsert_var(lines: &mut Vec<String>, key: &str, value: &str) {
        let entry = format!("{}={}", key, value);
        let existing = lines.iter().position(|line| {
            let line = line.trim();
            !line.starts_with('#')
                && line
                    .split_once('=')
                    .is_some_and(|(k, _)| k.trim() == key)
        });

        match existing {
            Some(pos) => lines[pos] = entry,
            None => lines.push(entry),
        }
    }
}

/// Compiled contract artifacts (solc `--abi` / `--bin` output).
#[derive(Debug, Clone)]
pub struct ContractArtifacts {
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl ContractArtifacts {
    pub fn load(abi_path: &Path, bin_path: &Path) -> Result<Self> {
        let abi_json = fs::read_to_string(abi_path)
            .with_context(|| format!("Failed to read ABI artifact {}", abi_path.display()))?;
        let abi: JsonAbi = serde_json::from_str(&abi_json)
            .with_context(|| format!("Invalid ABI artifact {}", abi_path.display()))?;

        let bin = fs::read_to_string(bin_path)
            .with_context(|| format!("Failed to read bytecode artifact {}", bin_path.display()))?;
        let bin = bin.trim();
        let bytecode = hex::decode(bin.strip_prefix("0x").unwrap_or(bin))
            .with_context(|| format!("Invalid bytecode artifact {}", bin_path.display()))?;

        anyhow::ensure!(!bytecode.is_empty(), "Bytecode artifact {} is empty", bin_path.display());

        Ok(Self {
            abi,
            bytecode: bytecode.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{B256, address};

    const CONTRACT: Address = address!("2d6918a3ffec3e09c633c11b50b62b8d2acd23ba");

    #[test]
    fn save_creates_file_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");

        DeploymentInfo::new("testnet".into(), CONTRACT)
            .save_to_env_file(&path)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# RockPaperScissors deployment configuration"));
        assert!(
            content
                .to_lowercase()
                .contains("contract_address=0x2d6918a3ffec3e09c633c11b50b62b8d2acd23ba")
        );
        assert!(!content.contains("DEPLOY_TX_HASH"));
    }

    #[test]
    fn save_updates_in_place_and_keeps_other_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(
            &path,
            "# keys\nRPC_URL=http://localhost:8545\nCONTRACT_ADDRESS=0x00\nBET_AMOUNT=0.01\n",
        )
        .unwrap();

        DeploymentInfo::new("local".into(), CONTRACT)
            .with_transaction(B256::repeat_byte(0xab), 42)
            .save_to_env_file(&path)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "# keys");
        assert_eq!(lines[1], "RPC_URL=http://localhost:8545");
        assert!(lines[2].starts_with("CONTRACT_ADDRESS=0x2d69"));
        assert_eq!(lines[3], "BET_AMOUNT=0.01");
        assert!(content.contains("NETWORK=local"));
        assert!(content.contains("DEPLOY_BLOCK=42"));
        assert_eq!(content.matches("CONTRACT_ADDRESS=").count(), 1);
    }

    #[test]
    fn artifacts_load_hex_with_or_without_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let abi_path = dir.path().join("rps.abi");
        let bin_path = dir.path().join("rps.bin");
        fs::write(
            &abi_path,
            r#"[{"type":"constructor","inputs":[{"name":"betAmount","type":"uint256","internalType":"uint256"}],"stateMutability":"nonpayable"}]"#,
        )
        .unwrap();

        fs::write(&bin_path, "6080604052\n").unwrap();
        let artifacts = ContractArtifacts::load(&abi_path, &bin_path).unwrap();
        assert_eq!(artifacts.bytecode.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
        assert_eq!(artifacts.abi.constructor().unwrap().inputs.len(), 1);

        fs::write(&bin_path, "0x6080").unwrap();
        assert_eq!(
            ContractArtifacts::load(&abi_path, &bin_path).unwrap().bytecode.len(),
            2
        );

        fs::write(&bin_path, "").unwrap();
        assert!(ContractArtifacts::load(&abi_path, &bin_path).is_err());
    }
}
