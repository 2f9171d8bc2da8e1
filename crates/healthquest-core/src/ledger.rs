//! Remote ledger client for the on-chain health contract.
//!
//! The contract is reached over Ethereum JSON-RPC. Writes
//! (`updateHealthData`, `registerUser`, `claimRewards`) are sent as
//! `eth_sendTransaction` from an account unlocked on the node. Reads
//! (`getUserRewards`, `getUserHealthData`) go through `eth_call` and decode
//! the returned static tuple word by word.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use sha3::{Digest, Keccak256};
use tracing::debug;

use crate::error::LedgerError;
use crate::storage::LedgerConfig;

/// Solidity signature of the metrics write.
pub const UPDATE_HEALTH_DATA_SIGNATURE: &str = "updateHealthData(uint256,uint256,uint256)";
pub const REGISTER_USER_SIGNATURE: &str = "registerUser()";
pub const CLAIM_REWARDS_SIGNATURE: &str = "claimRewards()";
pub const GET_USER_REWARDS_SIGNATURE: &str = "getUserRewards(address)";
pub const GET_USER_HEALTH_DATA_SIGNATURE: &str = "getUserHealthData(address)";

/// Reward totals as the contract stores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnChainRewards {
    pub total_points: u64,
    pub bny_rewards: u64,
    /// Unix seconds of the last claim, 0 if never claimed.
    pub last_claimed: u64,
}

/// Latest metrics as the contract stores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnChainHealthData {
    pub daily_steps: u64,
    pub water_intake: u64,
    pub sleep_hours: u64,
    pub goal_streak: u64,
    /// Unix seconds of the last update.
    pub last_update: u64,
}

/// Remote ledger the session mirrors metrics to.
///
/// Only [`LedgerClient::submit_metrics`] is needed for mirroring; the account
/// operations default to [`LedgerError::Unsupported`].
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Whether a wallet/contract session is available.
    fn is_session_active(&self) -> bool;

    /// Submit one day of metrics. Returns the transaction hash.
    async fn submit_metrics(
        &self,
        steps: u64,
        water_intake: u64,
        sleep_hours: u64,
    ) -> Result<String, LedgerError>;

    /// Register the session account with the contract.
    async fn register_user(&self) -> Result<String, LedgerError> {
        Err(LedgerError::Unsupported("registerUser".into()))
    }

    /// Claim accumulated on-chain rewards.
    async fn claim_rewards(&self) -> Result<String, LedgerError> {
        Err(LedgerError::Unsupported("claimRewards".into()))
    }

    async fn get_user_rewards(&self, _address: &str) -> Result<OnChainRewards, LedgerError> {
        Err(LedgerError::Unsupported("getUserRewards".into()))
    }

    async fn get_user_health_data(
        &self,
        _address: &str,
    ) -> Result<OnChainHealthData, LedgerError> {
        Err(LedgerError::Unsupported("getUserHealthData".into()))
    }
}

/// First four bytes of the Keccak-256 hash of a function signature.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// ABI-encode a call with static `uint256` arguments.
pub fn encode_uint_call(signature: &str, args: &[u64]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + 32 * args.len());
    data.extend_from_slice(&function_selector(signature));
    for arg in args {
        let mut word = [0u8; 32];
        word[24..].copy_from_slice(&arg.to_be_bytes());
        data.extend_from_slice(&word);
    }
    data
}

/// ABI-encode a call with a single `address` argument.
///
/// # Errors
/// Returns [`LedgerError::InvalidAddress`] for a malformed address.
pub fn encode_address_call(signature: &str, address: &str) -> Result<Vec<u8>, LedgerError> {
    let normalized = parse_address(address)?;
    let raw = hex::decode(&normalized[2..])
        .map_err(|_| LedgerError::InvalidAddress(address.to_string()))?;
    let mut data = Vec::with_capacity(4 + 32);
    data.extend_from_slice(&function_selector(signature));
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(&raw);
    Ok(data)
}

/// Decode the first `count` 32-byte words of `0x`-prefixed return data as
/// `uint256` values that must fit in `u64`.
///
/// # Errors
/// Returns [`LedgerError::InvalidResponse`] for bad hex, short data, or a
/// word larger than `u64::MAX`.
pub fn decode_uint_words(data: &str, count: usize) -> Result<Vec<u64>, LedgerError> {
    let hex_part = data.strip_prefix("0x").unwrap_or(data);
    let bytes = hex::decode(hex_part)
        .map_err(|e| LedgerError::InvalidResponse(format!("bad return data: {e}")))?;
    if bytes.len() < 32 * count {
        return Err(LedgerError::InvalidResponse(format!(
            "expected {count} words, got {} bytes",
            bytes.len()
        )));
    }

    bytes
        .chunks_exact(32)
        .take(count)
        .map(|word| {
            if word[..24].iter().any(|b| *b != 0) {
                return Err(LedgerError::InvalidResponse(
                    "uint256 value does not fit in u64".into(),
                ));
            }
            let mut tail = [0u8; 8];
            tail.copy_from_slice(&word[24..]);
            Ok(u64::from_be_bytes(tail))
        })
        .collect()
}

/// Calldata for `updateHealthData`, hex encoded with `0x` prefix.
pub fn update_health_data_calldata(steps: u64, water_intake: u64, sleep_hours: u64) -> String {
    let data = encode_uint_call(
        UPDATE_HEALTH_DATA_SIGNATURE,
        &[steps, water_intake, sleep_hours],
    );
    format!("0x{}", hex::encode(data))
}

/// Check a `0x`-prefixed 20-byte hex address.
///
/// # Errors
/// Returns [`LedgerError::InvalidAddress`] for anything else.
pub fn parse_address(address: &str) -> Result<String, LedgerError> {
    let trimmed = address.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| LedgerError::InvalidAddress(address.to_string()))?;
    if hex_part.len() != 40 || hex::decode(hex_part).is_err() {
        return Err(LedgerError::InvalidAddress(address.to_string()));
    }
    Ok(format!("0x{}", hex_part.to_ascii_lowercase()))
}

/// JSON-RPC backed ledger client.
pub struct JsonRpcLedger {
    rpc_url: String,
    chain_id: u64,
    contract_address: Option<String>,
    account: Option<String>,
    enabled: bool,
    http_client: Client,
}

impl JsonRpcLedger {
    /// Configured sender account, if any.
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            rpc_url: config.rpc_url.clone(),
            chain_id: config.chain_id,
            contract_address: config.contract_address.clone(),
            account: config.account.clone(),
            enabled: config.enabled,
            http_client: Client::new(),
        }
    }

    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, LedgerError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let resp: serde_json::Value = self
            .http_client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if let Some(err) = resp.get("error") {
            return Err(LedgerError::Rpc {
                code: err["code"].as_i64().unwrap_or(0),
                message: err["message"].as_str().unwrap_or("unknown error").to_string(),
            });
        }

        resp.get("result")
            .cloned()
            .ok_or_else(|| LedgerError::InvalidResponse(format!("missing result: {resp}")))
    }

    /// Contract address, or `NotConnected` when the ledger is off or unset.
    fn contract(&self) -> Result<String, LedgerError> {
        match &self.contract_address {
            Some(contract) if self.enabled => parse_address(contract),
            _ => Err(LedgerError::NotConnected),
        }
    }

    /// Send a contract transaction from the session account. Returns the hash.
    async fn send_transaction(&self, data: &[u8]) -> Result<String, LedgerError> {
        let to = self.contract()?;
        let from = parse_address(self.account.as_deref().ok_or(LedgerError::NotConnected)?)?;

        let tx = json!({
            "from": from,
            "to": to,
            "data": format!("0x{}", hex::encode(data)),
            "chainId": format!("0x{:x}", self.chain_id),
        });

        let result = self.call("eth_sendTransaction", json!([tx])).await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| LedgerError::InvalidResponse(format!("expected tx hash, got {result}")))
    }

    /// Read-only contract call at the latest block. Returns the raw hex data.
    async fn eth_call(&self, data: &[u8]) -> Result<String, LedgerError> {
        let to = self.contract()?;
        let call = json!({
            "to": to,
            "data": format!("0x{}", hex::encode(data)),
        });

        let result = self.call("eth_call", json!([call, "latest"])).await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| LedgerError::InvalidResponse(format!("expected hex data, got {result}")))
    }
}

#[async_trait]
impl LedgerClient for JsonRpcLedger {
    fn is_session_active(&self) -> bool {
        self.enabled && self.contract_address.is_some() && self.account.is_some()
    }

    async fn submit_metrics(
        &self,
        steps: u64,
        water_intake: u64,
        sleep_hours: u64,
    ) -> Result<String, LedgerError> {
        let data = encode_uint_call(
            UPDATE_HEALTH_DATA_SIGNATURE,
            &[steps, water_intake, sleep_hours],
        );
        let hash = self.send_transaction(&data).await?;
        debug!(tx_hash = %hash, "submitted health data");
        Ok(hash)
    }

    async fn register_user(&self) -> Result<String, LedgerError> {
        let hash = self
            .send_transaction(&encode_uint_call(REGISTER_USER_SIGNATURE, &[]))
            .await?;
        debug!(tx_hash = %hash, "registered user");
        Ok(hash)
    }

    async fn claim_rewards(&self) -> Result<String, LedgerError> {
        let hash = self
            .send_transaction(&encode_uint_call(CLAIM_REWARDS_SIGNATURE, &[]))
            .await?;
        debug!(tx_hash = %hash, "claimed rewards");
        Ok(hash)
    }

    async fn get_user_rewards(&self, address: &str) -> Result<OnChainRewards, LedgerError> {
        let data = encode_address_call(GET_USER_REWARDS_SIGNATURE, address)?;
        let words = decode_uint_words(&self.eth_call(&data).await?, 3)?;
        Ok(OnChainRewards {
            total_points: words[0],
            bny_rewards: words[1],
            last_claimed: words[2],
        })
    }

    async fn get_user_health_data(
        &self,
        address: &str,
    ) -> Result<OnChainHealthData, LedgerError> {
        let data = encode_address_call(GET_USER_HEALTH_DATA_SIGNATURE, address)?;
        let words = decode_uint_words(&self.eth_call(&data).await?, 5)?;
        Ok(OnChainHealthData {
            daily_steps: words[0],
            water_intake: words[1],
            sleep_hours: words[2],
            goal_streak: words[3],
            last_update: words[4],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const CONTRACT: &str = "0x00000000000000000000000000000000000000aa";
    const ACCOUNT: &str = "0x1111111111111111111111111111111111111111";

    fn config(url: &str) -> LedgerConfig {
        LedgerConfig {
            enabled: true,
            rpc_url: url.to_string(),
            contract_address: Some(CONTRACT.into()),
            account: Some(ACCOUNT.into()),
            ..LedgerConfig::default()
        }
    }

    #[test]
    fn selector_matches_known_erc20_selectors() {
        assert_eq!(function_selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(function_selector("balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);
    }

    #[test]
    fn calldata_layout() {
        let data = encode_uint_call(UPDATE_HEALTH_DATA_SIGNATURE, &[10_000, 8, 7]);
        assert_eq!(data.len(), 4 + 3 * 32);
        assert_eq!(&data[..4], &function_selector(UPDATE_HEALTH_DATA_SIGNATURE));
        assert_eq!(u64::from_be_bytes(data[28..36].try_into().unwrap()), 10_000);
        assert_eq!(u64::from_be_bytes(data[60..68].try_into().unwrap()), 8);
        assert_eq!(u64::from_be_bytes(data[92..100].try_into().unwrap()), 7);
        assert!(data[4..28].iter().all(|b| *b == 0));

        let hex = update_health_data_calldata(10_000, 8, 7);
        assert!(hex.starts_with("0x"));
        assert_eq!(hex.len(), 2 + 2 * 100);
    }

    #[test]
    fn address_validation() {
        assert_eq!(
            parse_address("0xABCDEFabcdef0000000000000000000000000001").unwrap(),
            "0xabcdefabcdef0000000000000000000000000001"
        );
        assert!(parse_address("abcdef").is_err());
        assert!(parse_address("0x123").is_err());
        assert!(parse_address("0xzz00000000000000000000000000000000000000").is_err());
    }

    #[test]
    fn session_requires_contract_and_account() {
        let mut cfg = config("http://localhost");
        assert!(JsonRpcLedger::new(&cfg).is_session_active());
        cfg.account = None;
        assert!(!JsonRpcLedger::new(&cfg).is_session_active());
        cfg = config("http://localhost");
        cfg.enabled = false;
        assert!(!JsonRpcLedger::new(&cfg).is_session_active());
    }

    #[tokio::test]
    async fn submit_posts_send_transaction() {
        let mut server = mockito::Server::new_async().await;
        let expected_data = update_health_data_calldata(8_000, 6, 7);
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "eth_sendTransaction",
                "params": [{ "to": CONTRACT, "from": ACCOUNT, "data": expected_data }]
            })))
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0xdeadbeef"}"#)
            .create_async()
            .await;

        let ledger = JsonRpcLedger::new(&config(&server.url()));
        let hash = ledger.submit_metrics(8_000, 6, 7).await.unwrap();
        assert_eq!(hash, "0xdeadbeef");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rpc_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"insufficient funds"}}"#,
            )
            .create_async()
            .await;

        let ledger = JsonRpcLedger::new(&config(&server.url()));
        let err = ledger.submit_metrics(1, 1, 1).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Rpc { code: -32000, ref message } if message == "insufficient funds"
        ));
    }

    fn words(values: &[u64]) -> String {
        let mut out = String::from("0x");
        for v in values {
            out.push_str(&format!("{v:064x}"));
        }
        out
    }

    #[test]
    fn address_call_layout() {
        let data = encode_address_call(GET_USER_REWARDS_SIGNATURE, ACCOUNT).unwrap();
        assert_eq!(data.len(), 36);
        assert_eq!(&data[..4], &function_selector(GET_USER_REWARDS_SIGNATURE));
        assert!(data[4..16].iter().all(|b| *b == 0));
        assert!(data[16..].iter().all(|b| *b == 0x11));
        assert!(encode_address_call(GET_USER_REWARDS_SIGNATURE, "0x12").is_err());
    }

    #[test]
    fn decodes_uint_words() {
        assert_eq!(decode_uint_words(&words(&[450, 4, 0]), 3).unwrap(), vec![450, 4, 0]);
        assert!(matches!(
            decode_uint_words(&words(&[1, 2]), 3),
            Err(LedgerError::InvalidResponse(_))
        ));
        let overflow = format!("0x{}", "f".repeat(64));
        assert!(decode_uint_words(&overflow, 1).is_err());
        assert!(decode_uint_words("0xzz", 1).is_err());
    }

    #[tokio::test]
    async fn register_and_claim_send_transactions() {
        let mut server = mockito::Server::new_async().await;
        let register = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "eth_sendTransaction",
                "params": [{
                    "from": ACCOUNT,
                    "data": format!("0x{}", hex::encode(function_selector(REGISTER_USER_SIGNATURE)))
                }]
            })))
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x01"}"#)
            .create_async()
            .await;
        let claim = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "params": [{
                    "data": format!("0x{}", hex::encode(function_selector(CLAIM_REWARDS_SIGNATURE)))
                }]
            })))
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x02"}"#)
            .create_async()
            .await;

        let ledger = JsonRpcLedger::new(&config(&server.url()));
        assert_eq!(ledger.register_user().await.unwrap(), "0x01");
        assert_eq!(ledger.claim_rewards().await.unwrap(), "0x02");
        register.assert_async().await;
        claim.assert_async().await;
    }

    #[tokio::test]
    async fn reads_rewards_and_health_data() {
        let mut server = mockito::Server::new_async().await;
        let rewards_call = format!(
            "0x{}",
            hex::encode(encode_address_call(GET_USER_REWARDS_SIGNATURE, ACCOUNT).unwrap())
        );
        let health_call = format!(
            "0x{}",
            hex::encode(encode_address_call(GET_USER_HEALTH_DATA_SIGNATURE, ACCOUNT).unwrap())
        );
        server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "eth_call",
                "params": [{ "to": CONTRACT, "data": rewards_call }, "latest"]
            })))
            .with_header("content-type", "application/json")
            .with_body(
                json!({"jsonrpc": "2.0", "id": 1, "result": words(&[510, 5, 1_700_000_000])})
                    .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "eth_call",
                "params": [{ "data": health_call }]
            })))
            .with_header("content-type", "application/json")
            .with_body(
                json!({"jsonrpc": "2.0", "id": 1, "result": words(&[9_000, 7, 8, 3, 1_700_000_500])})
                    .to_string(),
            )
            .create_async()
            .await;

        let ledger = JsonRpcLedger::new(&config(&server.url()));
        assert_eq!(
            ledger.get_user_rewards(ACCOUNT).await.unwrap(),
            OnChainRewards {
                total_points: 510,
                bny_rewards: 5,
                last_claimed: 1_700_000_000
            }
        );
        let health = ledger.get_user_health_data(ACCOUNT).await.unwrap();
        assert_eq!(health.daily_steps, 9_000);
        assert_eq!(health.goal_streak, 3);
    }

    #[tokio::test]
    async fn short_return_data_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x"}"#)
            .create_async()
            .await;

        let ledger = JsonRpcLedger::new(&config(&server.url()));
        assert!(matches!(
            ledger.get_user_rewards(ACCOUNT).await,
            Err(LedgerError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn inactive_session_does_not_call_out() {
        let mut cfg = config("http://127.0.0.1:9");
        cfg.contract_address = None;
        let ledger = JsonRpcLedger::new(&cfg);
        assert!(matches!(
            ledger.submit_metrics(1, 1, 1).await,
            Err(LedgerError::NotConnected)
        ));
        assert!(matches!(ledger.claim_rewards().await, Err(LedgerError::NotConnected)));
        assert!(matches!(
            ledger.get_user_rewards(ACCOUNT).await,
            Err(LedgerError::NotConnected)
        ));
    }
}
