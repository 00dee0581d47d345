// SPDX-License-Identifier: GPL-3.0-or-later

//! [`ChainClient`] over a node's JSON-RPC interface.

use super::storage::{self, BalanceKeys, StorageCache, StorageChangeSet};
use super::{ChainClient, ChainError, ExtrinsicCall, TxStatus, tx};
use crate::dashboard::subscription::{Subscription, SubscriptionHandle};
use crate::dashboard::types::{AccountBalanceSnapshot, SessionProgress, StakingLedger, TokenInfo};
use crate::wallet::{self, Signer};
use futures::future::BoxFuture;
use serde_json::Value;
use subxt_rpcs::RpcClient;
use subxt_rpcs::client::rpc_params;
use tokio::sync::mpsc;

const DEFAULT_TOKEN_SYMBOL: &str = "UNITS";
const DEFAULT_DECIMALS: u8 = 12;

type SystemProperties = serde_json::Map<String, Value>;

pub struct RpcChainClient {
    rpc: RpcClient,
    era_length: u64,
}

impl RpcChainClient {
    /// Open a connection to the node at `substrate.url`.
    pub async fn connect(
        substrate: &config::SubstrateConfig,
        chain: &config::ChainConfig,
    ) -> Result<Self, ChainError> {
        let rpc = if substrate.is_insecure() {
            RpcClient::from_insecure_url(&substrate.url).await
        } else {
            RpcClient::from_url(&substrate.url).await
        }
        .map_err(|e| ChainError::Unavailable(format!("{}: {e}", substrate.url)))?;

        tracing::info!(url = %substrate.url, "Connected to node");
        Ok(Self::new(rpc, chain))
    }

    pub fn new(rpc: RpcClient, chain: &config::ChainConfig) -> Self {
        Self {
            rpc,
            era_length: chain.era_length(),
        }
    }

    /// Subscribe to `keys` and rebuild a value from the merged cache after
    /// every change set. `build` returns `None` while the value is incomplete.
    async fn watch_storage<T, F>(
        &self,
        source: &'static str,
        keys: Vec<Vec<u8>>,
        build: F,
    ) -> Result<Subscription<T>, ChainError>
    where
        T: Send + 'static,
        F: Fn(&StorageCache) -> Result<Option<T>, ChainError> + Send + 'static,
    {
        let hex_keys: Vec<String> = keys.iter().map(|key| storage::to_hex(key)).collect();
        let mut changes = self
            .rpc
            .subscribe::<StorageChangeSet>(
                "state_subscribeStorage",
                rpc_params![hex_keys],
                "state_unsubscribeStorage",
            )
            .await?;

        let (updates, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            let mut cache = StorageCache::default();
            while let Some(change_set) = changes.next().await {
                let change_set = match change_set {
                    Ok(change_set) => change_set,
                    Err(e) => {
                        tracing::warn!(source, error = %e, "Storage subscription failed");
                        break;
                    }
                };
                if let Err(e) = cache.apply(&change_set) {
                    tracing::warn!(source, block = %change_set.block, error = %e, "Skipping change set");
                    continue;
                }
                match build(&cache) {
                    Ok(Some(value)) => {
                        if updates.send(value).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(source, block = %change_set.block, error = %e, "Failed to rebuild value");
                    }
                }
            }
            tracing::debug!(source, "Storage subscription closed");
        });

        // Aborting drops the RPC subscription, which unsubscribes on the node.
        let handle = SubscriptionHandle::new(move || task.abort());
        Ok(Subscription::new(receiver, handle))
    }
}

impl ChainClient for RpcChainClient {
    fn chain_properties(&self) -> BoxFuture<'_, Result<TokenInfo, ChainError>> {
        Box::pin(async move {
            let properties = self
                .rpc
                .request::<SystemProperties>("system_properties", rpc_params![])
                .await?;
            Ok(token_info(&properties))
        })
    }

    fn subscribe_balances<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<Subscription<AccountBalanceSnapshot>, ChainError>> {
        Box::pin(async move {
            let account = wallet::account_bytes(address)
                .map_err(|_| ChainError::InvalidAddress(address.to_string()))?;
            let keys = BalanceKeys::new(&account);
            self.watch_storage("balances", keys.all(), move |cache| {
                storage::snapshot_from_cache(cache, &keys)
            })
            .await
        })
    }

    fn subscribe_staking_ledger<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<Subscription<Option<StakingLedger>>, ChainError>> {
        Box::pin(async move {
            let account = wallet::account_bytes(address)
                .map_err(|_| ChainError::InvalidAddress(address.to_string()))?;
            let key = storage::ledger_key(&account);
            self.watch_storage("staking ledger", vec![key.clone()], move |cache| {
                storage::ledger_from_cache(cache, &key)
            })
            .await
        })
    }

    fn subscribe_session_progress(
        &self,
    ) -> BoxFuture<'_, Result<Subscription<SessionProgress>, ChainError>> {
        Box::pin(async move {
            let key = storage::active_era_key();
            let era_length = self.era_length;
            self.watch_storage("session progress", vec![key.clone()], move |cache| {
                storage::progress_from_cache(cache, &key, era_length)
            })
            .await
        })
    }

    fn submit_extrinsic<'a>(
        &'a self,
        call: ExtrinsicCall,
        signer_address: &'a str,
        signer: Signer,
    ) -> BoxFuture<'a, Result<Subscription<TxStatus>, ChainError>> {
        Box::pin(async move {
            if !signer.controls(signer_address) {
                return Err(ChainError::SignerMismatch(signer_address.to_string()));
            }
            tracing::info!(%call, signer = signer_address, "Submitting extrinsic");
            tx::submit_and_watch(self.rpc.clone(), call, signer).await
        })
    }
}

// ================================================================================================
// Chain Properties
// ================================================================================================

/// Token metadata from `system_properties`. Multi-token chains report
/// lists; the first entry is the native token.
fn token_info(properties: &SystemProperties) -> TokenInfo {
    let symbol = properties
        .get("tokenSymbol")
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Array(arr) => arr.first().and_then(|s| s.as_str()).map(str::to_string),
            _ => None,
        })
        .unwrap_or_else(|| DEFAULT_TOKEN_SYMBOL.to_string());

    let decimals = properties
        .get("tokenDecimals")
        .and_then(|v| match v {
            Value::Array(arr) => arr.first().and_then(Value::as_u64),
            other => other.as_u64(),
        })
        .and_then(|n| u8::try_from(n).ok())
        .unwrap_or(DEFAULT_DECIMALS);

    TokenInfo { symbol, decimals }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use subxt_rpcs::client::MockRpcClient;
    use subxt_rpcs::client::mock_rpc_client::Json as MockJson;

    fn properties(value: Value) -> SystemProperties {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_token_info_single_values() {
        let info = token_info(&properties(json!({"tokenSymbol": "DOT", "tokenDecimals": 10})));
        assert_eq!(
            info,
            TokenInfo {
                symbol: "DOT".into(),
                decimals: 10
            }
        );
    }

    #[test]
    fn test_token_info_lists_use_first_entry() {
        let info = token_info(&properties(
            json!({"tokenSymbol": ["KSM", "USDT"], "tokenDecimals": [12, 6]}),
        ));
        assert_eq!(info.symbol, "KSM");
        assert_eq!(info.decimals, 12);
    }

    #[test]
    fn test_token_info_defaults() {
        let info = token_info(&properties(json!({"ss58Format": 42})));
        assert_eq!(info.symbol, DEFAULT_TOKEN_SYMBOL);
        assert_eq!(info.decimals, DEFAULT_DECIMALS);

        let info = token_info(&properties(json!({"tokenDecimals": 300})));
        assert_eq!(info.decimals, DEFAULT_DECIMALS);
    }

    #[tokio::test]
    async fn test_chain_properties_over_rpc() {
        let mock_client = MockRpcClient::builder()
            .method_handler("system_properties", async |_params| {
                MockJson(json!({
                    "ss58Format": 0,
                    "tokenDecimals": 10,
                    "tokenSymbol": "DOT"
                }))
            })
            .build();
        let client = RpcChainClient::new(
            RpcClient::new(mock_client),
            &config::ChainConfig::default(),
        );

        let info = client.chain_properties().await.unwrap();
        assert_eq!(info.symbol, "DOT");
        assert_eq!(info.decimals, 10);
        assert_eq!(client.era_length, 14_400);
    }

    #[tokio::test]
    async fn test_invalid_address_is_rejected() {
        let client = RpcChainClient::new(
            RpcClient::new(MockRpcClient::builder().build()),
            &config::ChainConfig::default(),
        );
        let err = client.subscribe_balances("not-an-address").await.err().unwrap();
        assert!(matches!(err, ChainError::InvalidAddress(_)));
    }
}
