//! Extrinsic signing and submission.

use super::{ChainError, ExtrinsicCall, TxStatus};
use crate::dashboard::subscription::{Subscription, SubscriptionHandle};
use crate::wallet::Signer;
use subxt::SubstrateConfig;
use subxt::tx::TransactionStatus as SubmissionStatus;
use subxt::utils::{AccountId32, MultiSignature};
use subxt_rpcs::RpcClient;
use tokio::sync::mpsc;

impl subxt::tx::Signer<SubstrateConfig> for Signer {
    fn account_id(&self) -> AccountId32 {
        AccountId32(self.public_key())
    }

    fn sign(&self, signer_payload: &[u8]) -> MultiSignature {
        MultiSignature::Sr25519(self.sign_bytes(signer_payload))
    }
}

fn failed(err: impl std::fmt::Display) -> ChainError {
    ChainError::TransactionFailed(err.to_string())
}

fn tx_status<C>(status: SubmissionStatus<SubstrateConfig, C>) -> TxStatus {
    match status {
        SubmissionStatus::Validated => TxStatus::Ready,
        SubmissionStatus::Broadcasted => TxStatus::Broadcast,
        SubmissionStatus::NoLongerInBestBlock => TxStatus::Retracted,
        SubmissionStatus::InBestBlock(block) => {
            TxStatus::InBlock(format!("{:#x}", block.block_hash()))
        }
        SubmissionStatus::InFinalizedBlock(block) => {
            TxStatus::Finalized(format!("{:#x}", block.block_hash()))
        }
        SubmissionStatus::Error { message } => TxStatus::Error(message),
        SubmissionStatus::Invalid { message } => TxStatus::Invalid(message),
        SubmissionStatus::Dropped { message } => TxStatus::Dropped(message),
    }
}

/// Sign `call`, submit it at the current best block and forward its progress
/// until a terminal status.
pub(super) async fn submit_and_watch(
    rpc: RpcClient,
    call: ExtrinsicCall,
    signer: Signer,
) -> Result<Subscription<TxStatus>, ChainError> {
    let client = subxt::OnlineClient::<SubstrateConfig>::from_rpc_client(rpc)
        .await
        .map_err(failed)?;
    let client_at = client.at_current_block().await.map_err(failed)?;

    let payload = subxt::dynamic::tx(call.pallet, call.call, Vec::<scale_value::Value>::new());
    let mut progress = client_at
        .tx()
        .sign_and_submit_then_watch_default(&payload, &signer)
        .await
        .map_err(failed)?;

    let (updates, receiver) = mpsc::unbounded_channel();
    let task = tokio::spawn(async move {
        while let Some(status) = progress.next().await {
            let status = match status {
                Ok(status) => tx_status(status),
                Err(e) => TxStatus::Error(e.to_string()),
            };
            tracing::debug!(%call, %status, "Extrinsic status");

            let terminal = status.is_terminal();
            if updates.send(status).is_err() || terminal {
                break;
            }
        }
    });

    Ok(Subscription::new(
        receiver,
        SubscriptionHandle::new(move || task.abort()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    type Status = SubmissionStatus<SubstrateConfig, ()>;

    #[test]
    fn test_pool_statuses_map_one_to_one() {
        assert_eq!(tx_status(Status::Validated), TxStatus::Ready);
        assert_eq!(tx_status(Status::Broadcasted), TxStatus::Broadcast);
        assert_eq!(tx_status(Status::NoLongerInBestBlock), TxStatus::Retracted);
    }

    #[test]
    fn test_failures_keep_their_message() {
        let status = tx_status(Status::Invalid {
            message: "bad nonce".into(),
        });
        assert_eq!(status, TxStatus::Invalid("bad nonce".into()));
        assert!(status.is_terminal());

        let status = tx_status(Status::Dropped {
            message: "pool full".into(),
        });
        assert_eq!(status, TxStatus::Dropped("pool full".into()));

        let status = tx_status(Status::Error {
            message: "node".into(),
        });
        assert_eq!(status, TxStatus::Error("node".into()));
    }
}
