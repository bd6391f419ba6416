//! Composable, ordered transaction builder.
//!
//! A [`TransactionBuilder`] is an ordered list of [`InstructionWithSigners`],
//! each identified by a key unique within the builder. Adding an item whose key
//! already exists replaces it in place. Adding another builder inlines its items
//! in order and leaves its context behind.
//!
//! ```rust,ignore
//! let builder = TransactionBuilder::<()>::make()
//!     .set_fee_payer(payer)
//!     .add(create_token_builder)
//!     .add(InstructionWithSigners::new(mint_to_ix, vec![authority], "mintTokens"))
//!     .when(print_receipt, |b| b.add(receipt_item));
//! let response = builder.send_and_confirm(&client, &scope, ConfirmOptions::default()).await?;
//! ```

use std::fmt;

use solana_hash::Hash;
use solana_instruction::Instruction;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_signer::Signer;
use solana_transaction::Transaction;

use crate::client::MintlineClient;
use crate::error::{SdkError, SdkResult};
use crate::rpc::{ConfirmOptions, SendAndConfirmTransactionResponse};
use crate::task::CancellationScope;
use crate::transaction::identity::SignerHandle;

// ============================================================================
// Builder items
// ============================================================================

/// One instruction with the signers it requires and its key in the builder.
#[derive(Clone)]
pub struct InstructionWithSigners {
    pub instruction: Instruction,
    pub signers: Vec<SignerHandle>,
    pub key: String,
}

impl InstructionWithSigners {
    pub fn new(instruction: Instruction, signers: Vec<SignerHandle>, key: impl Into<String>) -> Self {
        Self {
            instruction,
            signers,
            key: key.into(),
        }
    }

    /// Public keys of the attached signers.
    pub fn signer_keys(&self) -> Vec<Pubkey> {
        self.signers.iter().map(|signer| signer.pubkey()).collect()
    }
}

impl fmt::Debug for InstructionWithSigners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstructionWithSigners")
            .field("key", &self.key)
            .field("program_id", &self.instruction.program_id)
            .field("signers", &self.signer_keys())
            .finish()
    }
}

/// Anything that can be added to a builder.
pub trait IntoInstructions {
    fn into_instructions(self) -> Vec<InstructionWithSigners>;
}

impl IntoInstructions for InstructionWithSigners {
    fn into_instructions(self) -> Vec<InstructionWithSigners> {
        vec![self]
    }
}

impl IntoInstructions for Vec<InstructionWithSigners> {
    fn into_instructions(self) -> Vec<InstructionWithSigners> {
        self
    }
}

impl<C> IntoInstructions for TransactionBuilder<C> {
    fn into_instructions(self) -> Vec<InstructionWithSigners> {
        self.records
    }
}

impl<C> IntoInstructions for &TransactionBuilder<C> {
    fn into_instructions(self) -> Vec<InstructionWithSigners> {
        self.records.clone()
    }
}

// ============================================================================
// TransactionBuilder
// ============================================================================

/// Ordered builder of instructions with a typed context.
pub struct TransactionBuilder<C = ()> {
    records: Vec<InstructionWithSigners>,
    fee_payer: Option<SignerHandle>,
    context: Option<C>,
}

impl<C> Default for TransactionBuilder<C> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            fee_payer: None,
            context: None,
        }
    }
}

impl<C: Clone> Clone for TransactionBuilder<C> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            fee_payer: self.fee_payer.clone(),
            context: self.context.clone(),
        }
    }
}

impl<C> TransactionBuilder<C> {
    /// An empty builder with no fee payer and no context.
    pub fn make() -> Self {
        Self::default()
    }

    /// Append items, replacing in place any item whose key already exists.
    pub fn add(mut self, items: impl IntoInstructions) -> Self {
        for item in items.into_instructions() {
            self.upsert(item);
        }
        self
    }

    fn upsert(&mut self, item: InstructionWithSigners) {
        match self.records.iter_mut().find(|record| record.key == item.key) {
            Some(existing) => {
                tracing::trace!(key = %item.key, "replacing instruction by key");
                *existing = item;
            }
            None => self.records.push(item),
        }
    }

    /// Apply `f` only when `condition` holds.
    pub fn when(self, condition: bool, f: impl FnOnce(Self) -> Self) -> Self {
        if condition {
            f(self)
        } else {
            self
        }
    }

    /// Apply `f` only when `condition` does not hold.
    pub fn unless(self, condition: bool, f: impl FnOnce(Self) -> Self) -> Self {
        self.when(!condition, f)
    }

    /// Record who pays fees. The fee payer signs the transaction.
    pub fn set_fee_payer(mut self, fee_payer: SignerHandle) -> Self {
        self.fee_payer = Some(fee_payer);
        self
    }

    pub fn fee_payer(&self) -> Option<&SignerHandle> {
        self.fee_payer.as_ref()
    }

    pub fn set_context(mut self, context: C) -> Self {
        self.context = Some(context);
        self
    }

    pub fn get_context(&self) -> Option<&C> {
        self.context.as_ref()
    }

    pub fn into_context(self) -> Option<C> {
        self.context
    }

    /// Keep the items and fee payer under a new context type.
    pub fn with_context<D>(self, context: D) -> TransactionBuilder<D> {
        TransactionBuilder {
            records: self.records,
            fee_payer: self.fee_payer,
            context: Some(context),
        }
    }

    /// Instructions in execution order.
    pub fn instructions(&self) -> Vec<Instruction> {
        self.records
            .iter()
            .map(|record| record.instruction.clone())
            .collect()
    }

    pub fn instructions_with_signers(&self) -> &[InstructionWithSigners] {
        &self.records
    }

    pub fn instruction_with_key(&self, key: &str) -> Option<&InstructionWithSigners> {
        self.records.iter().find(|record| record.key == key)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.records.iter().map(|record| record.key.as_str()).collect()
    }

    /// Fee payer followed by every item signer, deduplicated by public key.
    pub fn signers(&self) -> Vec<SignerHandle> {
        let mut seen: Vec<Pubkey> = Vec::new();
        let mut signers = Vec::new();
        let candidates = self
            .fee_payer
            .iter()
            .chain(self.records.iter().flat_map(|record| record.signers.iter()));
        for signer in candidates {
            let key = signer.pubkey();
            if !seen.contains(&key) {
                seen.push(key);
                signers.push(signer.clone());
            }
        }
        signers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Assemble an unsigned transaction.
    pub fn to_transaction(&self, fee_payer: &Pubkey, blockhash: Hash) -> Transaction {
        let mut transaction = Transaction::new_with_payer(&self.instructions(), Some(fee_payer));
        transaction.message.recent_blockhash = blockhash;
        transaction
    }

    /// Sign `transaction` with every signer it requires.
    ///
    /// Signers the message does not require are skipped. A required signer with
    /// no matching handle is an error.
    pub fn sign(&self, transaction: &mut Transaction, signers: &[SignerHandle]) -> SdkResult<()> {
        let required = transaction.message.header.num_required_signatures as usize;
        let message_data = transaction.message_data();

        for signer in signers {
            let key = signer.try_pubkey()?;
            let position = transaction.message.account_keys[..required]
                .iter()
                .position(|account| *account == key);
            match position {
                Some(index) => {
                    transaction.signatures[index] = signer.try_sign_message(&message_data)?;
                }
                None => tracing::warn!(signer = %key, "signer not required by transaction"),
            }
        }

        let missing = transaction.message.account_keys[..required]
            .iter()
            .zip(&transaction.signatures)
            .find(|(_, signature)| **signature == Signature::default());
        if let Some((key, _)) = missing {
            return Err(SdkError::Signing(format!("missing signature for {}", key)));
        }
        Ok(())
    }

    /// Sign, submit and confirm. Consumes the builder.
    ///
    /// The fee payer defaults to the client identity. Cancellation is checked
    /// after the blockhash lookup and right before broadcast. Once the
    /// transaction is broadcast, a cancellation only stops the wait and
    /// surfaces as [`SdkError::CanceledAfterBroadcast`] with the signature.
    /// Program failures are decoded through the client's program registry.
    pub async fn send_and_confirm(
        self,
        client: &MintlineClient,
        scope: &CancellationScope,
        options: ConfirmOptions,
    ) -> SdkResult<SendAndConfirmTransactionResponse> {
        let fee_payer = match &self.fee_payer {
            Some(fee_payer) => fee_payer.clone(),
            None => client.identity().driver()?,
        };
        let mut signers = vec![fee_payer.clone()];
        signers.extend(self.signers());

        let commitment = options.commitment.unwrap_or(client.config().commitment);
        let blockhash = client.rpc().get_latest_blockhash(Some(commitment)).await?;
        scope.throw_if_canceled()?;

        let mut transaction = self.to_transaction(&fee_payer.try_pubkey()?, blockhash);
        self.sign(&mut transaction, &signers)?;
        scope.throw_if_canceled()?;

        tracing::debug!(
            instructions = self.len(),
            keys = ?self.keys(),
            "sending transaction"
        );
        let signature = client
            .rpc()
            .send_transaction(&transaction, &options)
            .await
            .map_err(|err| client.programs().resolve_error(err))?;

        if scope.is_canceled() {
            tracing::warn!(
                signature = %signature,
                "canceled after broadcast, transaction may still land"
            );
            return Err(SdkError::CanceledAfterBroadcast { signature });
        }

        let confirmation = client
            .rpc()
            .confirm_transaction(&signature, &blockhash, commitment)
            .await?;
        if let Some(reason) = confirmation.err.clone() {
            return Err(SdkError::TransactionFailed { signature, reason });
        }

        tracing::debug!(signature = %signature, slot = confirmation.slot, "transaction confirmed");
        Ok(SendAndConfirmTransactionResponse {
            signature,
            blockhash,
            confirmation,
        })
    }
}

impl<C> fmt::Debug for TransactionBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionBuilder")
            .field("keys", &self.keys())
            .field("fee_payer", &self.fee_payer.as_ref().map(|payer| payer.pubkey()))
            .field("has_context", &self.context.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::identity::signer_handle;
    use solana_instruction::AccountMeta;
    use solana_keypair::Keypair;

    fn item(key: &str, signers: Vec<SignerHandle>, tag: u8) -> InstructionWithSigners {
        let accounts = signers
            .iter()
            .map(|signer| AccountMeta::new(signer.pubkey(), true))
            .collect();
        InstructionWithSigners::new(
            Instruction {
                program_id: Pubkey::new_unique(),
                accounts,
                data: vec![tag],
            },
            signers,
            key,
        )
    }

    #[test]
    fn test_append_order() {
        let builder = TransactionBuilder::<()>::make()
            .add(item("a", vec![], 1))
            .add(item("b", vec![], 2));
        assert_eq!(builder.keys(), vec!["a", "b"]);
        assert_eq!(builder.instructions()[1].data, vec![2]);
    }

    #[test]
    fn test_override_by_key_keeps_position() {
        let builder = TransactionBuilder::<()>::make()
            .add(item("a", vec![], 1))
            .add(item("b", vec![], 2))
            .add(item("a", vec![], 9));
        assert_eq!(builder.keys(), vec!["a", "b"]);
        assert_eq!(builder.instruction_with_key("a").unwrap().instruction.data, vec![9]);
    }

    #[test]
    fn test_nested_builder_order_and_context() {
        let nested = TransactionBuilder::<u32>::make()
            .set_context(7)
            .add(item("a1", vec![], 1))
            .add(item("a2", vec![], 2));
        let outer = TransactionBuilder::<&str>::make()
            .set_context("outer")
            .add(item("b", vec![], 0))
            .add(&nested);

        assert_eq!(outer.keys(), vec!["b", "a1", "a2"]);
        assert_eq!(outer.get_context(), Some(&"outer"));
        assert_eq!(nested.get_context(), Some(&7));
        assert_eq!(nested.len(), 2);
    }

    #[test]
    fn test_when_and_unless() {
        let base = TransactionBuilder::<u8>::make().set_context(1).add(item("a", vec![], 1));

        let skipped = base.clone().when(false, |b| b.add(item("x", vec![], 2)).set_context(2));
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped.get_context(), Some(&1));

        let applied = base.clone().when(true, |b| b.add(item("x", vec![], 2)).set_context(2));
        assert_eq!(applied.len(), 2);
        assert_eq!(applied.get_context(), Some(&2));

        assert_eq!(base.unless(true, |b| b.add(item("y", vec![], 3))).len(), 1);
    }

    #[test]
    fn test_signers_union_deduplicated() {
        let payer = signer_handle(Keypair::new());
        let shared = signer_handle(Keypair::new());
        let other = signer_handle(Keypair::new());

        let builder = TransactionBuilder::<()>::make()
            .set_fee_payer(payer.clone())
            .add(item("a", vec![shared.clone(), payer.clone()], 1))
            .add(item("b", vec![shared.clone(), other.clone()], 2));

        let keys: Vec<Pubkey> = builder.signers().iter().map(|s| s.pubkey()).collect();
        assert_eq!(keys, vec![payer.pubkey(), shared.pubkey(), other.pubkey()]);
    }

    #[test]
    fn test_sign_requires_every_signer() {
        let payer = signer_handle(Keypair::new());
        let authority = signer_handle(Keypair::new());
        let builder = TransactionBuilder::<()>::make().add(item("a", vec![authority.clone()], 1));

        let mut transaction = builder.to_transaction(&payer.pubkey(), Hash::default());
        let err = builder.sign(&mut transaction, &[payer.clone()]).unwrap_err();
        assert!(matches!(err, SdkError::Signing(_)));

        let mut transaction = builder.to_transaction(&payer.pubkey(), Hash::default());
        builder.sign(&mut transaction, &[payer, authority]).unwrap();
        assert!(transaction.is_signed());
    }
}
