// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::collections::BTreeMap;

use crate::{
    AccountStatus, Address, Amount, BalanceRecord, BlockData, BlockFeed, Genesis,
    GenesisAllocation, Round, SignedTransaction, StakeResult, TransactionKind,
    ADDRESS_SIZE_BYTES,
};

/// Deterministic address built from a seed byte
pub fn address(seed: u8) -> Address {
    let mut bytes = [0u8; ADDRESS_SIZE_BYTES];
    bytes[0] = seed;
    bytes[ADDRESS_SIZE_BYTES - 1] = seed.wrapping_mul(31);
    Address::from_bytes(&bytes)
}

/// Key registration sent by `sender`
pub fn keyreg(sender: Address, vote_last: Round) -> SignedTransaction {
    SignedTransaction {
        sender,
        kind: TransactionKind::KeyRegistration { vote_last },
        inner: Vec::new(),
    }
}

/// Payment sent by `sender`
pub fn payment(sender: Address) -> SignedTransaction {
    SignedTransaction {
        sender,
        kind: TransactionKind::Payment,
        inner: Vec::new(),
    }
}

/// Application call that spawned `inner`
pub fn app_call(sender: Address, inner: Vec<SignedTransaction>) -> SignedTransaction {
    SignedTransaction {
        sender,
        kind: TransactionKind::ApplicationCall,
        inner,
    }
}

/// Balance change of `address`
pub fn balance(address: Address, raw: u64, vote_last_valid: Round) -> BalanceRecord {
    BalanceRecord {
        address,
        balance: Amount::from_raw(raw),
        vote_last_valid,
    }
}

/// Block of `round` with the given transactions and balance deltas
pub fn block(
    round: Round,
    transactions: Vec<SignedTransaction>,
    balance_deltas: Vec<BalanceRecord>,
) -> BlockData {
    BlockData {
        round,
        timestamp: 1_700_000_000 + round as i64,
        transactions,
        balance_deltas: Some(balance_deltas),
        online_money: None,
    }
}

/// Block of `round` without any event
pub fn empty_block(round: Round) -> BlockData {
    block(round, Vec::new(), Vec::new())
}

/// Genesis allocation of an online account
pub fn online_allocation(address: Address, raw: u64, vote_last_valid: Round) -> GenesisAllocation {
    GenesisAllocation {
        address: address.to_string(),
        balance: Amount::from_raw(raw),
        vote_last_valid,
        status: AccountStatus::Online,
    }
}

/// Feed serving a genesis record and a fixed set of blocks from memory
#[derive(Debug, Clone, Default)]
pub struct MemoryFeed {
    /// genesis record
    pub genesis: Genesis,
    /// blocks by round
    pub blocks: BTreeMap<Round, BlockData>,
}

impl MemoryFeed {
    /// Feed with the given genesis allocations and no block
    pub fn with_allocations(allocations: Vec<GenesisAllocation>) -> Self {
        MemoryFeed {
            genesis: Genesis {
                network: "testnet".into(),
                allocations,
            },
            blocks: BTreeMap::new(),
        }
    }
}

impl BlockFeed for MemoryFeed {
    fn genesis(&self) -> StakeResult<Genesis> {
        Ok(self.genesis.clone())
    }

    fn block(&self, round: Round) -> StakeResult<Option<BlockData>> {
        Ok(self.blocks.get(&round).cloned())
    }
}
