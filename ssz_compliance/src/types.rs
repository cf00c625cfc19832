use ssz_runtime::{BitList, BitVector};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Foo {
    pub a: u64,
    pub b: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checkpoint {
    pub epoch: u64,
    pub root: [u8; 32],
}

/// Every field fixed-size, so the whole type is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub slot: u64,
    pub proposer: u32,
    pub flag: bool,
    pub parent: Checkpoint,
    pub seq: u16,
    pub big: u128,
    pub bits: BitVector<12>,
    pub pair: [u32; 2],
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attestation {
    #[cfg_attr(sszgen, ssz(max = 64))]
    pub aggregation: BitList,
    pub data: Checkpoint,
    pub signature: [u8; 8],
    #[cfg_attr(sszgen, ssz(max = 16))]
    pub indices: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub header: Header,
    pub attestations: Vec<Attestation>,
    pub extra: Vec<u8>,
    pub roots: Vec<[u8; 4]>,
    pub nested: Vec<Vec<u16>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Empty {}
