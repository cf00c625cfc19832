//! Fixture types whose SSZ codec is generated at build time.

pub mod types;

mod codec {
    include!(concat!(env!("OUT_DIR"), "/ssz_codec.rs"));
}
