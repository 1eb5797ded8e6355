//! Protocol-facing surface: shared data types and the client ports.

pub mod client;
pub mod types;

pub use client::{AcpClient, ClientConnector};
pub use types::{Account, Deliverable, DeliverableMeta, Job, MemoKind, Phase, SigningMemo};
