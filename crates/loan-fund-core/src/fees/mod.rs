//! Fee-impact bridge: management fee and carry drag between gross, fund
//! and LP returns.

pub mod bridge;

pub use bridge::{
    fee_allocation, fee_impact_bridge, return_bridge, BridgeStep, FeeAllocation,
    FeeImpactBridge, ReturnBridge, StepKind,
};
