//! Contract descriptions and the aggregation rules deciding which interfaces
//! can be proxied.

pub mod aggregator;
pub mod descriptor;
mod macros;

pub use aggregator::{ContractSurface, Member, aggregate, all_interfaces, is_eligible};
pub use descriptor::{
    Accessor, Contract, ContractDescriptor, MethodSignature, PropertySignature, TypeKind,
};
