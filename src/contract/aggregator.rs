use std::collections::HashSet;

use crate::contract::descriptor::{ContractDescriptor, MethodSignature, PropertySignature};
use crate::errors::{UnsupportedContractError, UnsupportedReason};

// -----------------------------------------------------------------------------
// ----- ContractSurface -------------------------------------------------------

/// A member together with the interface that declared it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Member<S> {
    pub declared_by: String,
    pub signature: S,
}

/// Everything a proxy for one contract has to forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSurface {
    pub contract: String,
    pub interfaces: Vec<String>,
    pub methods: Vec<Member<MethodSignature>>,
    pub properties: Vec<Member<PropertySignature>>,
}

impl ContractSurface {
    pub fn method(&self, name: &str) -> Option<&Member<MethodSignature>> {
        self.methods.iter().find(|m| m.signature.name == name)
    }

    pub fn property(&self, name: &str) -> Option<&Member<PropertySignature>> {
        self.properties.iter().find(|p| p.signature.name == name)
    }
}

// -----------------------------------------------------------------------------
// ----- Public ----------------------------------------------------------------

/// The interface and every interface it inherits, each once, in pre-order.
pub fn all_interfaces(contract: &ContractDescriptor) -> Vec<&ContractDescriptor> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    collect(contract, &mut seen, &mut out);
    out
}

pub fn is_eligible(contract: &ContractDescriptor) -> bool {
    aggregate(contract).is_ok()
}

/// Flattens `contract` into its deduplicated member set, or reports why it
/// cannot be proxied.
pub fn aggregate(contract: &ContractDescriptor) -> Result<ContractSurface, UnsupportedContractError> {
    let contract_name = contract.qualified_name();
    let reject = |reason| UnsupportedContractError::new(contract_name.clone(), reason);

    if !contract.is_interface() {
        return Err(reject(UnsupportedReason::NotAnInterface {
            interface: contract_name.clone(),
        }));
    }
    if contract.open_generic {
        return Err(reject(UnsupportedReason::OpenGeneric));
    }

    let interfaces = all_interfaces(contract);

    for iface in &interfaces {
        if !iface.is_interface() {
            return Err(reject(UnsupportedReason::NotAnInterface {
                interface: iface.qualified_name(),
            }));
        }
        if !iface.service_contract {
            return Err(reject(UnsupportedReason::MissingContractMarker {
                interface: iface.qualified_name(),
            }));
        }
        if let Some(method) = iface.methods.iter().find(|m| m.generic) {
            return Err(reject(UnsupportedReason::GenericMethod {
                interface: iface.qualified_name(),
                method: method.name.clone(),
            }));
        }
    }

    let mut methods = Vec::new();
    let mut properties = Vec::new();
    let mut seen_methods = HashSet::new();
    let mut seen_properties = HashSet::new();

    for iface in &interfaces {
        let declared_by = iface.qualified_name();

        for method in iface.methods.iter().filter(|m| m.accessor.is_none()) {
            let member = Member {
                declared_by: declared_by.clone(),
                signature: method.clone(),
            };
            if seen_methods.insert(member.clone()) {
                methods.push(member);
            }
        }

        for property in &iface.properties {
            let member = Member {
                declared_by: declared_by.clone(),
                signature: property.clone(),
            };
            if seen_properties.insert(member.clone()) {
                properties.push(member);
            }
        }
    }

    Ok(ContractSurface {
        contract: contract_name.clone(),
        interfaces: interfaces.iter().map(|i| i.qualified_name()).collect(),
        methods,
        properties,
    })
}

// -----------------------------------------------------------------------------
// ----- Private ---------------------------------------------------------------

fn collect<'a>(
    iface: &'a ContractDescriptor,
    seen: &mut HashSet<String>,
    out: &mut Vec<&'a ContractDescriptor>,
) {
    if !seen.insert(iface.qualified_name()) {
        return;
    }
    out.push(iface);
    for base in &iface.bases {
        collect(base, seen, out);
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
