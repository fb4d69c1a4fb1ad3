// -----------------------------------------------------------------------------
// ----- Contract --------------------------------------------------------------

/// Implemented for `dyn Trait` of every service contract trait. The
/// `service_contract!` macro writes this impl; hand-written impls are allowed
/// for interfaces that are described but not generated.
pub trait Contract: Send + Sync + 'static {
    fn descriptor() -> ContractDescriptor;
}

// -----------------------------------------------------------------------------
// ----- TypeKind --------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Interface,
    Concrete,
}

// -----------------------------------------------------------------------------
// ----- Members ---------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessor {
    Getter,
    Setter,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<String>,
    pub returns: String,
    pub generic: bool,
    /// Set when the method only exists to back a property.
    pub accessor: Option<Accessor>,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>, params: &[&str], returns: &str) -> Self {
        let returns = if returns.trim().is_empty() {
            "()".to_string()
        } else {
            returns.to_string()
        };

        Self {
            name: name.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
            returns,
            generic: false,
            accessor: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertySignature {
    pub name: String,
    pub value_type: String,
    pub readable: bool,
    pub writable: bool,
}

// -----------------------------------------------------------------------------
// ----- ContractDescriptor ----------------------------------------------------

/// Structural description of an interface: what it declares itself and which
/// interfaces it inherits from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDescriptor {
    pub module: String,
    pub name: String,
    pub kind: TypeKind,
    pub open_generic: bool,
    pub service_contract: bool,
    pub methods: Vec<MethodSignature>,
    pub properties: Vec<PropertySignature>,
    pub bases: Vec<ContractDescriptor>,
}

// -----------------------------------------------------------------------------
// ----- ContractDescriptor: Static --------------------------------------------

impl ContractDescriptor {
    /// An interface without the service-contract marker.
    pub fn interface(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            kind: TypeKind::Interface,
            open_generic: false,
            service_contract: false,
            methods: Vec::new(),
            properties: Vec::new(),
            bases: Vec::new(),
        }
    }

    pub fn service_contract(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            service_contract: true,
            ..Self::interface(module, name)
        }
    }

    pub fn concrete(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Concrete,
            ..Self::interface(module, name)
        }
    }
}

// -----------------------------------------------------------------------------
// ----- ContractDescriptor: Builder -------------------------------------------

impl ContractDescriptor {
    pub fn extends(mut self, base: ContractDescriptor) -> Self {
        self.bases.push(base);
        self
    }

    pub fn with_method(mut self, name: &str, params: &[&str], returns: &str) -> Self {
        self.methods.push(MethodSignature::new(name, params, returns));
        self
    }

    pub fn with_generic_method(mut self, name: &str, params: &[&str], returns: &str) -> Self {
        let mut method = MethodSignature::new(name, params, returns);
        method.generic = true;
        self.methods.push(method);
        self
    }

    /// Declares a property and the accessor methods backing it.
    pub fn with_property(
        mut self,
        name: &str,
        value_type: &str,
        getter: Option<&str>,
        setter: Option<&str>,
    ) -> Self {
        if let Some(getter) = getter {
            let mut method = MethodSignature::new(getter, &[], value_type);
            method.accessor = Some(Accessor::Getter);
            self.methods.push(method);
        }

        if let Some(setter) = setter {
            let mut method = MethodSignature::new(setter, &[value_type], "()");
            method.accessor = Some(Accessor::Setter);
            self.methods.push(method);
        }

        self.properties.push(PropertySignature {
            name: name.to_string(),
            value_type: value_type.to_string(),
            readable: getter.is_some(),
            writable: setter.is_some(),
        });
        self
    }

    pub fn open_generic(mut self) -> Self {
        self.open_generic = true;
        self
    }
}

// -----------------------------------------------------------------------------
// ----- ContractDescriptor: Public --------------------------------------------

impl ContractDescriptor {
    pub fn qualified_name(&self) -> String {
        if self.module.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.module, self.name)
        }
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
