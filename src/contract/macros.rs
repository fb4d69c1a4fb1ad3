/// Declares a service contract trait and generates everything a proxy needs:
///
/// - the trait itself, with `Send + Sync` and the listed base contracts as
///   supertraits;
/// - `impl Contract for dyn Trait`, describing the trait for the synthesizer;
/// - `impl Trait for Proxy<T>` for every `T: Trait`, forwarding each method
///   and property accessor unchanged to the pooled connection.
///
/// ```ignore
/// service_contract! {
///     pub trait Inventory: Named {
///         fn stock(&self, sku: String) -> u32;
///         property region: String { get => region; set => set_region; }
///     }
/// }
/// ```
///
/// Methods come first, then properties. Either accessor may be omitted.
#[macro_export]
macro_rules! service_contract {
    (
        $(#[$meta:meta])*
        $vis:vis trait $name:ident $(: $first:ident $(+ $rest:ident)*)? {
            $(
                $(#[$fmeta:meta])*
                fn $method:ident(&self $(, $arg:ident : $arg_ty:ty)*) $(-> $ret:ty)?;
            )*
            $(
                property $prop:ident : $pty:ty {
                    $(get => $getter:ident;)?
                    $(set => $setter:ident;)?
                }
            )*
        }
    ) => {
        $(#[$meta])*
        $vis trait $name: Send + Sync $(+ $first $(+ $rest)*)? {
            $(
                $(#[$fmeta])*
                fn $method(&self $(, $arg: $arg_ty)*) $(-> $ret)?;
            )*
            $(
                $( fn $getter(&self) -> $pty; )?
                $( fn $setter(&self, value: $pty); )?
            )*
        }

        impl $crate::contract::Contract for dyn $name {
            fn descriptor() -> $crate::contract::ContractDescriptor {
                $crate::contract::ContractDescriptor::service_contract(
                    module_path!(),
                    stringify!($name),
                )
                $(
                    .extends(<dyn $first as $crate::contract::Contract>::descriptor())
                    $( .extends(<dyn $rest as $crate::contract::Contract>::descriptor()) )*
                )?
                $(
                    .with_method(
                        stringify!($method),
                        &[$(stringify!($arg_ty)),*],
                        stringify!($($ret)?),
                    )
                )*
                $(
                    .with_property(
                        stringify!($prop),
                        stringify!($pty),
                        $crate::__contract_accessor!($($getter)?),
                        $crate::__contract_accessor!($($setter)?),
                    )
                )*
            }
        }

        impl<T> $name for $crate::proxy::Proxy<T>
        where
            T: ?Sized + $name + 'static,
        {
            $(
                fn $method(&self $(, $arg: $arg_ty)*) $(-> $ret)? {
                    <T as $name>::$method($crate::proxy::Proxy::connection(self) $(, $arg)*)
                }
            )*
            $(
                $(
                    fn $getter(&self) -> $pty {
                        <T as $name>::$getter($crate::proxy::Proxy::connection(self))
                    }
                )?
                $(
                    fn $setter(&self, value: $pty) {
                        <T as $name>::$setter($crate::proxy::Proxy::connection(self), value)
                    }
                )?
            )*
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __contract_accessor {
    () => {
        ::core::option::Option::None
    };
    ($accessor:ident) => {
        ::core::option::Option::Some(stringify!($accessor))
    };
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
