//! `define_port_error!`: declares a repository error enum together with
//! snake_case constructors.
//!
//! Each variant's fields become constructor parameters taking `impl Into<T>`,
//! so call sites can write `JobRepositoryError::query("lock poisoned")`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum LedgerPortError {
            Offline => "ledger offline",
            Rejected { message: String } => "ledger rejected write: {message}",
            Stale { id: String, expected: u64, actual: u64 } =>
                "entry {id} is stale: expected {expected}, found {actual}",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(LedgerPortError::offline(), LedgerPortError::Offline);
        assert_eq!(LedgerPortError::offline().to_string(), "ledger offline");
    }

    #[test]
    fn string_fields_accept_borrowed_input() {
        let err = LedgerPortError::rejected("disk full");
        assert_eq!(err.to_string(), "ledger rejected write: disk full");
    }

    #[test]
    fn mixed_fields_keep_their_types() {
        let err = LedgerPortError::stale("JOB-001", 3_u64, 5_u64);
        assert_eq!(err.to_string(), "entry JOB-001 is stale: expected 3, found 5");
    }
}
