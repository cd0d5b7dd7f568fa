//! `define_port_error!` declares a port error enum with one builder per
//! variant.
//!
//! Every variant carries named fields and gets a snake_case constructor whose
//! parameters accept `impl Into<FieldType>`, so adapters can write
//! `KeyValueStoreError::read(key, err.to_string())`.

macro_rules! define_port_error {
    (
        $(#[$enum_meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),+ $(,)? } => $display:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($display)]
                $variant {
                    $(
                        #[doc = concat!("Reported `", stringify!($field), "`.")]
                        $field: $ty,
                    )+
                },
            )+
        }

        ::paste::paste! {
            impl $name {
                $(
                    #[doc = concat!("Build [`", stringify!($name), "::", stringify!($variant), "`].")]
                    #[must_use]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                        Self::$variant { $($field: $field.into()),+ }
                    }
                )+
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum SlotError {
            Missing { key: String } => "slot '{key}' is empty",
            Oversized { key: String, bytes: u64 } => "slot '{key}' holds {bytes} bytes",
            HeldElsewhere { held_by: String, wanted: String } => "slot held by {held_by}, wanted {wanted}",
        }
    }

    #[test]
    fn string_fields_accept_borrowed_input() {
        let err = SlotError::missing("push_dedupe_like_m1");
        assert_eq!(err.to_string(), "slot 'push_dedupe_like_m1' is empty");
    }

    #[test]
    fn non_string_fields_keep_their_type() {
        let err = SlotError::oversized("pending_notification", 4096_u64);
        assert_eq!(
            err,
            SlotError::Oversized {
                key: "pending_notification".to_owned(),
                bytes: 4096,
            }
        );
    }

    #[test]
    fn camel_case_variants_get_snake_case_builders() {
        let err = SlotError::held_elsewhere("a", "b");
        assert_eq!(err.to_string(), "slot held by a, wanted b");
    }
}
