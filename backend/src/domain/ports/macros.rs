//! Helper macro generating `thiserror` port error enums with snake-case
//! constructors.

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
    //! Regression coverage for this module.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Slot {
        Primary,
    }

    impl std::fmt::Display for Slot {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::Primary => f.write_str("primary"),
            }
        }
    }

    define_port_error! {
        pub enum SamplePortError {
            Offline => "store offline",
            Failed { message: String } => "store failed: {message}",
            Busy { retries: u32 } => "store busy after {retries} retries",
            Taken { slot: Slot, message: String } => "slot {slot} taken: {message}",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(SamplePortError::offline().to_string(), "store offline");
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = SamplePortError::failed("timeout");
        assert_eq!(err.to_string(), "store failed: timeout");
    }

    #[test]
    fn constructors_preserve_non_string_types() {
        let err = SamplePortError::busy(3_u32);
        assert_eq!(err.to_string(), "store busy after 3 retries");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = SamplePortError::taken(Slot::Primary, "in use");
        assert_eq!(err.to_string(), "slot primary taken: in use");
    }
}
