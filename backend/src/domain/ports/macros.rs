//! Helper macro for declaring port error enums.
//!
//! Each variant gets a snake_case constructor whose fields accept anything
//! convertible into the declared type. An optional trailing
//! `retryable = [..];` clause generates `is_retryable`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@fields $variant () () $( $field : $ty, )*);
    };

    (@fields $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@fields $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @fields
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
        $( retryable = [ $($retry:ident),+ $(,)? ]; )?
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

            $(
                /// Whether repeating the call may succeed.
                pub fn is_retryable(&self) -> bool {
                    matches!(self, $( Self::$retry { .. } )|+)
                }
            )?
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum SamplePortError {
            Offline => "offline",
            Upstream { message: String } => "upstream: {message}",
            Throttled { seconds: u32 } => "throttled for {seconds}s",
            Rejected { message: String, status: u16 } => "rejected ({status}): {message}",
        }
        retryable = [Offline, Throttled];
    }

    #[test]
    fn constructors_convert_field_types() {
        assert_eq!(SamplePortError::upstream("boom").to_string(), "upstream: boom");
        assert_eq!(SamplePortError::throttled(3_u32).to_string(), "throttled for 3s");
        assert_eq!(
            SamplePortError::rejected("bad polygon", 400_u16).to_string(),
            "rejected (400): bad polygon"
        );
    }

    #[test]
    fn retryable_clause_covers_unit_and_struct_variants() {
        assert!(SamplePortError::offline().is_retryable());
        assert!(SamplePortError::throttled(1_u32).is_retryable());
        assert!(!SamplePortError::upstream("x").is_retryable());
    }
}
