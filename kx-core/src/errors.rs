pub use anyhow::{
    anyhow,
    bail,
    ensure,
};
pub use paste::paste;
pub use thiserror::Error;

pub type EmptyResult = anyhow::Result<()>;

// Declares a thiserror enum along with one snake_case constructor per variant, each of which
// returns the variant already wrapped in an `anyhow::Error`.
#[macro_export]
macro_rules! err_impl {
    ($errtype:ident,
        $(#[$errinfo:meta] $item:ident($dtype:ty),)+
    ) => {
        #[derive(Debug, $crate::errors::Error)]
        pub enum $errtype {
            $(#[$errinfo] $item($dtype)),+
        }

        impl $errtype {
            $($crate::errors::paste! {
                pub fn [<$item:snake>](in_: $dtype) -> anyhow::Error {
                    $crate::errors::anyhow!($errtype::$item(in_))
                }
            })+
        }
    };
}
