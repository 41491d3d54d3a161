/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum whose
/// storage form is a fixed upper-case label.
macro_rules! storage_labels {
    ($ty:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = $crate::error::ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_uppercase();
                match normalized.as_str() {
                    $($label => Ok($ty::$variant),)+
                    _ => Err($crate::error::ModelError::unknown_variant($kind, s)),
                }
            }
        }
    };
}

pub(crate) use storage_labels;
