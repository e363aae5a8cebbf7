/// Create an enum of form inputs that can be cycled with tab/shift-tab. Each
/// variant carries the label we show and the name the server knows it by.
#[macro_export]
macro_rules! form_fields {
    ($name:ident, $($variant:ident => ($label:literal, $field:literal)),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),*
        }

        impl $name {
            /// Every field, in tab order
            pub const FIELDS: &'static [$name] = &[
                $($name::$variant),*
            ];

            fn index(self) -> usize {
                self as usize
            }

            /// Rotate through the options (e.g. with tab)
            pub fn next(self) -> Self {
                Self::FIELDS[(self.index() + 1) % Self::FIELDS.len()]
            }

            /// Rotate through the options in reverse (e.g. with shift-tab)
            pub fn prev(self) -> Self {
                Self::FIELDS[(self.index() + Self::FIELDS.len() - 1) % Self::FIELDS.len()]
            }

            /// What we call this field on screen
            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),*
                }
            }

            /// What the server calls this field
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $field),*
                }
            }
        }
    };
}
