mod derive;

use proc_macro::TokenStream;

use crate::derive::handle_derive_bit;

/// Implements `padbind_bit_mask::Bitable` for a field-less enum.
///
/// Variant `n` in declaration order gets bit `1 << n`.
#[proc_macro_derive(Bit)]
pub fn derive_bit(input: TokenStream) -> TokenStream {
    handle_derive_bit(input)
}
