mod derive;

use proc_macro::TokenStream;

use crate::derive::handle_derive_bit;

/// Derives `unipad_bit_mask::Bitable` for a fieldless enum.
///
/// Variants get bit positions in declaration order. The enum also gains an
/// inherent `ALL` constant listing every variant in that order.
#[proc_macro_derive(Bit)]
pub fn derive_bit(input: TokenStream) -> TokenStream {
    handle_derive_bit(input)
}
