//! Order codec seam.
//!
//! On-chain orders are stored in a compact `y/z/A/B` form. The encoding is
//! owned by the contracts, so the engine only talks to it through
//! [`OrderCodec`].

use std::sync::Arc;

use rangebook_core::{DecodedOrder, EncodedOrder};

pub trait OrderCodec: Send + Sync {
    fn encode_order(&self, order: &DecodedOrder) -> EncodedOrder;
    fn decode_order(&self, order: &EncodedOrder) -> DecodedOrder;
}

impl<C: OrderCodec + ?Sized> OrderCodec for Arc<C> {
    fn encode_order(&self, order: &DecodedOrder) -> EncodedOrder {
        (**self).encode_order(order)
    }

    fn decode_order(&self, order: &EncodedOrder) -> DecodedOrder {
        (**self).decode_order(order)
    }
}

/// Arc wrapper for codec trait objects.
pub type DynOrderCodec = Arc<dyn OrderCodec>;

/// Lossless codec that copies fields across.
///
/// `y` = liquidity, `z` = marginal, `A` = highest, `B` = lowest.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl OrderCodec for IdentityCodec {
    fn encode_order(&self, order: &DecodedOrder) -> EncodedOrder {
        EncodedOrder {
            y: order.liquidity,
            z: order.marginal_rate,
            a: order.highest_rate,
            b: order.lowest_rate,
        }
    }

    fn decode_order(&self, order: &EncodedOrder) -> DecodedOrder {
        DecodedOrder {
            liquidity: order.y,
            lowest_rate: order.b,
            highest_rate: order.a,
            marginal_rate: order.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rangebook_core::Rate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_identity_codec_field_mapping() {
        let order = DecodedOrder {
            liquidity: dec!(1000000000),
            lowest_rate: Rate::new(dec!(1800), -12),
            highest_rate: Rate::new(dec!(2000), -12),
            marginal_rate: Rate::new(dec!(1900), -12),
        };
        let encoded = IdentityCodec.encode_order(&order);
        assert_eq!(encoded.y, dec!(1000000000));
        assert_eq!(encoded.z, order.marginal_rate);
        assert_eq!(encoded.a, order.highest_rate);
        assert_eq!(encoded.b, order.lowest_rate);
        assert_eq!(IdentityCodec.decode_order(&encoded), order);
    }
}
