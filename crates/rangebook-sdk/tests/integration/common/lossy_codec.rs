//! Codec that keeps a fixed number of significant digits per rate, the way
//! a packed on-chain encoding loses precision.

use rangebook_core::{DecodedOrder, EncodedOrder, Rate};
use rangebook_sdk::OrderCodec;

pub struct SignificantDigitsCodec {
    pub digits: u32,
}

impl SignificantDigitsCodec {
    fn squash(&self, rate: Rate) -> Rate {
        let mantissa = rate.mantissa();
        let rounded = mantissa.round_sf(self.digits).unwrap_or(mantissa);
        Rate::new(rounded, rate.exponent())
    }
}

impl OrderCodec for SignificantDigitsCodec {
    fn encode_order(&self, order: &DecodedOrder) -> EncodedOrder {
        EncodedOrder {
            y: order.liquidity,
            z: self.squash(order.marginal_rate),
            a: self.squash(order.highest_rate),
            b: self.squash(order.lowest_rate),
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
