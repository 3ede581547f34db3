use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

/// Native amount to wei, rounded down. `None` for negative or oversized input.
pub fn to_wei(amount: Decimal) -> Option<u128> {
    if amount.is_sign_negative() {
        return None;
    }
    amount
        .checked_mul(Decimal::from(WEI_PER_ETHER))?
        .floor()
        .to_u128()
}

/// JSON-RPC quantity encoding.
pub fn hex_quantity(value: u128) -> String {
    format!("0x{value:x}")
}
