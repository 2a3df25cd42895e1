/// Random 64-bit identifier rendered as 16 hex digits.
#[must_use]
pub fn new_id() -> String {
    format!("{:016x}", rand::random::<u64>())
}
