use crate::rfc2047::HeaderEncoder;
use crate::strings::quote_string;
use crate::Result;

/// A display name (possibly empty, possibly non-ASCII) paired with an
/// already-validated ASCII address-spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub name: String,
    pub address: String,
}

impl Address {
    pub fn new<N: Into<String>, A: Into<String>>(name: N, address: A) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// Format a list of addresses for a To or Cc header without any
/// column budget: `name <addr>` forms joined by `", "`.
pub fn join_addresses(addrs: &[Address]) -> String {
    let mut result = String::new();
    for a in addrs {
        if !result.is_empty() {
            result.push_str(", ");
        }
        if !a.name.is_empty() {
            result.push_str(&quote_string(&a.name, "\\\""));
            result.push(' ');
        }
        result.push('<');
        result.push_str(&a.address);
        result.push('>');
    }
    result
}

/// Format a list of addresses while tracking the column position,
/// RFC 2047-encoding display names through `encoder` and folding
/// whenever the running column passes 76. Folds happen after the
/// separating comma or after a display name; an address-spec is
/// atomic and never split.
pub fn encode_aware_join_addresses(
    encoder: &dyn HeaderEncoder,
    start_column: usize,
    addrs: &[Address],
) -> Result<String> {
    let mut col = start_column;
    let mut buf = String::new();
    for (i, a) in addrs.iter().enumerate() {
        if i > 0 {
            buf.push(',');
            col += 1;
            if col > 76 {
                buf.push_str("\r\n");
                col = 0;
            }
            buf.push(' ');
            col += 1;
        }
        if !a.name.is_empty() {
            let (after, encoded) = encoder.encode(col, &a.name)?;
            buf.push_str(&encoded);
            col = after;
            if col > 76 {
                buf.push_str("\r\n");
                col = 0;
            }
            buf.push(' ');
            col += 1;
        }
        buf.push('<');
        buf.push_str(&a.address);
        buf.push('>');
        col += a.address.len() + 2;
    }
    Ok(buf)
}

/// Single-address convenience wrapper around
/// [`encode_aware_join_addresses`].
pub fn stringize_address(
    encoder: &dyn HeaderEncoder,
    start_column: usize,
    addr: &Address,
) -> Result<String> {
    encode_aware_join_addresses(encoder, start_column, std::slice::from_ref(addr))
}
