//! Numeric encoding of textual IP addresses.
//!
//! Addresses are encoded into totally-ordered unsigned integers (u32 for IPv4,
//! u128 for IPv6) so that range membership becomes a numeric comparison.

use crate::error::GeoPulseError;

/// Encodes a dotted-quad IPv4 address as a big-endian u32.
///
/// Fails with [`GeoPulseError::MalformedAddress`] if the segment count is not
/// 4 or any octet is non-numeric or outside 0–255.
pub fn encode_v4(addr: &str) -> Result<u32, GeoPulseError> {
    let octets: Vec<&str> = addr.split('.').collect();
    if octets.len() != 4 {
        return Err(GeoPulseError::malformed(
            addr,
            format!("expected 4 octets, got {}", octets.len()),
        ));
    }

    let mut key = 0u32;
    for octet in octets {
        if octet.is_empty() || !octet.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GeoPulseError::malformed(
                addr,
                format!("octet {octet:?} is not a decimal number"),
            ));
        }
        let value: u32 = octet
            .parse()
            .map_err(|_| GeoPulseError::malformed(addr, format!("octet {octet:?} out of range")))?;
        if value > 255 {
            return Err(GeoPulseError::malformed(
                addr,
                format!("octet {octet:?} out of range"),
            ));
        }
        key = (key << 8) | value;
    }
    Ok(key)
}

/// Encodes an IPv6 address as a big-endian u128.
///
/// Expands at most one `::` zero-run abbreviation to reach 8 groups of 16
/// bits. An address with fewer than 8 groups and no `::` is padded with
/// trailing zero groups. IPv4-mapped forms and `%zone` suffixes are not
/// supported and fail as malformed.
pub fn encode_v6(addr: &str) -> Result<u128, GeoPulseError> {
    if addr.matches("::").count() > 1 {
        return Err(GeoPulseError::malformed(addr, "more than one \"::\""));
    }

    let groups: Vec<u16> = if let Some((head, tail)) = addr.split_once("::") {
        let head = parse_groups(addr, head)?;
        let tail = parse_groups(addr, tail)?;
        let present = head.len() + tail.len();
        if present > 8 {
            return Err(GeoPulseError::malformed(
                addr,
                format!("{present} groups around \"::\""),
            ));
        }
        let mut groups = head;
        groups.resize(8 - tail.len(), 0);
        groups.extend(tail);
        groups
    } else {
        let mut groups = parse_groups(addr, addr)?;
        if groups.len() > 8 {
            return Err(GeoPulseError::malformed(
                addr,
                format!("expected at most 8 groups, got {}", groups.len()),
            ));
        }
        groups.resize(8, 0);
        groups
    };

    Ok(groups
        .into_iter()
        .fold(0u128, |key, group| (key << 16) | u128::from(group)))
}

fn parse_groups(addr: &str, part: &str) -> Result<Vec<u16>, GeoPulseError> {
    if part.is_empty() {
        return Ok(Vec::new());
    }
    part.split(':')
        .map(|group| {
            if group.is_empty()
                || group.len() > 4
                || !group.bytes().all(|b| b.is_ascii_hexdigit())
            {
                return Err(GeoPulseError::malformed(
                    addr,
                    format!("bad hex group {group:?}"),
                ));
            }
            // Validated above, cannot fail
            Ok(u16::from_str_radix(group, 16).unwrap_or_default())
        })
        .collect()
}
