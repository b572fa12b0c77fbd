//! Decoding of hex-encoded `struct sockaddr` values (`saddr=`).

use crate::lookup::tables::{lookup, SOCKET_FAMILIES};
use std::net::{Ipv4Addr, Ipv6Addr};

const AF_LOCAL: u16 = 1;
const AF_INET: u16 = 2;
const AF_AX25: u16 = 3;
const AF_IPX: u16 = 4;
const AF_ATMPVC: u16 = 8;
const AF_X25: u16 = 9;
const AF_INET6: u16 = 10;
const AF_NETLINK: u16 = 16;

/// Render a `saddr=` value, e.g. `inet host:127.0.0.1 serv:631`.
pub fn render(value: &str) -> String {
    let Some(bytes) = decode_hex(value) else {
        return format!("conversion error({value})");
    };
    if bytes.len() < 2 {
        return format!("conversion error({value})");
    }

    // sa_family is host order; audit logs come from little-endian hosts
    // in practice.
    let family = u16::from_le_bytes([bytes[0], bytes[1]]);
    let Some(name) = lookup(SOCKET_FAMILIES, family) else {
        return format!("unknown family({family})");
    };

    match family {
        AF_LOCAL => local(name, &bytes),
        AF_INET => inet(name, &bytes),
        AF_INET6 => inet6(name, &bytes),
        AF_NETLINK => match bytes.get(4..8) {
            Some(pid) => format!("{name} pid:{}", le_u32(pid)),
            None => format!("{name} sockaddr len too short"),
        },
        AF_AX25 => match bytes.get(2..9) {
            Some(call) => format!("{name} call:{}", printable(call)),
            None => format!("{name} sockaddr len too short"),
        },
        AF_IPX => match (bytes.get(2..4), bytes.get(4..8)) {
            (Some(port), Some(net)) => format!(
                "{name} port:{} net:{}",
                u16::from_be_bytes([port[0], port[1]]),
                u32::from_be_bytes([net[0], net[1], net[2], net[3]])
            ),
            _ => format!("{name} sockaddr len too short"),
        },
        AF_ATMPVC => match bytes.get(2..4) {
            Some(itf) => format!("{name} int:{}", i16::from_le_bytes([itf[0], itf[1]])),
            None => format!("{name} sockaddr len too short"),
        },
        AF_X25 => {
            let addr = bytes.get(2..).unwrap_or_default();
            format!("{name} addr:{}", printable(until_nul(addr)))
        }
        _ => name.to_string(),
    }
}

fn local(name: &str, bytes: &[u8]) -> String {
    let path = &bytes[2..];
    match path.first() {
        // Abstract socket names start with a NUL byte
        Some(0) => format!("{name} {}", printable(until_nul(&path[1..]))),
        Some(_) => format!("{name} {}", printable(until_nul(path))),
        None => name.to_string(),
    }
}

fn inet(name: &str, bytes: &[u8]) -> String {
    if bytes.len() < 16 {
        return format!("{name} sockaddr len too short");
    }
    let port = u16::from_be_bytes([bytes[2], bytes[3]]);
    let addr = Ipv4Addr::new(bytes[4], bytes[5], bytes[6], bytes[7]);
    format!("{name} host:{addr} serv:{port}")
}

fn inet6(name: &str, bytes: &[u8]) -> String {
    if bytes.len() < 24 {
        return format!("{name} sockaddr len too short");
    }
    let port = u16::from_be_bytes([bytes[2], bytes[3]]);
    let mut octets = [0u8; 16];
    octets.copy_from_slice(&bytes[8..24]);
    let addr = Ipv6Addr::from(octets);
    format!("{name} host:{addr} serv:{port}")
}

fn le_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn until_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

fn printable(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn decode_hex(value: &str) -> Option<Vec<u8>> {
    if value.len() % 2 != 0 {
        return None;
    }
    (0..value.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(value.get(i..i + 2)?, 16).ok())
        .collect()
}
