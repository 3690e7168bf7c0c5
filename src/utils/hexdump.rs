//! Hex dump formatting for packet tracing.

use std::fmt::Write;

/// Render `data` as offset-prefixed hex lines with an ASCII column.
///
/// ```text
/// 0000 : 00 00 00 1A 06 00 00 00 |........|
/// 0008 : 00 00 03 76 01 01 05 73 |...v...s|
/// ```
///
/// A `width` of zero is treated as one byte per line.
pub fn hex_dump(data: &[u8], width: usize) -> String {
    let width = width.max(1);
    let mut out = String::with_capacity(data.len() * 4 + data.len() / width * 10);

    for (line, chunk) in data.chunks(width).enumerate() {
        let _ = write!(out, "{:04X} :", line * width);
        for byte in chunk {
            let _ = write!(out, " {byte:02X}");
        }
        for _ in chunk.len()..width {
            out.push_str("   ");
        }
        out.push_str(" |");
        out.extend(chunk.iter().map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_and_partial_lines() {
        let dump = hex_dump(b"\x00\x01AB\xffz", 4);
        let lines: Vec<_> = dump.lines().collect();
        assert_eq!(lines, ["0000 : 00 01 41 42 |..AB|", "0004 : FF 7A       |.z|"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(hex_dump(&[], 8), "");
    }

    #[test]
    fn test_zero_width() {
        assert_eq!(hex_dump(&[0x41, 0x42], 0), "0000 : 41 |A|\n0001 : 42 |B|\n");
    }
}
