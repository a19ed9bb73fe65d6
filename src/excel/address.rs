//! A1-style cell and range references

use crate::error::{BridgeError, BridgeResult};
use crate::types::{BoundingRange, CellAddress};

/// Excel's last column (XFD) and row
const MAX_COL: u32 = 16_383;
const MAX_ROW: u32 = 1_048_575;

/// Convert column index to Excel column letters (0→A, 25→Z, 26→AA, etc.)
pub fn column_to_letters(col: u32) -> String {
    let mut result = String::new();
    let mut idx = col;

    loop {
        let remainder = idx % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }

    result
}

/// Convert Excel column letters to a zero-based index (A→0, AA→26)
pub fn letters_to_column(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }

    let mut col: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }

    let col = col - 1;
    (col <= MAX_COL).then_some(col)
}

/// Encode an address as an A1 reference
pub fn encode_cell(addr: CellAddress) -> String {
    format!("{}{}", column_to_letters(addr.col), addr.row + 1)
}

/// Decode an A1 reference (`B3`, `$B$3`, `b3`) into an address
pub fn decode_cell(reference: &str) -> BridgeResult<CellAddress> {
    let malformed = || BridgeError::MalformedRange(reference.to_string());

    let cleaned: String = reference.trim().chars().filter(|c| *c != '$').collect();
    let split = cleaned
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(malformed)?;
    let (letters, digits) = cleaned.split_at(split);

    let col = letters_to_column(letters).ok_or_else(malformed)?;
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }
    let row: u32 = digits.parse().map_err(|_| malformed())?;
    if row == 0 || row - 1 > MAX_ROW {
        return Err(malformed());
    }

    Ok(CellAddress::new(row - 1, col))
}

/// Encode a range as `A1:C3`. A single cell still gets both corners.
pub fn encode_range(range: &BoundingRange) -> String {
    format!(
        "{}:{}",
        encode_cell(CellAddress::new(range.min_row, range.min_col)),
        encode_cell(CellAddress::new(range.max_row, range.max_col))
    )
}

/// Decode `A1:C3` or a lone `B2` into inclusive bounds
pub fn decode_range(reference: &str) -> BridgeResult<BoundingRange> {
    let mut parts = reference.split(':');
    let first = parts
        .next()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| BridgeError::MalformedRange(reference.to_string()))?;
    let second = parts.next();
    if parts.next().is_some() {
        return Err(BridgeError::MalformedRange(reference.to_string()));
    }

    let start = decode_cell(first)
        .map_err(|_| BridgeError::MalformedRange(reference.to_string()))?;
    let mut range = BoundingRange::single(start);
    if let Some(second) = second {
        let end = decode_cell(second)
            .map_err(|_| BridgeError::MalformedRange(reference.to_string()))?;
        range.extend(end);
    }

    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_to_letters() {
        // Single letters
        assert_eq!(column_to_letters(0), "A");
        assert_eq!(column_to_letters(1), "B");
        assert_eq!(column_to_letters(25), "Z");

        // Double letters
        assert_eq!(column_to_letters(26), "AA");
        assert_eq!(column_to_letters(27), "AB");
        assert_eq!(column_to_letters(51), "AZ");
        assert_eq!(column_to_letters(52), "BA");

        // Triple letters
        assert_eq!(column_to_letters(702), "AAA");
    }

    #[test]
    fn test_letters_to_column() {
        assert_eq!(letters_to_column("A"), Some(0));
        assert_eq!(letters_to_column("z"), Some(25));
        assert_eq!(letters_to_column("AA"), Some(26));
        assert_eq!(letters_to_column("AAA"), Some(702));
        assert_eq!(letters_to_column("XFD"), Some(16_383));
        assert_eq!(letters_to_column("XFE"), None);
        assert_eq!(letters_to_column(""), None);
        assert_eq!(letters_to_column("A1"), None);
    }

    #[test]
    fn test_encode_cell() {
        assert_eq!(encode_cell(CellAddress::new(0, 0)), "A1");
        assert_eq!(encode_cell(CellAddress::new(2, 1)), "B3");
        assert_eq!(encode_cell(CellAddress::new(99, 27)), "AB100");
    }

    #[test]
    fn test_decode_cell() {
        assert_eq!(decode_cell("B3").unwrap(), CellAddress::new(2, 1));
        assert_eq!(decode_cell("$B$3").unwrap(), CellAddress::new(2, 1));
        assert_eq!(decode_cell("ab100").unwrap(), CellAddress::new(99, 27));
    }

    #[test]
    fn test_decode_cell_malformed() {
        for bad in ["", "A", "3", "1A", "A0", "A1B", "A-1", "XFE1", "A1048577"] {
            assert!(
                matches!(decode_cell(bad), Err(BridgeError::MalformedRange(_))),
                "{} should be malformed",
                bad
            );
        }
    }

    #[test]
    fn test_encode_range() {
        let range = BoundingRange {
            min_row: 0,
            min_col: 0,
            max_row: 2,
            max_col: 2,
        };
        assert_eq!(encode_range(&range), "A1:C3");
        assert_eq!(encode_range(&BoundingRange::default()), "A1:A1");
    }

    #[test]
    fn test_decode_range() {
        let range = decode_range("A1:C3").unwrap();
        assert_eq!((range.min_row, range.min_col), (0, 0));
        assert_eq!((range.max_row, range.max_col), (2, 2));

        let single = decode_range("B2").unwrap();
        assert_eq!(single, BoundingRange::single(CellAddress::new(1, 1)));
    }

    #[test]
    fn test_decode_range_normalizes_reversed_corners() {
        let range = decode_range("C3:A1").unwrap();
        assert_eq!(range, decode_range("A1:C3").unwrap());
    }

    #[test]
    fn test_decode_range_malformed() {
        for bad in ["", ":", "A1:", "1A", "A1:B2:C3", "Sheet!A1"] {
            assert!(
                matches!(decode_range(bad), Err(BridgeError::MalformedRange(_))),
                "{} should be malformed",
                bad
            );
        }
    }
}
