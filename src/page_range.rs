use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageSpecError {
    #[error("pages spec is required")]
    Missing,
    #[error("invalid range: {0}")]
    InvalidRange(String),
    #[error("invalid page number: {0}")]
    InvalidPageNumber(String),
    #[error("no valid pages requested")]
    NoValidPages,
}

/// Distinct 1-based page numbers in ascending order, all within the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSet(Vec<u32>);

impl PageSet {
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for PageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, page) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", page)?;
        }
        Ok(())
    }
}

/// Parse a page spec like "1,3-5,8" against a document of `max_page` pages.
///
/// Malformed tokens are errors. Well-formed values beyond `max_page` are
/// dropped, and only an empty selection is rejected.
pub fn parse_page_spec(spec: &str, max_page: u32) -> Result<PageSet, PageSpecError> {
    if spec.is_empty() {
        return Err(PageSpecError::Missing);
    }

    let compact: String = spec.chars().filter(|c| !c.is_whitespace()).collect();
    let mut pages = BTreeSet::new();

    for token in compact.split(',').filter(|t| !t.is_empty()) {
        if let Some((start_str, end_str)) = token.split_once('-') {
            let invalid = || PageSpecError::InvalidRange(token.to_string());
            let start = parse_digits(start_str).ok_or_else(invalid)?;
            let end = parse_digits(end_str).ok_or_else(invalid)?;
            if start < 1 || end < 1 || start > end {
                return Err(invalid());
            }

            // start >= 1 here, so a start past max_page yields an empty range
            let last = end.min(u64::from(max_page));
            pages.extend((start..=last).map(|p| p as u32));
        } else {
            let page = parse_digits(token)
                .ok_or_else(|| PageSpecError::InvalidPageNumber(token.to_string()))?;
            if page >= 1 && page <= u64::from(max_page) {
                pages.insert(page as u32);
            }
        }
    }

    if pages.is_empty() {
        return Err(PageSpecError::NoValidPages);
    }

    Ok(PageSet(pages.into_iter().collect()))
}

/// ASCII digits only; values too large to represent saturate.
fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(s.parse::<u64>().unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(spec: &str, max_page: u32) -> Vec<u32> {
        parse_page_spec(spec, max_page).unwrap().iter().collect()
    }

    #[test]
    fn test_mixed_singles_and_ranges() {
        assert_eq!(pages("1,3-5,8", 10), vec![1, 3, 4, 5, 8]);
    }

    #[test]
    fn test_single_page_out_of_range_is_dropped() {
        assert_eq!(pages("1,50", 10), vec![1]);
    }

    #[test]
    fn test_range_tail_is_clipped() {
        assert_eq!(pages("8-1000", 10), vec![8, 9, 10]);
    }

    #[test]
    fn test_all_out_of_range() {
        assert_eq!(
            parse_page_spec("50-60", 10),
            Err(PageSpecError::NoValidPages)
        );
        assert_eq!(parse_page_spec("0", 10), Err(PageSpecError::NoValidPages));
    }

    #[test]
    fn test_non_numeric_range() {
        assert_eq!(
            parse_page_spec("1,a-3", 10),
            Err(PageSpecError::InvalidRange("a-3".to_string()))
        );
    }

    #[test]
    fn test_backwards_range() {
        assert_eq!(
            parse_page_spec("5-2", 10),
            Err(PageSpecError::InvalidRange("5-2".to_string()))
        );
    }

    #[test]
    fn test_zero_in_range() {
        assert_eq!(
            parse_page_spec("0-3", 10),
            Err(PageSpecError::InvalidRange("0-3".to_string()))
        );
    }

    #[test]
    fn test_open_ended_and_double_dash() {
        assert_eq!(
            parse_page_spec("-5", 10),
            Err(PageSpecError::InvalidRange("-5".to_string()))
        );
        assert_eq!(
            parse_page_spec("3-", 10),
            Err(PageSpecError::InvalidRange("3-".to_string()))
        );
        assert_eq!(
            parse_page_spec("1-2-3", 10),
            Err(PageSpecError::InvalidRange("1-2-3".to_string()))
        );
    }

    #[test]
    fn test_invalid_page_number() {
        assert_eq!(
            parse_page_spec("2,x", 10),
            Err(PageSpecError::InvalidPageNumber("x".to_string()))
        );
        assert_eq!(
            parse_page_spec("+3", 10),
            Err(PageSpecError::InvalidPageNumber("+3".to_string()))
        );
    }

    #[test]
    fn test_empty_spec() {
        assert_eq!(parse_page_spec("", 10), Err(PageSpecError::Missing));
        assert_eq!(
            parse_page_spec(" , ,", 10),
            Err(PageSpecError::NoValidPages)
        );
    }

    #[test]
    fn test_whitespace_and_empty_tokens() {
        assert_eq!(pages(" 1 , 3 - 4,,\t6,", 10), vec![1, 3, 4, 6]);
    }

    #[test]
    fn test_error_token_is_compacted() {
        assert_eq!(
            parse_page_spec("1, b - 2", 10),
            Err(PageSpecError::InvalidRange("b-2".to_string()))
        );
    }

    #[test]
    fn test_duplicates_and_ordering() {
        assert_eq!(pages("5,1-3,2,5,3-4", 10), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_huge_numbers_are_clipped() {
        assert_eq!(pages("2,99999999999999999999999", 3), vec![2]);
        assert_eq!(pages("3-99999999999999999999999", 4), vec![3, 4]);
    }

    #[test]
    fn test_zero_page_document() {
        assert_eq!(parse_page_spec("1-5", 0), Err(PageSpecError::NoValidPages));
    }

    #[test]
    fn test_reparse_canonical_output() {
        for spec in ["1,3-5,8", "10-2000,4", "7,7,7", "2-3,1"] {
            let first = parse_page_spec(spec, 12).unwrap();
            let second = parse_page_spec(&first.to_string(), 12).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_output_within_bounds() {
        for max_page in [1, 3, 10] {
            let set = parse_page_spec("1-100,0,7,2-2", max_page).unwrap();
            assert!(set.len() <= max_page as usize);
            assert!(set.iter().all(|p| (1..=max_page).contains(&p)));
            let pages: Vec<u32> = set.iter().collect();
            assert!(pages.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(parse_page_spec("3,1-2", 5).unwrap().to_string(), "1,2,3");
    }
}
