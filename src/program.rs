use thiserror::Error;

/// Failure to parse a program image line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid cell {token:?} at position {index}: {reason}")]
pub struct ParseProgramError {
    /// The offending comma-separated token.
    pub token: String,
    /// Zero-based position of the token in the line.
    pub index: usize,
    pub reason: String,
}

/// Parse a program image: a single line of comma-separated decimal integers,
/// each optionally signed. Surrounding whitespace on the line and around each
/// cell is tolerated. No other program format is supported.
pub fn parse_program(line: &str) -> Result<Vec<i64>, ParseProgramError> {
    line.trim()
        .split(',')
        .enumerate()
        .map(|(index, token)| {
            token.trim().parse::<i64>().map_err(|e| ParseProgramError {
                token: token.to_string(),
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_program() {
        assert_eq!(parse_program("1,0,0,0,99").unwrap(), vec![1, 0, 0, 0, 99]);
    }

    #[test]
    fn test_parse_negative_and_large_cells() {
        assert_eq!(
            parse_program("1101,100,-1,4,0").unwrap(),
            vec![1101, 100, -1, 4, 0]
        );
        assert_eq!(
            parse_program("104,1125899906842624,99").unwrap(),
            vec![104, 1125899906842624, 99]
        );
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        assert_eq!(parse_program(" 1, 2 ,3 \n").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_single_cell() {
        assert_eq!(parse_program("99").unwrap(), vec![99]);
    }

    #[test]
    fn test_parse_rejects_garbage_token() {
        let err = parse_program("1,two,3").unwrap_err();
        assert_eq!(err.token, "two");
        assert_eq!(err.index, 1);
    }

    #[test]
    fn test_parse_rejects_empty_line() {
        assert!(parse_program("").is_err());
        assert!(parse_program("  \n").is_err());
    }

    #[test]
    fn test_parse_rejects_trailing_comma() {
        let err = parse_program("1,2,").unwrap_err();
        assert_eq!(err.index, 2);
    }
}
