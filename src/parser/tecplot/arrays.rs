use log::trace;

use super::cursor::TextCursor;
use crate::error::ParseError;
use crate::structs_and_impls::*;

pub struct ArrayReader;

impl ArrayReader {
    /// Reads the `node_count x num_node_vars` nodal block, one value per line,
    /// variable after variable.
    pub fn read_nodal<'a>(
        cursor: TextCursor<'a>,
        zone: &ZoneMeta,
        policy: NumericPolicy,
        substituted: &mut usize,
    ) -> Result<(Block, TextCursor<'a>), ParseError> {
        let columns = zone.num_node_vars();
        let count = Self::value_count(zone.node_count, columns)?;
        let (values, rest) = Self::read_values(cursor, count, policy, "nodal data", substituted)?;
        trace!("read {} nodal values", values.len());
        Ok((Block::from_column_major(zone.node_count, columns, values), rest))
    }

    /// Reads the native cell-centered block (`cell_count x num_cell_native_vars`).
    /// The derived coordinate columns are not in the file; the frame assembler adds
    /// them in front once the connectivity is known.
    pub fn read_cells<'a>(
        cursor: TextCursor<'a>,
        zone: &ZoneMeta,
        policy: NumericPolicy,
        substituted: &mut usize,
    ) -> Result<(Block, TextCursor<'a>), ParseError> {
        let columns = zone.num_cell_native_vars();
        let count = Self::value_count(zone.cell_count, columns)?;
        let (values, rest) = Self::read_values(cursor, count, policy, "cell-centered data", substituted)?;
        trace!("read {} cell-centered values", values.len());
        Ok((Block::from_column_major(zone.cell_count, columns, values), rest))
    }

    fn value_count(rows: usize, columns: usize) -> Result<usize, ParseError> {
        rows.checked_mul(columns).ok_or_else(|| {
            ParseError::MalformedZoneHeader(format!("{} x {} values exceed the addressable size", rows, columns))
        })
    }

    // Collects `count` values, one per line. The vector grows with the input, so a
    // header promising more than the text holds fails on the missing lines.
    fn read_values<'a>(
        cursor: TextCursor<'a>,
        count: usize,
        policy: NumericPolicy,
        context: &'static str,
        substituted: &mut usize,
    ) -> Result<(Vec<f64>, TextCursor<'a>), ParseError> {
        let mut values = Vec::new();
        let mut rest = cursor;
        while values.len() < count {
            if rest.is_empty() {                                           // Header promised more values than remain
                return Err(ParseError::UnexpectedEnd { context, offset: rest.offset() });
            }
            let (line, next) = rest.next_line();
            values.push(Self::parse_value(line.trim(), policy, substituted)?);
            rest = next;
        }
        Ok((values, rest))
    }

    /// Converts one token according to the numeric policy.
    pub fn parse_value(
        token: TextCursor<'_>,
        policy: NumericPolicy,
        substituted: &mut usize,
    ) -> Result<f64, ParseError> {
        match token.as_str().parse::<f64>() {
            Ok(value) => Ok(value),
            Err(_) => match policy {
                NumericPolicy::Strict => Err(ParseError::NumericParse {
                    token: token.as_str().to_string(),
                    offset: token.offset(),
                }),
                NumericPolicy::ZeroFill => {
                    *substituted += 1;
                    Ok(0.0)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(node_count: usize, cell_count: usize, first: usize, last: usize) -> ZoneMeta {
        ZoneMeta { node_count, cell_count, first_cell_var_index: first, last_cell_var_index: last }
    }

    #[test]
    fn test_blocks_are_filled_column_major() {
        // 2 nodes x 3 nodal vars, then 2 cells x 1 native cell var
        let text = "1\n2\n3\n4\n5\n6\n10.5\n-2e-3\nrest";
        let zone = zone(2, 2, 3, 3);
        let mut substituted = 0;
        let (nodal, rest) =
            ArrayReader::read_nodal(TextCursor::new(text), &zone, NumericPolicy::Strict, &mut substituted).unwrap();
        assert_eq!(nodal.column(0), &[1.0, 2.0]);
        assert_eq!(nodal.column(2), &[5.0, 6.0]);
        assert!(rest.starts_with("10.5"));

        let (cells, rest) = ArrayReader::read_cells(rest, &zone, NumericPolicy::Strict, &mut substituted).unwrap();
        assert_eq!(cells.columns(), 1);
        assert_eq!(cells.column(0), &[10.5, -2e-3]);
        assert_eq!(substituted, 0);
        assert_eq!(rest.as_str(), "rest");
    }

    #[test]
    fn test_strict_policy_rejects_bad_token() {
        let text = "1\n2\nbogus\n4\n";
        let err = ArrayReader::read_nodal(TextCursor::new(text), &zone(2, 0, 2, 1), NumericPolicy::Strict, &mut 0)
            .unwrap_err();
        match err {
            ParseError::NumericParse { token, offset } => {
                assert_eq!(token, "bogus");
                assert_eq!(offset, 4);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_zero_fill_policy_counts_substitutions() {
        let text = "1\nnan?\n3\n \n";
        let mut substituted = 0;
        let (nodal, rest) =
            ArrayReader::read_nodal(TextCursor::new(text), &zone(2, 0, 2, 1), NumericPolicy::ZeroFill, &mut substituted)
                .unwrap();
        assert_eq!(nodal.values(), &[1.0, 0.0, 3.0, 0.0]);
        assert_eq!(substituted, 2);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_zero_cells_consume_nothing() {
        let text = "1 2 3 4\n";
        let (cells, rest) =
            ArrayReader::read_cells(TextCursor::new(text), &zone(2, 0, 2, 4), NumericPolicy::Strict, &mut 0).unwrap();
        assert_eq!(cells.rows(), 0);
        assert_eq!(cells.values().len(), 0);
        assert_eq!(rest.as_str(), "1 2 3 4\n");
    }

    #[test]
    fn test_short_input_is_an_error() {
        let err = ArrayReader::read_nodal(TextCursor::new("1\n2\n"), &zone(2, 1, 2, 2), NumericPolicy::Strict, &mut 0)
            .unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEnd { context: "nodal data", .. }));
    }

    #[test]
    fn test_oversized_counts_fail_without_allocating() {
        // a node count far beyond the input ends at the missing lines
        let err = ArrayReader::read_nodal(
            TextCursor::new("1\n2\n"),
            &zone(400_000_000_000, 1, 2, 1),
            NumericPolicy::ZeroFill,
            &mut 0,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEnd { context: "nodal data", .. }));

        let err = ArrayReader::read_cells(TextCursor::new("1\n"), &zone(4, usize::MAX, 2, 3), NumericPolicy::Strict, &mut 0)
            .unwrap_err();
        assert!(matches!(err, ParseError::MalformedZoneHeader(_)));
    }
}
