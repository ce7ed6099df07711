use log::{debug, trace};

use super::cursor::TextCursor;
use crate::error::ParseError;
use crate::structs_and_impls::*;

/// Title, declared variables and zone metadata at the top of a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameHeader {
    pub title: String,
    pub variables: Vec<Variable>,
    pub zone: ZoneMeta,
}

impl FrameHeader {
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_str())
    }
}

pub struct ZoneHeaderParser;

impl ZoneHeaderParser {
    /// Reads the title line, the variable list and the ZONE line.
    /// Returns the header and the cursor positioned on the first nodal value.
    pub fn parse<'a>(
        cursor: TextCursor<'a>,
        layout: &FrameLayout,
    ) -> Result<(FrameHeader, TextCursor<'a>), ParseError> {
        if cursor.is_empty() {
            return Err(ParseError::UnexpectedEnd { context: "title line", offset: cursor.offset() });
        }
        let (title_line, rest) = cursor.next_line();                    // Title is kept for the output header, never validated
        let title = Self::unquote(title_line.split_once_byte(b'=').map_or(title_line, |(_, v)| v));

        let (names, zone_line, rest) = Self::parse_variable_names(rest)?;
        let zone = Self::parse_zone_line(zone_line)?;
        let variables = Self::assign_roles(names, &zone, layout)?;
        if zone.data_line_count().is_none() {                           // Counts no input could ever satisfy
            return Err(ParseError::MalformedZoneHeader(format!(
                "N={}, E={} exceed the addressable data size",
                zone.node_count, zone.cell_count
            )));
        }

        debug!(
            "zone header: {} variables, N={}, E={}, cell variables [{}..={}]",
            variables.len(),
            zone.node_count,
            zone.cell_count,
            zone.first_cell_var_index,
            zone.last_cell_var_index
        );

        Ok((FrameHeader { title, variables, zone }, rest))
    }

    // Reads "VARIABLES = "v0"" followed by one quoted name per line, up to the ZONE line.
    // Returns the names, the ZONE line and the cursor after it.
    fn parse_variable_names(
        cursor: TextCursor<'_>,
    ) -> Result<(Vec<String>, TextCursor<'_>, TextCursor<'_>), ParseError> {
        if cursor.is_empty() {
            return Err(ParseError::UnexpectedEnd { context: "VARIABLES line", offset: cursor.offset() });
        }
        let (line, mut rest) = cursor.next_line();
        let (_, first) = line.split_once_byte(b'=').ok_or_else(|| {
            ParseError::MalformedZoneHeader(format!(
                "expected `=` in variables line `{}`",
                line.as_str()
            ))
        })?;

        let mut names = vec![Self::unquote(first)];

        loop {
            if rest.is_empty() {                                         // Variable list ran into end of input without a ZONE line
                return Err(ParseError::UnexpectedEnd { context: "variable list", offset: rest.offset() });
            }
            let (line, next) = rest.next_line();
            if line.starts_with("ZONE") {
                return Ok((names, line, next));
            }
            if !line.trim().is_empty() {                                 // Blank lines inside the list are ignored
                names.push(Self::unquote(line));
            }
            rest = next;
        }
    }

    /// Decodes `ZONE key=value, key=value ...` into node/cell counts and the cell variable range.
    pub fn parse_zone_line(line: TextCursor<'_>) -> Result<ZoneMeta, ParseError> {
        let mut fields = line.suffix("ZONE".len() as isize).trim();       // Drop the ZONE keyword
        let mut node_count = None;
        let mut cell_count = None;
        let mut cell_range = None;

        loop {
            let (field, rest) = Self::next_field(fields);
            if field.is_empty() {                                         // A zero-length field means the line is exhausted
                break;
            }
            fields = rest;

            let Some((key, value)) = field.split_once_byte(b'=') else {
                trace!("ignoring zone token without `=`: {}", field.as_str());
                continue;
            };
            let value = value.trim();
            match key.trim().as_str() {
                "N" | "NODES" => node_count = Some(Self::parse_count(value, "N")?),
                "E" | "ELEMENTS" => cell_count = Some(Self::parse_count(value, "E")?),
                "VARLOCATION" => cell_range = Some(Self::parse_var_location(value)?),
                other => trace!("ignoring zone attribute {}={}", other, value.as_str()),
            }
        }

        let node_count = node_count.ok_or(ParseError::MissingZoneAttribute("N"))?;
        let cell_count = cell_count.ok_or(ParseError::MissingZoneAttribute("E"))?;
        let (first_cell_var_index, last_cell_var_index) =
            cell_range.ok_or(ParseError::MissingZoneAttribute("VARLOCATION"))?;

        Ok(ZoneMeta { node_count, cell_count, first_cell_var_index, last_cell_var_index })
    }

    // Next comma-or-space separated field. Delimiters inside parentheses or
    // brackets belong to the field, so `VARLOCATION=([3-5, 7]=...)` stays whole.
    fn next_field(cursor: TextCursor<'_>) -> (TextCursor<'_>, TextCursor<'_>) {
        let is_delimiter = |b: u8| b == b',' || b.is_ascii_whitespace();
        let bytes = cursor.as_str().as_bytes();
        let start = bytes.iter().take_while(|&&b| is_delimiter(b)).count();
        let mut depth = 0usize;
        let mut end = start;
        while end < bytes.len() {
            match bytes[end] {
                b'(' | b'[' => depth += 1,
                b')' | b']' => depth = depth.saturating_sub(1),
                b if depth == 0 && is_delimiter(b) => break,
                _ => {}
            }
            end += 1;
        }
        let skip = bytes[end..].iter().take_while(|&&b| is_delimiter(b)).count();
        (cursor.slice(start as isize, end as isize), cursor.suffix((end + skip) as isize))
    }

    fn parse_count(value: TextCursor<'_>, key: &'static str) -> Result<usize, ParseError> {
        value.as_str().parse::<usize>().map_err(|e| {
            ParseError::MalformedZoneHeader(format!("{}={}: {}", key, value.as_str(), e))
        })
    }

    /// Decodes `([a-b]=CELLCENTERED)` into the 0-based inclusive range `(a-1, b-1)`.
    /// A single index `([a]=CELLCENTERED)` is read as `[a-a]`.
    pub fn parse_var_location(value: TextCursor<'_>) -> Result<(usize, usize), ParseError> {
        let inner = value.strip_enclosing(b'(', b')');                     // ([a-b]=CELLCENTERED) -> [a-b]=CELLCENTERED
        let range = inner.split_once_byte(b'=').map_or(inner, |(lhs, _)| lhs); // [a-b]=CELLCENTERED -> [a-b]
        let range = range.strip_enclosing(b'[', b']').trim();              // [a-b] -> a-b
        let (lo, hi) = range.split_once_byte(b'-').unwrap_or((range, range));

        let one_based = |part: TextCursor<'_>| -> Result<usize, ParseError> {
            let index = part.trim().as_str().parse::<usize>().map_err(|e| {
                ParseError::MalformedZoneHeader(format!("VARLOCATION={}: {}", value.as_str(), e))
            })?;
            index.checked_sub(1).ok_or_else(|| {                          // 1-based in the file, 0 is not a valid index
                ParseError::VariableRange(format!("VARLOCATION={}: indices start at 1", value.as_str()))
            })
        };
        let first = one_based(lo)?;
        let last = one_based(hi)?;
        if last + 1 < first {
            return Err(ParseError::VariableRange(format!(
                "VARLOCATION={}: range ends before it starts",
                value.as_str()
            )));
        }
        Ok((first, last))
    }

    // Tags each declared variable and checks the range against the list.
    fn assign_roles(
        names: Vec<String>,
        zone: &ZoneMeta,
        layout: &FrameLayout,
    ) -> Result<Vec<Variable>, ParseError> {
        if zone.first_cell_var_index < layout.coordinate_columns {
            return Err(ParseError::VariableRange(format!(
                "{} nodal variables declared, at least {} coordinate columns required",
                zone.first_cell_var_index, layout.coordinate_columns
            )));
        }
        if zone.last_cell_var_index + 1 != names.len() {
            return Err(ParseError::VariableRange(format!(
                "cell-centered range ends at variable {} but {} variables are declared",
                zone.last_cell_var_index + 1,
                names.len()
            )));
        }

        Ok(names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let role = if i < layout.coordinate_columns {
                    VariableRole::Derived
                } else if i < zone.first_cell_var_index {
                    VariableRole::Nodal
                } else {
                    VariableRole::CellNative
                };
                Variable { name, role }
            })
            .collect())
    }

    fn unquote(text: TextCursor<'_>) -> String {
        text.trim().strip_enclosing(b'"', b'"').as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(line: &str) -> Result<ZoneMeta, ParseError> {
        ZoneHeaderParser::parse_zone_line(TextCursor::new(line))
    }

    #[test]
    fn test_zone_line_with_cell_range() {
        let meta = zone("ZONE N=4, E=1, DATAPACKING=BLOCK, VARLOCATION=([4-5]=CELLCENTERED)").unwrap();
        assert_eq!(meta.node_count, 4);
        assert_eq!(meta.cell_count, 1);
        assert_eq!(meta.first_cell_var_index, 3);
        assert_eq!(meta.last_cell_var_index, 4);
    }

    #[test]
    fn test_zone_line_empty_cell_range() {
        // three nodal variables (two coordinates and one field), no cell-centered ones
        let meta = zone("ZONE N=4, E=1, VARLOCATION=([4-3]=CELLCENTERED)").unwrap();
        assert_eq!(meta.first_cell_var_index, 3);
        assert_eq!(meta.last_cell_var_index, 2);
        assert_eq!(meta.num_node_vars(), 3);
        assert_eq!(meta.num_cell_vars(2), 2);
    }

    #[test]
    fn test_zone_line_single_index_and_bracketed_commas() {
        let meta = zone("ZONE T=\"zone 1\" N=10 E=4 VARLOCATION=([3]=CELLCENTERED)").unwrap();
        assert_eq!((meta.node_count, meta.cell_count), (10, 4));
        assert_eq!((meta.first_cell_var_index, meta.last_cell_var_index), (2, 2));

        let meta = zone("ZONE N=10,E=4,VARLOCATION=([3 - 6]=CELLCENTERED),ZONETYPE=FEQUADRILATERAL").unwrap();
        assert_eq!((meta.first_cell_var_index, meta.last_cell_var_index), (2, 5));
    }

    #[test]
    fn test_zone_line_missing_attributes() {
        assert!(matches!(
            zone("ZONE E=1, VARLOCATION=([3-3]=CELLCENTERED)"),
            Err(ParseError::MissingZoneAttribute("N"))
        ));
        assert!(matches!(
            zone("ZONE N=4, VARLOCATION=([3-3]=CELLCENTERED)"),
            Err(ParseError::MissingZoneAttribute("E"))
        ));
        assert!(matches!(zone("ZONE N=4, E=1"), Err(ParseError::MissingZoneAttribute("VARLOCATION"))));
    }

    #[test]
    fn test_zone_line_bad_values() {
        assert!(matches!(zone("ZONE N=four, E=1, VARLOCATION=([3-3]=CELLCENTERED)"), Err(ParseError::MalformedZoneHeader(_))));
        assert!(matches!(zone("ZONE N=4, E=1, VARLOCATION=([0-3]=CELLCENTERED)"), Err(ParseError::VariableRange(_))));
        assert!(matches!(zone("ZONE N=4, E=1, VARLOCATION=([5-3]=CELLCENTERED)"), Err(ParseError::VariableRange(_))));
    }

    #[test]
    fn test_full_header() {
        let text = "TITLE = \"frame 0\"\nVARIABLES = \"z(m)\"\n\"r(m)\"\n\"phi(V)\"\n\"ne(m-3)\"\nZONE N=4, E=1, VARLOCATION=([4-4]=CELLCENTERED)\n1.0\n";
        let (header, rest) = ZoneHeaderParser::parse(TextCursor::new(text), &FrameLayout::default()).unwrap();
        assert_eq!(header.title, "frame 0");
        assert_eq!(header.variable_names().collect::<Vec<_>>(), vec!["z(m)", "r(m)", "phi(V)", "ne(m-3)"]);
        let roles: Vec<_> = header.variables.iter().map(|v| v.role).collect();
        assert_eq!(
            roles,
            vec![VariableRole::Derived, VariableRole::Derived, VariableRole::Nodal, VariableRole::CellNative]
        );
        assert_eq!(rest.as_str(), "1.0\n");
    }

    #[test]
    fn test_header_range_must_cover_variables() {
        let text = "TITLE\nVARIABLES = \"x\"\n\"y\"\n\"a\"\nZONE N=4, E=1, VARLOCATION=([3-4]=CELLCENTERED)\n";
        let err = ZoneHeaderParser::parse(TextCursor::new(text), &FrameLayout::default()).unwrap_err();
        assert!(matches!(err, ParseError::VariableRange(_)));
    }

    #[test]
    fn test_header_without_zone_line() {
        let text = "TITLE\nVARIABLES = \"x\"\n\"y\"\n";
        let err = ZoneHeaderParser::parse(TextCursor::new(text), &FrameLayout::default()).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEnd { context: "variable list", .. }));
    }

    #[test]
    fn test_header_with_unaddressable_counts() {
        let text = format!(
            "TITLE\nVARIABLES = \"z\"\n\"r\"\n\"ne\"\nZONE N=4, E={}, VARLOCATION=([3-3]=CELLCENTERED)\n",
            usize::MAX
        );
        let err = ZoneHeaderParser::parse(TextCursor::new(&text), &FrameLayout::default()).unwrap_err();
        assert!(matches!(err, ParseError::MalformedZoneHeader(_)));
        assert!(err.is_frame_local());
    }
}
