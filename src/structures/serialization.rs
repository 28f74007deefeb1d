//! Wire grammar for cells, dimensions, pairs and triads — the format that
//! glues file-backed pipeline stages together.
//!
//! ```text
//! pair      := '(' first second ')'
//! triad     := '(' first second third ')'
//! cell<T>   := '(' row column value<T> ')'
//! dimension := '[' R C ']'
//! ```
//!
//! Whitespace between tokens is insignificant; `(`/`)`/`[`/`]` are always
//! surrounded by whitespace in well-formed input, so a plain token stream
//! split on ASCII whitespace recovers every production without a real
//! lexer. Integer fields parse with `str::parse`; float fields go through
//! `fast_float2`, matching the hot-path numeric parsing the rest of this
//! crate's ancestry uses for CSV cells.

use std::io::{Read, Seek, SeekFrom};

use crate::error::{WafError, WafResult};

/// Reads whitespace-delimited tokens from a byte stream, tracking the byte
/// offset of the next unread byte. Single-byte reads mirror the original
/// `istream` extraction this grammar was modeled on; token boundaries are
/// never more than a few characters apart so the cost is immaterial.
pub struct Tokenizer<R> {
    reader: R,
    pos: u64,
}

impl<R: Read> Tokenizer<R> {
    pub fn new(reader: R) -> Self {
        Tokenizer { reader, pos: 0 }
    }

    pub fn pos(&self) -> u64 {
        self.pos
    }

    fn read_byte(&mut self) -> WafResult<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            return match self.reader.read(&mut buf) {
                Ok(0) => Ok(None),
                Ok(_) => {
                    self.pos += 1;
                    Ok(Some(buf[0]))
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => Err(WafError::from(e)),
            };
        }
    }

    /// Returns the next whitespace-delimited token, or `None` at end of
    /// stream. Brackets are always their own token since the grammar
    /// surrounds them with whitespace.
    pub fn next_token(&mut self) -> WafResult<Option<String>> {
        let mut byte = loop {
            match self.read_byte()? {
                None => return Ok(None),
                Some(b) if b.is_ascii_whitespace() => continue,
                Some(b) => break b,
            }
        };
        let mut token = String::new();
        loop {
            token.push(byte as char);
            match self.read_byte()? {
                None => break,
                Some(b) if b.is_ascii_whitespace() => break,
                Some(b) => byte = b,
            }
        }
        Ok(Some(token))
    }
}

impl<R: Read + Seek> Tokenizer<R> {
    /// Jumps the underlying stream to an absolute byte offset previously
    /// observed via [`Tokenizer::pos`].
    pub fn seek_to(&mut self, pos: u64) -> WafResult<()> {
        self.reader.seek(SeekFrom::Start(pos))?;
        self.pos = pos;
        Ok(())
    }
}

/// A value that can appear as the payload of a [`Cell`] or as a field of a
/// pair/triad — anything that round-trips through a single grammar token,
/// or recursively through a nested `( ... )`.
pub trait GrammarValue: Sized {
    fn read_from<R: Read>(tokens: &mut Tokenizer<R>) -> WafResult<Self>;
    fn write_to(&self, out: &mut dyn std::fmt::Write) -> std::fmt::Result;
}

pub(crate) fn expect_token<R: Read>(tokens: &mut Tokenizer<R>, expected: &str) -> WafResult<()> {
    match tokens.next_token()? {
        Some(ref t) if t == expected => Ok(()),
        Some(other) => Err(WafError::parse(format!(
            "expected `{expected}`, found `{other}`"
        ))),
        None => Err(WafError::parse(format!(
            "expected `{expected}`, found end of stream"
        ))),
    }
}

pub(crate) fn next_required_token<R: Read>(tokens: &mut Tokenizer<R>) -> WafResult<String> {
    tokens
        .next_token()?
        .ok_or_else(|| WafError::parse("unexpected end of stream"))
}

impl GrammarValue for usize {
    fn read_from<R: Read>(tokens: &mut Tokenizer<R>) -> WafResult<Self> {
        let tok = next_required_token(tokens)?;
        tok.parse::<usize>()
            .map_err(|_| WafError::parse(format!("`{tok}` is not an integer")))
    }

    fn write_to(&self, out: &mut dyn std::fmt::Write) -> std::fmt::Result {
        write!(out, "{self}")
    }
}

impl GrammarValue for u64 {
    fn read_from<R: Read>(tokens: &mut Tokenizer<R>) -> WafResult<Self> {
        let tok = next_required_token(tokens)?;
        tok.parse::<u64>()
            .map_err(|_| WafError::parse(format!("`{tok}` is not an integer")))
    }

    fn write_to(&self, out: &mut dyn std::fmt::Write) -> std::fmt::Result {
        write!(out, "{self}")
    }
}

impl GrammarValue for f64 {
    fn read_from<R: Read>(tokens: &mut Tokenizer<R>) -> WafResult<Self> {
        let tok = next_required_token(tokens)?;
        fast_float2::parse::<f64, _>(&tok)
            .map_err(|_| WafError::parse(format!("`{tok}` is not a number")))
    }

    fn write_to(&self, out: &mut dyn std::fmt::Write) -> std::fmt::Result {
        write!(out, "{self}")
    }
}

/// A bare token used as the payload of a term-set or frequency-vector
/// pair (`(termid term)`, `(termid frequency)`): terms are single
/// whitespace-free tokens, same as every other grammar field.
impl GrammarValue for String {
    fn read_from<R: Read>(tokens: &mut Tokenizer<R>) -> WafResult<Self> {
        next_required_token(tokens)
    }

    fn write_to(&self, out: &mut dyn std::fmt::Write) -> std::fmt::Result {
        write!(out, "{self}")
    }
}

impl<A: GrammarValue, B: GrammarValue> GrammarValue for (A, B) {
    fn read_from<R: Read>(tokens: &mut Tokenizer<R>) -> WafResult<Self> {
        expect_token(tokens, "(")?;
        let a = A::read_from(tokens)?;
        let b = B::read_from(tokens)?;
        expect_token(tokens, ")")?;
        Ok((a, b))
    }

    fn write_to(&self, out: &mut dyn std::fmt::Write) -> std::fmt::Result {
        write!(out, "( ")?;
        self.0.write_to(out)?;
        write!(out, " ")?;
        self.1.write_to(out)?;
        write!(out, " )")
    }
}

impl<A: GrammarValue, B: GrammarValue, C: GrammarValue> GrammarValue for (A, B, C) {
    fn read_from<R: Read>(tokens: &mut Tokenizer<R>) -> WafResult<Self> {
        expect_token(tokens, "(")?;
        let a = A::read_from(tokens)?;
        let b = B::read_from(tokens)?;
        let c = C::read_from(tokens)?;
        expect_token(tokens, ")")?;
        Ok((a, b, c))
    }

    fn write_to(&self, out: &mut dyn std::fmt::Write) -> std::fmt::Result {
        write!(out, "( ")?;
        self.0.write_to(out)?;
        write!(out, " ")?;
        self.1.write_to(out)?;
        write!(out, " ")?;
        self.2.write_to(out)?;
        write!(out, " )")
    }
}

/// `cell<T> := '(' row column value<T> ')'`
#[derive(Debug, Clone, PartialEq)]
pub struct Cell<T> {
    pub row: usize,
    pub column: usize,
    pub value: T,
}

impl<T: GrammarValue> Cell<T> {
    pub fn read<R: Read>(tokens: &mut Tokenizer<R>) -> WafResult<Self> {
        expect_token(tokens, "(")?;
        let row = usize::read_from(tokens)?;
        let column = usize::read_from(tokens)?;
        let value = T::read_from(tokens)?;
        expect_token(tokens, ")")?;
        Ok(Cell { row, column, value })
    }

    /// Emits `( r c v ) ` — note the trailing space, matching the original
    /// writer so row-separating newlines can simply be appended after it.
    pub fn write(&self, out: &mut dyn std::fmt::Write) -> std::fmt::Result {
        write!(out, "( {} {} ", self.row, self.column)?;
        self.value.write_to(out)?;
        write!(out, " ) ")
    }
}

/// `dimension := '[' R C ']'`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimension {
    pub rows: usize,
    pub columns: usize,
}

impl Dimension {
    pub fn read<R: Read>(tokens: &mut Tokenizer<R>) -> WafResult<Self> {
        expect_token(tokens, "[")?;
        let rows = usize::read_from(tokens)?;
        let columns = usize::read_from(tokens)?;
        expect_token(tokens, "]")?;
        Ok(Dimension { rows, columns })
    }

    pub fn write(&self, out: &mut dyn std::fmt::Write) -> std::fmt::Result {
        write!(out, "[ {} {} ]", self.rows, self.columns)
    }
}

/// One record of the matrix envelope: either a data cell, or the trailing
/// dimension footer that terminates the stream.
pub enum Record<T> {
    Cell(Cell<T>),
    Dimension(Dimension),
}

/// Dispatches on the first non-whitespace byte of the next record: `(`
/// means a cell, `[` means the dimension footer. Returns `None` at a clean
/// end of stream with nothing left to read (only valid between matrices,
/// never inside a well-formed envelope).
pub fn next_record<T: GrammarValue, R: Read>(
    tokens: &mut Tokenizer<R>,
) -> WafResult<Option<Record<T>>> {
    let first = match tokens.next_token()? {
        None => return Ok(None),
        Some(t) => t,
    };
    match first.as_str() {
        "(" => {
            let row = usize::read_from(tokens)?;
            let column = usize::read_from(tokens)?;
            let value = T::read_from(tokens)?;
            expect_token(tokens, ")")?;
            Ok(Some(Record::Cell(Cell { row, column, value })))
        }
        "[" => {
            let rows = usize::read_from(tokens)?;
            let columns = usize::read_from(tokens)?;
            expect_token(tokens, "]")?;
            Ok(Some(Record::Dimension(Dimension { rows, columns })))
        }
        other => Err(WafError::parse(format!(
            "expected `(` or `[`, found `{other}`"
        ))),
    }
}

/// Reads `pair`s (`'(' first second ')'`) until a clean end of stream,
/// for the term-set and frequency-vector file grammars, which are a flat
/// sequence of pairs with no trailing dimension footer.
pub fn read_pairs_until_eof<A, B, R>(tokens: &mut Tokenizer<R>) -> WafResult<Vec<(A, B)>>
where
    A: GrammarValue,
    B: GrammarValue,
    R: Read,
{
    let mut out = Vec::new();
    loop {
        match tokens.next_token()? {
            None => break,
            Some(ref t) if t == "(" => {
                let a = A::read_from(tokens)?;
                let b = B::read_from(tokens)?;
                expect_token(tokens, ")")?;
                out.push((a, b));
            }
            Some(other) => {
                return Err(WafError::parse(format!(
                    "expected `(` or end of stream, found `{other}`"
                )))
            }
        }
    }
    Ok(out)
}

/// Writes one `( a b )` pair per line, matching the term-set and
/// frequency-vector file grammars.
pub fn write_pairs<A, B>(
    pairs: impl Iterator<Item = (A, B)>,
    out: &mut dyn std::fmt::Write,
) -> std::fmt::Result
where
    A: GrammarValue,
    B: GrammarValue,
{
    for (a, b) in pairs {
        write!(out, "( ")?;
        a.write_to(out)?;
        write!(out, " ")?;
        b.write_to(out)?;
        writeln!(out, " )")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_integer_cell() {
        let mut tokens = Tokenizer::new(Cursor::new(b"( 0 2 6 )".to_vec()));
        let cell = Cell::<u64>::read(&mut tokens).unwrap();
        assert_eq!(cell, Cell { row: 0, column: 2, value: 6 });
    }

    #[test]
    fn parses_float_cell() {
        let mut tokens = Tokenizer::new(Cursor::new(b"( 1 1 3.5 )".to_vec()));
        let cell = Cell::<f64>::read(&mut tokens).unwrap();
        assert_eq!(cell.row, 1);
        assert_eq!(cell.column, 1);
        assert!((cell.value - 3.5).abs() < 1e-12);
    }

    #[test]
    fn parses_pair_valued_cell() {
        let mut tokens = Tokenizer::new(Cursor::new(b"( 0 1 ( 4 2 ) )".to_vec()));
        let cell = Cell::<(u64, u64)>::read(&mut tokens).unwrap();
        assert_eq!(cell.value, (4, 2));
    }

    #[test]
    fn parses_dimension() {
        let mut tokens = Tokenizer::new(Cursor::new(b"[ 3 4 ]".to_vec()));
        let dim = Dimension::read(&mut tokens).unwrap();
        assert_eq!(dim, Dimension { rows: 3, columns: 4 });
    }

    #[test]
    fn writes_trailing_space() {
        let cell = Cell { row: 0, column: 0, value: 1u64 };
        let mut s = String::new();
        cell.write(&mut s).unwrap();
        assert_eq!(s, "( 0 0 1 ) ");
    }

    #[test]
    fn next_record_dispatches_on_bracket() {
        let mut tokens = Tokenizer::new(Cursor::new(b"( 0 0 1 ) [ 1 1 ]".to_vec()));
        match next_record::<u64, _>(&mut tokens).unwrap() {
            Some(Record::Cell(c)) => assert_eq!(c, Cell { row: 0, column: 0, value: 1 }),
            _ => panic!("expected cell"),
        }
        match next_record::<u64, _>(&mut tokens).unwrap() {
            Some(Record::Dimension(d)) => assert_eq!(d, Dimension { rows: 1, columns: 1 }),
            _ => panic!("expected dimension"),
        }
        assert!(next_record::<u64, _>(&mut tokens).unwrap().is_none());
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        let mut tokens = Tokenizer::new(Cursor::new(b"( 0 x 1 )".to_vec()));
        assert!(Cell::<u64>::read(&mut tokens).is_err());
    }

    #[test]
    fn tokenizer_tracks_byte_position() {
        let mut tokens = Tokenizer::new(Cursor::new(b"( 0 0 1 ) ".to_vec()));
        let _ = Cell::<u64>::read(&mut tokens).unwrap();
        assert_eq!(tokens.pos(), 10);
    }

    #[test]
    fn reads_pairs_until_eof_with_no_dimension_footer() {
        let mut tokens = Tokenizer::new(Cursor::new(b"( 0 cat ) ( 1 dog )".to_vec()));
        let pairs = read_pairs_until_eof::<u64, String, _>(&mut tokens).unwrap();
        assert_eq!(
            pairs,
            vec![(0, "cat".to_string()), (1, "dog".to_string())]
        );
    }

    #[test]
    fn writes_and_reparses_pairs() {
        let mut s = String::new();
        write_pairs(
            vec![(0u64, "cat".to_string()), (1u64, "dog".to_string())].into_iter(),
            &mut s,
        )
        .unwrap();
        let mut tokens = Tokenizer::new(Cursor::new(s.into_bytes()));
        let pairs = read_pairs_until_eof::<u64, String, _>(&mut tokens).unwrap();
        assert_eq!(pairs.len(), 2);
    }
}
