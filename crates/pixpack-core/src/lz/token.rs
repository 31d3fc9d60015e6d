// crates/pixpack-core/src/lz/token.rs
//
// Wire form of a token: four optional field symbols, each coded with its own tree.
//
//   Literal(v)                 -> dy=0  dx=128  runlen=-   value=v
//   Copy(dy, dx, run, Some(v)) -> dy    dx      run        value=v
//   Copy(dy, dx, run, None)    -> dy    dx      run        value=-   (copy ends the image)
//
// (dy, dx) = (0, 128) is zero displacement, which no copy can have, so it marks a literal.

/// Column displacement bias: dx_biased = dest_col - src_col + DX_BIAS.
pub const DX_BIAS: i64 = 128;

pub const LITERAL_DY: u8 = 0;
pub const LITERAL_DX: u8 = DX_BIAS as u8;

pub const TOKEN_FIELDS: usize = 4;

/// Palette indices are below 16.
pub const VALUE_ALPHABET: usize = 16;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Dy = 0,
    Dx = 1,
    Runlen = 2,
    Value = 3,
}

impl Field {
    pub const ALL: [Field; TOKEN_FIELDS] = [Field::Dy, Field::Dx, Field::Runlen, Field::Value];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn alphabet(self) -> usize {
        match self {
            Field::Dy | Field::Dx | Field::Runlen => 256,
            Field::Value => VALUE_ALPHABET,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Dy => "dy",
            Field::Dx => "dx",
            Field::Runlen => "runlen",
            Field::Value => "value",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Literal(u8),
    /// Copy `runlen` symbols from `dy` rows up and `dx_biased - 128` columns
    /// left, then emit `trailing` if the image continues.
    Copy {
        dy: u8,
        dx_biased: u8,
        runlen: u8,
        trailing: Option<u8>,
    },
}

impl Token {
    /// Field symbols in wire order; `None` fields emit nothing.
    pub fn fields(&self) -> [Option<u8>; TOKEN_FIELDS] {
        match *self {
            Token::Literal(v) => [Some(LITERAL_DY), Some(LITERAL_DX), None, Some(v)],
            Token::Copy { dy, dx_biased, runlen, trailing } => {
                [Some(dy), Some(dx_biased), Some(runlen), trailing]
            }
        }
    }

    /// Pixels this token produces.
    #[inline]
    pub fn advance(&self) -> usize {
        match *self {
            Token::Literal(_) => 1,
            Token::Copy { runlen, trailing, .. } => runlen as usize + trailing.is_some() as usize,
        }
    }

    /// Backward distance in raster order for a row of `width` symbols.
    pub fn displacement(dy: u8, dx_biased: u8, width: usize) -> i64 {
        dy as i64 * width as i64 + dx_biased as i64 - DX_BIAS
    }
}

/// Split tokens into per-field symbol streams, skipping absent fields.
pub fn split_fields(tokens: &[Token], out: &mut [Vec<u8>; TOKEN_FIELDS]) {
    for t in tokens {
        for (stream, sym) in out.iter_mut().zip(t.fields()) {
            if let Some(s) = sym {
                stream.push(s);
            }
        }
    }
}
