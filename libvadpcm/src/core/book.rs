//! external codebook forms: the `.table` text and the binary book record

use std::fmt::Write as _;
use std::io::{Read, Write};
use std::str::FromStr;

use super::error::{Error, VadpcmResult};
use super::predictor::{Codebook, Predictor};
use super::types::{clamp_16, MAX_ORDER, MAX_PREDICTORS, PREDICTOR_ROWS};

// text form

impl Codebook {
    /// `.table` text: order, predictor count, then per predictor `order` lines
    /// of 8 values (one per codec row), each value followed by a space
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "{}\n{}\n", self.order(), self.len());

        for predictor in self.predictors() {
            for column in 0..self.order() {
                for row in 0..PREDICTOR_ROWS {
                    let _ = write!(out, "{} ", predictor.coefficient(row, column));
                }
                out.push('\n');
            }
        }

        out
    }

    /// parse the `.table` text written by [`Codebook::serialize`]
    pub fn parse(text: &str) -> VadpcmResult<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() < 2 {
            return Err(Error::MissingHeader);
        }

        let order = parse_int(tokens[0])?;
        let npredictors = parse_int(tokens[1])?;
        if !(1..=MAX_ORDER as i64).contains(&order) {
            return Err(Error::InvalidOrder(order));
        }
        if !(1..=MAX_PREDICTORS as i64).contains(&npredictors) {
            return Err(Error::InvalidPredictorCount(npredictors));
        }
        let (order, npredictors) = (order as usize, npredictors as usize);

        let expected = 2 + npredictors * order * PREDICTOR_ROWS;
        if tokens.len() != expected {
            return Err(Error::WrongValueCount {
                expected,
                actual: tokens.len(),
            });
        }

        let mut values = tokens[2..].iter().map(|t| parse_int(t));
        let mut predictors = Vec::with_capacity(npredictors);
        for _ in 0..npredictors {
            // text is column-major per predictor; the model takes rows
            let mut base = vec![0i32; PREDICTOR_ROWS * order];
            for column in 0..order {
                for row in 0..PREDICTOR_ROWS {
                    let value = values.next().ok_or(Error::WrongValueCount {
                        expected,
                        actual: tokens.len(),
                    })??;
                    base[row * order + column] = i32::try_from(value)
                        .map_err(|_| Error::InvalidNumber(value.to_string()))?;
                }
            }
            predictors.push(Predictor::from_base(order, &base)?);
        }

        Codebook::new(order, predictors)
    }
}

impl FromStr for Codebook {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Codebook::parse(s)
    }
}

fn parse_int(token: &str) -> VadpcmResult<i64> {
    token
        .parse::<i64>()
        .map_err(|_| Error::InvalidNumber(token.to_string()))
}

// book record

/// flat book record: base coefficients laid out `[predictor][row][order]`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdpcmBook {
    pub order: i32,
    pub npredictors: i32,
    pub book: Vec<i16>,
}

impl AdpcmBook {
    /// number of coefficients the header promises
    pub fn coefficient_count(&self) -> usize {
        let order = self.order.max(0) as usize;
        let npredictors = self.npredictors.max(0) as usize;
        order * npredictors * PREDICTOR_ROWS
    }

    /// parse a big-endian `i16 order, i16 npredictors, i16 coefficients...` payload
    pub fn from_bytes(data: &[u8]) -> VadpcmResult<Self> {
        if data.len() < 4 {
            return Err(Error::MissingHeader);
        }
        let order = i16::from_be_bytes([data[0], data[1]]) as i32;
        let npredictors = i16::from_be_bytes([data[2], data[3]]) as i32;

        let mut book = AdpcmBook {
            order,
            npredictors,
            book: Vec::new(),
        };
        let expected = book.coefficient_count();
        let available = (data.len() - 4) / 2;
        if available < expected {
            return Err(Error::TruncatedBook {
                expected,
                actual: available,
            });
        }

        book.book = data[4..4 + expected * 2]
            .chunks_exact(2)
            .map(|b| i16::from_be_bytes([b[0], b[1]]))
            .collect();

        Ok(book)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.book.len() * 2);
        out.extend_from_slice(&(self.order as i16).to_be_bytes());
        out.extend_from_slice(&(self.npredictors as i16).to_be_bytes());
        for value in &self.book {
            out.extend_from_slice(&value.to_be_bytes());
        }
        out
    }

    pub fn read_from<R: Read>(reader: &mut R) -> VadpcmResult<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        AdpcmBook::from_bytes(&data)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> VadpcmResult<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }
}

impl Codebook {
    /// flatten into a book record, clamping coefficients to 16 bits
    pub fn to_book(&self) -> AdpcmBook {
        let book = self
            .predictors()
            .iter()
            .flat_map(|p| p.base())
            .map(clamp_16)
            .collect();

        AdpcmBook {
            order: self.order() as i32,
            npredictors: self.len() as i32,
            book,
        }
    }

    /// reshape a book record and re-expand every predictor
    pub fn from_book(book: &AdpcmBook) -> VadpcmResult<Self> {
        if !(1..=MAX_ORDER as i32).contains(&book.order) {
            return Err(Error::InvalidOrder(book.order as i64));
        }
        if !(1..=MAX_PREDICTORS as i32).contains(&book.npredictors) {
            return Err(Error::InvalidPredictorCount(book.npredictors as i64));
        }

        let expected = book.coefficient_count();
        if book.book.len() < expected {
            return Err(Error::TruncatedBook {
                expected,
                actual: book.book.len(),
            });
        }

        let base: Vec<i32> = book.book[..expected].iter().map(|&v| v as i32).collect();
        Codebook::from_base(book.order as usize, book.npredictors as usize, &base)
    }
}
