// src/sheets/schema.rs
//! Extraction Schema
//!
//! The fixed set of evaluation columns (L through AB) that the model fills for
//! every proposal. One `Field` per column; the response key, the column letter
//! and the column number are all derived from the same variant so the response
//! validator and the workbook writer cannot drift apart.
//!
//! ## Layout constants
//!
//! - Headers live on worksheet row 5, data starts on row 6
//! - The identifier column is located by its header text (`TPN No.`)
//! - Column U doubles as the "already processed" marker
//! - Fields the model does not supply are written as `-`

use std::fmt;

/// 1-based worksheet row holding the column headers.
pub const HEADER_ROW: u32 = 5;

/// Header text of the identifier (TPN) column.
pub const IDENTIFIER_HEADER: &str = "TPN No.";

/// Placeholder written for any schema field the response did not supply.
pub const SENTINEL: &str = "-";

/// Accepted value domain of a field, as described to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDomain {
    /// "Yes" / "No" / "Not Mentioned"
    YesNo,
    /// Free text, "None" when absent
    FreeText,
    /// Rank number or "Not Ranked"
    Rank,
    /// Numeric score or "Not Available"
    Score,
    /// "UGC" / "AICTE" / "Both" / "None"
    Autonomy,
    /// "page-number(comment)"
    PageReference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    AA,
    AB,
}

impl Field {
    /// Every schema field, in column order.
    pub const ALL: [Field; 17] = [
        Field::L,
        Field::M,
        Field::N,
        Field::O,
        Field::P,
        Field::Q,
        Field::R,
        Field::S,
        Field::T,
        Field::U,
        Field::V,
        Field::W,
        Field::X,
        Field::Y,
        Field::Z,
        Field::AA,
        Field::AB,
    ];

    /// A row with a non-empty value in this column has already been extracted.
    pub const PROCESSED_MARKER: Field = Field::U;

    /// Worksheet column label.
    pub fn letter(self) -> &'static str {
        match self {
            Field::L => "L",
            Field::M => "M",
            Field::N => "N",
            Field::O => "O",
            Field::P => "P",
            Field::Q => "Q",
            Field::R => "R",
            Field::S => "S",
            Field::T => "T",
            Field::U => "U",
            Field::V => "V",
            Field::W => "W",
            Field::X => "X",
            Field::Y => "Y",
            Field::Z => "Z",
            Field::AA => "AA",
            Field::AB => "AB",
        }
    }

    /// 1-based worksheet column number (L = 12 ... AB = 28).
    pub fn column(self) -> u32 {
        // Column L is the first schema column
        12 + self as u32
    }

    /// Key the model uses for this field in its JSON response.
    pub fn key(self) -> &'static str {
        match self {
            Field::L => "col_l",
            Field::M => "col_m",
            Field::N => "col_n",
            Field::O => "col_o",
            Field::P => "col_p",
            Field::Q => "col_q",
            Field::R => "col_r",
            Field::S => "col_s",
            Field::T => "col_t",
            Field::U => "col_u",
            Field::V => "col_v",
            Field::W => "col_w",
            Field::X => "col_x",
            Field::Y => "col_y",
            Field::Z => "col_z",
            Field::AA => "col_aa",
            Field::AB => "col_ab",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn domain(self) -> FieldDomain {
        match self {
            Field::N => FieldDomain::FreeText,
            Field::P | Field::Q => FieldDomain::Rank,
            Field::S => FieldDomain::Score,
            Field::T => FieldDomain::Autonomy,
            Field::AA | Field::AB => FieldDomain::PageReference,
            _ => FieldDomain::YesNo,
        }
    }

    /// Short human label, shown by `list-columns`.
    pub fn label(self) -> &'static str {
        match self {
            Field::L => "Central Government funded/aided",
            Field::M => "State Government funded/aided",
            Field::N => "Other funding sources",
            Field::O => "Institution of Eminence",
            Field::P => "NIRF rank",
            Field::Q => "QS Asia rank",
            Field::R => "NBA accreditation 30%+",
            Field::S => "NAAC score",
            Field::T => "Autonomous status",
            Field::U => "80%+ admission, last 5 years",
            Field::V => "Two faculty members",
            Field::W => "Lab space 2000 sq.ft",
            Field::X => "Full-time lab technician",
            Field::Y => "Governing body approval",
            Field::Z => "Written commitment",
            Field::AA => "Support for Y (page/comment)",
            Field::AB => "Support for Z (page/comment)",
        }
    }

    /// Cell address for this field on the given worksheet row, e.g. `AA7`.
    pub fn address(self, row: u32) -> String {
        format!("{}{}", self.letter(), row)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Convert a 1-based column number to its worksheet label (1 -> A, 27 -> AA).
pub fn column_letter(mut column: u32) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}
