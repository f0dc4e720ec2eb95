use crate::error::SheetError;
use crate::spreadsheet::reference::index_to_reference;
use chrono::NaiveDate;
use chrono::TimeDelta;

/// Types of cell data found in worksheet XML.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as 0/1
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline or formula string values
    InlineString,
    /// Shared string table references, resolved to text while reading
    SharedString,
    /// Error values such as `#N/A`
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Parses custom number format strings for date/time patterns.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_bracket = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_bracket => is_literal = true,

                ']' if is_bracket => is_bracket = false,
                '[' if !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }
}

/// A single non-empty cell with its position, type, and stored value.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    pub(crate) kind: CellType,
    /// Value as stored in the worksheet
    pub(crate) value: String,
}

impl Cell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Renders the cell as text without numeric reinterpretation.
    ///
    /// Plain numbers and strings keep their stored literal, so leading zeros of
    /// text cells survive. Date-formatted numbers are rendered as ISO text. A date
    /// serial that cannot be converted falls back to its stored literal.
    pub(crate) fn to_text(&self) -> String {
        let rendered = match self.kind {
            CellType::Boolean => Ok(if self.value == "1" { "true" } else { "false" }.to_owned()),
            CellType::NumberDateTime1900 => to_datetime_string(&self.value, false),
            CellType::NumberDateTime1904 => to_datetime_string(&self.value, true),
            CellType::NumberDate1900 => to_date_string(&self.value, false),
            CellType::NumberDate1904 => to_date_string(&self.value, true),
            CellType::NumberTime1900 | CellType::NumberTime1904 => to_time_string(&self.value),
            CellType::IsoDateTime => Ok(self.value.replace('T', " ")),
            _ => Ok(self.value.to_owned()),
        };
        rendered.unwrap_or_else(|error| {
            log::warn!("Cell {} value '{}' kept as stored: {}", self.reference(), self.value, error);
            self.value.to_owned()
        })
    }
}

/// Largest serial accepted as a date, far past year 9999.
const MAX_DATE_SERIAL: f64 = 1e8;

/// Converts an Excel numeric date to an ISO date string.
/// Handles the Lotus 1-2-3 leap year bug for the 1900 epoch.
fn to_date_string(value: &str, is_1904: bool) -> Result<String, SheetError> {
    let serial = value.parse::<f64>()?;
    if !serial.is_finite() || serial.abs() > MAX_DATE_SERIAL {
        return Err(SheetError::WithContextError(format!("date serial '{value}' out of range")));
    }
    let days = serial.trunc() as i64;
    let offset = if is_1904 {
        1462
    } else if days < 60 {
        1
    } else {
        0
    };
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).expect("NaiveDate literal");
    let date = days
        .checked_add(offset)
        .and_then(TimeDelta::try_days)
        .and_then(|delta| epoch.checked_add_signed(delta))
        .ok_or_else(|| SheetError::WithContextError(format!("date serial '{value}' out of range")))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Converts the fractional part of an Excel numeric time to `HH:MM:SS[.mmm]`.
fn to_time_string(value: &str) -> Result<String, SheetError> {
    let factor = value.parse::<f64>()?.fract();
    let mut hours = (factor * 86_400_000f64).round() as i64;
    let milliseconds = hours % 1_000;
    hours /= 1_000;
    let seconds = hours % 60;
    hours /= 60;
    let minutes = hours % 60;
    hours /= 60;
    let timestamp = if milliseconds > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{milliseconds:03}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    };
    Ok(timestamp)
}

/// Converts an Excel numeric datetime to `YYYY-MM-DD HH:MM:SS`.
fn to_datetime_string(value: &str, is_1904: bool) -> Result<String, SheetError> {
    let date = to_date_string(value, is_1904)?;
    let time = to_time_string(value)?;
    Ok(format!("{date} {time}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell {
            row: 0,
            col: 0,
            kind,
            value: value.to_owned(),
        }
    }

    #[test]
    fn text_keeps_leading_zeros() {
        assert_eq!(cell(CellType::InlineString, "007").to_text(), "007");
        assert_eq!(cell(CellType::Number, "7").to_text(), "7");
        assert_eq!(cell(CellType::Number, "1.25").to_text(), "1.25");
    }

    #[test]
    fn text_of_booleans_and_errors() {
        assert_eq!(cell(CellType::Boolean, "1").to_text(), "true");
        assert_eq!(cell(CellType::Boolean, "0").to_text(), "false");
        assert_eq!(cell(CellType::Error, "#N/A").to_text(), "#N/A");
    }

    #[test]
    fn text_of_dates() {
        assert_eq!(cell(CellType::NumberDate1900, "1").to_text(), "1900-01-01");
        assert_eq!(cell(CellType::NumberDate1900, "61").to_text(), "1900-03-01");
        assert_eq!(cell(CellType::NumberDate1900, "45292").to_text(), "2024-01-01");
        assert_eq!(cell(CellType::NumberDate1904, "0").to_text(), "1904-01-01");
        assert_eq!(cell(CellType::NumberDateTime1900, "45292.5").to_text(), "2024-01-01 12:00:00");
        assert_eq!(cell(CellType::NumberTime1900, "0.75").to_text(), "18:00:00");
        assert_eq!(cell(CellType::IsoDateTime, "2024-01-01T08:30:00").to_text(), "2024-01-01 08:30:00");
    }

    #[test]
    fn unparsable_date_serial_keeps_stored_value() {
        assert_eq!(cell(CellType::NumberDate1900, "n/a").to_text(), "n/a");
    }

    #[test]
    fn out_of_range_date_serial_keeps_stored_value() {
        assert_eq!(cell(CellType::NumberDate1900, "1e15").to_text(), "1e15");
        assert_eq!(cell(CellType::NumberDate1904, "-1e300").to_text(), "-1e300");
        assert_eq!(cell(CellType::NumberDate1900, "inf").to_text(), "inf");
        assert_eq!(cell(CellType::NumberDate1900, "NaN").to_text(), "NaN");
        assert_eq!(cell(CellType::NumberDateTime1900, "1e15").to_text(), "1e15");
    }

    #[test]
    fn custom_number_formats() {
        assert_eq!(CellType::parse_custom_number_format("yyyy/mm/dd", false), CellType::NumberDate1900);
        assert_eq!(CellType::parse_custom_number_format("hh:mm", true), CellType::NumberTime1904);
        assert_eq!(CellType::parse_custom_number_format("yyyy-mm-dd hh:mm:ss", false), CellType::NumberDateTime1900);
        assert_eq!(CellType::parse_custom_number_format("0.00", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("[Red]0.00", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("\"days\" 0", false), CellType::Number);
        assert_eq!(CellType::parse_builtin_number_format_id("14", false), Some(CellType::NumberDate1900));
        assert_eq!(CellType::parse_builtin_number_format_id("0", false), None);
    }
}
